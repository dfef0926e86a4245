/**
 * Session Tokens
 *
 * HS256 JWTs shared with the login service. The login service issues them;
 * this module verifies them and can also issue its own for tests and local
 * tooling. Expiry is absolute: validation runs with zero leeway.
 */

use jsonwebtoken::{
    decode, encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

impl Claims {
    /// Claims for `user_id`, issued at `issued_at` and valid for `ttl`
    pub fn new(user_id: Uuid, issued_at: u64, ttl: Duration) -> Self {
        Self {
            sub: user_id.to_string(),
            exp: issued_at.saturating_add(ttl.as_secs()),
            iat: issued_at,
        }
    }
}

/// Signing and verification keys derived from one shared secret
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl SessionKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Create a token for `user_id` that expires after `ttl`
    pub fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<String, jsonwebtoken::errors::Error> {
        self.sign(&Claims::new(user_id, get_current_timestamp(), ttl))
    }

    /// Sign arbitrary claims
    pub fn sign(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
    }

    /// Verify signature and expiry, returning the decoded claims
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(token_data.claims)
    }
}
