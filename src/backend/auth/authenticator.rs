/**
 * Session Authenticator
 *
 * Resolves an opaque session token to a `UserIdentity`. Used once when a
 * connection is established and by the bearer-token extractor on the HTTP
 * API.
 */

use jsonwebtoken::errors::ErrorKind;
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::auth::sessions::SessionKeys;
use crate::backend::auth::users::UserDirectory;
use crate::shared::error::AuthError;
use crate::shared::user::UserIdentity;

/// Verifies session tokens and resolves their subject
#[derive(Clone)]
pub struct SessionAuthenticator {
    keys: SessionKeys,
    directory: Arc<dyn UserDirectory>,
}

impl SessionAuthenticator {
    pub fn new(keys: SessionKeys, directory: Arc<dyn UserDirectory>) -> Self {
        Self { keys, directory }
    }

    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    pub fn directory(&self) -> &Arc<dyn UserDirectory> {
        &self.directory
    }

    /// Verify `token` and resolve its subject.
    ///
    /// # Errors
    ///
    /// * `Missing` - no token, or a blank one
    /// * `Expired` - valid signature, `exp` in the past
    /// * `Invalid` - anything else, including an unknown subject
    pub async fn authenticate(&self, token: Option<&str>) -> Result<UserIdentity, AuthError> {
        let token = match token.map(str::trim) {
            Some(token) if !token.is_empty() => token,
            _ => return Err(AuthError::Missing),
        };

        let claims = self.keys.verify(token).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => {
                tracing::debug!(error = %e, "Session token rejected");
                AuthError::Invalid
            }
        })?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::Invalid)?;

        match self.directory.find_user(user_id).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => {
                tracing::warn!(user_id = %user_id, "Session token for unknown user");
                Err(AuthError::Invalid)
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "User lookup failed during authentication");
                Err(AuthError::Invalid)
            }
        }
    }
}
