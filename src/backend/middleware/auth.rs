/**
 * Authentication Extractor
 *
 * Protects HTTP API routes. The bearer token from the `Authorization`
 * header goes through the same `SessionAuthenticator` that admits
 * WebSocket connections, so both surfaces agree on who is logged in.
 */

use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::user::UserIdentity;

/// Token from an `Authorization: Bearer <token>` header.
///
/// Any other scheme carries no session token and yields `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(str::trim).filter(|token| !token.is_empty())
}

/// Axum extractor for the authenticated user
///
/// Rejects with 401 and a JSON body whose `logout` flag is set for expired
/// or invalid tokens.
#[derive(Clone, Debug)]
pub struct AuthUser(pub UserIdentity);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers);
        let user = state
            .gateway
            .authenticator()
            .authenticate(token)
            .await
            .map_err(|e| {
                tracing::warn!(reason = e.kind(), path = %parts.uri.path(), "API request rejected");
                BackendError::from(e)
            })?;

        Ok(AuthUser(user))
    }
}
