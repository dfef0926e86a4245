/**
 * Backend Error Types
 *
 * This module defines error types returned by the HTTP API. They are
 * converted to JSON responses in `conversion.rs`.
 *
 * # Error Categories
 *
 * ## Authentication Errors
 *
 * A missing, expired or invalid bearer token. Always 401; expired and
 * invalid tokens also tell the client to log out.
 *
 * ## Read Errors
 *
 * History and conversation-list failures from the message router:
 * - Caller is not a participant (403)
 * - Store unavailable (503)
 *
 * ## Handler Errors
 *
 * Malformed path or query parameters, with an explicit status code.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::error::{AuthError, HistoryError};

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use chatrelay::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::handler(StatusCode::BAD_REQUEST, "Invalid request");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (malformed path or query)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Bearer token missing or rejected
    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    /// History or conversation-list read refused
    #[error(transparent)]
    History(#[from] HistoryError),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `Unauthorized` - 401 Unauthorized
    /// - `History::NotParticipant` - 403 Forbidden
    /// - `History::StoreUnavailable` - 503 Service Unavailable
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::History(err) => match err {
                HistoryError::NotParticipant => StatusCode::FORBIDDEN,
                HistoryError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::Unauthorized(err) => err.to_string(),
            Self::History(err) => err.to_string(),
        }
    }

    /// Whether the client must discard its session token
    pub fn forces_logout(&self) -> bool {
        matches!(self, Self::Unauthorized(err) if err.forces_logout())
    }
}
