//! Shared Error Types
//!
//! Errors surfaced by the realtime core to connected clients. Each variant
//! has a stable snake_case `kind()` that is used on the wire.
//!
//! # Error Categories
//!
//! - `AuthError` - Connection-rejecting authentication failures
//! - `SendError` - A message could not be accepted
//! - `SeenError` - A mark-as-seen request was refused
//! - `HistoryError` - A history or conversation-list read was refused
//!
//! # Usage
//!
//! ```rust
//! use chatrelay::shared::error::AuthError;
//!
//! let error = AuthError::Expired;
//! assert!(error.forces_logout());
//! assert_eq!(error.kind(), "expired");
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authentication failure. Every kind rejects the connection.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthError {
    /// No token supplied
    #[error("session token missing")]
    Missing,
    /// Signature verified but the token is past its expiry
    #[error("session token expired")]
    Expired,
    /// Malformed token, bad signature or unknown subject
    #[error("session token invalid")]
    Invalid,
}

impl AuthError {
    /// Whether the client must discard its stored credential and return
    /// to the credential-entry flow
    pub fn forces_logout(&self) -> bool {
        matches!(self, Self::Expired | Self::Invalid)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Expired => "expired",
            Self::Invalid => "invalid",
        }
    }
}

/// A message was not sent. Nothing is visible to either party.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SendError {
    /// Persistence failed; no delivery was attempted
    #[error("message store unavailable: {reason}")]
    StoreUnavailable { reason: String },
    /// Neither text nor attachment
    #[error("message has no content")]
    EmptyMessage,
    /// Target names no participant other than the sender
    #[error("message target has no recipients")]
    InvalidTarget,
    /// Sender is not a participant of the target conversation
    #[error("sender is not a participant of the conversation")]
    NotParticipant,
    /// Target conversation does not exist
    #[error("conversation not found")]
    UnknownConversation,
}

impl SendError {
    pub fn store_unavailable(reason: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::StoreUnavailable { .. } => "store_unavailable",
            Self::EmptyMessage => "empty_message",
            Self::InvalidTarget => "invalid_target",
            Self::NotParticipant => "not_participant",
            Self::UnknownConversation => "unknown_conversation",
        }
    }
}

/// A mark-as-seen request was refused; `seen_by` is unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeenError {
    #[error("message not found")]
    NotFound,
    #[error("user is not a participant of the conversation")]
    NotParticipant,
    #[error("message store unavailable: {reason}")]
    StoreUnavailable { reason: String },
}

impl SeenError {
    pub fn store_unavailable(reason: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::NotParticipant => "not_participant",
            Self::StoreUnavailable { .. } => "store_unavailable",
        }
    }
}

/// A history or conversation-list read was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryError {
    #[error("user is not a participant of the conversation")]
    NotParticipant,
    #[error("message store unavailable: {reason}")]
    StoreUnavailable { reason: String },
}

impl HistoryError {
    pub fn store_unavailable(reason: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotParticipant => "not_participant",
            Self::StoreUnavailable { .. } => "store_unavailable",
        }
    }
}
