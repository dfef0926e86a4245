//! User identity as seen by the realtime core.
//!
//! Accounts are owned by an external service; only the fields needed for
//! presence and message headers are carried here.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resolved identity of an authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: Uuid,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_ref: Option<String>,
}

impl UserIdentity {
    pub fn new(id: Uuid, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            avatar_ref: None,
        }
    }

    pub fn with_avatar(mut self, avatar_ref: impl Into<String>) -> Self {
        self.avatar_ref = Some(avatar_ref.into());
        self
    }
}
