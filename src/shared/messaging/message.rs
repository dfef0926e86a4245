//! Chat Message Data Structure
//!
//! Represents a message in a conversation, plus the client-supplied content
//! it is built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::conversation::ConversationId;

/// Content of an outgoing message as supplied by the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MessageContent {
    /// Message text (may be empty when an attachment is present)
    #[serde(default)]
    pub text: String,
    /// Reference to an externally stored attachment (image, video)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_ref: Option<String>,
}

impl MessageContent {
    /// Plain text content
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment_ref: None,
        }
    }

    /// Attach an external reference
    pub fn with_attachment(mut self, attachment_ref: impl Into<String>) -> Self {
        self.attachment_ref = Some(attachment_ref.into());
        self
    }

    /// True when there is neither visible text nor an attachment
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
            && self
                .attachment_ref
                .as_deref()
                .map(|r| r.trim().is_empty())
                .unwrap_or(true)
    }
}

/// Represents a chat message
///
/// `sequence` is assigned by the store on insert and is the only ordering
/// authority within a conversation. `seen_by` only ever grows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique message ID (UUIDv7, time-ordered)
    pub id: Uuid,
    /// Conversation this message belongs to
    pub conversation_id: ConversationId,
    /// User who sent the message
    pub sender_id: Uuid,
    /// Message text
    pub text: String,
    /// Optional attachment reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_ref: Option<String>,
    /// When the message was created
    pub created_at: DateTime<Utc>,
    /// Store-assigned position in the conversation (0 until persisted)
    pub sequence: i64,
    /// Users who have seen this message
    pub seen_by: BTreeSet<Uuid>,
}

impl Message {
    /// Build a new, not yet persisted message. The sender has always seen
    /// their own message.
    pub fn new(conversation_id: ConversationId, sender_id: Uuid, content: MessageContent) -> Self {
        let mut seen_by = BTreeSet::new();
        seen_by.insert(sender_id);

        Self {
            id: Uuid::now_v7(),
            conversation_id,
            sender_id,
            text: content.text,
            attachment_ref: content.attachment_ref,
            created_at: Utc::now(),
            sequence: 0,
            seen_by,
        }
    }

    /// Record that `user_id` has seen this message.
    /// Returns `false` if the user was already present.
    pub fn mark_seen_by(&mut self, user_id: Uuid) -> bool {
        self.seen_by.insert(user_id)
    }

    /// Whether `user_id` has seen this message
    pub fn is_seen_by(&self, user_id: Uuid) -> bool {
        self.seen_by.contains(&user_id)
    }
}
