//! Conversation/Message Store Interface
//!
//! The store is the durable system of record for conversations and messages
//! and the single source of ordering truth: `insert_message` assigns each
//! message a strictly increasing `sequence`, and `fetch_history` returns
//! messages in that order.
//!
//! # Implementations
//!
//! - **`memory`** - `InMemoryStore`, used when no database is configured
//!   and throughout the tests
//! - **`db`** - `SqliteStore`, backed by sqlx
//!
//! Errors are surfaced to the caller as-is and never retried here.

use async_trait::async_trait;
use std::collections::BTreeSet;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::messaging::{ConversationId, ConversationSummary, Message};

/// In-memory store
pub mod memory;

/// SQLite store
pub mod db;

pub use db::SqliteStore;
pub use memory::InMemoryStore;

/// Store-level failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable conversation and message storage
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Return the conversation whose participant set is exactly
    /// `participants`, creating it if none exists
    async fn find_or_create_conversation(
        &self,
        participants: &BTreeSet<Uuid>,
    ) -> Result<ConversationId, StoreError>;

    /// Persist a message and return its assigned sequence
    async fn insert_message(&self, message: &Message) -> Result<i64, StoreError>;

    /// Participants of a conversation, `None` if it does not exist
    async fn list_participants(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<BTreeSet<Uuid>>, StoreError>;

    /// Messages with `sequence > since_sequence`, in ascending order
    async fn fetch_history(
        &self,
        conversation_id: ConversationId,
        since_sequence: i64,
    ) -> Result<Vec<Message>, StoreError>;

    /// Look up a single message
    async fn find_message(&self, message_id: Uuid) -> Result<Option<Message>, StoreError>;

    /// Add `user_id` to the message's `seen_by`.
    /// Returns `true` if the user was newly added.
    async fn add_seen(&self, message_id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;

    /// Conversation list for `user_id`, most recently active first
    async fn list_conversations(&self, user_id: Uuid) -> Result<Vec<ConversationSummary>, StoreError>;
}

/// Stable key for a participant set, independent of insertion order
pub(crate) fn participant_key(participants: &BTreeSet<Uuid>) -> String {
    participants
        .iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
