//! In-memory `MessageStore`.
//!
//! A single mutex guards all state, so every operation is atomic and the
//! sequence counter is strictly increasing.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{participant_key, MessageStore, StoreError};
use crate::shared::messaging::{ConversationId, ConversationSummary, Message};

#[derive(Default)]
struct Inner {
    conversations: HashMap<ConversationId, BTreeSet<Uuid>>,
    by_participants: HashMap<String, ConversationId>,
    /// Messages in insertion (= sequence) order
    messages: Vec<Message>,
    index: HashMap<Uuid, usize>,
    next_sequence: i64,
}

/// Process-local store
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn find_or_create_conversation(
        &self,
        participants: &BTreeSet<Uuid>,
    ) -> Result<ConversationId, StoreError> {
        let mut inner = self.lock();
        let key = participant_key(participants);
        if let Some(id) = inner.by_participants.get(&key) {
            return Ok(*id);
        }

        let id = ConversationId::new();
        inner.conversations.insert(id, participants.clone());
        inner.by_participants.insert(key, id);
        Ok(id)
    }

    async fn insert_message(&self, message: &Message) -> Result<i64, StoreError> {
        let mut inner = self.lock();
        if !inner.conversations.contains_key(&message.conversation_id) {
            return Err(StoreError::Corrupt(format!(
                "conversation {} does not exist",
                message.conversation_id
            )));
        }
        if inner.index.contains_key(&message.id) {
            return Err(StoreError::Corrupt(format!("duplicate message id {}", message.id)));
        }

        inner.next_sequence += 1;
        let sequence = inner.next_sequence;
        let mut stored = message.clone();
        stored.sequence = sequence;

        let position = inner.messages.len();
        inner.index.insert(stored.id, position);
        inner.messages.push(stored);
        Ok(sequence)
    }

    async fn list_participants(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<BTreeSet<Uuid>>, StoreError> {
        Ok(self.lock().conversations.get(&conversation_id).cloned())
    }

    async fn fetch_history(
        &self,
        conversation_id: ConversationId,
        since_sequence: i64,
    ) -> Result<Vec<Message>, StoreError> {
        Ok(self
            .lock()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id && m.sequence > since_sequence)
            .cloned()
            .collect())
    }

    async fn find_message(&self, message_id: Uuid) -> Result<Option<Message>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .index
            .get(&message_id)
            .and_then(|&position| inner.messages.get(position))
            .cloned())
    }

    async fn add_seen(&self, message_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        let position = *inner
            .index
            .get(&message_id)
            .ok_or_else(|| StoreError::Corrupt(format!("message {message_id} does not exist")))?;
        Ok(inner.messages[position].mark_seen_by(user_id))
    }

    async fn list_conversations(&self, user_id: Uuid) -> Result<Vec<ConversationSummary>, StoreError> {
        let inner = self.lock();
        let mut summaries: Vec<ConversationSummary> = inner
            .conversations
            .iter()
            .filter(|(_, participants)| participants.contains(&user_id))
            .map(|(id, participants)| {
                let in_conversation = inner.messages.iter().filter(|m| m.conversation_id == *id);
                let unseen_count = in_conversation
                    .clone()
                    .filter(|m| m.sender_id != user_id && !m.is_seen_by(user_id))
                    .count() as u32;
                ConversationSummary {
                    conversation_id: *id,
                    participants: participants.clone(),
                    last_message: in_conversation.last().cloned(),
                    unseen_count,
                }
            })
            .collect();

        summaries.sort_by_key(|s| std::cmp::Reverse(s.last_message.as_ref().map(|m| m.sequence).unwrap_or(0)));
        Ok(summaries)
    }
}
