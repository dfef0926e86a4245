//! Message Router
//!
//! Accepts a message from a sender, makes it durable, then fans it out to
//! the live connections of the other participants.
//!
//! # Delivery Contract
//!
//! 1. Validate content and target
//! 2. Resolve (or lazily create) the conversation
//! 3. Persist; the store assigns `sequence`
//! 4. Push `new_message` to every live connection of every other participant
//!
//! A store failure aborts before step 4, so a message is either durable or
//! invisible to everyone. Live pushes are fire-and-forget: an offline
//! recipient catches up through history, not through a retry.
//!
//! # Ordering
//!
//! Steps 3 and 4 run under a per-conversation lock, and the message (with
//! its `created_at`) is built inside it. Live readers therefore receive a conversation's
//! messages in `sequence` order, and `created_at` never decreases with it.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use crate::backend::realtime::broadcast::send_to_users;
use crate::backend::registry::ConnectionRegistry;
use crate::backend::store::MessageStore;
use crate::shared::error::{HistoryError, SeenError, SendError};
use crate::shared::event::ServerEvent;
use crate::shared::messaging::{
    ConversationId, ConversationSummary, ConversationTarget, Message, MessageContent,
};

/// Outcome of a successful send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// The persisted message, with its sequence assigned
    pub message: Message,
    /// Connections the message was pushed to
    pub live_deliveries: usize,
}

type ConversationLocks = HashMap<ConversationId, Arc<AsyncMutex<()>>>;

#[derive(Clone)]
pub struct MessageRouter {
    store: Arc<dyn MessageStore>,
    registry: Arc<ConnectionRegistry>,
    ordering: Arc<Mutex<ConversationLocks>>,
}

impl MessageRouter {
    pub fn new(store: Arc<dyn MessageStore>, registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            store,
            registry,
            ordering: Arc::default(),
        }
    }

    /// Lock serializing persist-then-push within one conversation
    fn conversation_lock(&self, conversation_id: ConversationId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.ordering.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(locks.entry(conversation_id).or_default())
    }

    pub fn store(&self) -> &Arc<dyn MessageStore> {
        &self.store
    }

    /// Persist a message and deliver it to the other participants
    pub async fn send(
        &self,
        sender_id: Uuid,
        target: ConversationTarget,
        content: MessageContent,
    ) -> Result<SentMessage, SendError> {
        if content.is_empty() {
            return Err(SendError::EmptyMessage);
        }

        let (conversation_id, participants) = self.resolve(sender_id, &target).await?;

        let lock = self.conversation_lock(conversation_id);
        let _ordered = lock.lock().await;

        let mut message = Message::new(conversation_id, sender_id, content);
        message.sequence = self.store.insert_message(&message).await.map_err(|e| {
            tracing::warn!(
                sender_id = %sender_id,
                conversation_id = %conversation_id,
                error = %e,
                "Message not persisted"
            );
            SendError::store_unavailable(e.to_string())
        })?;

        let recipients = participants.into_iter().filter(|id| *id != sender_id);
        let event = ServerEvent::NewMessage {
            message: message.clone(),
        };
        let live_deliveries = send_to_users(&self.registry, recipients, &event);

        tracing::debug!(
            message_id = %message.id,
            conversation_id = %conversation_id,
            sequence = message.sequence,
            live_deliveries,
            "Message routed"
        );
        Ok(SentMessage {
            message,
            live_deliveries,
        })
    }

    async fn resolve(
        &self,
        sender_id: Uuid,
        target: &ConversationTarget,
    ) -> Result<(ConversationId, BTreeSet<Uuid>), SendError> {
        if let Some(participants) = target.participants_with(sender_id) {
            if participants.len() < 2 {
                return Err(SendError::InvalidTarget);
            }
            let conversation_id = self
                .store
                .find_or_create_conversation(&participants)
                .await
                .map_err(|e| {
                    tracing::warn!(sender_id = %sender_id, error = %e, "Conversation lookup failed");
                    SendError::store_unavailable(e.to_string())
                })?;
            return Ok((conversation_id, participants));
        }

        let conversation_id = match target {
            ConversationTarget::Existing(conversation_id) => *conversation_id,
            _ => return Err(SendError::InvalidTarget),
        };
        let participants = self
            .store
            .list_participants(conversation_id)
            .await
            .map_err(|e| SendError::store_unavailable(e.to_string()))?
            .ok_or(SendError::UnknownConversation)?;
        if !participants.contains(&sender_id) {
            return Err(SendError::NotParticipant);
        }
        Ok((conversation_id, participants))
    }

    /// Record that `user_id` has seen a message.
    ///
    /// Idempotent. The first time a user is added, the other participants
    /// receive a `message_seen` event.
    pub async fn mark_seen(&self, user_id: Uuid, message_id: Uuid) -> Result<Message, SeenError> {
        let mut message = self
            .store
            .find_message(message_id)
            .await
            .map_err(|e| SeenError::store_unavailable(e.to_string()))?
            .ok_or(SeenError::NotFound)?;

        let participants = self
            .store
            .list_participants(message.conversation_id)
            .await
            .map_err(|e| SeenError::store_unavailable(e.to_string()))?
            .ok_or(SeenError::NotFound)?;
        if !participants.contains(&user_id) {
            return Err(SeenError::NotParticipant);
        }

        let newly_seen = self.store.add_seen(message_id, user_id).await.map_err(|e| {
            tracing::warn!(message_id = %message_id, error = %e, "Seen marker not persisted");
            SeenError::store_unavailable(e.to_string())
        })?;

        if newly_seen {
            message.mark_seen_by(user_id);
            let event = ServerEvent::MessageSeen {
                message_id,
                conversation_id: message.conversation_id,
                user_id,
            };
            send_to_users(
                &self.registry,
                participants.into_iter().filter(|id| *id != user_id),
                &event,
            );
        }
        Ok(message)
    }

    /// Messages after `since_sequence` in a conversation the user belongs to
    pub async fn history(
        &self,
        user_id: Uuid,
        conversation_id: ConversationId,
        since_sequence: i64,
    ) -> Result<Vec<Message>, HistoryError> {
        let participants = self
            .store
            .list_participants(conversation_id)
            .await
            .map_err(|e| HistoryError::store_unavailable(e.to_string()))?;
        // An unknown conversation is indistinguishable from a foreign one
        if !participants.is_some_and(|p| p.contains(&user_id)) {
            return Err(HistoryError::NotParticipant);
        }

        self.store
            .fetch_history(conversation_id, since_sequence)
            .await
            .map_err(|e| HistoryError::store_unavailable(e.to_string()))
    }

    /// Conversation list for `user_id`, most recently active first
    pub async fn conversations(&self, user_id: Uuid) -> Result<Vec<ConversationSummary>, HistoryError> {
        self.store
            .list_conversations(user_id)
            .await
            .map_err(|e| HistoryError::store_unavailable(e.to_string()))
    }
}
