//! Concurrent sends into one conversation
//!
//! A reader must see a conversation's messages in `sequence` order even
//! when the store finishes the earlier insert after a later send started.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use chatrelay::backend::store::{InMemoryStore, MessageStore, StoreError};
use chatrelay::shared::event::ServerEvent;
use chatrelay::shared::{
    ConversationId, ConversationSummary, ConversationTarget, Message, MessageContent,
};

use crate::assert_event;
use crate::common::{test_user, TestServer};

const STALLED_TEXT: &str = "first";

/// In-memory store that stalls after assigning a sequence to one message
#[derive(Default)]
struct StallingStore {
    inner: InMemoryStore,
}

#[async_trait]
impl MessageStore for StallingStore {
    async fn find_or_create_conversation(
        &self,
        participants: &BTreeSet<Uuid>,
    ) -> Result<ConversationId, StoreError> {
        self.inner.find_or_create_conversation(participants).await
    }

    async fn insert_message(&self, message: &Message) -> Result<i64, StoreError> {
        let sequence = self.inner.insert_message(message).await?;
        if message.text == STALLED_TEXT {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        Ok(sequence)
    }

    async fn list_participants(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<BTreeSet<Uuid>>, StoreError> {
        self.inner.list_participants(conversation_id).await
    }

    async fn fetch_history(
        &self,
        conversation_id: ConversationId,
        since_sequence: i64,
    ) -> Result<Vec<Message>, StoreError> {
        self.inner.fetch_history(conversation_id, since_sequence).await
    }

    async fn find_message(&self, message_id: Uuid) -> Result<Option<Message>, StoreError> {
        self.inner.find_message(message_id).await
    }

    async fn add_seen(&self, message_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        self.inner.add_seen(message_id, user_id).await
    }

    async fn list_conversations(&self, user_id: Uuid) -> Result<Vec<ConversationSummary>, StoreError> {
        self.inner.list_conversations(user_id).await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_overlapping_sends_arrive_in_sequence_order() {
    let alice = test_user("Alice");
    let bob = test_user("Bob");
    let server = TestServer::with_store(&[alice.clone(), bob.clone()], Arc::new(StallingStore::default()));
    let mut b = server.connect(&bob).await;

    let router = server.gateway.router().clone();
    let opened = router
        .send(alice.id, ConversationTarget::Direct(bob.id), MessageContent::text("hello"))
        .await
        .expect("send failed");
    let conversation = ConversationTarget::Existing(opened.message.conversation_id);
    assert_event!(b.next_non_presence().await, ServerEvent::NewMessage { message } => message);

    let first = tokio::spawn({
        let router = router.clone();
        let target = conversation.clone();
        async move { router.send(alice.id, target, MessageContent::text(STALLED_TEXT)).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = tokio::spawn({
        let router = router.clone();
        let target = conversation.clone();
        async move { router.send(alice.id, target, MessageContent::text("second")).await }
    });

    let first = first.await.expect("task panicked").expect("send failed");
    let second = second.await.expect("task panicked").expect("send failed");
    assert!(first.message.sequence < second.message.sequence);
    assert!(first.message.created_at <= second.message.created_at);

    let mut observed = Vec::new();
    for _ in 0..2 {
        let message = assert_event!(b.next_non_presence().await, ServerEvent::NewMessage { message } => message);
        observed.push((message.text, message.sequence));
    }
    assert_eq!(
        observed,
        vec![
            (STALLED_TEXT.to_string(), first.message.sequence),
            ("second".to_string(), second.message.sequence),
        ]
    );
}
