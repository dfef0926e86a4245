//! Store failure tests
//!
//! A message that cannot be persisted must not be delivered to anyone.

use assert_matches::assert_matches;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use chatrelay::backend::store::{InMemoryStore, MessageStore, StoreError};
use chatrelay::shared::event::ServerEvent;
use chatrelay::shared::{
    ClientEvent, ConversationId, ConversationSummary, ConversationTarget, Message, MessageContent,
    SendError,
};

use crate::assert_event;
use crate::common::{test_user, TestServer};

/// In-memory store whose writes fail while `failing` is set
#[derive(Default)]
struct FlakyStore {
    inner: InMemoryStore,
    failing: AtomicBool,
}

impl FlakyStore {
    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("disk full".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageStore for FlakyStore {
    async fn find_or_create_conversation(
        &self,
        participants: &BTreeSet<Uuid>,
    ) -> Result<ConversationId, StoreError> {
        self.inner.find_or_create_conversation(participants).await
    }

    async fn insert_message(&self, message: &Message) -> Result<i64, StoreError> {
        self.check()?;
        self.inner.insert_message(message).await
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
        self.check()?;
        self.inner.add_seen(message_id, user_id).await
    }

    async fn list_conversations(&self, user_id: Uuid) -> Result<Vec<ConversationSummary>, StoreError> {
        self.inner.list_conversations(user_id).await
    }
}

#[tokio::test]
async fn test_failed_persist_delivers_nothing() {
    let alice = test_user("Alice");
    let bob = test_user("Bob");
    let store = Arc::new(FlakyStore::default());
    let server = TestServer::with_store(&[alice.clone(), bob.clone()], store.clone());

    let a = server.connect(&alice).await;
    let mut b = server.connect(&bob).await;

    store.set_failing(true);
    let result = server
        .gateway
        .router()
        .send(alice.id, ConversationTarget::Direct(bob.id), MessageContent::text("lost"))
        .await;
    assert_matches!(result, Err(SendError::StoreUnavailable { .. }));

    let reply = a
        .request(ClientEvent::Send {
            target: ConversationTarget::Direct(bob.id),
            content: MessageContent::text("also lost"),
        })
        .await;
    let error = assert_event!(reply, ServerEvent::SendFailed { error } => error);
    assert_eq!(error.kind(), "store_unavailable");
    b.assert_no_message().await;

    store.set_failing(false);
    let reply = a
        .request(ClientEvent::Send {
            target: ConversationTarget::Direct(bob.id),
            content: MessageContent::text("kept"),
        })
        .await;
    let sent = assert_event!(reply, ServerEvent::MessageSent { message } => message);
    let delivered = assert_event!(b.next_non_presence().await, ServerEvent::NewMessage { message } => message);
    assert_eq!(delivered.id, sent.id);

    let history = server
        .gateway
        .router()
        .history(bob.id, sent.conversation_id, 0)
        .await
        .expect("history failed");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].text, "kept");
}

#[tokio::test]
async fn test_failed_seen_marker_notifies_nobody() {
    let alice = test_user("Alice");
    let bob = test_user("Bob");
    let store = Arc::new(FlakyStore::default());
    let server = TestServer::with_store(&[alice.clone(), bob.clone()], store.clone());

    let mut a = server.connect(&alice).await;
    let b = server.connect(&bob).await;

    let sent = server
        .gateway
        .router()
        .send(alice.id, ConversationTarget::Direct(bob.id), MessageContent::text("read me"))
        .await
        .expect("send failed");

    store.set_failing(true);
    let reply = b.request(ClientEvent::MarkSeen { message_id: sent.message.id }).await;
    assert_matches!(reply, ServerEvent::SeenFailed { .. });
    a.assert_no_message().await;

    let stored = store
        .find_message(sent.message.id)
        .await
        .expect("lookup failed")
        .expect("message missing");
    assert_eq!(stored.seen_by, BTreeSet::from([alice.id]));
}
