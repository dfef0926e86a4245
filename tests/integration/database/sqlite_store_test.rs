//! SQLite store integration tests

use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

use chatrelay::backend::store::MessageStore;
use chatrelay::shared::event::ServerEvent;
use chatrelay::shared::{ClientEvent, ConversationId, ConversationTarget, Message, MessageContent};

use crate::common::{create_test_store, open_file_store, test_user, TestServer};
use crate::{assert_err, assert_event, assert_ok, assert_strictly_increasing};

fn pair() -> BTreeSet<Uuid> {
    BTreeSet::from([Uuid::new_v4(), Uuid::new_v4()])
}

#[tokio::test]
async fn test_messages_survive_reopen() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let participants = pair();
    let sender = *participants.iter().next().expect("empty participant set");

    let (conversation, sent) = {
        let store = open_file_store(&dir).await;
        let conversation = assert_ok!(store.find_or_create_conversation(&participants).await);
        let mut message = Message::new(conversation, sender, MessageContent::text("durable"));
        message.sequence = assert_ok!(store.insert_message(&message).await);
        store.pool().close().await;
        (conversation, message)
    };

    let store = open_file_store(&dir).await;
    let again = assert_ok!(store.find_or_create_conversation(&participants).await);
    assert_eq!(again, conversation);

    let history = assert_ok!(store.fetch_history(conversation, 0).await);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, sent.id);
    assert_eq!(history[0].sequence, sent.sequence);
    assert_eq!(history[0].text, "durable");
    assert!(history[0].is_seen_by(sender));
}

#[tokio::test]
async fn test_sequences_increase_across_conversations() {
    let store = create_test_store().await;
    let first = pair();
    let second = pair();
    let a = assert_ok!(store.find_or_create_conversation(&first).await);
    let b = assert_ok!(store.find_or_create_conversation(&second).await);
    assert!(a != b);

    let mut sequences = Vec::new();
    for (i, (conversation, participants)) in [(a, &first), (b, &second), (a, &first)].into_iter().enumerate() {
        let sender = *participants.iter().next().expect("empty participant set");
        let message = Message::new(conversation, sender, MessageContent::text(format!("m{i}")));
        sequences.push(assert_ok!(store.insert_message(&message).await));
    }
    assert_strictly_increasing!(sequences.clone());

    let history = assert_ok!(store.fetch_history(a, 0).await);
    assert_eq!(
        history.iter().map(|m| m.sequence).collect::<Vec<_>>(),
        vec![sequences[0], sequences[2]]
    );
    let since = assert_ok!(store.fetch_history(a, sequences[0]).await);
    assert_eq!(since.len(), 1);
    assert_eq!(since[0].text, "m2");
}

#[tokio::test]
async fn test_add_seen_is_idempotent() {
    let store = create_test_store().await;
    let participants = pair();
    let mut ids = participants.iter().copied();
    let sender = ids.next().expect("empty participant set");
    let reader = ids.next().expect("single participant");

    let conversation = assert_ok!(store.find_or_create_conversation(&participants).await);
    let message = Message::new(conversation, sender, MessageContent::text("look"));
    assert_ok!(store.insert_message(&message).await);

    assert!(assert_ok!(store.add_seen(message.id, reader).await));
    assert!(!assert_ok!(store.add_seen(message.id, reader).await));
    assert!(!assert_ok!(store.add_seen(message.id, sender).await));

    let stored = assert_ok!(store.find_message(message.id).await).expect("message missing");
    assert_eq!(stored.seen_by, participants);
}

#[tokio::test]
async fn test_unknown_records() {
    let store = create_test_store().await;
    let missing = ConversationId::new();

    assert_eq!(assert_ok!(store.list_participants(missing).await), None);
    assert!(assert_ok!(store.find_message(Uuid::new_v4()).await).is_none());
    assert!(assert_ok!(store.fetch_history(missing, 0).await).is_empty());

    let orphan = Message::new(missing, Uuid::new_v4(), MessageContent::text("nowhere"));
    assert_err!(store.insert_message(&orphan).await);
}

#[tokio::test]
async fn test_upserted_users_are_found() {
    use chatrelay::backend::auth::UserDirectory;

    let store = create_test_store().await;
    let alice = test_user("Alice");
    assert_ok!(store.upsert_user(&alice).await);
    assert_ok!(store.upsert_user(&alice.clone().with_avatar("a.png")).await);

    let found = assert_ok!(store.find_user(alice.id).await).expect("user missing");
    assert_eq!(found.display_name, "Alice");
    assert_eq!(found.avatar_ref.as_deref(), Some("a.png"));
    assert!(assert_ok!(store.find_user(Uuid::new_v4()).await).is_none());
}

#[tokio::test]
async fn test_gateway_over_sqlite_counts_unseen() {
    let alice = test_user("Alice");
    let bob = test_user("Bob");
    let store = Arc::new(create_test_store().await);
    let server = TestServer::with_store(&[alice.clone(), bob.clone()], store);

    let a = server.connect(&alice).await;
    let b = server.connect(&bob).await;

    let mut sent = Vec::new();
    for text in ["first", "second"] {
        let reply = a
            .request(ClientEvent::Send {
                target: ConversationTarget::Direct(bob.id),
                content: MessageContent::text(text),
            })
            .await;
        sent.push(assert_event!(reply, ServerEvent::MessageSent { message } => message));
    }

    let reply = b.request(ClientEvent::MarkSeen { message_id: sent[0].id }).await;
    assert_event!(reply, ServerEvent::Seen { .. } => ());

    let reply = b.request(ClientEvent::ListConversations).await;
    let conversations = assert_event!(reply, ServerEvent::Conversations { conversations } => conversations);
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].unseen_count, 1);
    assert_eq!(conversations[0].participants, BTreeSet::from([alice.id, bob.id]));

    let reply = a.request(ClientEvent::ListConversations).await;
    let conversations = assert_event!(reply, ServerEvent::Conversations { conversations } => conversations);
    assert_eq!(conversations[0].unseen_count, 0);
}
