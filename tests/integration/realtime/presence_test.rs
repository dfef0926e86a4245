//! Presence and connection admission tests

use pretty_assertions::assert_eq;
use tokio::time::timeout;

use chatrelay::shared::event::ServerEvent;
use chatrelay::shared::{AuthError, ClientEvent};

use crate::assert_event;
use crate::common::{
    expired_test_token, forged_test_token, generate_test_token, test_user, TestServer, QUIET_PERIOD,
};

#[tokio::test]
async fn test_online_set_follows_connects_and_disconnects() {
    let alice = test_user("Alice");
    let bob = test_user("Bob");
    let server = TestServer::start(&[alice.clone(), bob.clone()]);

    let mut a = server.connect(&alice).await;
    a.wait_for_online(&[alice.id]).await;

    let mut b = server.connect(&bob).await;
    a.wait_for_online(&[alice.id, bob.id]).await;
    b.wait_for_online(&[alice.id, bob.id]).await;

    a.disconnect();
    b.wait_for_online(&[bob.id]).await;
    assert!(!server.gateway.registry().is_online(alice.id));
}

#[tokio::test]
async fn test_second_device_disconnect_keeps_user_online() {
    let alice = test_user("Alice");
    let bob = test_user("Bob");
    let server = TestServer::start(&[alice.clone(), bob.clone()]);

    let mut b = server.connect(&bob).await;
    let laptop = server.connect(&alice).await;
    let phone = server.connect(&alice).await;
    b.wait_for_online(&[alice.id, bob.id]).await;
    assert_eq!(server.gateway.registry().connections_of(alice.id).len(), 2);

    phone.disconnect();
    assert!(server.gateway.registry().is_online(alice.id));
    assert_eq!(server.gateway.registry().connections_of(alice.id).len(), 1);

    laptop.disconnect();
    b.wait_for_online(&[bob.id]).await;
    assert!(server.gateway.registry().connections_of(alice.id).is_empty());
}

#[tokio::test]
async fn test_rejected_tokens_register_nothing() {
    let alice = test_user("Alice");
    let bob = test_user("Bob");
    let stranger = test_user("Stranger");
    let server = TestServer::start(&[alice.clone(), bob.clone()]);

    let mut a = server.connect(&alice).await;
    a.wait_for_online(&[alice.id]).await;

    let expired = expired_test_token(bob.id);
    let forged = forged_test_token(bob.id);
    let unknown = generate_test_token(stranger.id);

    assert_eq!(server.try_connect(Some(&expired)).await.err(), Some(AuthError::Expired));
    assert_eq!(server.try_connect(Some(&forged)).await.err(), Some(AuthError::Invalid));
    assert_eq!(server.try_connect(Some(&unknown)).await.err(), Some(AuthError::Invalid));
    assert_eq!(server.try_connect(Some("not.a.jwt")).await.err(), Some(AuthError::Invalid));
    assert_eq!(server.try_connect(None).await.err(), Some(AuthError::Missing));

    assert_eq!(server.gateway.registry().connection_count(), 1);
    assert!(!server.gateway.registry().is_online(bob.id));

    // Nobody else came online, so any further snapshot is unchanged
    while let Ok(Some(event)) = timeout(QUIET_PERIOD, a.events.recv()).await {
        assert_eq!(event, ServerEvent::OnlineUsers { user_ids: vec![alice.id] });
    }
}

#[tokio::test]
async fn test_peer_status_reports_identity_and_presence() {
    let alice = test_user("Alice");
    let bob = test_user("Bob").with_avatar("avatars/bob.png");
    let server = TestServer::start(&[alice.clone(), bob.clone()]);

    let a = server.connect(&alice).await;

    let reply = a.request(ClientEvent::PeerStatus { user_id: bob.id }).await;
    assert_eq!(reply, ServerEvent::Peer { user: bob.clone(), online: false });

    let b = server.connect(&bob).await;
    let reply = a.request(ClientEvent::PeerStatus { user_id: bob.id }).await;
    assert_eq!(reply, ServerEvent::Peer { user: bob.clone(), online: true });

    let reply = a
        .request(ClientEvent::PeerStatus { user_id: uuid::Uuid::new_v4() })
        .await;
    let code = assert_event!(reply, ServerEvent::Error { code, .. } => code);
    assert_eq!(code, "unknown_user");
    drop(b);
}

#[tokio::test]
async fn test_events_after_disconnect_are_refused() {
    let alice = test_user("Alice");
    let server = TestServer::start(&[alice.clone()]);

    let a = server.connect(&alice).await;
    let connection_id = a.session.connection_id;
    a.disconnect();

    let reply = server
        .gateway
        .on_client_event(connection_id, ClientEvent::ListConversations)
        .await;
    let code = assert_event!(reply, ServerEvent::Error { code, .. } => code);
    assert_eq!(code, "unknown_connection");

    // Disconnecting twice is harmless
    assert!(server.gateway.on_disconnect(connection_id).is_none());
}
