//! Gateway and client fixtures
//!
//! A `TestServer` is the realtime core without a transport: the gateway
//! plus a running presence broadcaster. A `TestClient` stands in for one
//! WebSocket connection by owning the receiving end of its event queue.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use uuid::Uuid;

use chatrelay::backend::auth::{InMemoryUserDirectory, SessionAuthenticator};
use chatrelay::backend::chat::{ChatGateway, Session};
use chatrelay::backend::messaging::MessageRouter;
use chatrelay::backend::realtime::PresenceBroadcaster;
use chatrelay::backend::registry::{ConnectionHandle, ConnectionRegistry};
use chatrelay::backend::store::{InMemoryStore, MessageStore};
use chatrelay::shared::{AuthError, ClientEvent, UserIdentity};
use chatrelay::shared::event::ServerEvent;

use super::auth_helpers::{generate_test_token, test_keys};

/// How long a test waits for an expected push
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(2);

/// How long a test waits before deciding nothing is coming
pub const QUIET_PERIOD: Duration = Duration::from_millis(100);

/// Gateway over `store` with `users` in its directory
pub fn build_gateway(users: &[UserIdentity], store: Arc<dyn MessageStore>) -> ChatGateway {
    let directory: InMemoryUserDirectory = users.iter().cloned().collect();
    let authenticator = SessionAuthenticator::new(test_keys(), Arc::new(directory));
    let registry = Arc::new(ConnectionRegistry::new());
    let router = MessageRouter::new(store, Arc::clone(&registry));
    ChatGateway::new(authenticator, registry, router)
}

/// Realtime core with a live presence broadcaster
pub struct TestServer {
    pub gateway: ChatGateway,
    presence: JoinHandle<()>,
}

impl TestServer {
    /// In-memory server knowing `users`
    pub fn start(users: &[UserIdentity]) -> Self {
        Self::with_store(users, Arc::new(InMemoryStore::new()))
    }

    pub fn with_store(users: &[UserIdentity], store: Arc<dyn MessageStore>) -> Self {
        let gateway = build_gateway(users, store);
        let presence = PresenceBroadcaster::new(Arc::clone(gateway.registry())).spawn();
        Self { gateway, presence }
    }

    /// Connect `user` with a valid token
    pub async fn connect(&self, user: &UserIdentity) -> TestClient {
        let token = generate_test_token(user.id);
        match self.try_connect(Some(&token)).await {
            Ok(client) => client,
            Err(e) => panic!("Connection for {} rejected: {:?}", user.display_name, e),
        }
    }

    pub async fn try_connect(&self, token: Option<&str>) -> Result<TestClient, AuthError> {
        let (handle, events) = ConnectionHandle::channel();
        let session = self.gateway.on_connect(token, handle).await?;
        Ok(TestClient {
            gateway: self.gateway.clone(),
            session,
            events,
        })
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.presence.abort();
    }
}

/// One connection's view of the server
pub struct TestClient {
    gateway: ChatGateway,
    pub session: Session,
    pub events: UnboundedReceiver<ServerEvent>,
}

impl TestClient {
    pub fn user_id(&self) -> Uuid {
        self.session.user.id
    }

    /// Send a client event and return the reply
    pub async fn request(&self, event: ClientEvent) -> ServerEvent {
        self.gateway
            .on_client_event(self.session.connection_id, event)
            .await
    }

    /// Next pushed event, failing the test after `EVENT_TIMEOUT`
    pub async fn next_event(&mut self) -> ServerEvent {
        match timeout(EVENT_TIMEOUT, self.events.recv()).await {
            Ok(Some(event)) => event,
            Ok(None) => panic!("Event queue closed"),
            Err(_) => panic!("No event within {:?}", EVENT_TIMEOUT),
        }
    }

    /// Next pushed event that is not a presence snapshot
    pub async fn next_non_presence(&mut self) -> ServerEvent {
        loop {
            match self.next_event().await {
                ServerEvent::OnlineUsers { .. } => continue,
                other => return other,
            }
        }
    }

    /// Skip events until a presence snapshot equal to `expected` arrives
    pub async fn wait_for_online(&mut self, expected: &[Uuid]) {
        let mut expected = expected.to_vec();
        expected.sort();
        loop {
            if let ServerEvent::OnlineUsers { user_ids } = self.next_event().await {
                if user_ids == expected {
                    return;
                }
            }
        }
    }

    /// Assert that no non-presence event arrives within `QUIET_PERIOD`
    pub async fn assert_no_message(&mut self) {
        let deadline = tokio::time::Instant::now() + QUIET_PERIOD;
        loop {
            match tokio::time::timeout_at(deadline, self.events.recv()).await {
                Err(_) | Ok(None) => return,
                Ok(Some(ServerEvent::OnlineUsers { .. })) => continue,
                Ok(Some(other)) => panic!("Unexpected event: {:?}", other),
            }
        }
    }

    /// Everything queued right now
    pub fn drain(&mut self) -> Vec<ServerEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event);
        }
        drained
    }

    /// Close this connection
    pub fn disconnect(self) {
        self.gateway.on_disconnect(self.session.connection_id);
    }
}
