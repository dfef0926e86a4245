/**
 * Chat Gateway
 *
 * Entry point for a transport. A transport (the WebSocket endpoint, or a
 * test harness) calls `on_connect` once per socket, forwards each decoded
 * `ClientEvent` to `on_client_event`, writes back the returned reply, and
 * calls `on_disconnect` on every exit path.
 *
 * Events pushed to a connection by other users (presence, new messages,
 * seen markers) arrive on the connection's own channel, not through the
 * reply.
 */

use std::sync::Arc;

use crate::backend::auth::SessionAuthenticator;
use crate::backend::messaging::MessageRouter;
use crate::backend::registry::{Connection, ConnectionHandle, ConnectionId, ConnectionRegistry};
use crate::shared::error::AuthError;
use crate::shared::event::{ClientEvent, ServerEvent};
use crate::shared::user::UserIdentity;

/// An authenticated, registered connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub connection_id: ConnectionId,
    pub user: UserIdentity,
}

#[derive(Clone)]
pub struct ChatGateway {
    authenticator: SessionAuthenticator,
    registry: Arc<ConnectionRegistry>,
    router: MessageRouter,
}

impl ChatGateway {
    pub fn new(
        authenticator: SessionAuthenticator,
        registry: Arc<ConnectionRegistry>,
        router: MessageRouter,
    ) -> Self {
        Self {
            authenticator,
            registry,
            router,
        }
    }

    pub fn authenticator(&self) -> &SessionAuthenticator {
        &self.authenticator
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    /// Authenticate and register a new connection.
    ///
    /// Nothing is registered when authentication fails.
    pub async fn on_connect(
        &self,
        token: Option<&str>,
        handle: ConnectionHandle,
    ) -> Result<Session, AuthError> {
        let user = self.authenticator.authenticate(token).await.map_err(|e| {
            tracing::warn!(reason = e.kind(), "Connection rejected");
            e
        })?;

        let connection_id = ConnectionId::next();
        self.registry.register(user.id, connection_id, handle);
        tracing::info!(
            user_id = %user.id,
            connection_id = %connection_id,
            "Connection established"
        );

        Ok(Session {
            connection_id,
            user,
        })
    }

    /// Unregister a connection. Safe to call more than once.
    pub fn on_disconnect(&self, connection_id: ConnectionId) -> Option<Connection> {
        let removed = self.registry.unregister(connection_id);
        if let Some(connection) = &removed {
            tracing::info!(
                user_id = %connection.user_id,
                connection_id = %connection_id,
                "Connection closed"
            );
        }
        removed
    }

    /// Handle one event from a registered connection and produce its reply
    pub async fn on_client_event(&self, connection_id: ConnectionId, event: ClientEvent) -> ServerEvent {
        let Some(connection) = self.registry.connection(connection_id) else {
            tracing::debug!(connection_id = %connection_id, event = event.name(), "Event from unknown connection");
            return ServerEvent::error("unknown_connection", "connection is not registered");
        };
        let user_id = connection.user_id;

        match event {
            ClientEvent::Send { target, content } => {
                match self.router.send(user_id, target, content).await {
                    Ok(sent) => ServerEvent::MessageSent {
                        message: sent.message,
                    },
                    Err(error) => ServerEvent::SendFailed { error },
                }
            }
            ClientEvent::MarkSeen { message_id } => {
                match self.router.mark_seen(user_id, message_id).await {
                    Ok(message) => ServerEvent::Seen { message },
                    Err(error) => ServerEvent::SeenFailed { error },
                }
            }
            ClientEvent::FetchHistory {
                conversation_id,
                since_sequence,
            } => match self
                .router
                .history(user_id, conversation_id, since_sequence)
                .await
            {
                Ok(messages) => ServerEvent::History {
                    conversation_id,
                    messages,
                },
                Err(e) => ServerEvent::history_failed(&e),
            },
            ClientEvent::ListConversations => match self.router.conversations(user_id).await {
                Ok(conversations) => ServerEvent::Conversations { conversations },
                Err(e) => ServerEvent::history_failed(&e),
            },
            ClientEvent::PeerStatus { user_id: peer_id } => {
                match self.authenticator.directory().find_user(peer_id).await {
                    Ok(Some(user)) => ServerEvent::Peer {
                        online: self.registry.is_online(user.id),
                        user,
                    },
                    Ok(None) => ServerEvent::error("unknown_user", format!("user {peer_id} not found")),
                    Err(e) => {
                        tracing::warn!(user_id = %peer_id, error = %e, "Peer lookup failed");
                        ServerEvent::error("store_unavailable", e.to_string())
                    }
                }
            }
        }
    }
}
