/**
 * Server Initialization
 *
 * This module wires the realtime core together and builds the Axum router.
 *
 * # Initialization Process
 *
 * 1. Load stores (SQLite, or in-memory fallback)
 * 2. Create the connection registry and session authenticator
 * 3. Create the message router and chat gateway
 * 4. Spawn the presence broadcaster
 * 5. Create and configure the router
 */

use axum::Router;
use std::sync::Arc;

use crate::backend::auth::{SessionAuthenticator, SessionKeys};
use crate::backend::chat::ChatGateway;
use crate::backend::messaging::MessageRouter;
use crate::backend::realtime::presence::PresenceBroadcaster;
use crate::backend::realtime::socket::Heartbeat;
use crate::backend::registry::ConnectionRegistry;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_stores, Stores};
use crate::backend::server::state::AppState;
use crate::shared::config::ServerConfig;

/// Build application state from already-opened stores.
///
/// Does not start the presence broadcaster.
pub fn build_state(config: &ServerConfig, stores: Stores) -> AppState {
    let registry = Arc::new(ConnectionRegistry::new());
    let authenticator = SessionAuthenticator::new(
        SessionKeys::from_secret(config.jwt_secret.as_bytes()),
        stores.users,
    );
    let router = MessageRouter::new(stores.messages, Arc::clone(&registry));
    let gateway = ChatGateway::new(authenticator, registry, router);

    AppState::new(gateway, Heartbeat::from(config))
}

/// Create and configure the Axum application
///
/// # Error Handling
///
/// The function is designed to be resilient:
/// - Missing database: Server continues on the in-memory store
/// - Unreachable database: Logged, then the same fallback
pub async fn create_app(config: &ServerConfig) -> Router<()> {
    tracing::info!("Initializing chat realtime server");

    let stores = load_stores(config).await;
    let app_state = build_state(config, stores);

    PresenceBroadcaster::new(Arc::clone(app_state.gateway.registry())).spawn();
    tracing::info!("Presence broadcaster started");

    create_router(app_state)
}
