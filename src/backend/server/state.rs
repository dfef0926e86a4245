/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct serves as the central state container for the
 * application, holding:
 * - The chat gateway (authenticator, connection registry, message router)
 * - Heartbeat timings for WebSocket connections
 *
 * # Thread Safety
 *
 * Everything in `AppState` is cheap to clone and shared behind `Arc`:
 * - `ConnectionRegistry` guards its indexes with a single `RwLock`
 * - Stores are `Send + Sync` trait objects
 *
 * # State Extraction
 *
 * The `FromRef` implementations allow Axum handlers to extract specific
 * parts of the state without needing the entire `AppState`.
 *
 * # Example
 *
 * ```rust,no_run
 * use chatrelay::backend::registry::ConnectionRegistry;
 * use axum::extract::State;
 * use std::sync::Arc;
 *
 * async fn handler(State(registry): State<Arc<ConnectionRegistry>>) -> String {
 *     registry.connection_count().to_string()
 * }
 * ```
 */

use axum::extract::FromRef;
use std::sync::Arc;

use crate::backend::auth::SessionAuthenticator;
use crate::backend::chat::ChatGateway;
use crate::backend::messaging::MessageRouter;
use crate::backend::realtime::socket::Heartbeat;
use crate::backend::registry::ConnectionRegistry;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Transport entry point: connect, disconnect, client events
    pub gateway: ChatGateway,

    /// Ping/pong timings for WebSocket connections
    pub heartbeat: Heartbeat,
}

impl AppState {
    pub fn new(gateway: ChatGateway, heartbeat: Heartbeat) -> Self {
        Self { gateway, heartbeat }
    }
}

impl FromRef<AppState> for ChatGateway {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.gateway.clone()
    }
}

impl FromRef<AppState> for Arc<ConnectionRegistry> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(app_state.gateway.registry())
    }
}

impl FromRef<AppState> for MessageRouter {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.gateway.router().clone()
    }
}

impl FromRef<AppState> for SessionAuthenticator {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.gateway.authenticator().clone()
    }
}

impl FromRef<AppState> for Heartbeat {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.heartbeat
    }
}
