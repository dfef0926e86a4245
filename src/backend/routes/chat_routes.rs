/**
 * Chat Route Configuration
 *
 * # Routes
 *
 * - `GET /ws?token=<jwt>` - WebSocket upgrade for presence and messaging
 *
 * Authentication happens after the upgrade so a rejected client still
 * receives a close code telling it why.
 */

use axum::{routing::get, Router};

use crate::backend::realtime::socket::ws_upgrade;
use crate::backend::server::state::AppState;

/// Configure chat-related routes
pub fn configure_chat_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/ws", get(ws_upgrade))
}
