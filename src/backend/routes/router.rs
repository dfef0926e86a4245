/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * 1. Chat routes (WebSocket)
 * 2. API routes (presence, conversations, history)
 * 3. Health check
 * 4. Fallback handler (404)
 */

use axum::{http::StatusCode, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::chat_routes::configure_chat_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Route Details
///
/// - `GET /ws` - WebSocket upgrade
/// - `GET /api/presence` - Online users
/// - `GET /api/conversations` - Conversation list
/// - `GET /api/conversations/{id}/messages` - History
/// - `GET /health` - Liveness probe
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = configure_chat_routes(Router::new());
    let router = configure_api_routes(router);

    let router = router.route("/health", get(|| async { "ok" }));

    // Fallback handler for 404
    let router = router.fallback(|| async { (StatusCode::NOT_FOUND, "404 Not Found") });

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
