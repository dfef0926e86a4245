/**
 * API Route Configuration
 *
 * # Routes
 *
 * - `GET /api/presence` - Online user ids
 * - `GET /api/conversations` - Caller's conversation list
 * - `GET /api/conversations/{id}/messages?since=<seq>` - History catch-up
 *
 * # Authentication
 *
 * Every route requires `Authorization: Bearer <token>`. Rejections are
 * 401 with a JSON body carrying a `logout` flag.
 */

use axum::{routing::get, Router};

use crate::backend::messaging::handlers::{get_conversations, get_messages};
use crate::backend::realtime::handlers::get_presence;
use crate::backend::server::state::AppState;

/// Configure API routes
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/presence", get(get_presence))
        .route("/api/conversations", get(get_conversations))
        .route(
            "/api/conversations/{conversation_id}/messages",
            get(get_messages),
        )
}
