//! Presence HTTP Handler
//!
//! `GET /api/presence` returns the same online set that connected clients
//! receive in `online_users` events.

use axum::{extract::State, Json};
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::middleware::AuthUser;
use crate::backend::registry::ConnectionRegistry;

/// GET /api/presence
pub async fn get_presence(
    State(registry): State<Arc<ConnectionRegistry>>,
    AuthUser(_user): AuthUser,
) -> Json<Vec<Uuid>> {
    Json(registry.online_user_ids().into_iter().collect())
}
