//! Messaging HTTP Handlers
//!
//! HTTP catch-up for clients that are reconnecting or loading a
//! conversation for the first time. Live delivery goes over the WebSocket.

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::messaging::MessageRouter;
use crate::backend::middleware::AuthUser;
use crate::shared::messaging::{ConversationId, ConversationSummary, Message};

/// Query parameters for `GET /api/conversations/{id}/messages`
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Return messages with a sequence strictly greater than this
    #[serde(default)]
    pub since: i64,
}

/// GET /api/conversations
pub async fn get_conversations(
    State(router): State<MessageRouter>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<ConversationSummary>>, BackendError> {
    let conversations = router.conversations(user.id).await?;
    Ok(Json(conversations))
}

/// GET /api/conversations/{id}/messages?since=<sequence>
///
/// # Errors
///
/// * `400 Bad Request` - Conversation id or `since` is malformed
/// * `401 Unauthorized` - Missing or rejected token
/// * `403 Forbidden` - Caller is not a participant (or no such conversation)
/// * `503 Service Unavailable` - Store failure
pub async fn get_messages(
    State(router): State<MessageRouter>,
    AuthUser(user): AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<Message>>, BackendError> {
    let Path(conversation_id) = path?;
    let Query(query) = query?;
    let messages = router
        .history(user.id, ConversationId(conversation_id), query.since)
        .await?;
    Ok(Json(messages))
}
