/**
 * WebSocket Transport
 *
 * This module implements `GET /ws?token=<jwt>`, the long-lived connection
 * clients use for presence and message delivery.
 *
 * # Connection Lifecycle
 *
 * 1. The upgrade is always accepted; authentication runs on the socket
 * 2. Auth failure closes immediately with an application close code
 * 3. On success the connection is registered and three tasks run:
 *    - writer: drains the connection's event queue into the socket
 *    - heartbeat: pings periodically, gives up when no pong arrives
 *    - reader (this task): decodes client events, queues replies
 * 4. Whichever way the reader loop ends, the connection is unregistered
 *
 * # Close Codes
 *
 * - `4000` - Session token missing
 * - `4001` - Session token expired (client must log out)
 * - `4002` - Session token invalid (client must log out)
 *
 * # Frames
 *
 * Events are JSON text frames. Binary frames are rejected with an `error`
 * reply; the connection stays open.
 */

use axum::{
    body::Bytes,
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::backend::chat::{ChatGateway, Session};
use crate::backend::registry::ConnectionHandle;
use crate::backend::server::state::AppState;
use crate::shared::config::ServerConfig;
use crate::shared::error::AuthError;
use crate::shared::event::{ClientEvent, ServerEvent};

pub const CLOSE_TOKEN_MISSING: u16 = 4000;
pub const CLOSE_TOKEN_EXPIRED: u16 = 4001;
pub const CLOSE_TOKEN_INVALID: u16 = 4002;

/// Close code sent when no pong arrives in time (going away)
const CLOSE_PONG_TIMEOUT: u16 = 1001;

/// Ping/pong timings for one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heartbeat {
    pub ping_interval: Duration,
    pub pong_timeout: Duration,
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(30),
            pong_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&ServerConfig> for Heartbeat {
    fn from(config: &ServerConfig) -> Self {
        Self {
            ping_interval: config.ping_interval,
            pong_timeout: config.pong_timeout,
        }
    }
}

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct WsAuthQuery {
    pub token: Option<String>,
}

/// Close code and reason for a rejected connection
pub fn close_frame_for(error: AuthError) -> CloseFrame {
    let (code, reason) = match error {
        AuthError::Missing => (CLOSE_TOKEN_MISSING, "session token missing"),
        AuthError::Expired => (CLOSE_TOKEN_EXPIRED, "session expired; log in again"),
        AuthError::Invalid => (CLOSE_TOKEN_INVALID, "session invalid; log in again"),
    };
    CloseFrame {
        code,
        reason: reason.into(),
    }
}

/// GET /ws?token=JWT
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(params): Query<WsAuthQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| run_connection(socket, state, params.token))
}

/// Authenticate, register and serve one socket until it closes
pub async fn run_connection(mut socket: WebSocket, state: AppState, token: Option<String>) {
    let gateway = state.gateway;
    let (handle, events) = ConnectionHandle::channel();
    let replies = handle.clone();

    let session = match gateway.on_connect(token.as_deref(), handle).await {
        Ok(session) => session,
        Err(error) => {
            let _ = socket.send(Message::Close(Some(close_frame_for(error)))).await;
            return;
        }
    };

    let (ws_sender, ws_receiver) = socket.split();
    let (control_tx, control_rx) = mpsc::unbounded_channel::<Message>();
    let (pong_tx, pong_rx) = mpsc::unbounded_channel::<()>();

    let writer_handle = tokio::spawn(writer_task(ws_sender, events, control_rx));
    let mut heartbeat_handle =
        tokio::spawn(heartbeat_task(control_tx.clone(), pong_rx, state.heartbeat));

    tokio::select! {
        _ = reader_loop(ws_receiver, &gateway, &session, &replies, &control_tx, &pong_tx) => {}
        _ = &mut heartbeat_handle => {
            tracing::info!(
                user_id = %session.user.id,
                connection_id = %session.connection_id,
                "Heartbeat expired"
            );
        }
    }

    gateway.on_disconnect(session.connection_id);
    heartbeat_handle.abort();
    drop(replies);
    drop(control_tx);
    // Give the writer a moment to flush a pending close frame
    let _ = timeout(Duration::from_millis(100), writer_handle).await;
}

async fn reader_loop(
    mut ws_receiver: futures_util::stream::SplitStream<WebSocket>,
    gateway: &ChatGateway,
    session: &Session,
    replies: &ConnectionHandle,
    control_tx: &mpsc::UnboundedSender<Message>,
    pong_tx: &mpsc::UnboundedSender<()>,
) {
    while let Some(frame) = ws_receiver.next().await {
        let msg = match frame {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(
                    user_id = %session.user.id,
                    connection_id = %session.connection_id,
                    error = %e,
                    "WebSocket receive error"
                );
                return;
            }
        };

        match msg {
            Message::Text(text) => {
                let reply = match serde_json::from_str::<ClientEvent>(text.as_str()) {
                    Ok(event) => gateway.on_client_event(session.connection_id, event).await,
                    Err(e) => {
                        tracing::debug!(connection_id = %session.connection_id, "Malformed client event: {}", e);
                        ServerEvent::error("bad_request", e.to_string())
                    }
                };
                if replies.push(reply).is_err() {
                    return;
                }
            }
            Message::Binary(_) => {
                let reply = ServerEvent::error("bad_request", "binary frames are not supported");
                if replies.push(reply).is_err() {
                    return;
                }
            }
            Message::Pong(_) => {
                let _ = pong_tx.send(());
            }
            Message::Ping(data) => {
                let _ = control_tx.send(Message::Pong(data));
            }
            Message::Close(frame) => {
                tracing::debug!(
                    connection_id = %session.connection_id,
                    reason = ?frame,
                    "Client initiated close"
                );
                return;
            }
        }
    }
}

/// Forward queued events and control frames to the socket
async fn writer_task(
    mut ws_sender: SplitSink<WebSocket, Message>,
    mut events: mpsc::UnboundedReceiver<ServerEvent>,
    mut control: mpsc::UnboundedReceiver<Message>,
) {
    loop {
        let msg = tokio::select! {
            Some(event) = events.recv() => match serde_json::to_string(&event) {
                Ok(json) => Message::Text(json.into()),
                Err(e) => {
                    tracing::error!(event = event.name(), "Failed to serialize event: {}", e);
                    continue;
                }
            },
            Some(msg) = control.recv() => msg,
            else => break,
        };

        let closing = matches!(msg, Message::Close(_));
        if ws_sender.send(msg).await.is_err() || closing {
            break;
        }
    }
}

/// Ping on an interval; return once a pong is overdue or the writer is gone
async fn heartbeat_task(
    control_tx: mpsc::UnboundedSender<Message>,
    mut pong_rx: mpsc::UnboundedReceiver<()>,
    heartbeat: Heartbeat,
) {
    let mut ping_timer = interval(heartbeat.ping_interval);
    ping_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Skip the first immediate tick
    ping_timer.tick().await;

    loop {
        ping_timer.tick().await;
        // Drop pongs that arrived unprompted
        while pong_rx.try_recv().is_ok() {}

        if control_tx.send(Message::Ping(Bytes::from_static(b"hb"))).is_err() {
            return;
        }

        match timeout(heartbeat.pong_timeout, pong_rx.recv()).await {
            Ok(Some(())) => {}
            _ => {
                tracing::warn!("Pong timeout, closing connection");
                let _ = control_tx.send(Message::Close(Some(CloseFrame {
                    code: CLOSE_PONG_TIMEOUT,
                    reason: "pong timeout".into(),
                })));
                return;
            }
        }
    }
}
