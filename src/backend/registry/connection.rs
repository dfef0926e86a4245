/**
 * Live Connection Types
 *
 * A connection is one authenticated socket. Each owns the sending half of
 * an unbounded channel; the transport drains the receiving half into the
 * socket, so pushing an event never waits on the peer.
 */

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::shared::event::ServerEvent;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique connection identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl ConnectionId {
    /// Allocate the next id; never reused within a process
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// The receiving side of the connection has gone away
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("connection closed")]
pub struct ConnectionClosed;

/// Push side of a connection's outbound queue
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    tx: mpsc::UnboundedSender<ServerEvent>,
}

impl ConnectionHandle {
    /// Create a handle and the receiver the transport drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue an event for this connection
    pub fn push(&self, event: ServerEvent) -> Result<(), ConnectionClosed> {
        self.tx.send(event).map_err(|_| ConnectionClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Registry entry
#[derive(Debug, Clone)]
pub struct Connection {
    pub connection_id: ConnectionId,
    pub user_id: Uuid,
    pub established_at: DateTime<Utc>,
    pub handle: ConnectionHandle,
}

impl Connection {
    pub fn new(connection_id: ConnectionId, user_id: Uuid, handle: ConnectionHandle) -> Self {
        Self {
            connection_id,
            user_id,
            established_at: Utc::now(),
            handle,
        }
    }
}
