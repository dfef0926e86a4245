//! Real-time Update Module
//!
//! This module pushes events to live connections: presence snapshots,
//! new messages and seen markers. It also hosts the WebSocket transport
//! those connections arrive on.
//!
//! # Architecture
//!
//! The realtime module is organized into focused submodules:
//!
//! - **`broadcast`** - Fan-out helpers over the connection registry
//! - **`presence`** - `PresenceBroadcaster`, online-set snapshots on change
//! - **`socket`** - WebSocket endpoint and per-connection actor (`ssr`)
//! - **`handlers`** - `GET /api/presence` (`ssr`)
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── broadcast.rs    - Event fan-out utilities
//! ├── presence.rs     - Presence broadcaster task
//! ├── socket.rs       - WebSocket handler, reader/writer/heartbeat tasks
//! └── handlers.rs     - Presence HTTP handler
//! ```
//!
//! # Delivery Semantics
//!
//! Every push is a non-blocking send on the connection's unbounded queue.
//! A push to a connection that is closing fails silently; presence is a
//! full snapshot each time, so nothing needs to be replayed.
//!
//! # Example
//!
//! ```rust
//! use chatrelay::backend::realtime::PresenceBroadcaster;
//! use chatrelay::backend::registry::{ConnectionHandle, ConnectionId, ConnectionRegistry};
//! use std::sync::Arc;
//! use uuid::Uuid;
//!
//! let registry = Arc::new(ConnectionRegistry::new());
//! let (handle, _rx) = ConnectionHandle::channel();
//! registry.register(Uuid::new_v4(), ConnectionId::next(), handle);
//!
//! let broadcaster = PresenceBroadcaster::new(registry);
//! assert_eq!(broadcaster.notify_membership_changed(), 1);
//! ```

/// Event fan-out utilities
pub mod broadcast;

/// Presence broadcaster
pub mod presence;

/// WebSocket transport
#[cfg(feature = "ssr")]
pub mod socket;

/// Presence HTTP handler
#[cfg(feature = "ssr")]
pub mod handlers;

// Re-export commonly used types and functions
pub use broadcast::{send_to_user, send_to_users};
pub use presence::PresenceBroadcaster;
#[cfg(feature = "ssr")]
pub use socket::{ws_upgrade, Heartbeat};
