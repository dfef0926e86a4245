//! Backend Module
//!
//! This module contains the realtime core and the server around it.
//!
//! # Architecture
//!
//! The core compiles without the `ssr` feature:
//!
//! - **`auth`** - Session tokens, user directory, `SessionAuthenticator`
//! - **`registry`** - Live connections per user
//! - **`realtime`** - Presence broadcasting and event fan-out
//! - **`messaging`** - `MessageRouter`: send, seen, history
//! - **`store`** - Conversation/message persistence
//! - **`chat`** - `ChatGateway`, the contract a transport drives
//!
//! The server layer needs `ssr`:
//!
//! - **`server`** - Application state and startup
//! - **`routes`** - Router assembly
//! - **`middleware`** - Bearer-token extraction
//! - **`error`** - HTTP error responses
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── auth/           - Authentication
//! ├── registry/       - Connection registry
//! ├── realtime/       - Presence, fan-out, WebSocket transport
//! ├── messaging/      - Message router and catch-up handlers
//! ├── store/          - Message store implementations
//! ├── chat/           - Chat gateway
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── middleware/     - Request middleware
//! └── error/          - Error types
//! ```
//!
//! # Event Flow
//!
//! 1. A client connects to `/ws?token=...`; the gateway authenticates and
//!    registers the connection
//! 2. The registry signals a membership change; the presence broadcaster
//!    pushes `online_users` to everyone
//! 3. `send` events go through the router: persist first, then push
//!    `new_message` to every live connection of the other participants
//! 4. `mark_seen` records the marker and pushes `message_seen` back
//! 5. On disconnect the connection is unregistered and presence goes out
//!    again if the user's last connection closed

/// Authentication and user lookup
pub mod auth;

/// Connection registry
pub mod registry;

/// Real-time update system
pub mod realtime;

/// Message routing
pub mod messaging;

/// Message store
pub mod store;

/// Chat gateway
pub mod chat;

/// Server setup and configuration
#[cfg(feature = "ssr")]
pub mod server;

/// Route configuration
#[cfg(feature = "ssr")]
pub mod routes;

/// Middleware for request processing
#[cfg(feature = "ssr")]
pub mod middleware;

/// Backend error types
#[cfg(feature = "ssr")]
pub mod error;

/// Re-export commonly used types
pub use chat::ChatGateway;
pub use messaging::MessageRouter;
pub use realtime::PresenceBroadcaster;
pub use registry::ConnectionRegistry;
#[cfg(feature = "ssr")]
pub use error::BackendError;
#[cfg(feature = "ssr")]
pub use server::create_app;
