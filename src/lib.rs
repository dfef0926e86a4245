//! ChatRelay - Main Library
//!
//! ChatRelay is the realtime core of a chat service: it tracks which users
//! are online, routes messages between conversation participants with
//! immediate delivery to every live connection, persists them, and
//! propagates "seen" markers.
//!
//! # Module Structure
//!
//! - **`shared`** - Types exchanged with clients
//!   - Users, messages, conversations
//!   - Wire events (`ClientEvent` / `ServerEvent`)
//!   - Client-facing error kinds and server configuration
//!
//! - **`backend`** - The realtime core and its HTTP/WebSocket surface
//!   - Session authentication and connection registry
//!   - Presence broadcasting and message routing
//!   - Message store (in-memory or SQLite)
//!   - Axum server (only compiled with `ssr` feature)
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Axum server, routes, WebSocket transport and the
//!   `chatrelay-server` binary. Without it the core still builds and can be
//!   driven through `backend::chat::ChatGateway` directly.
//!
//! # Usage
//!
//! ```rust,no_run
//! use chatrelay::backend::server::create_app;
//! use chatrelay::shared::ServerConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let app = create_app(&config).await;
//! let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! - The connection registry is guarded by a single `RwLock`; every
//!   mutation and snapshot is atomic with respect to the others
//! - Each connection owns an unbounded queue drained by one writer task,
//!   so pushes never block the sender
//! - Stores are `Send + Sync` trait objects shared through `Arc`

/// Shared types and data structures
pub mod shared;

/// Realtime core and server
pub mod backend;
