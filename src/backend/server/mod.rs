//! Server Module
//!
//! This module contains the code that assembles the realtime core into a
//! running Axum server.
//!
//! # Architecture
//!
//! The server module is organized into focused submodules:
//!
//! - **`state`** - Application state structure and `FromRef` implementations
//! - **`config`** - Store selection (SQLite or in-memory)
//! - **`init`** - Server initialization and app creation
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Store loading with in-memory fallback
//! └── init.rs         - Server initialization and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: `ServerConfig::from_env()` in the binary
//! 2. **Store Loading**: SQLite if configured, in-memory otherwise
//! 3. **State Creation**: Registry, authenticator, router, gateway
//! 4. **Background Tasks**: Presence broadcaster
//! 5. **Router Creation**: Configures all routes and middleware
//!
//! # Example
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

/// Application state management
pub mod state;

/// Store loading
pub mod config;

/// Server initialization
pub mod init;

// Re-export commonly used types
pub use config::{load_stores, Stores};
pub use init::{build_state, create_app};
pub use state::AppState;
