//! Routes Module
//!
//! HTTP route configuration for the realtime server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Router assembly, layers, fallback
//! ├── chat_routes.rs  - WebSocket endpoint
//! └── api_routes.rs   - Authenticated JSON API
//! ```

/// Main router creation
pub mod router;

/// Chat-related routes
pub mod chat_routes;

/// API endpoint routes
pub mod api_routes;

// Re-export commonly used functions
pub use router::create_router;
