//! Shared Module
//!
//! Types exchanged between the realtime core and its clients: users,
//! messages, conversations, the wire events and the errors carried by them.
//! All types are serde-serializable.

/// User identity
pub mod user;

/// Message and conversation types
pub mod messaging;

/// Wire events on a live connection
pub mod event;

/// Errors surfaced to clients
pub mod error;

/// Server configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use config::{ConfigError, ServerConfig, ServerConfigBuilder};
pub use error::{AuthError, HistoryError, SeenError, SendError};
pub use event::{ClientEvent, ServerEvent};
pub use messaging::{ConversationId, ConversationSummary, ConversationTarget, Message, MessageContent};
pub use user::UserIdentity;
