//! Messaging Module
//!
//! Message routing between participants, plus the HTTP catch-up endpoints.
//!
//! - **`router`** - `MessageRouter`: send, mark seen, history, conversations
//! - **`handlers`** - `GET /api/conversations[/{id}/messages]` (`ssr`)

pub mod router;

#[cfg(feature = "ssr")]
pub mod handlers;

pub use router::{MessageRouter, SentMessage};
#[cfg(feature = "ssr")]
pub use handlers::{get_conversations, get_messages};
