//! Messaging Module
//!
//! This module contains the data structures for the messaging system:
//!
//! - `Message` / `MessageContent` - A message in a conversation
//! - `ConversationId` / `ConversationTarget` - Conversation addressing
//! - `ConversationSummary` - A viewer's conversation list entry
//!
//! # Usage
//!
//! ```rust
//! use chatrelay::shared::messaging::{ConversationTarget, MessageContent};
//! use uuid::Uuid;
//!
//! let target = ConversationTarget::Direct(Uuid::new_v4());
//! let content = MessageContent::text("hi");
//! # let _ = (target, content);
//! ```

pub mod conversation;
pub mod message;

// Re-export all types
pub use conversation::{ConversationId, ConversationSummary, ConversationTarget};
pub use message::{Message, MessageContent};
