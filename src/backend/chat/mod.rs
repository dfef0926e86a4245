//! Chat Backend Module
//!
//! The transport-facing side of the realtime core. `ChatGateway` ties the
//! session authenticator, connection registry and message router together
//! behind three calls: connect, client event, disconnect.
//!
//! # Example
//!
//! ```rust,no_run
//! use chatrelay::backend::chat::ChatGateway;
//! use chatrelay::backend::registry::ConnectionHandle;
//! use chatrelay::shared::ClientEvent;
//!
//! # async fn example(gateway: ChatGateway, token: String) {
//! let (handle, mut events) = ConnectionHandle::channel();
//! if let Ok(session) = gateway.on_connect(Some(&token), handle).await {
//!     let reply = gateway
//!         .on_client_event(session.connection_id, ClientEvent::ListConversations)
//!         .await;
//!     println!("{}", reply.name());
//!     gateway.on_disconnect(session.connection_id);
//! }
//! # let _ = events.recv().await;
//! # }
//! ```

/// Transport contract
pub mod gateway;

pub use gateway::{ChatGateway, Session};
