//! Middleware Module
//!
//! Request processing shared by the HTTP API routes.
//!
//! # Architecture
//!
//! The middleware module currently provides:
//!
//! - **`auth`** - Bearer-token extractor for protected routes
//!
//! # Example
//!
//! ```rust,no_run
//! use chatrelay::backend::middleware::AuthUser;
//!
//! async fn whoami(AuthUser(user): AuthUser) -> String {
//!     user.display_name
//! }
//! ```

pub mod auth;

pub use auth::{bearer_token, AuthUser};
