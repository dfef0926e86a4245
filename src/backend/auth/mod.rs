//! Authentication Module
//!
//! This module verifies the session tokens that clients present when they
//! open a realtime connection or call the HTTP API. Accounts and the login
//! flow live in an external service that shares the signing secret.
//!
//! # Architecture
//!
//! The auth module is organized into focused submodules:
//!
//! - **`sessions`** - JWT signing keys, claims, issue and verify
//! - **`users`** - `UserDirectory` trait and an in-memory directory
//! - **`authenticator`** - `SessionAuthenticator`, token → `UserIdentity`
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs            - Module exports and documentation
//! ├── sessions.rs       - JWT token management
//! ├── users.rs          - User lookup
//! └── authenticator.rs  - Token verification and subject resolution
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Connect**: client supplies a token → signature and expiry checked
//! 2. **Resolve**: subject looked up in the `UserDirectory`
//! 3. **Register**: the gateway binds the resolved identity to the connection
//!
//! A missing token, an expired one and an invalid one are distinct
//! `AuthError` kinds; the last two force the client to log out.

/// JWT token generation and validation
pub mod sessions;

/// User lookup
pub mod users;

/// Token verification
pub mod authenticator;

pub use authenticator::SessionAuthenticator;
pub use sessions::{Claims, SessionKeys};
pub use users::{InMemoryUserDirectory, UserDirectory};
