//! Authentication test helpers
//!
//! Provides utilities for creating test users and signing session tokens
//! with a fixed test secret.

use std::time::Duration;
use uuid::Uuid;
use chatrelay::backend::auth::{Claims, SessionKeys};
use chatrelay::shared::UserIdentity;

/// Secret shared by every test gateway
pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Signing keys for `TEST_SECRET`
pub fn test_keys() -> SessionKeys {
    SessionKeys::from_secret(TEST_SECRET.as_bytes())
}

/// Create a test user with a fresh id
pub fn test_user(display_name: &str) -> UserIdentity {
    UserIdentity::new(Uuid::new_v4(), display_name)
}

/// Generate a test JWT token valid for an hour
pub fn generate_test_token(user_id: Uuid) -> String {
    test_keys()
        .issue(user_id, Duration::from_secs(3600))
        .expect("Failed to generate test token")
}

/// Token that expired a minute ago
pub fn expired_test_token(user_id: Uuid) -> String {
    let issued_at = jsonwebtoken::get_current_timestamp() - 3600;
    let claims = Claims::new(user_id, issued_at, Duration::from_secs(60));
    test_keys().sign(&claims).expect("Failed to sign expired token")
}

/// Token for `user_id` signed with a different secret
pub fn forged_test_token(user_id: Uuid) -> String {
    SessionKeys::from_secret(b"not-the-server-secret-0123456789")
        .issue(user_id, Duration::from_secs(3600))
        .expect("Failed to generate forged token")
}

/// Create authorization header value
pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}
