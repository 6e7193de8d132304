//! Integration tests for Tamarind.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL and run migrations
//! tam-cli migrate all
//!
//! # Start the servers
//! cargo run -p tamarind-shop &
//! cargo run -p tamarind-blog &
//!
//! # Run integration tests (they are #[ignore]d by default)
//! cargo test -p tamarind-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `SHOP_BASE_URL` - shop API base (default `http://localhost:3000`)
//! - `BLOG_BASE_URL` - blog API base (default `http://localhost:3100`)

use reqwest::Client;

/// Base URL for the shop API.
#[must_use]
pub fn shop_base_url() -> String {
    std::env::var("SHOP_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the blog API.
#[must_use]
pub fn blog_base_url() -> String {
    std::env::var("BLOG_BASE_URL").unwrap_or_else(|_| "http://localhost:3100".to_string())
}

/// A cookie-keeping client, so login sessions persist across requests.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique email per test run, so repeated runs don't collide on the
/// unique constraint.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}+{}@example.com", uuid::Uuid::new_v4().simple())
}
