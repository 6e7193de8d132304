//! Database operations for the blog `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `post` - Posts (TEXT status column, nullable category)
//! - `blog_category` - Categories
//! - `tag`, `post_tag` - Tags and assignments
//!
//! # Migrations
//!
//! Migrations are stored in `crates/blog/migrations/` and run via:
//! ```bash
//! cargo run -p tamarind-cli -- migrate blog
//! ```

pub mod categories;
pub mod posts;
pub mod tags;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::CategoryRepository;
pub use posts::PostRepository;
pub use tags::TagRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate slug).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Parse a TEXT column into its enum, flagging unknown values.
pub(crate) fn parse_text<T>(raw: &str, column: &str) -> Result<T, RepositoryError>
where
    T: std::str::FromStr,
{
    raw.parse()
        .map_err(|_| RepositoryError::DataCorruption(format!("invalid {column} value: {raw}")))
}

/// Parse a slug column, flagging corruption.
pub(crate) fn parse_slug(raw: &str) -> Result<tamarind_core::Slug, RepositoryError> {
    tamarind_core::Slug::parse(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid slug in database: {e}")))
}
