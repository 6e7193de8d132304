//! Database operations for the shop `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `shop_user` - Accounts (argon2 password hashes)
//! - `session` - Tower-sessions storage
//! - `product`, `category`, `product_category` - Catalog
//! - `cart`, `cart_item` - Carts (token-addressed)
//! - `invoice`, `invoice_item` - Checkout invoices
//! - `stock_reservation` - Temporary stock holds
//! - `shop_order`, `order_item` - Completed orders
//!
//! Queries use the runtime `sqlx::query_as` API with `FromRow` row structs;
//! repositories convert rows into domain models and map constraint
//! violations to [`RepositoryError::Conflict`].
//!
//! # Migrations
//!
//! Migrations are stored in `crates/shop/migrations/` and run via:
//! ```bash
//! cargo run -p tamarind-cli -- migrate shop
//! ```

pub mod carts;
pub mod categories;
pub mod inventory;
pub mod invoices;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use categories::CategoryRepository;
pub use invoices::InvoiceRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

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

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
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

/// Parse a TEXT status column into its enum, flagging unknown values.
pub(crate) fn parse_status<T>(raw: &str, column: &str) -> Result<T, RepositoryError>
where
    T: std::str::FromStr,
{
    raw.parse()
        .map_err(|_| RepositoryError::DataCorruption(format!("invalid {column} value: {raw}")))
}
