//! Database migration commands.
//!
//! # Environment Variables
//!
//! - `SHOP_DATABASE_URL` - `PostgreSQL` connection string for the shop
//! - `BLOG_DATABASE_URL` - `PostgreSQL` connection string for the blog

use sqlx::PgPool;
use thiserror::Error;

/// Errors from migration commands.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run shop database migrations.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn shop() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("SHOP_DATABASE_URL")
        .map_err(|_| MigrationError::MissingEnvVar("SHOP_DATABASE_URL"))?;

    tracing::info!("Connecting to shop database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running shop migrations...");
    sqlx::migrate!("../shop/migrations").run(&pool).await?;

    tracing::info!("Shop migrations complete");
    Ok(())
}

/// Run blog database migrations.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn blog() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("BLOG_DATABASE_URL")
        .map_err(|_| MigrationError::MissingEnvVar("BLOG_DATABASE_URL"))?;

    tracing::info!("Connecting to blog database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running blog migrations...");
    sqlx::migrate!("../blog/migrations").run(&pool).await?;

    tracing::info!("Blog migrations complete");
    Ok(())
}
