//! Seed commands for local development.
//!
//! Seeding is idempotent: rows are keyed by slug/email and re-running the
//! command leaves existing data alone.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use tamarind_shop::services::AuthService;
use tamarind_shop::services::auth::AuthError;

/// Demo account created by `seed shop`.
const DEMO_EMAIL: &str = "demo@tamarind.sh";
const DEMO_PASSWORD: &str = "tamarind-demo-2026";

/// Errors from seed commands.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

/// Seed the shop database with categories, products, and a demo user.
///
/// # Errors
///
/// Returns an error if the connection or a query fails.
pub async fn shop() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("SHOP_DATABASE_URL")
        .map_err(|_| SeedError::MissingEnvVar("SHOP_DATABASE_URL"))?;
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Seeding shop categories...");
    for (name, slug) in [("Pantry", "pantry"), ("Fresh", "fresh"), ("Gifts", "gifts")] {
        sqlx::query("INSERT INTO category (name, slug) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(name)
            .bind(slug)
            .execute(&pool)
            .await?;
    }

    tracing::info!("Seeding shop products...");
    let products: &[(&str, &str, Decimal, i32)] = &[
        ("Tamarind Paste Jar", "tamarind-paste-jar", Decimal::new(699, 2), 120),
        ("Dried Tamarind Pods", "dried-tamarind-pods", Decimal::new(1250, 2), 45),
        ("Chili-Tamarind Sauce", "chili-tamarind-sauce", Decimal::new(899, 2), 80),
        ("Gift Crate", "gift-crate", Decimal::new(3900, 2), 15),
    ];
    for (name, slug, price, stock) in products {
        sqlx::query(
            r"
            INSERT INTO product (name, slug, description, price, currency, stock)
            VALUES ($1, $2, '', $3, 'USD', $4)
            ON CONFLICT (slug) DO NOTHING
            ",
        )
        .bind(name)
        .bind(slug)
        .bind(price)
        .bind(stock)
        .execute(&pool)
        .await?;
    }

    tracing::info!("Seeding demo user {DEMO_EMAIL}...");
    match AuthService::new(&pool).register(DEMO_EMAIL, DEMO_PASSWORD).await {
        Ok(_) | Err(AuthError::UserAlreadyExists) => {}
        Err(e) => return Err(e.into()),
    }

    tracing::info!("Shop seed complete");
    Ok(())
}

/// Seed the blog database with a category, tags, and a published post.
///
/// # Errors
///
/// Returns an error if the connection or a query fails.
pub async fn blog() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("BLOG_DATABASE_URL")
        .map_err(|_| SeedError::MissingEnvVar("BLOG_DATABASE_URL"))?;
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Seeding blog categories and tags...");
    sqlx::query(
        "INSERT INTO blog_category (name, slug) VALUES ('Announcements', 'announcements')
         ON CONFLICT DO NOTHING",
    )
    .execute(&pool)
    .await?;

    for (name, slug) in [("recipes", "recipes"), ("sourcing", "sourcing")] {
        sqlx::query("INSERT INTO tag (name, slug) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(name)
            .bind(slug)
            .execute(&pool)
            .await?;
    }

    tracing::info!("Seeding blog posts...");
    sqlx::query(
        r"
        INSERT INTO post (title, slug, body, status, category_id, published_at)
        SELECT 'Hello from the orchard', 'hello-from-the-orchard',
               'First harvest of the season is in.', 'published', c.id, now()
        FROM blog_category c
        WHERE c.slug = 'announcements'
        ON CONFLICT (slug) DO NOTHING
        ",
    )
    .execute(&pool)
    .await?;

    tracing::info!("Blog seed complete");
    Ok(())
}
