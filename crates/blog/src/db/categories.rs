//! Database operations for blog categories.

use sqlx::PgPool;

use tamarind_core::{CategoryId, Slug};

use super::{RepositoryError, parse_slug};
use crate::models::post::BlogCategory;

/// Internal row type for category queries.
#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    slug: String,
}

impl CategoryRow {
    fn into_category(self) -> Result<BlogCategory, RepositoryError> {
        Ok(BlogCategory {
            id: CategoryId::new(self.id),
            name: self.name,
            slug: parse_slug(&self.slug)?,
        })
    }
}

/// Repository for blog category operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug already exists.
    pub async fn create(&self, name: &str) -> Result<BlogCategory, RepositoryError> {
        let slug = Slug::from_title(name);

        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO blog_category (name, slug)
            VALUES ($1, $2)
            RETURNING id, name, slug
            ",
        )
        .bind(name)
        .bind(slug.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!("category '{slug}' already exists"));
            }
            RepositoryError::Database(e)
        })?;

        row.into_category()
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<BlogCategory>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug FROM blog_category ORDER BY name ASC",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CategoryRow::into_category).collect()
    }

    /// Delete a category; posts keep existing with a NULL category.
    ///
    /// # Returns
    ///
    /// `true` if the category was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM blog_category WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
