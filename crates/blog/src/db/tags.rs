//! Database operations for tags.

use sqlx::PgPool;

use tamarind_core::{Slug, TagId};

use super::{RepositoryError, parse_slug};
use crate::models::post::Tag;

/// Internal row type for tag queries.
#[derive(Debug, sqlx::FromRow)]
struct TagRow {
    id: i32,
    name: String,
    slug: String,
}

impl TagRow {
    fn into_tag(self) -> Result<Tag, RepositoryError> {
        Ok(Tag {
            id: TagId::new(self.id),
            name: self.name,
            slug: parse_slug(&self.slug)?,
        })
    }
}

/// Repository for tag operations.
pub struct TagRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TagRepository<'a> {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a tag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name or slug already exists.
    pub async fn create(&self, name: &str) -> Result<Tag, RepositoryError> {
        let slug = Slug::from_title(name);

        let row = sqlx::query_as::<_, TagRow>(
            r"
            INSERT INTO tag (name, slug)
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
                return RepositoryError::Conflict(format!("tag '{name}' already exists"));
            }
            RepositoryError::Database(e)
        })?;

        row.into_tag()
    }

    /// List all tags.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Tag>, RepositoryError> {
        let rows = sqlx::query_as::<_, TagRow>("SELECT id, name, slug FROM tag ORDER BY name ASC")
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TagRow::into_tag).collect()
    }

    /// Delete a tag; assignments go with it (ON DELETE CASCADE).
    ///
    /// # Returns
    ///
    /// `true` if the tag was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: TagId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM tag WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
