//! Database operations for posts.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tamarind_core::{CategoryId, PostId, PostStatus, Slug, TagId};

use super::{RepositoryError, parse_slug, parse_text};
use crate::models::post::{CreatePostInput, Post, PostFilter, Tag, UpdatePostInput};

/// Internal row type for post queries.
#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: i32,
    title: String,
    slug: String,
    body: String,
    status: String,
    category_id: Option<i32>,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PostRow {
    fn into_post(self, tags: Vec<Tag>) -> Result<Post, RepositoryError> {
        let slug = parse_slug(&self.slug)?;
        let status: PostStatus = parse_text(&self.status, "post status")?;
        Ok(Post {
            id: PostId::new(self.id),
            title: self.title,
            slug,
            body: self.body,
            status,
            category_id: self.category_id.map(CategoryId::new),
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            tags,
        })
    }
}

/// Internal row type for tag-per-post queries.
#[derive(Debug, sqlx::FromRow)]
struct PostTagRow {
    post_id: i32,
    id: i32,
    name: String,
    slug: String,
}

const POST_COLUMNS: &str =
    "id, title, slug, body, status, category_id, published_at, created_at, updated_at";

const MAX_SLUG_ATTEMPTS: u32 = 20;

/// Repository for post database operations.
pub struct PostRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PostRepository<'a> {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a draft post, deriving a unique slug from the title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if no free slug could be found.
    pub async fn create(&self, input: &CreatePostInput) -> Result<Post, RepositoryError> {
        let base = Slug::from_title(&input.title);

        for attempt in 0..MAX_SLUG_ATTEMPTS {
            let slug = if attempt == 0 {
                base.clone()
            } else {
                base.with_suffix(attempt + 1)
            };

            let result = sqlx::query_as::<_, PostRow>(&format!(
                r"
                INSERT INTO post (title, slug, body, status, category_id)
                VALUES ($1, $2, $3, 'draft', $4)
                RETURNING {POST_COLUMNS}
                "
            ))
            .bind(&input.title)
            .bind(slug.as_str())
            .bind(&input.body)
            .bind(input.category_id.map(|id| id.as_i32()))
            .fetch_one(self.pool)
            .await;

            match result {
                Ok(row) => {
                    let id = PostId::new(row.id);
                    self.set_tags(id, &input.tag_ids).await?;
                    let tags = self.tags_for(id).await?;
                    return row.into_post(tags);
                }
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {}
                Err(e) => return Err(RepositoryError::Database(e)),
            }
        }

        Err(RepositoryError::Conflict(format!(
            "could not find a free slug for '{base}'"
        )))
    }

    /// Get a post by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Post>, RepositoryError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM post WHERE slug = $1"
        ))
        .bind(slug.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => {
                let tags = self.tags_for(PostId::new(row.id)).await?;
                Ok(Some(row.into_post(tags)?))
            }
            None => Ok(None),
        }
    }

    /// List posts with filtering and pagination, tags included.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, RepositoryError> {
        let status = filter.status.unwrap_or(PostStatus::Published);
        let category_slug = filter.category.as_ref().map(Slug::as_str);
        let tag_slug = filter.tag.as_ref().map(Slug::as_str);

        let rows = sqlx::query_as::<_, PostRow>(&format!(
            r"
            SELECT DISTINCT
                p.id, p.title, p.slug, p.body, p.status, p.category_id,
                p.published_at, p.created_at, p.updated_at
            FROM post p
            LEFT JOIN blog_category c ON c.id = p.category_id
            LEFT JOIN post_tag pt ON pt.post_id = p.id
            LEFT JOIN tag t ON t.id = pt.tag_id
            WHERE p.status = $1
              AND ($2::text IS NULL OR c.slug = $2)
              AND ($3::text IS NULL OR t.slug = $3)
            ORDER BY p.published_at DESC NULLS LAST, p.id DESC
            LIMIT $4 OFFSET $5
            "
        ))
        .bind(status.to_string())
        .bind(category_slug)
        .bind(tag_slug)
        .bind(filter.clamped_limit())
        .bind(filter.clamped_offset())
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut tags_by_post = self.tags_for_many(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let tags = tags_by_post.remove(&row.id).unwrap_or_default();
                row.into_post(tags)
            })
            .collect()
    }

    /// Update a post. `tag_ids` replaces the whole assignment when present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post doesn't exist.
    pub async fn update(
        &self,
        id: PostId,
        input: &UpdatePostInput,
    ) -> Result<Post, RepositoryError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r"
            UPDATE post
            SET
                title = COALESCE($2, title),
                body = COALESCE($3, body),
                category_id = COALESCE($4, category_id)
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(input.title.as_deref())
        .bind(input.body.as_deref())
        .bind(input.category_id.map(|c| c.as_i32()))
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if let Some(tag_ids) = &input.tag_ids {
            self.set_tags(id, tag_ids).await?;
        }

        let tags = self.tags_for(id).await?;
        row.into_post(tags)
    }

    /// Publish a post: status `published`, `published_at` stamped once.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post doesn't exist.
    pub async fn publish(&self, id: PostId) -> Result<Post, RepositoryError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r"
            UPDATE post
            SET status = 'published',
                published_at = COALESCE(published_at, now())
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let tags = self.tags_for(id).await?;
        row.into_post(tags)
    }

    /// Delete a post.
    ///
    /// # Returns
    ///
    /// `true` if the post was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: PostId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM post WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replace a post's tag assignments.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn set_tags(&self, id: PostId, tag_ids: &[TagId]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM post_tag WHERE post_id = $1")
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?;

        for tag_id in tag_ids {
            sqlx::query(
                "INSERT INTO post_tag (post_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(id.as_i32())
            .bind(tag_id.as_i32())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Tags assigned to one post.
    async fn tags_for(&self, id: PostId) -> Result<Vec<Tag>, RepositoryError> {
        let mut map = self.tags_for_many(&[id.as_i32()]).await?;
        Ok(map.remove(&id.as_i32()).unwrap_or_default())
    }

    /// Tags for a set of posts in one query, grouped by post id.
    async fn tags_for_many(
        &self,
        post_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<Tag>>, RepositoryError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, PostTagRow>(
            r"
            SELECT pt.post_id, t.id, t.name, t.slug
            FROM post_tag pt
            INNER JOIN tag t ON t.id = pt.tag_id
            WHERE pt.post_id = ANY($1)
            ORDER BY t.name ASC
            ",
        )
        .bind(post_ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<i32, Vec<Tag>> = HashMap::new();
        for row in rows {
            let tag = Tag {
                id: TagId::new(row.id),
                name: row.name,
                slug: parse_slug(&row.slug)?,
            };
            grouped.entry(row.post_id).or_default().push(tag);
        }

        Ok(grouped)
    }
}
