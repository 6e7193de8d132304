//! Post, category, and tag models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tamarind_core::{CategoryId, PostId, PostStatus, Slug, TagId};

/// A blog post.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub slug: Slug,
    pub body: String,
    pub status: PostStatus,
    pub category_id: Option<CategoryId>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Tags assigned to the post.
    pub tags: Vec<Tag>,
}

/// A blog category.
#[derive(Debug, Clone, Serialize)]
pub struct BlogCategory {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
}

/// A tag.
#[derive(Debug, Clone, Serialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub slug: Slug,
}

/// Payload for creating a post.
#[derive(Debug, Deserialize)]
pub struct CreatePostInput {
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub tag_ids: Vec<TagId>,
}

/// Payload for updating a post. Absent fields are left unchanged; `tag_ids`
/// replaces the whole assignment when present.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub body: Option<String>,
    pub category_id: Option<CategoryId>,
    pub tag_ids: Option<Vec<TagId>>,
}

/// Listing filter for posts.
#[derive(Debug, Default, Deserialize)]
pub struct PostFilter {
    /// Defaults to published-only.
    pub status: Option<PostStatus>,
    pub category: Option<Slug>,
    pub tag: Option<Slug>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PostFilter {
    /// Hard cap on page size.
    pub const MAX_LIMIT: i64 = 100;

    /// Clamp the requested limit into `1..=MAX_LIMIT`.
    #[must_use]
    pub fn clamped_limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, Self::MAX_LIMIT)
    }

    /// Offset, floored at zero.
    #[must_use]
    pub fn clamped_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_clamps() {
        let filter = PostFilter {
            limit: Some(9999),
            offset: Some(-3),
            ..PostFilter::default()
        };
        assert_eq!(filter.clamped_limit(), PostFilter::MAX_LIMIT);
        assert_eq!(filter.clamped_offset(), 0);
        assert_eq!(PostFilter::default().clamped_limit(), 20);
    }
}
