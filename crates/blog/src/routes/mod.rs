//! HTTP route handlers for the blog API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (DB ping)
//!
//! # Posts
//! GET    /posts                - List posts (published by default)
//! POST   /posts                - Create a draft post
//! GET    /posts/{slug}         - Post detail by slug
//! PUT    /posts/{id}           - Update a post
//! DELETE /posts/{id}           - Delete a post
//! POST   /posts/{id}/publish   - Publish a draft
//!
//! # Categories
//! GET    /categories           - List categories
//! POST   /categories           - Create a category
//! DELETE /categories/{id}      - Delete a category
//!
//! # Tags
//! GET    /tags                 - List tags
//! POST   /tags                 - Create a tag
//! DELETE /tags/{id}            - Delete a tag
//! ```

pub mod categories;
pub mod posts;
pub mod tags;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create the post routes router.
///
/// Reads address posts by slug; writes address them by numeric id. Both
/// shapes share the one path parameter slot.
pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(posts::index).post(posts::create))
        .route(
            "/{key}",
            get(posts::show).put(posts::update).delete(posts::delete),
        )
        .route("/{key}/publish", post(posts::publish))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route("/{id}", delete(categories::delete))
}

/// Create the tag routes router.
pub fn tag_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(tags::index).post(tags::create))
        .route("/{id}", delete(tags::delete))
}

/// Create all routes for the blog API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/posts", post_routes())
        .nest("/categories", category_routes())
        .nest("/tags", tag_routes())
}
