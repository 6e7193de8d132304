//! Post route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::instrument;

use tamarind_core::{PostId, Slug};

use crate::db::PostRepository;
use crate::error::{AppError, Result, not_found_as};
use crate::models::post::{CreatePostInput, PostFilter, UpdatePostInput};
use crate::state::AppState;

/// List posts.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<PostFilter>,
) -> Result<Json<Value>> {
    let posts = PostRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(json!({ "posts": posts })))
}

/// Show one post by slug.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<Value>> {
    let slug = Slug::parse(&slug).map_err(|_| AppError::NotFound(format!("post {slug}")))?;

    let post = PostRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {slug}")))?;

    Ok(Json(json!({ "post": post })))
}

/// Create a draft post.
#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> Result<(StatusCode, Json<Value>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::BadRequest("title cannot be empty".to_string()));
    }

    let post = PostRepository::new(state.pool()).create(&input).await?;
    Ok((StatusCode::CREATED, Json(json!({ "post": post }))))
}

/// Update a post.
#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<UpdatePostInput>,
) -> Result<Json<Value>> {
    if let Some(title) = &input.title
        && title.trim().is_empty()
    {
        return Err(AppError::BadRequest("title cannot be empty".to_string()));
    }

    let post = PostRepository::new(state.pool())
        .update(PostId::new(id), &input)
        .await
        .map_err(not_found_as("post"))?;

    Ok(Json(json!({ "post": post })))
}

/// Publish a draft.
#[instrument(skip(state))]
pub async fn publish(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<Value>> {
    let post = PostRepository::new(state.pool())
        .publish(PostId::new(id))
        .await
        .map_err(not_found_as("post"))?;

    Ok(Json(json!({ "post": post })))
}

/// Delete a post.
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode> {
    let deleted = PostRepository::new(state.pool())
        .delete(PostId::new(id))
        .await?;

    if !deleted {
        return Err(AppError::NotFound(format!("post {id}")));
    }

    Ok(StatusCode::NO_CONTENT)
}
