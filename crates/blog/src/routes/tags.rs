//! Tag route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use tamarind_core::TagId;

use crate::db::TagRepository;
use crate::error::{AppError, Result, not_found_as};
use crate::state::AppState;

/// Create tag request body.
#[derive(Debug, Deserialize)]
pub struct CreateTagBody {
    pub name: String,
}

/// List all tags.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Value>> {
    let tags = TagRepository::new(state.pool()).list().await?;
    Ok(Json(json!({ "tags": tags })))
}

/// Create a tag.
#[instrument(skip(state))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateTagBody>,
) -> Result<(StatusCode, Json<Value>)> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    let tag = TagRepository::new(state.pool())
        .create(body.name.trim())
        .await
        .map_err(not_found_as("tag"))?;

    Ok((StatusCode::CREATED, Json(json!({ "tag": tag }))))
}

/// Delete a tag.
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode> {
    let deleted = TagRepository::new(state.pool()).delete(TagId::new(id)).await?;

    if !deleted {
        return Err(AppError::NotFound(format!("tag {id}")));
    }

    Ok(StatusCode::NO_CONTENT)
}
