//! Category route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use tamarind_core::CategoryId;

use crate::db::CategoryRepository;
use crate::error::{AppError, Result, not_found_as};
use crate::state::AppState;

/// Create category request body.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryBody {
    pub name: String,
}

/// List all categories.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Value>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(json!({ "categories": categories })))
}

/// Create a category.
#[instrument(skip(state))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryBody>,
) -> Result<(StatusCode, Json<Value>)> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    let category = CategoryRepository::new(state.pool())
        .create(body.name.trim())
        .await
        .map_err(not_found_as("category"))?;

    Ok((StatusCode::CREATED, Json(json!({ "category": category }))))
}

/// Delete a category.
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode> {
    let deleted = CategoryRepository::new(state.pool())
        .delete(CategoryId::new(id))
        .await?;

    if !deleted {
        return Err(AppError::NotFound(format!("category {id}")));
    }

    Ok(StatusCode::NO_CONTENT)
}
