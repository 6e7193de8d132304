//! Product catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::instrument;

use tamarind_core::{ProductId, Slug};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::product::{CreateProductInput, ProductFilter, UpdateProductInput};
use crate::state::AppState;

/// List products.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Value>> {
    let products = ProductRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(json!({ "products": products })))
}

/// Show one product by slug.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>> {
    let slug =
        Slug::parse(&slug).map_err(|_| AppError::NotFound(format!("product {slug}")))?;

    let product = ProductRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    Ok(Json(json!({ "product": product })))
}

/// Create a product.
#[instrument(skip(state, input), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<CreateProductInput>,
) -> Result<(StatusCode, Json<Value>)> {
    validate_create(&input)?;

    let product = ProductRepository::new(state.pool()).create(&input).await?;
    Ok((StatusCode::CREATED, Json(json!({ "product": product }))))
}

/// Update a product.
#[instrument(skip(state, input), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    Json(input): Json<UpdateProductInput>,
) -> Result<Json<Value>> {
    validate_update(&input)?;

    let product = ProductRepository::new(state.pool())
        .update(ProductId::new(id), &input)
        .await
        .map_err(crate::error::not_found_as("product"))?;

    Ok(Json(json!({ "product": product })))
}

/// Delete a product, deactivating it instead when history references it.
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let deleted = ProductRepository::new(state.pool())
        .delete_or_deactivate(ProductId::new(id))
        .await
        .map_err(crate::error::not_found_as("product"))?;

    Ok(Json(json!({ "deleted": deleted, "deactivated": !deleted })))
}

fn validate_create(input: &CreateProductInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }
    if input.price.is_sign_negative() {
        return Err(AppError::BadRequest("price cannot be negative".to_string()));
    }
    if input.stock < 0 {
        return Err(AppError::BadRequest("stock cannot be negative".to_string()));
    }
    Ok(())
}

fn validate_update(input: &UpdateProductInput) -> Result<()> {
    if let Some(name) = &input.name
        && name.trim().is_empty()
    {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }
    if let Some(price) = input.price
        && price.is_sign_negative()
    {
        return Err(AppError::BadRequest("price cannot be negative".to_string()));
    }
    if let Some(stock) = input.stock
        && stock < 0
    {
        return Err(AppError::BadRequest("stock cannot be negative".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tamarind_core::CurrencyCode;

    #[test]
    fn test_validate_create() {
        let ok = CreateProductInput {
            name: "Crate".to_string(),
            description: String::new(),
            price: Decimal::new(100, 2),
            currency: CurrencyCode::USD,
            stock: 3,
            category_ids: vec![],
        };
        assert!(validate_create(&ok).is_ok());

        let bad_name = CreateProductInput {
            name: "   ".to_string(),
            ..ok_clone(&ok)
        };
        assert!(validate_create(&bad_name).is_err());

        let bad_price = CreateProductInput {
            price: Decimal::new(-1, 0),
            ..ok_clone(&ok)
        };
        assert!(validate_create(&bad_price).is_err());

        let bad_stock = CreateProductInput {
            stock: -1,
            ..ok_clone(&ok)
        };
        assert!(validate_create(&bad_stock).is_err());
    }

    fn ok_clone(input: &CreateProductInput) -> CreateProductInput {
        CreateProductInput {
            name: input.name.clone(),
            description: input.description.clone(),
            price: input.price,
            currency: input.currency,
            stock: input.stock,
            category_ids: input.category_ids.clone(),
        }
    }

    #[test]
    fn test_validate_update() {
        assert!(validate_update(&UpdateProductInput::default()).is_ok());
        assert!(
            validate_update(&UpdateProductInput {
                price: Some(Decimal::new(-5, 0)),
                ..UpdateProductInput::default()
            })
            .is_err()
        );
        assert!(
            validate_update(&UpdateProductInput {
                name: Some(String::new()),
                ..UpdateProductInput::default()
            })
            .is_err()
        );
    }
}
