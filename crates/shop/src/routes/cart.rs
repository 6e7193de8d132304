//! Cart route handlers.
//!
//! Carts are addressed by an opaque UUID token sent in the `X-Cart-Token`
//! header, so anonymous visitors can build a cart before they register.

use axum::{
    Json,
    extract::{FromRequestParts, Path, State},
    http::{StatusCode, request::Parts},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;
use uuid::Uuid;

use tamarind_core::{CartItemId, ProductId};

use crate::db::{CartRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::models::cart::{Cart, CartWithItems};
use crate::state::AppState;

/// Header carrying the cart token.
pub const CART_TOKEN_HEADER: &str = "x-cart-token";

/// Extractor for the `X-Cart-Token` header.
pub struct CartToken(pub Uuid);

impl<S> FromRequestParts<S> for CartToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let raw = parts
            .headers
            .get(CART_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::BadRequest("missing X-Cart-Token header".to_string()))?;

        let token = raw
            .parse::<Uuid>()
            .map_err(|_| AppError::BadRequest("invalid cart token".to_string()))?;

        Ok(Self(token))
    }
}

/// Add item request body.
#[derive(Debug, Deserialize)]
pub struct AddItemBody {
    pub product_id: ProductId,
    pub quantity: Option<i32>,
}

/// Update item request body.
#[derive(Debug, Deserialize)]
pub struct UpdateItemBody {
    pub quantity: i32,
}

/// Create a new cart; the response carries the token to store client-side.
#[instrument(skip(state, user))]
pub async fn create(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<(StatusCode, Json<Value>)> {
    let cart = CartRepository::new(state.pool())
        .create(user.map(|u| u.id))
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "cart": cart }))))
}

/// Show the cart with lines priced at current catalog prices.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    CartToken(token): CartToken,
) -> Result<Json<Value>> {
    let carts = CartRepository::new(state.pool());
    let cart = lookup(&carts, token).await?;
    let lines = carts.list_lines(cart.id).await?;
    let subtotal = CartWithItems::subtotal_of(&lines);

    Ok(Json(json!({
        "cart": CartWithItems { cart, lines, subtotal }
    })))
}

/// Add a product to the cart (sums quantity on repeat adds).
#[instrument(skip(state))]
pub async fn add_item(
    State(state): State<AppState>,
    CartToken(token): CartToken,
    Json(body): Json<AddItemBody>,
) -> Result<(StatusCode, Json<Value>)> {
    let quantity = body.quantity.unwrap_or(1);
    if quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be positive".to_string(),
        ));
    }

    // Reject unknown and retired products up front with a clean 404.
    let product = ProductRepository::new(state.pool())
        .get_by_id(body.product_id)
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| AppError::NotFound(format!("product {}", body.product_id)))?;

    let carts = CartRepository::new(state.pool());
    let cart = lookup(&carts, token).await?;
    let item = carts.upsert_item(cart.id, product.id, quantity).await?;

    Ok((StatusCode::CREATED, Json(json!({ "item": item }))))
}

/// Set a line's quantity.
#[instrument(skip(state))]
pub async fn update_item(
    State(state): State<AppState>,
    CartToken(token): CartToken,
    Path(item_id): Path<i32>,
    Json(body): Json<UpdateItemBody>,
) -> Result<Json<Value>> {
    if body.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be positive; delete the line to remove it".to_string(),
        ));
    }

    let carts = CartRepository::new(state.pool());
    let cart = lookup(&carts, token).await?;
    let item = carts
        .set_item_quantity(cart.id, CartItemId::new(item_id), body.quantity)
        .await
        .map_err(crate::error::not_found_as("cart item"))?;

    Ok(Json(json!({ "item": item })))
}

/// Remove a line from the cart.
#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    CartToken(token): CartToken,
    Path(item_id): Path<i32>,
) -> Result<StatusCode> {
    let carts = CartRepository::new(state.pool());
    let cart = lookup(&carts, token).await?;
    let removed = carts.delete_item(cart.id, CartItemId::new(item_id)).await?;

    if !removed {
        return Err(AppError::NotFound(format!("cart item {item_id}")));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn lookup(carts: &CartRepository<'_>, token: Uuid) -> Result<Cart> {
    carts
        .get_by_token(token)
        .await?
        .ok_or_else(|| AppError::NotFound("cart".to_string()))
}
