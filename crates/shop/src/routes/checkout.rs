//! Checkout route handler.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::routes::cart::CartToken;
use crate::services::CheckoutService;
use crate::state::AppState;

/// Start a checkout: hold stock for the cart and create the provider
/// invoice. The response carries the payment URL the client redirects to.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    CartToken(token): CartToken,
) -> Result<(StatusCode, Json<crate::services::checkout::CheckoutResponse>)> {
    let service = CheckoutService::new(
        state.pool(),
        state.stripe(),
        state.config().reservation_ttl,
    );

    let response = service.begin(&user, token).await?;

    Ok((StatusCode::CREATED, Json(response)))
}
