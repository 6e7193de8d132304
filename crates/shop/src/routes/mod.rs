//! HTTP route handlers for the shop API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (DB ping)
//!
//! # Auth (rate limited)
//! POST /auth/register          - Create an account, start a session
//! POST /auth/login             - Start a session
//! POST /auth/logout            - End the session
//! GET  /auth/me                - Current user
//!
//! # Catalog
//! GET    /products             - List products (pagination, category filter)
//! GET    /products/{slug}      - Product detail
//! POST   /products             - Create product (auth)
//! PUT    /products/{id}        - Update product (auth)
//! DELETE /products/{id}        - Delete or deactivate product (auth)
//! GET    /categories           - List categories
//! POST   /categories           - Create category (auth)
//! DELETE /categories/{id}      - Delete category (auth)
//!
//! # Cart (token via X-Cart-Token header)
//! POST   /cart                 - Create cart, returns token
//! GET    /cart                 - Cart with lines and subtotal
//! POST   /cart/items           - Add product to cart
//! PUT    /cart/items/{id}      - Set line quantity
//! DELETE /cart/items/{id}      - Remove line
//!
//! # Checkout & orders
//! POST /checkout               - Reserve stock, create provider invoice (auth)
//! GET  /orders                 - Current user's orders (auth)
//! GET  /orders/{id}            - One order with items (auth, owner-only)
//!
//! # Webhooks
//! POST /webhooks/stripe        - Signed payment provider callbacks
//! ```

pub mod auth;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod webhooks;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
///
/// Reads address products by slug; writes address them by numeric id. Both
/// shapes share the one path parameter slot.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{key}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route("/{id}", delete(categories::delete))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(cart::create).get(cart::show))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{id}",
            put(cart::update_item).delete(cart::remove_item),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
}

/// Create all routes for the shop API.
///
/// Auth endpoints sit behind the strict rate limiter; everything else gets
/// the general one at the top level in `main`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest(
            "/auth",
            auth_routes().layer(crate::middleware::auth_rate_limiter()),
        )
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::checkout))
        .nest("/orders", order_routes())
        .route("/webhooks/stripe", post(webhooks::stripe))
}
