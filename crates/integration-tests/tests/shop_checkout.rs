//! Integration tests for the cart and checkout flow.
//!
//! These tests require:
//! - A running `PostgreSQL` database with shop migrations applied
//! - The shop server running (cargo run -p tamarind-shop)
//! - A payment provider stub reachable at `STRIPE_API_BASE`
//!
//! Run with: cargo test -p tamarind-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use tamarind_integration_tests::{session_client, shop_base_url, unique_email};

const CART_TOKEN_HEADER: &str = "x-cart-token";

/// Register a fresh account and return the logged-in client.
async fn register(client: &Client) -> String {
    let email = unique_email("checkout");
    let resp = client
        .post(format!("{}/auth/register", shop_base_url()))
        .json(&json!({ "email": email, "password": "integration-pass-1" }))
        .send()
        .await
        .expect("register request");
    assert_eq!(resp.status(), StatusCode::CREATED);
    email
}

/// Create a cart and return its token.
async fn create_cart(client: &Client) -> String {
    let resp = client
        .post(format!("{}/cart", shop_base_url()))
        .send()
        .await
        .expect("cart create request");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("cart body");
    body["cart"]["token"]
        .as_str()
        .expect("cart token")
        .to_string()
}

/// Pick a product id with stock from the public listing.
async fn first_product_id(client: &Client) -> i64 {
    let resp = client
        .get(format!("{}/products", shop_base_url()))
        .send()
        .await
        .expect("products request");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("products body");
    let products = body["products"].as_array().expect("products array");
    let product = products
        .iter()
        .find(|p| p["stock"].as_i64().unwrap_or(0) > p["reserved_stock"].as_i64().unwrap_or(0))
        .expect("a product with available stock (run `tam-cli seed shop`)");
    product["id"].as_i64().expect("product id")
}

#[tokio::test]
#[ignore = "Requires running shop server and seeded database"]
async fn test_cart_lifecycle() {
    let client = session_client();
    let token = create_cart(&client).await;
    let product_id = first_product_id(&client).await;

    // Add an item
    let resp = client
        .post(format!("{}/cart/items", shop_base_url()))
        .header(CART_TOKEN_HEADER, &token)
        .json(&json!({ "product_id": product_id, "quantity": 2 }))
        .send()
        .await
        .expect("add item");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("item body");
    let item_id = body["item"]["id"].as_i64().expect("item id");

    // Adding again sums quantities
    let resp = client
        .post(format!("{}/cart/items", shop_base_url()))
        .header(CART_TOKEN_HEADER, &token)
        .json(&json!({ "product_id": product_id, "quantity": 1 }))
        .send()
        .await
        .expect("add item again");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .get(format!("{}/cart", shop_base_url()))
        .header(CART_TOKEN_HEADER, &token)
        .send()
        .await
        .expect("cart show");
    let body: Value = resp.json().await.expect("cart body");
    let lines = body["cart"]["lines"].as_array().expect("lines");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"].as_i64(), Some(3));

    // Drop the line back to 1, then remove it
    let resp = client
        .put(format!("{}/cart/items/{item_id}", shop_base_url()))
        .header(CART_TOKEN_HEADER, &token)
        .json(&json!({ "quantity": 1 }))
        .send()
        .await
        .expect("update item");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .delete(format!("{}/cart/items/{item_id}", shop_base_url()))
        .header(CART_TOKEN_HEADER, &token)
        .send()
        .await
        .expect("remove item");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore = "Requires running shop server and seeded database"]
async fn test_checkout_requires_auth() {
    let client = session_client();
    let token = create_cart(&client).await;

    let resp = client
        .post(format!("{}/checkout", shop_base_url()))
        .header(CART_TOKEN_HEADER, &token)
        .send()
        .await
        .expect("checkout request");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running shop server and seeded database"]
async fn test_checkout_rejects_empty_cart() {
    let client = session_client();
    register(&client).await;
    let token = create_cart(&client).await;

    let resp = client
        .post(format!("{}/checkout", shop_base_url()))
        .header(CART_TOKEN_HEADER, &token)
        .send()
        .await
        .expect("checkout request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running shop server, seeded database, and provider stub"]
async fn test_checkout_reserves_stock() {
    let client = session_client();
    register(&client).await;
    let token = create_cart(&client).await;
    let product_id = first_product_id(&client).await;

    let resp = client
        .post(format!("{}/cart/items", shop_base_url()))
        .header(CART_TOKEN_HEADER, &token)
        .json(&json!({ "product_id": product_id, "quantity": 1 }))
        .send()
        .await
        .expect("add item");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(format!("{}/checkout", shop_base_url()))
        .header(CART_TOKEN_HEADER, &token)
        .send()
        .await
        .expect("checkout request");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("checkout body");
    assert!(body["invoice_id"].as_i64().is_some());

    // The hold shows up on the product until the webhook or sweeper acts.
    let resp = client
        .get(format!("{}/products", shop_base_url()))
        .send()
        .await
        .expect("products request");
    let products: Value = resp.json().await.expect("products body");
    let product = products["products"]
        .as_array()
        .expect("products array")
        .iter()
        .find(|p| p["id"].as_i64() == Some(product_id))
        .expect("checked-out product")
        .clone();
    assert!(product["reserved_stock"].as_i64().unwrap_or(0) >= 1);
}

#[tokio::test]
#[ignore = "Requires running shop server"]
async fn test_oversized_quantity_is_rejected_at_checkout() {
    let client = session_client();
    register(&client).await;
    let token = create_cart(&client).await;
    let product_id = first_product_id(&client).await;

    // Far more than any seeded product carries.
    let resp = client
        .post(format!("{}/cart/items", shop_base_url()))
        .header(CART_TOKEN_HEADER, &token)
        .json(&json!({ "product_id": product_id, "quantity": 1_000_000 }))
        .send()
        .await
        .expect("add item");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(format!("{}/checkout", shop_base_url()))
        .header(CART_TOKEN_HEADER, &token)
        .send()
        .await
        .expect("checkout request");

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
