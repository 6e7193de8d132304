//! Integration tests for shop authentication.
//!
//! These tests require a running shop server with migrations applied.
//!
//! Run with: cargo test -p tamarind-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use tamarind_integration_tests::{session_client, shop_base_url, unique_email};

#[tokio::test]
#[ignore = "Requires running shop server"]
async fn test_register_login_me_logout() {
    let client = session_client();
    let email = unique_email("auth");
    let password = "integration-pass-1";

    // Register starts a session
    let resp = client
        .post(format!("{}/auth/register", shop_base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("register");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .get(format!("{}/auth/me", shop_base_url()))
        .send()
        .await
        .expect("me");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("me body");
    assert_eq!(body["user"]["email"].as_str(), Some(email.as_str()));

    // Logout ends it
    let resp = client
        .post(format!("{}/auth/logout", shop_base_url()))
        .send()
        .await
        .expect("logout");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .get(format!("{}/auth/me", shop_base_url()))
        .send()
        .await
        .expect("me after logout");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // And login starts a fresh one
    let resp = client
        .post(format!("{}/auth/login", shop_base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("login");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running shop server"]
async fn test_duplicate_registration_conflicts() {
    let client = session_client();
    let email = unique_email("dup");
    let body = json!({ "email": email, "password": "integration-pass-1" });

    let resp = client
        .post(format!("{}/auth/register", shop_base_url()))
        .json(&body)
        .send()
        .await
        .expect("first register");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(format!("{}/auth/register", shop_base_url()))
        .json(&body)
        .send()
        .await
        .expect("second register");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running shop server"]
async fn test_login_with_wrong_password_is_unauthorized() {
    let client = session_client();
    let email = unique_email("wrongpw");

    let resp = client
        .post(format!("{}/auth/register", shop_base_url()))
        .json(&json!({ "email": email, "password": "integration-pass-1" }))
        .send()
        .await
        .expect("register");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let fresh = session_client();
    let resp = fresh
        .post(format!("{}/auth/login", shop_base_url()))
        .json(&json!({ "email": email, "password": "not-the-password" }))
        .send()
        .await
        .expect("login");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
