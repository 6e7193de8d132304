//! Integration tests for the payment webhook endpoint.
//!
//! Only the rejection paths are exercised here; accepting a real event
//! requires knowing the server's webhook secret, which the signed-event
//! unit tests in the shop crate cover.
//!
//! Run with: cargo test -p tamarind-integration-tests -- --ignored

use reqwest::StatusCode;

use tamarind_integration_tests::{session_client, shop_base_url};

const EVENT_BODY: &str = r#"{
    "id": "evt_integration",
    "type": "invoice.paid",
    "data": { "object": { "id": "in_integration", "status": "paid" } }
}"#;

#[tokio::test]
#[ignore = "Requires running shop server"]
async fn test_webhook_without_signature_is_rejected() {
    let client = session_client();

    let resp = client
        .post(format!("{}/webhooks/stripe", shop_base_url()))
        .body(EVENT_BODY)
        .send()
        .await
        .expect("webhook request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running shop server"]
async fn test_webhook_with_bad_signature_is_rejected() {
    let client = session_client();

    let resp = client
        .post(format!("{}/webhooks/stripe", shop_base_url()))
        .header("stripe-signature", format!("t=1700000000,v1={}", "0".repeat(64)))
        .body(EVENT_BODY)
        .send()
        .await
        .expect("webhook request");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
