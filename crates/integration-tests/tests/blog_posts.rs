//! Integration tests for the blog API.
//!
//! These tests require a running blog server with migrations applied.
//!
//! Run with: cargo test -p tamarind-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use tamarind_integration_tests::{blog_base_url, session_client};

#[tokio::test]
#[ignore = "Requires running blog server"]
async fn test_post_draft_publish_lifecycle() {
    let client = session_client();
    let title = format!("Integration post {}", uuid::Uuid::new_v4().simple());

    // Create a draft
    let resp = client
        .post(format!("{}/posts", blog_base_url()))
        .json(&json!({ "title": title, "body": "Hello." }))
        .send()
        .await
        .expect("create post");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("post body");
    let id = body["post"]["id"].as_i64().expect("post id");
    let slug = body["post"]["slug"].as_str().expect("post slug").to_string();
    assert_eq!(body["post"]["status"].as_str(), Some("draft"));

    // Drafts are hidden from the default listing
    let resp = client
        .get(format!("{}/posts", blog_base_url()))
        .send()
        .await
        .expect("list posts");
    let listing: Value = resp.json().await.expect("listing body");
    assert!(
        !listing["posts"]
            .as_array()
            .expect("posts array")
            .iter()
            .any(|p| p["id"].as_i64() == Some(id))
    );

    // Publish, then it shows up
    let resp = client
        .post(format!("{}/posts/{id}/publish", blog_base_url()))
        .send()
        .await
        .expect("publish post");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("publish body");
    assert_eq!(body["post"]["status"].as_str(), Some("published"));
    assert!(body["post"]["published_at"].is_string());

    let resp = client
        .get(format!("{}/posts/{slug}", blog_base_url()))
        .send()
        .await
        .expect("show post");
    assert_eq!(resp.status(), StatusCode::OK);

    // Clean up
    let resp = client
        .delete(format!("{}/posts/{id}", blog_base_url()))
        .send()
        .await
        .expect("delete post");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore = "Requires running blog server"]
async fn test_tags_roundtrip() {
    let client = session_client();
    let name = format!("tag-{}", uuid::Uuid::new_v4().simple());

    let resp = client
        .post(format!("{}/tags", blog_base_url()))
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("create tag");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("tag body");
    let tag_id = body["tag"]["id"].as_i64().expect("tag id");

    // Duplicate names conflict
    let resp = client
        .post(format!("{}/tags", blog_base_url()))
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("create duplicate tag");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Assign to a post at creation time
    let resp = client
        .post(format!("{}/posts", blog_base_url()))
        .json(&json!({
            "title": format!("Tagged {name}"),
            "body": "Body.",
            "tag_ids": [tag_id],
        }))
        .send()
        .await
        .expect("create tagged post");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("post body");
    let post_id = body["post"]["id"].as_i64().expect("post id");
    let tags = body["post"]["tags"].as_array().expect("tags array");
    assert!(tags.iter().any(|t| t["id"].as_i64() == Some(tag_id)));

    // Clean up
    let _ = client
        .delete(format!("{}/posts/{post_id}", blog_base_url()))
        .send()
        .await;
    let resp = client
        .delete(format!("{}/tags/{tag_id}", blog_base_url()))
        .send()
        .await
        .expect("delete tag");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore = "Requires running blog server"]
async fn test_unknown_post_is_404() {
    let client = session_client();
    let resp = client
        .get(format!("{}/posts/definitely-not-a-real-slug", blog_base_url()))
        .send()
        .await
        .expect("show post");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
