//! Post API Tests
//!
//! Covers creation with form validation, fetching, listing with sort and
//! filters, upvotes, and the secret-key gate on edit and delete.

mod common;

use axum::http::StatusCode;
use common::{app, SECRET_KEY};
use serde_json::json;
use uuid::Uuid;

// ===========================================================================
// Post Creation
// ===========================================================================

#[tokio::test]
async fn create_post_round_trip() {
    let app = app();
    let before = time::OffsetDateTime::now_utc();

    let resp = app
        .post_json(
            "/posts",
            json!({
                "title": "X",
                "community": "Running",
                "content": "Anyone up for intervals?",
                "secret_key": SECRET_KEY,
                "upvotes": 42,
            }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    let created = resp.json();
    let id = created["id"].as_str().unwrap();

    let resp = app.get(&format!("/posts/{}", id)).await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["title"], "X");
    assert_eq!(body["community"], "Running");
    assert_eq!(body["upvotes"], 0);
    assert!(body.get("secret_key").is_none());

    let created_at = time::OffsetDateTime::parse(
        body["created_at"].as_str().unwrap(),
        &time::format_description::well_known::Rfc3339,
    )
    .unwrap();
    assert!(created_at >= before);
}

#[tokio::test]
async fn create_post_reports_every_invalid_field() {
    let app = app();

    let resp = app
        .post_json(
            "/posts",
            json!({
                "title": "   ",
                "community": "Running",
                "image_url": "not a url",
                "secret_key": "",
            }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_message(), "validation failed");
    let fields = &resp.json()["fields"];
    assert_eq!(fields["title"], "Title is required");
    assert_eq!(fields["secret_key"], "Secret key is required");
    assert_eq!(fields["image_url"], "Please enter a valid URL");

    let resp = app.get("/posts").await;
    assert_eq!(resp.json()["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn create_post_rejects_unknown_community() {
    let app = app();

    let resp = app
        .post_json(
            "/posts",
            json!({ "title": "t", "community": "Knitting", "secret_key": "k" }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["fields"]["community"], "Please select a community");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = app();

    let resp = app
        .post_json(
            "/posts",
            json!({
                "title": "x".repeat(128 * 1024),
                "community": "Running",
                "secret_key": SECRET_KEY,
            }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.get("/posts").await.json()["items"], json!([]));
}

#[tokio::test]
async fn get_nonexistent_post() {
    let app = app();

    let resp = app.get(&format!("/posts/{}", Uuid::new_v4())).await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.error_message(), "post not found");
}

// ===========================================================================
// Listing
// ===========================================================================

#[tokio::test]
async fn list_newest_first() {
    let app = app();
    let first = app.create_post("first", "Running").await;
    let second = app.create_post("second", "Matcha").await;
    let third = app.create_post("third", "Gaming").await;

    let resp = app.get("/posts?sort=newest").await;
    assert_eq!(resp.status, StatusCode::OK);
    let ids: Vec<String> = resp.json()["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|post| post["id"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(
        ids,
        vec![third.to_string(), second.to_string(), first.to_string()]
    );
}

#[tokio::test]
async fn list_popular_by_upvotes() {
    let app = app();
    let posts = app.posts();
    for (title, votes) in [("five", 5), ("one", 1), ("nine", 9)] {
        let id = app.create_post(title, "Gaming").await;
        for n in 0..votes {
            posts.upvote(id, n).await.unwrap();
        }
    }

    let resp = app.get("/posts?sort=popular").await;
    let upvotes: Vec<i64> = resp.json()["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|post| post["upvotes"].as_i64().unwrap())
        .collect();

    assert_eq!(upvotes, vec![9, 5, 1]);
}

#[tokio::test]
async fn list_filters_by_search_and_location() {
    let app = app();
    app.create_post("Trail run on Saturday", "Running").await;
    app.create_post("Ceremonial grade haul", "Matcha").await;

    let resp = app
        .post_json(
            "/posts",
            json!({
                "title": "Track workout",
                "community": "Running",
                "location": "Fullerton, CA",
                "secret_key": SECRET_KEY,
            }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);

    let resp = app.get("/posts?search=RUN").await;
    let items = resp.json()["items"].as_array().unwrap().clone();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Trail run on Saturday");

    let resp = app.get("/posts?local_only=true").await;
    let items = resp.json()["items"].as_array().unwrap().clone();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Track workout");
}

#[tokio::test]
async fn list_community_posts() {
    let app = app();
    app.create_post("Long run", "Running").await;
    app.create_post("Whisk care", "Matcha").await;

    let resp = app.get("/communities/matcha/posts").await;
    assert_eq!(resp.status, StatusCode::OK);
    let items = resp.json()["items"].as_array().unwrap().clone();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["community"], "Matcha");

    let resp = app.get("/communities/knitting/posts").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_communities() {
    let app = app();

    let resp = app.get("/communities").await;

    assert_eq!(resp.json()["items"], json!(["Running", "Matcha", "Gaming"]));
}

#[tokio::test]
async fn store_outage_is_service_unavailable() {
    let app = app();
    app.store().set_unavailable(true);

    let resp = app.get("/posts").await;
    assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(resp.error_message(), "store unavailable");

    let resp = app.get("/health").await;
    assert_eq!(resp.json()["status"], "degraded");
}

// ===========================================================================
// Upvotes
// ===========================================================================

#[tokio::test]
async fn upvote_increments_by_one() {
    let app = app();
    let id = app.create_post("vote me", "Gaming").await;
    let posts = app.posts();
    for n in 0..3 {
        posts.upvote(id, n).await.unwrap();
    }

    let resp = app
        .post_json(&format!("/posts/{}/upvote", id), json!({ "current_upvotes": 3 }))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["upvotes"], 4);
}

#[tokio::test]
async fn upvote_from_stale_count_still_increments() {
    let app = app();
    let id = app.create_post("race", "Gaming").await;
    let posts = app.posts();

    // Two clients that both saw zero upvotes.
    posts.upvote(id, 0).await.unwrap();
    let post = posts.upvote(id, 0).await.unwrap();

    assert_eq!(post.upvotes, 2);
}

#[tokio::test]
async fn upvote_with_maximal_seen_count() {
    let app = app();
    let id = app.create_post("overflow", "Gaming").await;

    let resp = app
        .post_json(&format!("/posts/{}/upvote", id), json!({ "current_upvotes": i64::MAX }))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["upvotes"], 1);
}

#[tokio::test]
async fn upvote_missing_post() {
    let app = app();

    let resp = app
        .post_json(&format!("/posts/{}/upvote", Uuid::new_v4()), json!({}))
        .await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

// ===========================================================================
// Secret-key gate
// ===========================================================================

#[tokio::test]
async fn verify_secret_key() {
    let app = app();
    let id = app.create_post("mine", "Matcha").await;

    let resp = app
        .post_json(&format!("/posts/{}/verify", id), json!({ "secret_key": SECRET_KEY }))
        .await;
    assert_eq!(resp.json()["valid"], true);

    let resp = app
        .post_json(&format!("/posts/{}/verify", id), json!({ "secret_key": "guess" }))
        .await;
    assert_eq!(resp.json()["valid"], false);
}

#[tokio::test]
async fn edit_with_correct_key() {
    let app = app();
    let id = app.create_post("Old title", "Matcha").await;

    let resp = app
        .patch_json(
            &format!("/posts/{}", id),
            json!({
                "title": "New title",
                "community": "Gaming",
                "location": "Osaka",
            }),
            Some(SECRET_KEY),
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["title"], "New title");
    assert_eq!(body["community"], "Gaming");
    assert_eq!(body["location"], "Osaka");
    assert!(body["content"].is_null());
}

#[tokio::test]
async fn edit_with_wrong_key_changes_nothing() {
    let app = app();
    let id = app.create_post("Keep me", "Matcha").await;

    let resp = app
        .patch_json(
            &format!("/posts/{}", id),
            json!({ "title": "Hijacked", "community": "Matcha" }),
            Some("wrong"),
        )
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.error_message(), "Incorrect secret key");

    let resp = app.get(&format!("/posts/{}", id)).await;
    assert_eq!(resp.json()["title"], "Keep me");
}

#[tokio::test]
async fn edit_without_key_is_unauthorized() {
    let app = app();
    let id = app.create_post("Keep me", "Matcha").await;

    let resp = app
        .patch_json(
            &format!("/posts/{}", id),
            json!({ "title": "Hijacked", "community": "Matcha" }),
            None,
        )
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.error_message(), "Secret key is required");
}

#[tokio::test]
async fn edit_validates_before_checking_key() {
    let app = app();
    let id = app.create_post("Keep me", "Matcha").await;

    let resp = app
        .patch_json(
            &format!("/posts/{}", id),
            json!({ "title": "", "community": "Matcha" }),
            Some(SECRET_KEY),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["fields"]["title"], "Title is required");
    assert!(resp.json()["fields"].get("secret_key").is_none());
}

#[tokio::test]
async fn delete_with_wrong_key_keeps_post() {
    let app = app();
    let id = app.create_post("Still here", "Running").await;

    let resp = app.delete(&format!("/posts/{}", id), Some("nope")).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let resp = app.get(&format!("/posts/{}", id)).await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn delete_with_correct_key() {
    let app = app();
    let id = app.create_post("Bye", "Running").await;

    let resp = app.delete(&format!("/posts/{}", id), Some(SECRET_KEY)).await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);

    let resp = app.get(&format!("/posts/{}", id)).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_missing_post_is_not_found() {
    let app = app();

    let resp = app
        .delete(&format!("/posts/{}", Uuid::new_v4()), Some(SECRET_KEY))
        .await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}
