//! Integration tests for schema decoration as seen through a full boot.

use serde_json::{Value, json};

use crate::helpers::TestApp;

use arbor_graph::namespace::RequestSeed;
use arbor_graph::source::FieldSource;

#[tokio::test]
async fn test_replace_hook_rewrites_every_post_title() {
    let app = TestApp::new().await;
    let ctx = app.contexts.context(RequestSeed::default());

    let posts = app
        .schema
        .resolve_field(
            "Query",
            "posts",
            FieldSource::default(),
            Value::Null,
            ctx.clone(),
        )
        .await
        .unwrap();

    // Query.posts itself is undecorated; the decoration sits on Post.title.
    let first = FieldSource::Json(posts.as_array().unwrap()[0].clone());
    let title = app
        .schema
        .resolve_field("Post", "title", first, Value::Null, ctx)
        .await
        .unwrap();
    assert_eq!(title, json!("Introduction to GraphQL!"));
}

#[tokio::test]
async fn test_undecorated_fields_are_untouched() {
    let app = TestApp::new().await;
    let ctx = app.contexts.context(RequestSeed::default());

    let votes = app
        .schema
        .resolve_field(
            "Post",
            "votes",
            FieldSource::json(json!({"votes": 7})),
            Value::Null,
            ctx,
        )
        .await
        .unwrap();
    assert_eq!(votes, json!(7));
}

#[tokio::test]
async fn test_pre_hook_failure_surfaces_through_http() {
    let app = TestApp::new().await;

    let (status, body) = app.query("author", json!({"id": -3})).await;
    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("VALIDATION_ERROR"));

    let (status, body) = app.query("author", json!({"id": 2})).await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(body["data"]["firstName"], json!("Sashko"));
}

#[tokio::test]
async fn test_variant_resolution_through_http() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/graph/ql",
            Some(json!({"field": "content", "variantOf": "Content"})),
        )
        .await;
    assert_eq!(status, axum::http::StatusCode::OK);
    // The latest post carries votes, so the core resolver names it.
    assert_eq!(body["variant"], json!("Post"));
}

#[tokio::test]
async fn test_request_contexts_are_independent() {
    let app = TestApp::new().await;

    let a = app.contexts.context(RequestSeed::default());
    let b = app.contexts.context(RequestSeed {
        user: Some(json!({"id": 1})),
    });

    assert!(a.user().is_none());
    assert_eq!(b.user().unwrap()["id"], json!(1));
}
