//! Integration tests for the HTTP surface.

use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::helpers::TestApp;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.request("GET", "/api/v1/system/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
}

#[tokio::test]
async fn test_query_posts() {
    let app = TestApp::new().await;
    let (status, body) = app.query("posts", Value::Null).await;
    assert_eq!(status, StatusCode::OK);

    let posts = body["data"].as_array().unwrap();
    assert_eq!(posts.len(), 4);
    assert_eq!(posts[0]["title"], json!("Introduction to GraphQL"));
}

#[tokio::test]
async fn test_mutation_upvote_persists_across_requests() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/graph/ql",
            Some(json!({"mutation": "upvotePost", "args": {"postId": 1}})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["votes"], json!(3));

    // A second request sees the new tally: the store is process-wide even
    // though the namespaces are rebuilt per request.
    let (_, body) = app
        .request(
            "POST",
            "/api/v1/graph/ql",
            Some(json!({"mutation": "upvotePost", "args": {"postId": 1}})),
        )
        .await;
    assert_eq!(body["data"]["votes"], json!(4));
}

#[tokio::test]
async fn test_mutation_missing_post_is_404() {
    let app = TestApp::new().await;
    let (status, body) = app
        .request(
            "POST",
            "/api/v1/graph/ql",
            Some(json!({"mutation": "upvotePost", "args": {"postId": 99}})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("NOT_FOUND"));
}

#[tokio::test]
async fn test_request_must_name_exactly_one_field() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request("POST", "/api/v1/graph/ql", Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "POST",
            "/api/v1/graph/ql",
            Some(json!({"field": "posts", "mutation": "upvotePost"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_plugin_readtime_field_end_to_end() {
    let app = TestApp::new().await;

    // Resolve a post's readtime through the plugin's resolver + loader.
    let ctx = app
        .contexts
        .context(arbor_graph::namespace::RequestSeed::default());
    let readtime = app
        .schema
        .resolve_field(
            "Post",
            "readtime",
            arbor_graph::source::FieldSource::json(json!({"title": "Welcome to Meteor"})),
            Value::Null,
            ctx,
        )
        .await
        .unwrap();
    assert_eq!(readtime["minutes"], json!(1));
}

#[tokio::test]
async fn test_installed_plugins_are_listed() {
    let app = TestApp::new().await;
    let (status, body) = app.request("GET", "/api/v1/system/plugins", None).await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["readtime", "ping"]);
}

#[tokio::test]
async fn test_plugin_route_is_mounted() {
    let app = TestApp::new().await;
    let (status, _) = app.request("GET", "/ping", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_explorer_mounts_in_devel_mode() {
    let app = TestApp::new().await;
    let (status, _) = app.request("GET", "/api/v1/graph/iql", None).await;
    assert_eq!(status, StatusCode::OK);
}
