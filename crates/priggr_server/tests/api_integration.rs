//! Integration tests for the Priggr HTTP API.

mod support;

use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use support::{setup_test_server, test_server_with, BrokenHighlighter};

#[tokio::test]
async fn test_paste_lifecycle() {
    let (server, _temp) = setup_test_server();

    let create_response = server
        .post("/api/paste")
        .json(&json!({
            "content": "fn main() {}",
            "syntax": "rust"
        }))
        .await;
    assert_eq!(create_response.status_code(), StatusCode::OK);
    let created: serde_json::Value = create_response.json();
    let paste_id = created["id"].as_str().expect("id").to_string();
    assert_eq!(paste_id.len(), 32);

    let get_response = server.get(&format!("/api/paste/{}", paste_id)).await;
    assert_eq!(get_response.status_code(), StatusCode::OK);
    let view: serde_json::Value = get_response.json();
    assert_eq!(view["content"], "<div class=\"rust\">fn main() {}</div>");
    assert_eq!(view["syntax_tag"], "rust");
    assert_eq!(view["highlighted"], true);
    assert!(view["created_at"].is_string());
    assert!(view.get("hit_count").is_none());

    let raw_response = server.get(&format!("/api/paste/{}/raw", paste_id)).await;
    assert_eq!(raw_response.status_code(), StatusCode::OK);
    raw_response.assert_header("content-type", "text/plain; charset=utf-8");
    assert_eq!(raw_response.text(), "fn main() {}");
}

#[tokio::test]
async fn test_unknown_syntax_is_stored_as_plain() {
    let (server, _temp) = setup_test_server();
    let created: serde_json::Value = server
        .post("/api/paste")
        .json(&json!({ "content": "SELECT 1;", "syntax": "not-a-lexer" }))
        .await
        .json();
    let id = created["id"].as_str().unwrap();

    let view: serde_json::Value = server.get(&format!("/api/paste/{}", id)).await.json();
    assert_eq!(view["syntax_tag"], "plain");
}

#[tokio::test]
async fn test_burn_after_read_serves_once() {
    let (server, _temp) = setup_test_server();
    let created: serde_json::Value = server
        .post("/api/paste")
        .json(&json!({ "content": "top secret", "expires": -2 }))
        .await
        .json();
    let id = created["id"].as_str().unwrap();

    let first = server.get(&format!("/api/paste/{}/raw", id)).await;
    assert_eq!(first.status_code(), StatusCode::OK);
    assert_eq!(first.text(), "top secret");

    let second = server.get(&format!("/api/paste/{}", id)).await;
    assert_eq!(second.status_code(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = second.json();
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn test_missing_paste_is_not_found() {
    let (server, _temp) = setup_test_server();
    let response = server.get("/api/paste/0123456789abcdef0123456789abcdef").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let raw = server.get("/api/paste/nope/raw").await;
    assert_eq!(raw.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_create_requests_are_rejected() {
    let (server, _temp) = setup_test_server();

    let empty = server
        .post("/api/paste")
        .json(&json!({ "content": "" }))
        .await;
    assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = empty.json();
    assert!(body["error"].as_str().unwrap().contains("empty"));

    let bad_expiry = server
        .post("/api/paste")
        .json(&json!({ "content": "x", "expires": -7 }))
        .await;
    assert_eq!(bad_expiry.status_code(), StatusCode::BAD_REQUEST);

    let endless_expiry = server
        .post("/api/paste")
        .json(&json!({ "content": "x", "expires": 10_000_000_000_000_i64 }))
        .await;
    assert_eq!(endless_expiry.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let (server, _temp) = setup_test_server();
    let response = server
        .post("/api/paste")
        .json(&json!({ "content": "a".repeat(128 * 1024) }))
        .await;
    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_broken_highlighter_degrades_to_plain_content() {
    let (server, _temp) = test_server_with(Arc::new(BrokenHighlighter));
    let created: serde_json::Value = server
        .post("/api/paste")
        .json(&json!({ "content": "let x = 1;", "syntax": "rust" }))
        .await
        .json();
    let id = created["id"].as_str().unwrap();

    let response = server.get(&format!("/api/paste/{}", id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let view: serde_json::Value = response.json();
    assert_eq!(view["content"], "let x = 1;");
    assert_eq!(view["highlighted"], false);
}

#[tokio::test]
async fn test_languages_lists_sentinels_then_known_tags() {
    let (server, _temp) = setup_test_server();
    let response = server.get("/api/languages").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let tags: Vec<String> = response.json();
    assert_eq!(tags, vec!["autodetect", "plain", "python", "rust"]);
}

#[tokio::test]
async fn test_security_headers_are_set() {
    let (server, _temp) = setup_test_server();
    let response = server.get("/api/languages").await;
    response.assert_header("x-content-type-options", "nosniff");
    response.assert_header("x-frame-options", "DENY");
    response.assert_contains_header("content-security-policy");
}
