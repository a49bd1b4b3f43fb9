//! HTTP tests for the axum router.

#![cfg(feature = "server")]

mod common;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use rstest::rstest;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{create_test_actions, signup_entries, todo_entries, with_intent};
use form_actions::api::{AppState, create_router, get_todos, post_todos};
use form_actions::form::Intent;

// =============================================================================
// Helpers
// =============================================================================

fn router() -> Router {
    let (actions, _) = create_test_actions();
    create_router(AppState::new(actions))
}

fn encode(entries: &[(String, String)]) -> String {
    entries
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(name, NON_ALPHANUMERIC),
                utf8_percent_encode(value, NON_ALPHANUMERIC)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn form_request(uri: &str, entries: &[(String, String)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(encode(entries)))
        .unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// =============================================================================
// Health
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_health_check() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(router(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

// =============================================================================
// Todos
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_post_todos_then_get_returns_saved_list() {
    let router = router();
    let entries = todo_entries("Week", &[("Plan", true)]);

    let (status, body) = send(router.clone(), form_request("/todos", &entries)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let request = Request::builder().uri("/todos").body(Body::empty()).unwrap();
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"title": "Week", "tasks": [{"content": "Plan", "completed": true}]})
    );
}

#[rstest]
#[tokio::test]
async fn test_invalid_todos_is_unprocessable() {
    let entries = todo_entries("", &[("Plan", false)]);

    let (status, body) = send(router(), form_request("/todos", &entries)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"], json!({"title": ["Title is required"]}));
    assert_eq!(body["initialValue"]["tasks"][0]["content"], "Plan");
}

#[rstest]
#[tokio::test]
async fn test_insert_intent_re_renders_with_ok() {
    let entries = with_intent(
        todo_entries("Week", &[]),
        &Intent::Insert {
            name: "tasks".to_string(),
            index: None,
            default_value: None,
        },
    );

    let (status, body) = send(router(), form_request("/todos", &entries)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intent"]["type"], "insert");
    assert_eq!(body["initialValue"]["tasks"], json!([{}]));
    assert_eq!(body["error"]["tasks[0].content"], json!(["Content is required"]));
}

#[rstest]
#[tokio::test]
async fn test_malformed_intent_is_bad_request() {
    let mut entries = todo_entries("Week", &[]);
    entries.push(("__intent__".to_string(), "not json".to_string()));

    let (status, body) = send(router(), form_request("/todos", &entries)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"][""].as_array().map(Vec::len), Some(1));
}

#[rstest]
#[tokio::test]
async fn test_overflowing_index_in_field_name_is_ignored() {
    let mut entries = todo_entries("Week", &[]);
    entries.push(("tasks[18446744073709551615].content".to_string(), "boom".to_string()));

    let (status, body) = send(router(), form_request("/todos", &entries)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["initialValue"], json!({"title": "Week", "tasks": []}));
}

#[rstest]
#[tokio::test]
async fn test_reset_without_payload_is_accepted() {
    let mut entries = todo_entries("Edited", &[]);
    entries.push(("__intent__".to_string(), r#"{"type":"reset"}"#.to_string()));

    let (status, body) = send(router(), form_request("/todos", &entries)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intent"]["type"], "reset");
    assert_eq!(body["initialValue"], json!({"title": "", "tasks": []}));
}

#[rstest]
#[tokio::test]
async fn test_handlers_share_state() {
    let (actions, _) = create_test_actions();
    let state = AppState::new(actions);

    let response = post_todos(
        State(state.clone()),
        axum::extract::Form(todo_entries("Direct", &[])),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    let stored = get_todos(State(state)).await.unwrap();
    assert_eq!(stored.0.title, "Direct");
}

// =============================================================================
// Login / Signup
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_login_success_redirects_with_value() {
    let entries = vec![
        ("email".to_string(), "user@example.com".to_string()),
        ("password".to_string(), "secret1".to_string()),
    ];

    let (status, body) = send(router(), form_request("/login", &entries)).await;

    assert_eq!(status, StatusCode::OK);
    let redirect = body["redirect"].as_str().unwrap();
    assert!(redirect.starts_with("/?value=%7B"));
    assert!(body.get("initialValue").is_none());
}

#[rstest]
#[tokio::test]
async fn test_signup_taken_username_is_unprocessable() {
    let entries = signup_entries("admin", "secret1", "secret1");

    let (status, body) = send(router(), form_request("/signup", &entries)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], json!({"username": ["Username is already taken"]}));
    assert_eq!(body["initialValue"]["username"], "admin");
}

#[rstest]
#[tokio::test]
async fn test_signup_mismatch_reports_confirm_password() {
    let entries = signup_entries("alice", "abc123", "xyz");

    let (status, body) = send(router(), form_request("/signup", &entries)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], json!({"confirmPassword": ["Password does not match"]}));
}
