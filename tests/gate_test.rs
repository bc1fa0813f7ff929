mod common;

use axum::http::StatusCode;
use jobboard_backend::services::token_service::TokenPurpose;
use serde_json::json;

use common::{app, bare_request, json_request, offline_state, send};

#[tokio::test]
async fn protected_route_without_token_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(offline_state(dir.path()));

    let (status, body) = send(&app, bare_request("GET", "/api/user/my-account", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "token not found");
}

#[tokio::test]
async fn garbage_token_is_invalid_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(offline_state(dir.path()));

    let (status, body) = send(&app, bare_request("GET", "/api/job", Some("not.a.jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid credentials");
}

#[tokio::test]
async fn reset_token_cannot_open_a_session() {
    let dir = tempfile::tempdir().unwrap();
    let state = offline_state(dir.path());
    let token = state
        .tokens
        .issue("65a1f0c2b4d3e5f6a7b8c9d0", "a@b.io", TokenPurpose::PasswordReset)
        .unwrap();
    let app = app(state);

    let (status, body) = send(&app, bare_request("GET", "/api/auth/logout", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid credentials");
}

#[tokio::test]
async fn signup_reports_every_violation_at_once() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(offline_state(dir.path()));

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({"firstName": "Ada", "email": "not-an-email", "phone": "123", "password": "short"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    let messages: Vec<String> = body["message"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m.as_str().unwrap().to_string())
        .collect();
    assert!(messages.contains(&"lastName is required".to_string()));
    assert!(messages.iter().any(|m| m.starts_with("email ")));
    assert!(messages.iter().any(|m| m.starts_with("phone ")));
    assert!(messages.iter().any(|m| m.starts_with("password ")));
}

#[tokio::test]
async fn malformed_json_body_is_a_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(offline_state(dir.path()));

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"email\": "))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn path_ids_are_validated_before_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(offline_state(dir.path()));

    let (status, body) = send(&app, bare_request("GET", "/api/user/not-an-id", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"].as_array().unwrap().len(), 1);
    assert!(body["message"][0].as_str().unwrap().starts_with("userId "));
}

#[tokio::test]
async fn unknown_routes_get_the_error_shape() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(offline_state(dir.path()));

    let (status, body) = send(&app, bare_request("GET", "/api/nowhere", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn resume_upload_route_is_mounted_behind_the_gate() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(offline_state(dir.path()));

    let (status, body) = send(
        &app,
        bare_request("POST", "/api/job/apply/65a1f0c2b4d3e5f6a7b8c9d0", None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "token not found");
}
