//! Web API Config Tests
//!
//! Integration tests for the runtime config and password endpoints.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;
use subsync::web::handlers::AppState;
use subsync::web::router::{create_health_router, create_router};

fn create_test_server(password: &str, subscription_sources: &str) -> TestServer {
    let app_state = Arc::new(AppState {
        access_password: password.to_string(),
        subscription_sources: subscription_sources.to_string(),
    });
    let router = create_router(app_state, &[]).merge(create_health_router());
    TestServer::new(router).expect("Failed to create test server")
}

#[tokio::test]
async fn test_get_config_reports_password_presence_only() {
    let server = create_test_server("s3cret", "https://a.example.com/list.json");

    let response = server.get("/api/config").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(
        body,
        json!({
            "hasEnvPassword": true,
            "subscriptionSources": "https://a.example.com/list.json"
        })
    );
    assert!(!response.text().contains("s3cret"));
}

#[tokio::test]
async fn test_get_config_without_password() {
    let server = create_test_server("", "");

    let body = server.get("/api/config").await.json::<Value>();

    assert_eq!(body["hasEnvPassword"], json!(false));
    assert_eq!(body["subscriptionSources"], json!(""));
}

#[tokio::test]
async fn test_verify_password_correct() {
    let server = create_test_server("s3cret", "");

    let response = server
        .post("/api/config")
        .json(&json!({ "password": "s3cret" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "valid": true }));
}

#[tokio::test]
async fn test_verify_password_wrong() {
    let server = create_test_server("s3cret", "");

    let response = server
        .post("/api/config")
        .json(&json!({ "password": "guess" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "valid": false }));
}

#[tokio::test]
async fn test_verify_password_missing_field() {
    let server = create_test_server("s3cret", "");

    let response = server.post("/api/config").json(&json!({})).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["valid"], json!(false));
}

#[tokio::test]
async fn test_verify_password_when_none_configured() {
    let server = create_test_server("", "");

    let response = server
        .post("/api/config")
        .json(&json!({ "password": "" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({ "valid": false, "message": "No env password set" })
    );
}

#[tokio::test]
async fn test_verify_password_malformed_body() {
    let server = create_test_server("s3cret", "");

    let response = server.post("/api/config").text("{password:").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "valid": false, "message": "Invalid request" })
    );
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server("", "");

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "OK");
}
