//! Integration tests for the signup API.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use signup_core::MemoryAccountProvider;
use signup_server::api::{create_router, create_router_with_rate_limit, AppState, RateLimitState};
use signup_server::session::SessionRegistry;
use std::time::Duration;
use tower::ServiceExt;

fn create_test_app() -> Router {
    let state = AppState::new(MemoryAccountProvider::default());
    create_router_with_rate_limit(state, RateLimitState::permissive())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

async fn open_session(app: &Router) -> String {
    let (status, json) = send(app, "POST", "/v1/signup/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    json["session_id"].as_str().unwrap().to_string()
}

async fn fill(app: &Router, session: &str, fields: &[(&str, &str)]) {
    for (field, value) in fields {
        let uri = format!("/v1/signup/sessions/{}/fields/{}", session, field);
        let (status, _) = send(app, "PUT", &uri, Some(json!({ "value": value }))).await;
        assert_eq!(status, StatusCode::OK);
    }
}

const VALID: [(&str, &str); 5] = [
    ("tax_id", "12345678901"),
    ("full_name", "Ana"),
    ("email", "ana@x.com"),
    ("phone_number", "11987654321"),
    ("passphrase", "204857"),
];

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["active_sessions"], 0);
    assert_eq!(json["accounts"], 0);
}

#[tokio::test]
async fn test_new_session_is_idle() {
    let app = create_test_app();
    let session = open_session(&app).await;

    let (status, json) = send(&app, "GET", &format!("/v1/signup/sessions/{}", session), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"]["status"], "idle");
    assert_eq!(json["state"]["busy"], false);
    assert_eq!(json["errors"]["tax_id"], "");
}

#[tokio::test]
async fn test_digit_field_is_sanitized() {
    let app = create_test_app();
    let session = open_session(&app).await;

    let uri = format!("/v1/signup/sessions/{}/fields/phone_number", session);
    let (status, json) = send(&app, "PUT", &uri, Some(json!({ "value": "(11) 9876" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["value"], "119876");
    assert_eq!(json["error"], "phone number accepts digits only");

    let (_, json) = send(&app, "PUT", &uri, Some(json!({ "value": "1198765" }))).await;
    assert_eq!(json["error"], "");
}

#[tokio::test]
async fn test_passphrase_is_masked() {
    let app = create_test_app();
    let session = open_session(&app).await;
    fill(&app, &session, &[("passphrase", "2048")]).await;

    let (_, json) = send(&app, "GET", &format!("/v1/signup/sessions/{}", session), None).await;

    assert_eq!(json["fields"]["passphrase"], "****");
}

#[tokio::test]
async fn test_unknown_field() {
    let app = create_test_app();
    let session = open_session(&app).await;

    let uri = format!("/v1/signup/sessions/{}/fields/cpf", session);
    let (status, json) = send(&app, "PUT", &uri, Some(json!({ "value": "1" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "UNKNOWN_FIELD");
}

#[tokio::test]
async fn test_unknown_session() {
    let app = create_test_app();

    let uri = "/v1/signup/sessions/6f1c2a9e-3b0d-4c47-9a55-2d2f8e0b7c11";
    let (status, json) = send(&app, "GET", uri, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn test_submit_empty_form() {
    let app = create_test_app();
    let session = open_session(&app).await;

    let uri = format!("/v1/signup/sessions/{}/submit", session);
    let (status, json) = send(&app, "POST", &uri, None).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "MissingFields");
    assert_eq!(json["error"], "all fields are required");

    let (_, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(json["accounts"], 0);

    let (_, json) = send(&app, "GET", &format!("/v1/signup/sessions/{}", session), None).await;
    assert_eq!(json["state"]["status"], "failed");
    assert_eq!(json["state"]["code"], "MissingFields");
}

#[tokio::test]
async fn test_successful_registration_closes_session() {
    let app = create_test_app();
    let session = open_session(&app).await;
    fill(&app, &session, &VALID).await;

    let uri = format!("/v1/signup/sessions/{}/submit", session);
    let (status, json) = send(&app, "POST", &uri, None).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["email"], "ana@x.com");
    assert_eq!(json["next"], "login");

    let (status, _) = send(&app, "GET", &format!("/v1/signup/sessions/{}", session), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(json["accounts"], 1);
    assert_eq!(json["active_sessions"], 0);
}

#[tokio::test]
async fn test_duplicate_email_is_reported_and_retryable() {
    let app = create_test_app();

    let first = open_session(&app).await;
    fill(&app, &first, &VALID).await;
    let (status, _) = send(&app, "POST", &format!("/v1/signup/sessions/{}/submit", first), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let second = open_session(&app).await;
    fill(&app, &second, &VALID).await;
    let uri = format!("/v1/signup/sessions/{}/submit", second);
    let (status, json) = send(&app, "POST", &uri, None).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "email already registered");
    assert_eq!(json["code"], "EmailAlreadyRegistered");

    let (_, view) = send(&app, "GET", &format!("/v1/signup/sessions/{}", second), None).await;
    assert_eq!(view["state"]["busy"], false);

    fill(&app, &second, &[("email", "bia@x.com")]).await;
    let (status, _) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_provider_password_policy() {
    let state = AppState::new(MemoryAccountProvider::new(8));
    let app = create_router_with_rate_limit(state, RateLimitState::permissive());

    let session = open_session(&app).await;
    fill(&app, &session, &VALID).await;

    let uri = format!("/v1/signup/sessions/{}/submit", session);
    let (status, json) = send(&app, "POST", &uri, None).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "password rejected by provider policy");
}

#[tokio::test]
async fn test_delete_session() {
    let app = create_test_app();
    let session = open_session(&app).await;
    let uri = format!("/v1/signup/sessions/{}", session);

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_check() {
    let app = create_test_app();

    let (status, _) = send(
        &app,
        "POST",
        "/v1/login/validate",
        Some(json!({ "email": "ana@x.com", "passphrase": "204857" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(
        &app,
        "POST",
        "/v1/login/validate",
        Some(json!({ "email": "ana@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "MissingFields");
}

#[tokio::test]
async fn test_password_reset() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "POST",
        "/v1/password-reset",
        Some(json!({ "email": "ana@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().contains("ana@x.com"));

    let (status, json) = send(&app, "POST", "/v1/password-reset", Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "MissingEmail");

    let (status, json) = send(
        &app,
        "POST",
        "/v1/password-reset",
        Some(json!({ "email": "ana@x" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "InvalidEmailFormat");
}

#[tokio::test]
async fn test_submit_rate_limit_is_per_session() {
    let state = AppState::new(MemoryAccountProvider::default());
    let app = create_router_with_rate_limit(state, RateLimitState::new(1, 100));
    let first = open_session(&app).await;
    let second = open_session(&app).await;
    let uri = format!("/v1/signup/sessions/{}/submit", first);

    let (status, _) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, json) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["code"], "RATE_LIMIT_EXCEEDED");

    // Another session keeps its own quota.
    let uri = format!("/v1/signup/sessions/{}/submit", second);
    let (status, _) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Unlimited routes keep working.
    let (status, _) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_session_opening_uses_global_limit() {
    let state = AppState::new(MemoryAccountProvider::default());
    let app = create_router_with_rate_limit(state, RateLimitState::new(100, 1));
    open_session(&app).await;

    let (status, json) = send(&app, "POST", "/v1/signup/sessions", None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["code"], "RATE_LIMIT_EXCEEDED");

    let (status, _) = send(
        &app,
        "POST",
        "/v1/password-reset",
        Some(json!({ "email": "ana@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_expired_session_is_not_found() {
    let sessions = SessionRegistry::with_limits(Duration::ZERO, 100);
    let state = AppState::with_registry(MemoryAccountProvider::default(), sessions);
    let app = create_router_with_rate_limit(state, RateLimitState::permissive());
    let session = open_session(&app).await;

    let (status, json) = send(&app, "GET", &format!("/v1/signup/sessions/{}", session), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "SESSION_NOT_FOUND");

    let uri = format!("/v1/signup/sessions/{}/submit", session);
    let (status, _) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_cap() {
    let sessions = SessionRegistry::with_limits(Duration::from_secs(60), 1);
    let state = AppState::with_registry(MemoryAccountProvider::default(), sessions);
    let app = create_router_with_rate_limit(state, RateLimitState::permissive());
    let session = open_session(&app).await;

    let (status, json) = send(&app, "POST", "/v1/signup/sessions", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "TOO_MANY_SESSIONS");

    // Closing a session frees its slot.
    let (status, _) = send(&app, "DELETE", &format!("/v1/signup/sessions/{}", session), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    open_session(&app).await;
}

#[tokio::test]
async fn test_default_router() {
    let app = create_router(AppState::new(MemoryAccountProvider::default()));

    let (status, _) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}
