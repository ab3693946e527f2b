//! # Integration Tests for ams-api
//!
//! Drives the assembled router end to end: registration, duplicate
//! detection, login, token validation (including expiry via a simulated
//! clock and signature tampering), method handling, and health probes.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use ams_auth::{MemoryCredentialStore, SigningKey, TokenService, TOKEN_TTL_SECS};
use ams_api::config::AppConfig;
use ams_api::state::AppState;

const TEST_KEY: [u8; 32] = [42u8; 32];

/// Helper: build the test app over an in-memory store with a fixed key.
fn test_app() -> axum::Router {
    let config = AppConfig {
        port: 5111,
        signing_key: SigningKey::from_bytes(TEST_KEY),
        key_ephemeral: false,
    };
    let state = AppState::new(config, Arc::new(MemoryCredentialStore::new()), None);
    ams_api::app(state)
}

/// Helper: a token service sharing the test app's signing key, for crafting
/// tokens with a controlled clock.
fn test_tokens() -> TokenService {
    TokenService::new(&SigningKey::from_bytes(TEST_KEY))
}

/// Helper: POST a JSON body to the given path.
fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Helper: read a response body as the envelope JSON.
async fn envelope(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn register_body() -> Value {
    json!({
        "fname": "A",
        "lname": "B",
        "email": "a@x.com",
        "username": "ab",
        "password": "pw1234"
    })
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health/liveness")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_probe() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health/readiness")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Registration ---------------------------------------------------------------

#[tokio::test]
async fn test_register_success_envelope() {
    let app = test_app();
    let response = app
        .oneshot(post_json("/auth/register/", register_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = envelope(response).await;
    assert_eq!(body["isSuccess"], json!(true));
    assert_eq!(body["data"], json!("User registered successfully"));
    assert_eq!(body["errorMessage"], json!(null));
    assert_eq!(body["status"], json!(200));
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = test_app();
    let first = app
        .clone()
        .oneshot(post_json("/auth/register/", register_body()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    // Same payload again — username collides first.
    let second = app
        .oneshot(post_json("/auth/register/", register_body()))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body = envelope(second).await;
    assert_eq!(body["isSuccess"], json!(false));
    assert_eq!(body["errorMessage"], json!("username already exists"));
    assert_eq!(body["status"], json!(400));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = test_app();
    app.clone()
        .oneshot(post_json("/auth/register/", register_body()))
        .await
        .unwrap();

    let mut body = register_body();
    body["username"] = json!("cd");
    let response = app.oneshot(post_json("/auth/register/", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = envelope(response).await;
    assert_eq!(body["errorMessage"], json!("email already exists"));
}

#[tokio::test]
async fn test_register_missing_fields() {
    let app = test_app();
    let response = app
        .oneshot(post_json(
            "/auth/register/",
            json!({"fname": "A", "username": "ab"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = envelope(response).await;
    assert_eq!(body["isSuccess"], json!(false));
    assert_eq!(
        body["errorMessage"],
        json!("required fields missing: lname, email, password")
    );
}

#[tokio::test]
async fn test_register_empty_fields_equal_missing() {
    let app = test_app();
    let mut payload = register_body();
    payload["password"] = json!("");
    let response = app
        .oneshot(post_json("/auth/register/", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = envelope(response).await;
    assert_eq!(
        body["errorMessage"],
        json!("required fields missing: password")
    );
}

#[tokio::test]
async fn test_register_malformed_json() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/register/")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = envelope(response).await;
    assert_eq!(body["isSuccess"], json!(false));
}

#[tokio::test]
async fn test_register_rejects_get() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/register/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = envelope(response).await;
    assert_eq!(body["errorMessage"], json!("only POST method allowed"));
    assert_eq!(body["status"], json!(405));
}

// -- Login ----------------------------------------------------------------------

#[tokio::test]
async fn test_login_returns_token() {
    let app = test_app();
    app.clone()
        .oneshot(post_json("/auth/register/", register_body()))
        .await
        .unwrap();

    let response = app
        .oneshot(post_json(
            "/auth/login/",
            json!({"username": "ab", "password": "pw1234"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = envelope(response).await;
    assert_eq!(body["isSuccess"], json!(true));
    let token = body["data"]["token"].as_str().unwrap();
    assert_eq!(token.split('.').count(), 3, "expected a JWT");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = test_app();
    app.clone()
        .oneshot(post_json("/auth/register/", register_body()))
        .await
        .unwrap();

    let wrong_password = app
        .clone()
        .oneshot(post_json(
            "/auth/login/",
            json!({"username": "ab", "password": "wrong"}),
        ))
        .await
        .unwrap();
    let unknown_user = app
        .oneshot(post_json(
            "/auth/login/",
            json!({"username": "ghost", "password": "pw1234"}),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    let a = envelope(wrong_password).await;
    let b = envelope(unknown_user).await;
    assert_eq!(a["errorMessage"], b["errorMessage"]);
    assert_eq!(a["errorMessage"], json!("invalid username or password"));
}

#[tokio::test]
async fn test_login_missing_fields() {
    let app = test_app();
    let response = app
        .oneshot(post_json("/auth/login/", json!({"username": "ab"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = envelope(response).await;
    assert_eq!(
        body["errorMessage"],
        json!("required fields missing: password")
    );
}

#[tokio::test]
async fn test_login_rejects_get() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/login/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// -- Token validation -------------------------------------------------------------

#[tokio::test]
async fn test_validate_fresh_token() {
    let app = test_app();
    app.clone()
        .oneshot(post_json("/auth/register/", register_body()))
        .await
        .unwrap();

    let login = app
        .clone()
        .oneshot(post_json(
            "/auth/login/",
            json!({"username": "ab", "password": "pw1234"}),
        ))
        .await
        .unwrap();
    let token = envelope(login).await["data"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    let before = Utc::now().timestamp();
    let response = app
        .oneshot(post_json("/auth/validate/", json!({"token": token})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = envelope(response).await;
    assert_eq!(body["isSuccess"], json!(true));
    assert_eq!(body["data"]["username"], json!("ab"));
    assert!(body["data"]["user_id"].as_str().is_some());

    // Expiry is issuance + 1 hour (small tolerance for test runtime).
    let expires_at = body["data"]["expires_at"].as_i64().unwrap();
    assert!(expires_at >= before + TOKEN_TTL_SECS - 5);
    assert!(expires_at <= Utc::now().timestamp() + TOKEN_TTL_SECS);
}

#[tokio::test]
async fn test_validate_missing_token() {
    let app = test_app();

    let empty = app
        .clone()
        .oneshot(post_json("/auth/validate/", json!({"token": ""})))
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
    let body = envelope(empty).await;
    assert_eq!(body["errorMessage"], json!("token is required"));

    let absent = app
        .oneshot(post_json("/auth/validate/", json!({})))
        .await
        .unwrap();
    assert_eq!(absent.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_validate_expired_token() {
    let app = test_app();

    // One hour and one second ago — expired by exactly one second.
    let issued = Utc::now() - Duration::seconds(TOKEN_TTL_SECS + 1);
    let token = test_tokens()
        .issue_at(Uuid::new_v4(), "ab", true, issued)
        .unwrap();

    let response = app
        .oneshot(post_json("/auth/validate/", json!({"token": token})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = envelope(response).await;
    assert_eq!(body["errorMessage"], json!("token has expired"));
    assert_eq!(body["status"], json!(401));
}

#[tokio::test]
async fn test_validate_tampered_token() {
    let app = test_app();
    let token = test_tokens()
        .issue_at(Uuid::new_v4(), "ab", true, Utc::now())
        .unwrap();

    // Flip a character in the payload segment.
    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let payload = &mut parts[1];
    let mid = payload.len() / 2;
    let original = payload.as_bytes()[mid];
    let replacement = if original == b'A' { "B" } else { "A" };
    payload.replace_range(mid..mid + 1, replacement);
    let tampered = parts.join(".");

    let response = app
        .oneshot(post_json("/auth/validate/", json!({"token": tampered})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = envelope(response).await;
    assert_eq!(body["errorMessage"], json!("invalid token"));
}

#[tokio::test]
async fn test_validate_garbage_token() {
    let app = test_app();
    let response = app
        .oneshot(post_json("/auth/validate/", json!({"token": "not.a.token"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_validate_rejects_get() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/validate/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// -- Full scenario ----------------------------------------------------------------

#[tokio::test]
async fn test_register_login_validate_scenario() {
    let app = test_app();

    // Register.
    let response = app
        .clone()
        .oneshot(post_json("/auth/register/", register_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Register the same payload again.
    let response = app
        .clone()
        .oneshot(post_json("/auth/register/", register_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Login.
    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/login/",
            json!({"username": "ab", "password": "pw1234"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let token = envelope(response).await["data"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    // Validate immediately — succeeds with the registered username.
    let response = app
        .clone()
        .oneshot(post_json("/auth/validate/", json!({"token": token.clone()})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = envelope(response).await;
    assert_eq!(body["data"]["username"], json!("ab"));

    // One hour and one second later (simulated clock) the same token is
    // expired. The HTTP handler uses the wall clock, so the clock is
    // simulated at the verifier seam with the shared key.
    let claims_now = test_tokens().validate_at(&token, Utc::now());
    assert!(claims_now.is_ok());
    let later = Utc::now() + Duration::seconds(TOKEN_TTL_SECS + 1);
    let expired = test_tokens().validate_at(&token, later).unwrap_err();
    assert_eq!(expired, ams_auth::TokenError::Expired);
}

// -- Metrics ------------------------------------------------------------------------

#[tokio::test]
async fn test_metrics_endpoint_reports_requests() {
    let app = test_app();
    app.clone()
        .oneshot(post_json("/auth/register/", register_body()))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("ams_http_requests_total"));
    assert!(text.contains("ams_signing_key_ephemeral"));
}
