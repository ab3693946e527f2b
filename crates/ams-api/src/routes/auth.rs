//! # Authentication Routes
//!
//! Routes:
//! - POST /auth/register/ — create a credential record
//! - POST /auth/login/ — verify credentials, mint a trust token
//! - POST /auth/validate/ — verify a token's signature and expiry
//!
//! All three accept only POST; any other verb gets a 405 envelope via the
//! per-route method fallback. Field absence and JSON parse failures are 400
//! envelopes — nothing propagates to the transport layer as a raw rejection.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use ams_auth::RegistrationInput;

use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::state::AppState;

/// Build the auth router. Both trailing-slash and bare forms are mounted.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/auth/register/",
            post(register).fallback(method_not_allowed),
        )
        .route("/auth/register", post(register).fallback(method_not_allowed))
        .route("/auth/login/", post(login).fallback(method_not_allowed))
        .route("/auth/login", post(login).fallback(method_not_allowed))
        .route(
            "/auth/validate/",
            post(validate).fallback(method_not_allowed),
        )
        .route("/auth/validate", post(validate).fallback(method_not_allowed))
}

/// Fallback for non-POST verbs on any auth route.
async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Registration request body. Fields are optional at the wire level so that
/// absent and empty values produce the same `MissingFields` outcome instead
/// of a deserialization error.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub fname: Option<String>,
    #[serde(default)]
    pub lname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Token validation request body.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub token: Option<String>,
}

fn reject(rejection: JsonRejection) -> ApiError {
    ApiError::Validation(format!("invalid JSON body: {rejection}"))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/register/ — register a new account.
///
/// Success returns a generic confirmation only; the created record is not
/// echoed back.
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let Json(req) = payload.map_err(reject)?;

    let input = RegistrationInput {
        first_name: req.fname.unwrap_or_default(),
        last_name: req.lname.unwrap_or_default(),
        email: req.email.unwrap_or_default(),
        username: req.username.unwrap_or_default(),
        password: req.password.unwrap_or_default(),
    };

    state.registrar.register(&input).await?;
    Ok(Envelope::success(json!("User registered successfully")))
}

/// POST /auth/login/ — verify credentials and mint a trust token.
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let Json(req) = payload.map_err(reject)?;

    let token = state
        .issuer
        .login(
            req.username.as_deref().unwrap_or_default(),
            req.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Envelope::success(json!({ "token": token })))
}

/// POST /auth/validate/ — validate a trust token and return its claims.
async fn validate(
    State(state): State<AppState>,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let Json(req) = payload.map_err(reject)?;

    let claims = state.tokens.validate(req.token.as_deref().unwrap_or_default())?;

    Ok(Envelope::success(json!({
        "user_id": claims.sub,
        "username": claims.username,
        "expires_at": claims.exp,
    })))
}
