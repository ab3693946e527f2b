//! # ams-api — Axum HTTP Surface
//!
//! The HTTP boundary over the `ams-auth` credential core.
//!
//! ## API Surface
//!
//! | Route                 | Module            | Outcome                          |
//! |-----------------------|-------------------|----------------------------------|
//! | `POST /auth/register/`| [`routes::auth`]  | Create a credential record       |
//! | `POST /auth/login/`   | [`routes::auth`]  | Verify credentials, mint a token |
//! | `POST /auth/validate/`| [`routes::auth`]  | Validate a token, return claims  |
//! | `GET /health/*`       | here              | Kubernetes health probes         |
//! | `GET /metrics`        | here              | Prometheus scrape endpoint       |
//!
//! Every auth response is the uniform envelope
//! `{isSuccess, data, errorMessage, status}` — see [`envelope`].
//!
//! ## Middleware stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```
//!
//! Health probes and `/metrics` are mounted outside the API middleware so
//! they stay reachable regardless of auth state.

pub mod config;
pub mod db;
pub mod envelope;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::{Extension, Router};
use chrono::Utc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

pub use crate::error::ApiError;

/// Check if metrics are enabled via the `AMS_METRICS_ENABLED` env var.
/// Defaults to `true` when the variable is absent or set to anything other
/// than `"false"`.
fn metrics_enabled() -> bool {
    std::env::var("AMS_METRICS_ENABLED")
        .map(|v| v.to_lowercase() != "false")
        .unwrap_or(true)
}

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) and `/metrics` are mounted outside the API
/// middleware stack so they remain accessible without a request body.
pub fn app(state: AppState) -> Router {
    let metrics = ApiMetrics::new();
    let metrics_on = metrics_enabled();

    metrics
        .signing_key_ephemeral()
        .set(if state.config.key_ephemeral { 1.0 } else { 0.0 });

    // Body size limit: 64 KiB. Auth payloads are small; anything larger is
    // not a legitimate request.
    let mut api = routes::auth::router().layer(DefaultBodyLimit::max(64 * 1024));

    if metrics_on {
        api = api
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(Extension(metrics.clone()));
    }

    let api = api
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let mut unauthenticated = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    if metrics_on {
        unauthenticated = unauthenticated
            .route("/metrics", axum::routing::get(prometheus_metrics))
            .layer(Extension(metrics));
    }

    let unauthenticated = unauthenticated.with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// GET /metrics — Prometheus metrics scrape endpoint.
async fn prometheus_metrics(Extension(metrics): Extension<ApiMetrics>) -> impl IntoResponse {
    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the application is ready to serve traffic.
///
/// Checks:
/// - The token service can mint and validate a token with the loaded key.
/// - Database connection is healthy (when configured).
///
/// Returns 200 "ready" or 503 with a diagnostic message.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    // Verify the signing key is functional end to end.
    let now = Utc::now();
    let probe = state
        .tokens
        .issue_at(Uuid::nil(), "readiness-probe", false, now)
        .and_then(|token| state.tokens.validate_at(&token, now));
    if probe.is_err() {
        return (StatusCode::SERVICE_UNAVAILABLE, "signing key degraded").into_response();
    }

    // Verify database connection (when configured).
    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("Database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }

    (StatusCode::OK, "ready").into_response()
}
