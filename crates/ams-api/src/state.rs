//! # Application State
//!
//! Shared state for the Axum application. The registrar, issuer, and token
//! service are constructed once from the configuration and the chosen
//! credential store; handlers receive cheap clones.

use std::sync::Arc;

use sqlx::PgPool;

use ams_auth::{CredentialHasher, CredentialStore, Registrar, SessionIssuer, TokenService};

use crate::config::AppConfig;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub registrar: Registrar,
    pub issuer: SessionIssuer,
    pub tokens: TokenService,
    /// Present only when `DATABASE_URL` is configured; used by the
    /// readiness probe.
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// Wire the auth services to the given credential store.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn CredentialStore>,
        db_pool: Option<PgPool>,
    ) -> Self {
        let hasher = CredentialHasher::new();
        let tokens = TokenService::new(&config.signing_key);
        Self {
            registrar: Registrar::new(store.clone(), hasher.clone()),
            issuer: SessionIssuer::new(store, hasher, tokens.clone()),
            tokens,
            config,
            db_pool,
        }
    }
}
