//! # Session Issuer
//!
//! Verifies a supplied secret against the stored digest and, on match, mints
//! a signed trust token.
//!
//! Lookup and verification are two explicit steps (fetch-by-username, then
//! constant-time digest verification) rather than a combined conditional
//! fetch. Unknown-username and wrong-password produce the same error, and
//! the miss path burns one hash so it costs roughly the same as a failed
//! verification.

use std::sync::Arc;

use chrono::Utc;

use crate::error::AuthError;
use crate::hasher::CredentialHasher;
use crate::store::CredentialStore;
use crate::token::TokenService;

/// Issues trust tokens for verified credentials.
#[derive(Clone)]
pub struct SessionIssuer {
    store: Arc<dyn CredentialStore>,
    hasher: CredentialHasher,
    tokens: TokenService,
}

impl SessionIssuer {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: CredentialHasher,
        tokens: TokenService,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    /// Verify a username/secret pair and mint a trust token.
    ///
    /// Every failure of the credential pair — unknown username, wrong
    /// secret, deactivated record — reports [`AuthError::InvalidCredentials`]
    /// with an identical message.
    pub async fn login(&self, username: &str, secret: &str) -> Result<String, AuthError> {
        let mut missing = Vec::new();
        if username.trim().is_empty() {
            missing.push("username");
        }
        if secret.is_empty() {
            missing.push("password");
        }
        if !missing.is_empty() {
            return Err(AuthError::MissingFields(missing.join(", ")));
        }

        let record = self
            .store
            .find_by_username(username)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;

        let Some(record) = record else {
            // Burn one hash so the unknown-username path costs roughly the
            // same as a failed verification.
            let _ = self.hasher.hash(secret);
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(secret, &record.password_digest) || !record.is_active {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::debug!(username = %record.username, "issuing session token");
        self.tokens
            .issue_at(record.id, &record.username, record.is_admin, Utc::now())
            .map_err(|e| AuthError::Token(e.to_string()))
    }
}
