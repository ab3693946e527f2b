//! # Account Registrar
//!
//! Validates registration input, hashes the secret, and persists a new
//! credential record with default privilege flags. The single insert is the
//! only side effect; atomicity on conflict is the store's guarantee.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{RegistrationError, StoreError};
use crate::hasher::CredentialHasher;
use crate::store::{CredentialRecord, CredentialStore};

/// Raw registration input. All five fields are required and must be
/// non-empty after trimming.
#[derive(Debug, Clone)]
pub struct RegistrationInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

impl RegistrationInput {
    /// Names of required fields that are absent or empty, in wire order.
    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.first_name.trim().is_empty() {
            missing.push("fname");
        }
        if self.last_name.trim().is_empty() {
            missing.push("lname");
        }
        if self.email.trim().is_empty() {
            missing.push("email");
        }
        if self.username.trim().is_empty() {
            missing.push("username");
        }
        if self.password.is_empty() {
            missing.push("password");
        }
        missing
    }
}

/// Registers new accounts against the credential store.
#[derive(Clone)]
pub struct Registrar {
    store: Arc<dyn CredentialStore>,
    hasher: CredentialHasher,
}

impl Registrar {
    pub fn new(store: Arc<dyn CredentialStore>, hasher: CredentialHasher) -> Self {
        Self { store, hasher }
    }

    /// Register a new account.
    ///
    /// On success the caller gets no payload — the record is owned by the
    /// store. Uniqueness conflicts are mapped best-effort to the violated
    /// field by constraint-name inspection; when the field cannot be
    /// determined a generic conflict is reported rather than guessing.
    pub async fn register(&self, input: &RegistrationInput) -> Result<(), RegistrationError> {
        let missing = input.missing_fields();
        if !missing.is_empty() {
            return Err(RegistrationError::MissingFields(missing.join(", ")));
        }

        let digest = self
            .hasher
            .hash(&input.password)
            .map_err(|e| RegistrationError::Hasher(e.to_string()))?;

        let record = CredentialRecord {
            id: Uuid::new_v4(),
            username: input.username.clone(),
            email: input.email.clone(),
            password_digest: digest,
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            // Default flags for self-registered accounts. `is_admin` is the
            // privilege flag embedded in issued tokens.
            is_admin: true,
            is_active: true,
            is_superuser: false,
            created_at: Utc::now(),
        };

        match self.store.insert(&record).await {
            Ok(()) => {
                tracing::info!(username = %record.username, "registered new account");
                Ok(())
            }
            Err(StoreError::UniqueViolation { constraint }) => {
                Err(match constraint.as_deref() {
                    Some(c) if c.to_lowercase().contains("username") => {
                        RegistrationError::DuplicateUsername
                    }
                    Some(c) if c.to_lowercase().contains("email") => {
                        RegistrationError::DuplicateEmail
                    }
                    _ => RegistrationError::StoreConflict,
                })
            }
            Err(e) => Err(RegistrationError::Store(e.to_string())),
        }
    }
}
