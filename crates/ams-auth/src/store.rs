//! # Credential Store Seam
//!
//! The external persistence collaborator, abstracted as a keyed-lookup
//! service. The core never owns the store's transactional machinery — insert
//! atomicity (no partial record on a uniqueness violation) is the backend's
//! guarantee.
//!
//! Two implementations exist: a Postgres store in `ams-api` (production) and
//! [`MemoryCredentialStore`] here (tests, and databaseless deployments).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::StoreError;

/// Constraint name reported for duplicate usernames.
///
/// Matches the Postgres constraint in `migrations/0001_credentials.sql` so
/// the registrar's conflict inspection behaves identically against both
/// backends.
pub const USERNAME_CONSTRAINT: &str = "credentials_username_key";

/// Constraint name reported for duplicate emails.
pub const EMAIL_CONSTRAINT: &str = "credentials_email_key";

/// A stored credential record.
///
/// Created by the registrar, never mutated by this core. The digest is an
/// Argon2id PHC string, never a plaintext secret.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_digest: String,
    pub first_name: String,
    pub last_name: String,
    /// Privilege flag embedded in issued tokens.
    pub is_admin: bool,
    /// Inactive records cannot log in.
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

/// Row-oriented persistence interface for credential records.
///
/// `insert` must be atomic: on a uniqueness violation no partial record may
/// be observable by a concurrent reader.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist a new credential record.
    ///
    /// Returns [`StoreError::UniqueViolation`] when the username or email is
    /// already taken, carrying the violated constraint name when the backend
    /// reports one.
    async fn insert(&self, record: &CredentialRecord) -> Result<(), StoreError>;

    /// Fetch a credential record by exact username match.
    async fn find_by_username(&self, username: &str)
        -> Result<Option<CredentialRecord>, StoreError>;
}

/// In-memory credential store.
///
/// Enforces the same uniqueness constraints as the Postgres schema and
/// reports the same constraint names, so registrar behavior is identical
/// across backends.
#[derive(Default)]
pub struct MemoryCredentialStore {
    records: RwLock<Vec<CredentialRecord>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records. Used by tests to assert "no partial record
    /// was persisted".
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn insert(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        let mut records = self.records.write();
        if records.iter().any(|r| r.username == record.username) {
            return Err(StoreError::UniqueViolation {
                constraint: Some(USERNAME_CONSTRAINT.to_string()),
            });
        }
        if records.iter().any(|r| r.email == record.email) {
            return Err(StoreError::UniqueViolation {
                constraint: Some(EMAIL_CONSTRAINT.to_string()),
            });
        }
        records.push(record.clone());
        Ok(())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .iter()
            .find(|r| r.username == username)
            .cloned())
    }
}

#[cfg(test)]
pub(crate) fn test_record(username: &str, email: &str) -> CredentialRecord {
    CredentialRecord {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: email.to_string(),
        password_digest: "$argon2id$unused".to_string(),
        first_name: "A".to_string(),
        last_name: "B".to_string(),
        is_admin: true,
        is_active: true,
        is_superuser: false,
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_find() {
        let store = MemoryCredentialStore::new();
        let record = test_record("ab", "a@x.com");
        store.insert(&record).await.unwrap();

        let found = store.find_by_username("ab").await.unwrap().unwrap();
        assert_eq!(found.id, record.id);
        assert_eq!(found.email, "a@x.com");
    }

    #[tokio::test]
    async fn find_unknown_username_is_none() {
        let store = MemoryCredentialStore::new();
        assert!(store.find_by_username("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_reports_constraint() {
        let store = MemoryCredentialStore::new();
        store.insert(&test_record("ab", "a@x.com")).await.unwrap();

        let err = store
            .insert(&test_record("ab", "other@x.com"))
            .await
            .unwrap_err();
        match err {
            StoreError::UniqueViolation { constraint } => {
                assert_eq!(constraint.as_deref(), Some(USERNAME_CONSTRAINT));
            }
            other => panic!("expected UniqueViolation, got: {other:?}"),
        }
        // The failed insert left no partial record.
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_reports_constraint() {
        let store = MemoryCredentialStore::new();
        store.insert(&test_record("ab", "a@x.com")).await.unwrap();

        let err = store
            .insert(&test_record("cd", "a@x.com"))
            .await
            .unwrap_err();
        match err {
            StoreError::UniqueViolation { constraint } => {
                assert_eq!(constraint.as_deref(), Some(EMAIL_CONSTRAINT));
            }
            other => panic!("expected UniqueViolation, got: {other:?}"),
        }
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn username_match_is_exact() {
        let store = MemoryCredentialStore::new();
        store.insert(&test_record("ab", "a@x.com")).await.unwrap();
        assert!(store.find_by_username("AB").await.unwrap().is_none());
        assert!(store.find_by_username("ab ").await.unwrap().is_none());
    }
}
