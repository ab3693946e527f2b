//! # Database Persistence Layer
//!
//! Postgres-backed credential store via SQLx.
//!
//! The database is **optional**. When `DATABASE_URL` is set, credential
//! records persist to the `credentials` table. When absent, the server runs
//! against the in-memory store (suitable for development and testing; records
//! do not survive restarts).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use ams_auth::{CredentialRecord, CredentialStore, StoreError};

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set — running in-memory only mode. \
                 Credential records will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    // Run embedded migrations.
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Credential store backed by the `credentials` table.
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: Uuid,
    username: String,
    email: String,
    password_digest: String,
    first_name: String,
    last_name: String,
    is_admin: bool,
    is_active: bool,
    is_superuser: bool,
    created_at: DateTime<Utc>,
}

impl From<CredentialRow> for CredentialRecord {
    fn from(row: CredentialRow) -> Self {
        CredentialRecord {
            id: row.id,
            username: row.username,
            email: row.email,
            password_digest: row.password_digest,
            first_name: row.first_name,
            last_name: row.last_name,
            is_admin: row.is_admin,
            is_active: row.is_active,
            is_superuser: row.is_superuser,
            created_at: row.created_at,
        }
    }
}

/// Map an insert failure, surfacing the violated constraint name when the
/// backend reports one.
fn map_store_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::UniqueViolation {
                constraint: db.constraint().map(str::to_string),
            };
        }
    }
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn insert(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO credentials (id, username, email, password_digest, first_name,
             last_name, is_admin, is_active, is_superuser, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(record.id)
        .bind(&record.username)
        .bind(&record.email)
        .bind(&record.password_digest)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(record.is_admin)
        .bind(record.is_active)
        .bind(record.is_superuser)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_store_err)?;

        Ok(())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, username, email, password_digest, first_name, last_name,
             is_admin, is_active, is_superuser, created_at
             FROM credentials WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_store_err)?;

        Ok(row.map(CredentialRecord::from))
    }
}
