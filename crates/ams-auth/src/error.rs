//! # Error Taxonomy
//!
//! Structured errors for the credential core. Each operation returns its own
//! enum so the HTTP boundary can translate every branch into the uniform
//! response envelope without inspecting strings.

use thiserror::Error;

/// Credential hashing failed.
///
/// Argon2 only fails on malformed parameters or salt material, so this is
/// effectively unreachable in normal operation and maps to a 500.
#[derive(Error, Debug)]
#[error("credential hashing failed: {0}")]
pub struct HasherError(pub String);

/// Errors from the credential store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness constraint was violated on insert.
    ///
    /// `constraint` carries the violated constraint name when the backend
    /// reports one; duplicate-field detection is best-effort inspection of
    /// that name.
    #[error("unique constraint violated: {}", .constraint.as_deref().unwrap_or("unknown"))]
    UniqueViolation { constraint: Option<String> },

    /// Any other backend failure (connection, query, decode).
    #[error("credential store failure: {0}")]
    Backend(String),
}

/// Errors from [`crate::Registrar::register`].
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// One or more required fields were absent or empty (400).
    #[error("required fields missing: {0}")]
    MissingFields(String),

    /// The requested username is already taken (400).
    #[error("username already exists")]
    DuplicateUsername,

    /// The requested email is already registered (400).
    #[error("email already exists")]
    DuplicateEmail,

    /// A uniqueness constraint was violated but the field could not be
    /// determined (400).
    #[error("conflicts with an existing credential record")]
    StoreConflict,

    /// Unexpected backing-store failure (500).
    #[error("credential store failure: {0}")]
    Store(String),

    /// Credential hashing failed (500).
    #[error("credential hashing failed: {0}")]
    Hasher(String),
}

/// Errors from [`crate::SessionIssuer::login`].
#[derive(Error, Debug)]
pub enum AuthError {
    /// Username or password absent or empty (400).
    #[error("required fields missing: {0}")]
    MissingFields(String),

    /// Unknown username or wrong password — deliberately the same message
    /// for both so the response does not reveal which half failed (401).
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Unexpected backing-store failure (500).
    #[error("credential store failure: {0}")]
    Store(String),

    /// Token could not be signed (500).
    #[error("token issuance failed: {0}")]
    Token(String),
}

/// Errors from [`crate::TokenService::validate`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    /// No token was supplied (400).
    #[error("token is required")]
    Missing,

    /// The current instant is at or past the `exp` claim (401).
    #[error("token has expired")]
    Expired,

    /// The signature did not verify or the structure could not be parsed.
    /// The two cases are indistinguishable on purpose (401).
    #[error("invalid token")]
    Malformed,

    /// Signing failed during issuance (500).
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// The signing key material could not be parsed.
#[derive(Error, Debug)]
#[error("invalid signing key: {0}")]
pub struct InvalidKey(pub String);
