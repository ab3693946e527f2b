//! # API Error Type
//!
//! The single translation point from the domain error taxonomy to the
//! uniform response envelope. No domain error propagates past a handler as
//! an unhandled fault; internal error details are logged but never echoed
//! to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use ams_auth::{AuthError, RegistrationError, TokenError};

use crate::envelope::Envelope;

/// Application-level error that renders as a failure envelope.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed input (400).
    #[error("{0}")]
    Validation(String),

    /// Uniqueness violation on registration (400).
    #[error("{0}")]
    Conflict(String),

    /// Bad credentials or a bad/expired token (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Wrong HTTP verb on an auth route (405).
    #[error("only POST method allowed")]
    MethodNotAllowed,

    /// Unexpected persistence or signing failure (500). The message is
    /// logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Never expose internal error details to clients.
        let message = match &self {
            Self::Internal(_) => {
                tracing::error!(error = %self, "internal server error");
                "server error".to_string()
            }
            other => other.to_string(),
        };

        Envelope::failure(status, message).into_response()
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::MissingFields(_) => Self::Validation(err.to_string()),
            RegistrationError::DuplicateUsername
            | RegistrationError::DuplicateEmail
            | RegistrationError::StoreConflict => Self::Conflict(err.to_string()),
            RegistrationError::Store(_) | RegistrationError::Hasher(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingFields(_) => Self::Validation(err.to_string()),
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::Store(_) | AuthError::Token(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Missing => Self::Validation(err.to_string()),
            TokenError::Expired | TokenError::Malformed => Self::Unauthorized(err.to_string()),
            TokenError::Signing(_) => Self::Internal(err.to_string()),
        }
    }
}
