//! # Uniform Response Envelope
//!
//! Every auth endpoint responds with the same JSON envelope:
//! `{isSuccess, data, errorMessage, status}`. The real HTTP status code
//! mirrors the envelope's `status` field; the field stays in the body for
//! clients that only read the payload.

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

/// The uniform response body shared by success and failure responses.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub is_success: bool,
    pub data: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub status: u16,
}

impl Envelope {
    /// A 200 envelope wrapping the given payload.
    pub fn success(data: serde_json::Value) -> (StatusCode, Json<Envelope>) {
        (
            StatusCode::OK,
            Json(Envelope {
                is_success: true,
                data: Some(data),
                error_message: None,
                status: StatusCode::OK.as_u16(),
            }),
        )
    }

    /// A failure envelope with the given status and message.
    pub fn failure(status: StatusCode, message: String) -> (StatusCode, Json<Envelope>) {
        (
            status,
            Json(Envelope {
                is_success: false,
                data: None,
                error_message: Some(message),
                status: status.as_u16(),
            }),
        )
    }
}
