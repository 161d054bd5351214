//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden - valid credentials but insufficient permissions.
    #[error("forbidden")]
    Forbidden,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - malformed input, rejected before any mutation.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The entity exists but is in a state that forbids the operation
    /// (e.g. checkout on an empty cart, cancel on the free plan).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Concurrent mutation of the same aggregate. Retryable, but the caller
    /// must re-fetch state first rather than resend the same command.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string(), None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::InvalidState(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_state",
                msg.clone(),
                None,
            ),
            Self::Conflict(msg) => (
                StatusCode::CONFLICT,
                "conflict",
                msg.clone(),
                Some(serde_json::json!({
                    "retryable": true,
                    "hint": "re-fetch current state before retrying"
                })),
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<aquafarm_store::StoreError> for ApiError {
    fn from(err: aquafarm_store::StoreError) -> Self {
        match err {
            aquafarm_store::StoreError::NotFound => Self::NotFound("record not found".into()),
            aquafarm_store::StoreError::VersionConflict { expected, found } => Self::Conflict(
                format!("concurrent update detected (expected version {expected}, found {found})"),
            ),
            aquafarm_store::StoreError::Database(msg)
            | aquafarm_store::StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}
