use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failure taxonomy surfaced at the request boundary.
///
/// Every variant is raised at the point of detection and propagates unchanged
/// to the response; there is no local recovery outside the recurrence worker.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input: bad amount, bad enum value, bad date parts.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Missing/invalid/expired session or bad credentials. Kept uniform so a
    /// login attempt cannot probe which check failed.
    #[error("{0}")]
    Authentication(String),

    /// Authenticated, but the role does not cover the operation.
    #[error("{0}")]
    Authorization(String),

    /// No matching owned resource. Never distinguishes "exists but not
    /// yours" from "does not exist".
    #[error("{0}")]
    NotFound(String),

    /// Duplicate email at signup.
    #[error("{0}")]
    Conflict(String),

    /// Store or infrastructure failure; detail is logged, not returned.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ApiError::Authentication(m) => (StatusCode::UNAUTHORIZED, m.clone()),
            ApiError::Authorization(m) => (StatusCode::FORBIDDEN, m.clone()),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
