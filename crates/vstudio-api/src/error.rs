//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use vstudio_heygen::HeygenError;
use vstudio_models::ModelError;
use vstudio_store::DatabaseError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Validation(#[from] ModelError),

    #[error("HeyGen error: {0}")]
    Upstream(#[from] HeygenError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(HeygenError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) | ApiError::Database(_) | ApiError::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Validation(_) => "bad_request",
            ApiError::Upstream(_) => "upstream_error",
            ApiError::Internal(_) | ApiError::Database(_) | ApiError::Template(_) => {
                "internal_error"
            }
        }
    }

    fn is_internal(&self) -> bool {
        matches!(
            self,
            ApiError::Internal(_) | ApiError::Database(_) | ApiError::Template(_)
        )
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

/// Marks a response produced from an internal failure, so that
/// [`crate::middleware::hide_internal_errors`] can replace its body.
#[derive(Debug, Clone, Copy)]
pub struct InternalErrorMarker;

/// Generic body served in place of internal error details.
pub fn redacted_internal_error() -> Response {
    let body = ErrorResponse {
        error: "An internal error occurred".to_string(),
        code: "internal_error",
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(status = status.as_u16(), "Request failed: {}", self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code(),
        };

        let mut response = (status, Json(body)).into_response();
        if self.is_internal() {
            response.extensions_mut().insert(InternalErrorMarker);
        }
        response
    }
}
