//! # ApiError
//!
//! Maps `DomainError` onto HTTP. The JSON body is always
//! `{"code": "...", "message": "..."}`; clients match on `code`, never on the message.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::DomainError;
use tracing::error;

/// Stable, machine-readable identifiers.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const CONFLICT: &str = "CONFLICT";
    pub const STORE_ERROR: &str = "STORE_ERROR";
}

#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl ApiError {
    pub fn error_code(&self) -> &'static str {
        match &self.0 {
            DomainError::Validation(_) => error_code::VALIDATION_FAILED,
            DomainError::NotFound { .. } => error_code::NOT_FOUND,
            DomainError::Conflict(_) => error_code::CONFLICT,
            DomainError::Store(_) => error_code::STORE_ERROR,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(DomainError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self.0 {
            // the cause stays in the log; callers get an opaque message
            DomainError::Store(cause) => {
                error!(error = %format!("{cause:#}"), "record store failure");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = serde_json::json!({
            "code": self.error_code(),
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}
