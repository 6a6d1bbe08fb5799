//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and JSON error responses so every
//! endpoint fails the same way. Handlers return `Result<_, AppError>` and use
//! `?` throughout; the `IntoResponse` impl here does the rest.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use locumdesk_core::errors::LocumError;
use serde_json::json;

/// Application error wrapper that provides HTTP status code mapping
///
/// `AppError` wraps domain-specific `LocumError` instances and implements
/// `IntoResponse` to convert them into HTTP responses with appropriate
/// status codes and JSON payloads.
#[derive(Debug)]
pub struct AppError(pub LocumError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map error types to HTTP status codes
        let status = match &self.0 {
            LocumError::NotFound(_) => StatusCode::NOT_FOUND,
            LocumError::Validation(_) => StatusCode::BAD_REQUEST,
            LocumError::Authentication(_) => StatusCode::UNAUTHORIZED,
            LocumError::Authorization(_) => StatusCode::FORBIDDEN,
            LocumError::Conflict(_) => StatusCode::CONFLICT,
            LocumError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LocumError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LocumError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", self.0);
        }

        let message = self.0.to_string();
        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

/// Allows using `?` with functions returning `Result<T, LocumError>`.
impl From<LocumError> for AppError {
    fn from(err: LocumError) -> Self {
        AppError(err)
    }
}

/// Allows using `?` with repository functions returning `Result<T, eyre::Report>`.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(LocumError::Database(err))
    }
}
