use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::contact::ContactError;
use crate::resume::ResumeError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Content unavailable: {0}")]
    ContentUnavailable(String),

    #[error("Resume error: {0}")]
    Resume(#[from] ResumeError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ContactError> for AppError {
    fn from(e: ContactError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::ContentUnavailable(msg) => {
                tracing::warn!("Content unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "CONTENT_UNAVAILABLE",
                    "Content is not available yet".to_string(),
                )
            }
            AppError::Resume(e) => {
                tracing::error!("Resume error: {e}");
                let code = match e {
                    ResumeError::Capability(_) => "GENERATOR_UNAVAILABLE",
                    _ => "RESUME_ERROR",
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    code,
                    e.user_message().to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
