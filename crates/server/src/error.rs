// crates/server/src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::jobs::StoreError;

/// Structured JSON error response for API errors
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// API error types that map to HTTP status codes
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or empty required field.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Body is not JSON of the expected shape.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Duplicate job: {0}")]
    DuplicateJob(String),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists(user_id) => ApiError::DuplicateJob(user_id),
            StoreError::NotFound(user_id) => ApiError::JobNotFound(user_id),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            ApiError::Validation(msg) => {
                tracing::warn!(message = %msg, "Validation failed");
                (StatusCode::BAD_REQUEST, ErrorResponse::new(msg.clone()))
            }
            ApiError::InvalidBody(msg) => {
                tracing::warn!(message = %msg, "Invalid request body");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_details("Invalid request body", msg.clone()),
                )
            }
            ApiError::DuplicateJob(user_id) => {
                tracing::warn!(user_id = %user_id, "Duplicate job rejected");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("user_id must be unique"),
                )
            }
            ApiError::JobNotFound(user_id) => {
                tracing::warn!(user_id = %user_id, "Job not found");
                (StatusCode::NOT_FOUND, ErrorResponse::new("Invalid user_id"))
            }
            ApiError::Internal(msg) => {
                tracing::error!(message = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error"),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
