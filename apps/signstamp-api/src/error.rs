//! Error types for the signstamp server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use signstamp_core::PlacementError;

/// Server error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Compositing error: {0}")]
    Compositing(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{} not found", what),
            ),
            ApiError::Compositing(msg) => {
                // Unexpected toolkit failure, not a user input problem.
                error!("compositing failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "COMPOSITING_ERROR",
                    msg.clone(),
                )
            }
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<PlacementError> for ApiError {
    fn from(err: PlacementError) -> Self {
        match err {
            PlacementError::ParseError(msg) => {
                ApiError::InvalidRequest(format!("Invalid or corrupt PDF: {}", msg))
            }
            PlacementError::DecodeError(msg) => {
                ApiError::InvalidRequest(format!("Invalid signature image: {}", msg))
            }
            PlacementError::CompositingError(msg) => ApiError::Compositing(msg),
        }
    }
}
