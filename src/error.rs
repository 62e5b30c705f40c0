//! Error types for the REST API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::gex::GexError;


/// API error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code.
    pub code: String,
}

/// API error types.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Dataset not found.
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Uploaded payload is not valid JSON.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Uploaded payload matches no known schema.
    #[error("Unrecognized payload format")]
    UnrecognizedFormat,

    /// Uploaded payload has no usable records.
    #[error("Empty dataset: no usable option records")]
    EmptyDataset,

    /// Internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::DatasetNotFound(_) => (StatusCode::NOT_FOUND, "DATASET_NOT_FOUND"),
            ApiError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ApiError::Parse(_) => (StatusCode::BAD_REQUEST, "PARSE_ERROR"),
            ApiError::UnrecognizedFormat => (StatusCode::BAD_REQUEST, "UNRECOGNIZED_FORMAT"),
            ApiError::EmptyDataset => (StatusCode::BAD_REQUEST, "EMPTY_DATASET"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<GexError> for ApiError {
    fn from(err: GexError) -> Self {
        match err {
            GexError::Parse(e) => ApiError::Parse(e.to_string()),
            GexError::UnrecognizedFormat => ApiError::UnrecognizedFormat,
            GexError::EmptyDataset => ApiError::EmptyDataset,
            e @ (GexError::InvalidWindow { .. }
            | GexError::InvalidLevels(_)
            | GexError::TooManyLevels { .. }) => {
                ApiError::InvalidRequest(e.to_string())
            }
        }
    }
}
