use crate::import::ImportError;
use crate::library::LibraryError;
use crate::storage::StorageError;
use crate::streaming::{RangeNotSatisfiable, StreamError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found music track")]
    NotFound,
    #[error(transparent)]
    RangeNotSatisfiable(#[from] RangeNotSatisfiable),
    #[error("{0}")]
    BadRequest(String),
    #[error("Access denied for host: {0}")]
    Forbidden(String),
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),
    #[error("Import error: {0}")]
    Import(#[from] ImportError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StreamError> for ApiError {
    fn from(e: StreamError) -> Self {
        match e {
            StreamError::RangeNotSatisfiable(e) => ApiError::RangeNotSatisfiable(e),
            StreamError::Io(e) => ApiError::Io(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
            ApiError::RangeNotSatisfiable(e) => e.into_response(),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            ApiError::Forbidden(_) => (
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({ "detail": self.to_string() })),
            )
                .into_response(),
            ApiError::Library(_) | ApiError::Import(_) | ApiError::Storage(_) | ApiError::Io(_) => {
                error!("Request failed: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
