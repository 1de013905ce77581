// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Failures the comment service reports to its callers.
/// Infrastructure problems are collapsed into `Internal` after being logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentError {
    Internal,
    InvalidQuery,
    ParentNotFound,
    ParentDeleted,
    InvalidId,
    CommentNotFound,
}

impl fmt::Display for CommentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            CommentError::Internal => "something went wrong, try again later",
            CommentError::InvalidQuery => "incorrect query parameters",
            CommentError::ParentNotFound => "specified parent comment ID not found",
            CommentError::ParentDeleted => "specified parent comment is deleted",
            CommentError::InvalidId => "incorrect comment ID",
            CommentError::CommentNotFound => "specified comment doesn't exist",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for CommentError {}

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., reply to a deleted comment)
    Conflict(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Maps service failures onto HTTP statuses.
impl From<CommentError> for AppError {
    fn from(err: CommentError) -> Self {
        let msg = err.to_string();
        match err {
            CommentError::Internal => AppError::InternalServerError(msg),
            CommentError::InvalidQuery | CommentError::InvalidId => AppError::BadRequest(msg),
            CommentError::ParentNotFound | CommentError::CommentNotFound => {
                AppError::NotFound(msg)
            }
            CommentError::ParentDeleted => AppError::Conflict(msg),
        }
    }
}
