// src/error.rs

use std::collections::BTreeMap;
use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::flow::TransitionError;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 422 Unprocessable Entity, one message per form field
    Validation(BTreeMap<String, String>),

    // 401 Unauthorized (bad token, failed sign-in, wrong module password)
    AuthError(String),

    // 403 Forbidden (step not unlocked yet)
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (action not valid in the current step)
    Conflict(String),

    // 502 Bad Gateway (remote assessment API failed or unreachable)
    Upstream(String),
}

impl AppError {
    /// Replaces the message of an upstream failure with a page-specific one.
    pub fn upstream_context(self, message: &str) -> Self {
        match self {
            AppError::Upstream(_) => AppError::Upstream(message.to_string()),
            other => other,
        }
    }
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
        let (status, error_message, fields) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                    None,
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Validation(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Please fix the errors before submitting".to_string(),
                Some(fields),
            ),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg, None),
        };

        let body = match fields {
            Some(fields) => Json(json!({ "error": error_message, "fields": fields })),
            None => Json(json!({ "error": error_message })),
        };

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on session storage queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

/// Transport failures never reach the user verbatim.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("Assessment API request failed: {}", err);
        AppError::Upstream("Failed to reach the assessment service".to_string())
    }
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::NotUnlocked => AppError::Forbidden(err.to_string()),
            TransitionError::InvalidStep { .. }
            | TransitionError::NoGuidelines
            | TransitionError::ConfirmationRequired => AppError::Conflict(err.to_string()),
        }
    }
}
