use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use super::engine_error::EngineError;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    InternalServerError(String),
    BadRequest(String),
    NotFound(String),
    /// A provider behind the engine failed; the client may retry.
    UpstreamFailure(String),
    /// Microphone permission problem; retrying without user action is futile.
    DeviceDenied(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, "Bad request")
            }
            AppError::NotFound(msg) => {
                tracing::warn!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, "Resource not found")
            }
            AppError::UpstreamFailure(msg) => {
                tracing::error!("Upstream provider failure: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Provider request failed, please retry",
                )
            }
            AppError::DeviceDenied(msg) => {
                tracing::warn!("Device permission denied: {}", msg);
                (
                    StatusCode::FORBIDDEN,
                    "Microphone access denied; enable it and start a new recording",
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InternalServerError(msg) => write!(f, "Internal server error: {msg}"),
            AppError::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            AppError::NotFound(msg) => write!(f, "Not found: {msg}"),
            AppError::UpstreamFailure(msg) => write!(f, "Upstream failure: {msg}"),
            AppError::DeviceDenied(msg) => write!(f, "Device denied: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match &err {
            EngineError::DevicePermission(msg) => AppError::DeviceDenied(msg.clone()),
            EngineError::InvalidState(msg) => AppError::BadRequest(msg.clone()),
            EngineError::Codec(msg) => AppError::BadRequest(msg.clone()),
            // Transport, timeout, invalid-response and aggregated chain
            // failures present the same retry affordance to the client;
            // the distinct kind is preserved in the log line.
            _ => AppError::UpstreamFailure(err.to_string()),
        }
    }
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
