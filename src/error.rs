//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::engine::RecordError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Auth errors
    Unauthorized,

    // Malformed or out-of-range input; never logged as an error
    Validation(String),

    // Engine started but essential state is not initialized yet
    NotReady,

    // Request exceeded its caller-supplied deadline
    Timeout,

    // Outcome store unavailable or write failed
    Storage(String),

    // Generic errors
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Invalid or missing API key".to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotReady => (StatusCode::SERVICE_UNAVAILABLE, "Engine not ready".to_string()),
            AppError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "Request deadline exceeded".to_string()),
            AppError::Storage(msg) => {
                tracing::error!("Outcome store error: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Outcome store unavailable".to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Validation(msg) => AppError::Validation(msg),
            RecordError::Storage(e) => AppError::Storage(e.to_string()),
        }
    }
}
