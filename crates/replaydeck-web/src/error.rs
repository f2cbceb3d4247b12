//! Mapping of core errors to HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use replaydeck_core::CoreError;
use tracing::{error, warn};

/// Error returned by every API handler
#[derive(Debug)]
pub enum ApiError {
    Core(CoreError),
    /// Blocking task panicked or was cancelled
    Task(tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Core(CoreError::AccessDenied { .. }) => StatusCode::FORBIDDEN,
            ApiError::Core(CoreError::InvalidPath { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Core(e) if e.is_decode_failure() => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        ApiError::Core(e)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Task(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Core(e) => e.to_string(),
            ApiError::Task(_) => "Internal server error".to_string(),
        };

        if status.is_server_error() {
            error!(error = ?self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %message, "Request rejected");
        }

        let body = Json(serde_json::json!({
            "error": message
        }));
        (status, body).into_response()
    }
}
