//! Error types for the server.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Server error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Session store error.
    #[error(transparent)]
    Session(#[from] crumb_session::Error),

    /// Bad request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ServerError {
    /// HTTP status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        use crumb_session::Error as SessionError;

        match self {
            ServerError::Session(e) => match e {
                SessionError::CookieNotFound => (StatusCode::UNAUTHORIZED, "no_session"),
                SessionError::InvalidSession => (StatusCode::NOT_FOUND, "invalid_session"),
                SessionError::InvalidKey => (StatusCode::NOT_FOUND, "invalid_key"),
                SessionError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
                SessionError::Transport(_) | SessionError::Entropy(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
                }
            },
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.to_string();

        match &self {
            ServerError::Session(e) if e.is_fatal() => {
                tracing::error!(status = %status, code, error = %message, "Fatal session store error");
            }
            _ if status.is_server_error() => {
                tracing::error!(status = %status, code, error = %message, "Server error");
            }
            _ => {
                tracing::warn!(status = %status, code, error = %message, "Client error");
            }
        }

        let body = ErrorResponse {
            code: code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
