//! Error types for the server.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use edubridge_portal::PortalError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Server error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// No session token on the request.
    #[error("No token specified!")]
    MissingToken,

    /// Token is unknown or its session expired.
    #[error("Invalid token!")]
    InvalidToken,

    /// Session is live but the portal logged the handle out.
    #[error("You first have to log in!")]
    NotLoggedIn,

    /// The portal rejected the credentials.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The portal has no data for the request.
    #[error("{0}")]
    NotFound(String),

    /// Some message recipients do not exist.
    #[error("Some of the account ids you provided are invalid: {}", format_ids(.0))]
    InvalidRecipient(Vec<i64>),

    /// Upload without a file.
    #[error("No file sent!")]
    NoFile,

    /// Upload larger than the configured limit.
    #[error("File too large")]
    PayloadTooLarge,

    /// Bad request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// The portal failed to answer.
    #[error("Portal error: {0}")]
    Portal(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn format_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<PortalError> for ServerError {
    fn from(e: PortalError) -> Self {
        match e {
            PortalError::BadCredentials => ServerError::InvalidCredentials,
            PortalError::MissingData(msg) => ServerError::NotFound(msg),
            PortalError::NotLoggedIn => ServerError::NotLoggedIn,
            PortalError::InvalidRequest(msg) => ServerError::BadRequest(msg),
            PortalError::Transport(msg) => ServerError::Portal(msg),
            PortalError::Fixture(msg) => ServerError::Internal(msg),
        }
    }
}

impl ServerError {
    /// HTTP status and stable error code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ServerError::MissingToken => (StatusCode::BAD_REQUEST, "missing_token"),
            ServerError::InvalidToken => (StatusCode::BAD_REQUEST, "invalid_token"),
            ServerError::NotLoggedIn => (StatusCode::BAD_REQUEST, "not_logged_in"),
            ServerError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ServerError::InvalidRecipient(_) => (StatusCode::BAD_REQUEST, "invalid_recipient"),
            ServerError::NoFile => (StatusCode::BAD_REQUEST, "no_file"),
            ServerError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ServerError::RateLimitExceeded => {
                (StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded")
            }
            ServerError::Portal(_) => (StatusCode::BAD_GATEWAY, "portal_error"),
            ServerError::Internal(_) | ServerError::Serialization(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
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

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = %status, code, error = %message, "Server error");
        } else {
            tracing::warn!(status = %status, code, error = %message, "Client error");
        }

        let body = ErrorResponse {
            code: code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
