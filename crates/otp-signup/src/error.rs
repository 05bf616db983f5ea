//! Error types for the signup service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Signup error types.
#[derive(Debug, Error)]
pub enum SignupError {
    #[error("{0}")]
    Validation(String),

    #[error("Notification dispatch failed: {0}")]
    Dispatch(String),

    #[error("OTP expired or invalid")]
    ExpiredOrMissing,

    #[error("Invalid OTP")]
    CodeMismatch,

    #[error("Device registration storage failed: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SignupError {
    /// HTTP status and stable machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            SignupError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            SignupError::Dispatch(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DISPATCH_ERROR"),
            SignupError::ExpiredOrMissing => (StatusCode::BAD_REQUEST, "EXPIRED_OR_MISSING"),
            SignupError::CodeMismatch => (StatusCode::BAD_REQUEST, "CODE_MISMATCH"),
            SignupError::Persistence(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_ERROR")
            }
            SignupError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Message shown to the caller. Server-side failures get a fixed message
    /// so collaborator details never reach the client.
    pub fn public_message(&self) -> String {
        match self {
            SignupError::Dispatch(_) => "Failed to send OTP".to_string(),
            SignupError::Persistence(_) => "Failed to store device registration".to_string(),
            SignupError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for SignupError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            error!(code, error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: self.public_message(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for SignupError {
    fn from(e: std::io::Error) -> Self {
        SignupError::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for SignupError {
    fn from(e: serde_json::Error) -> Self {
        SignupError::Persistence(format!("JSON serialization error: {}", e))
    }
}

impl From<reqwest::Error> for SignupError {
    fn from(e: reqwest::Error) -> Self {
        SignupError::Dispatch(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_bad_request() {
        for err in [
            SignupError::Validation("Phone number is required".into()),
            SignupError::ExpiredOrMissing,
            SignupError::CodeMismatch,
        ] {
            assert_eq!(err.status_and_code().0, StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = SignupError::Dispatch("connection refused to 10.0.0.7".into());
        assert_eq!(err.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Failed to send OTP");

        let err = SignupError::Persistence("disk full".into());
        assert_eq!(err.public_message(), "Failed to store device registration");

        let err = SignupError::Internal("expected value at line 1".into());
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err = SignupError::Validation("Invalid action".into());
        assert_eq!(err.public_message(), "Invalid action");
    }

    #[test]
    fn test_io_error_maps_to_persistence() {
        let err: SignupError = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert!(matches!(err, SignupError::Persistence(_)));
    }
}
