//! # Error Handling
//!
//! This module defines the error taxonomy for the drill server and how each
//! category is converted to an HTTP response.
//!
//! ## Error Categories:
//! - **Validation**: the client skipped a step or sent unusable input
//!   (no sound selected yet, no audio attached) → 400
//! - **NotFound**: the requested sound has no dataset entry → 404
//! - **Config**: the server is missing its transcription credential → 500
//! - **Gateway**: the speech-to-text provider failed or timed out; the
//!   provider's own message is passed through unmodified → 502
//! - **Internal**: anything else that went wrong server-side → 500
//!
//! ## Wire Contract:
//! Every error renders as `{"error": "<message>"}`. Errors are never
//! retried and never fatal: the server keeps serving after any single
//! request fails.

use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

/// Custom error type covering every failure a request can hit.
///
/// ## Usage Example:
/// ```rust
/// return Err(AppError::Validation("No audio file provided".to_string()));
/// ```
#[derive(Debug)]
pub enum AppError {
    /// Client skipped a required step or sent missing/empty input
    Validation(String),

    /// Requested phoneme symbol has no dataset entry
    NotFound(String),

    /// Server-side configuration problem (missing API credential)
    Config(String),

    /// The transcription provider failed; carries the provider's message
    Gateway(String),

    /// Any other server-side failure
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Gateway(msg) => write!(f, "Transcription gateway error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

/// Conversion of errors into HTTP responses.
///
/// ## HTTP Status Code Mapping:
/// - Validation → 400 (Bad Request)
/// - NotFound → 404 (Not Found)
/// - Config/Internal → 500 (Internal Server Error)
/// - Gateway → 502 (Bad Gateway)
///
/// The body carries only the message, matching what clients of this API
/// already parse:
/// ```json
/// {"error": "No letter selected"}
/// ```
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, message) = match self {
            AppError::Validation(msg) => (actix_web::http::StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (actix_web::http::StatusCode::NOT_FOUND, msg),
            AppError::Config(msg) => (actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Gateway(msg) => (actix_web::http::StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(msg) => (actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        HttpResponse::build(status).json(json!({ "error": message }))
    }
}

/// Startup helpers use anyhow; anything that leaks into a request path
/// becomes an internal error.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Malformed JSON from a client is the client's fault.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON parsing error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Shorthand for `Result<T, AppError>`.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            AppError::Validation("x".into()).error_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".into()).error_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Config("x".into()).error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Gateway("x".into()).error_response().status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_display_includes_message() {
        let err = AppError::Gateway("provider unavailable".into());
        assert!(err.to_string().contains("provider unavailable"));
    }
}
