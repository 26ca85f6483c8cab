//! # Error Handling
//!
//! Custom error types and their conversion to HTTP responses.
//!
//! Every failure leaving the service goes through [`AppError`], so all error
//! responses share one JSON shape: `{"detail": "<message>"}`. The upload
//! client relies on that shape to build the message it shows the user.

use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

/// Application error categories.
///
/// ## HTTP Status Code Mapping:
/// - `BadRequest` → 400 (missing file, empty file, unsupported type)
/// - `PayloadTooLarge` → 413 (upload over the configured size cap)
/// - `Transcription` → 500 (the inference engine failed or was unreachable)
/// - `Internal` → 500 (anything else on the server side)
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    PayloadTooLarge(String),
    Transcription(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::Transcription(msg) => write!(f, "Transcription error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

/// Conversion of [`AppError`] into the wire error body.
///
/// ## JSON Response Format:
/// ```json
/// {
///   "detail": "File is empty"
/// }
/// ```
///
/// The body carries the bare message without the `Display` prefix; the prefix
/// is for logs, the detail is for users.
impl ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            AppError::BadRequest(_) => actix_web::http::StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => actix_web::http::StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Transcription(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let detail = match self {
            AppError::BadRequest(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::Transcription(msg)
            | AppError::Internal(msg) => msg.clone(),
        };

        HttpResponse::build(self.status_code()).json(json!({
            "detail": detail
        }))
    }
}

/// Shorthand for `Result<T, AppError>`.
pub type AppResult<T> = Result<T, AppError>;
