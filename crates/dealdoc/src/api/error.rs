//! HTTP error mapping.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::DealdocError;
use crate::types::ExtractionFailure;

use super::types::ErrorResponse;

/// Error returned by API handlers.
///
/// - 400: malformed JSON, missing fields or an undecodable base64 payload
/// - 405: wrong method
/// - 422: the document itself could not be extracted
/// - 500: unexpected internal or storage failures
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Transport-level problem with the request (400).
    pub fn validation(err: DealdocError) -> Self {
        match err {
            DealdocError::Validation { message, .. } => Self::bad_request(message),
            other => Self::bad_request(other.to_string()),
        }
    }

    /// Unexpected server-side failure (500). Detail is logged, not returned.
    pub fn internal(err: DealdocError) -> Self {
        tracing::error!(error = ?err, "Internal error while handling request");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "An unexpected error occurred while processing the document. Please try again.",
        )
    }

    /// Failed extraction: 422 for problems with the document, 500 otherwise.
    pub fn from_failure(failure: &ExtractionFailure) -> Self {
        let status = if failure.kind.is_client_error() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, failure.reason.clone())
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed. Use POST.")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            success: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
