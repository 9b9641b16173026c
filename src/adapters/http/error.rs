//! Error bodies and status mapping shared by every endpoint group.
//!
//! Each endpoint group wraps its domain error in a newtype (`EventApiError`,
//! `PaymentApiError`, ...) whose `IntoResponse` goes through the helpers
//! here, so every failure answers with the same `ErrorResponse` shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ErrorCode, ValidationError};

/// Standard error body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

/// HTTP status for a domain error code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed | ErrorCode::RegistrationUnavailable => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ErrorCode::NotFound
        | ErrorCode::EventNotFound
        | ErrorCode::UserNotFound
        | ErrorCode::PaymentNotFound
        | ErrorCode::AccessGrantNotFound => StatusCode::NOT_FOUND,
        ErrorCode::AlreadyExists
        | ErrorCode::DuplicateEmail
        | ErrorCode::DuplicateSlug
        | ErrorCode::InvalidStateTransition => StatusCode::CONFLICT,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::ExternalServiceError => StatusCode::BAD_GATEWAY,
        ErrorCode::DatabaseError | ErrorCode::CacheError | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// `ErrorResponse` with the status derived from `code`.
pub fn error_response(code: ErrorCode, message: impl Into<String>) -> Response {
    let body = ErrorResponse::new(code.to_string(), message);
    (status_for(code), Json(body)).into_response()
}

/// 422 naming the offending field.
pub fn validation_response(err: &ValidationError) -> Response {
    let body = ErrorResponse::with_details(
        ErrorCode::ValidationFailed.to_string(),
        err.to_string(),
        serde_json::json!({ "field": err.field() }),
    );
    (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
}

/// Logs the cause and answers 500 without leaking it.
pub fn internal_error(cause: &str) -> Response {
    tracing::error!(error = %cause, "Request failed");
    error_response(ErrorCode::InternalError, "Internal server error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_and_blocked_registration_are_422() {
        assert_eq!(status_for(ErrorCode::ValidationFailed), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            status_for(ErrorCode::RegistrationUnavailable),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn missing_records_are_404() {
        for code in [
            ErrorCode::NotFound,
            ErrorCode::EventNotFound,
            ErrorCode::PaymentNotFound,
            ErrorCode::AccessGrantNotFound,
        ] {
            assert_eq!(status_for(code), StatusCode::NOT_FOUND, "{code}");
        }
    }

    #[test]
    fn conflicts_and_gateway_failures() {
        assert_eq!(status_for(ErrorCode::DuplicateSlug), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCode::InvalidStateTransition), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCode::ExternalServiceError), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn error_response_serializes_without_details_when_none() {
        let json = serde_json::to_string(&ErrorResponse::new("NOT_FOUND", "Not found")).unwrap();
        assert!(!json.contains("details"));
    }

    #[test]
    fn validation_response_names_field() {
        let response = validation_response(&ValidationError::empty_field("title"));
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn internal_error_is_500() {
        assert_eq!(internal_error("boom").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
