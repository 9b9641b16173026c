//! Webhook rejection reasons.

use thiserror::Error;

use crate::domain::foundation::ErrorCode;

/// Why a gateway notification was rejected.
///
/// Verification failures answer with a JSON `{"error": ...}` body; handling
/// failures answer in the gateway's plain-text dialect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    #[error("PayKeeper disabled")]
    Disabled,

    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid IP address")]
    InvalidIp,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Validation failed")]
    ValidationFailed,

    #[error("Error! Missing orderid")]
    MissingOrderId,

    #[error("Error! Payment not found")]
    PaymentNotFound,

    #[error("Error! Internal server error")]
    Internal(String),
}

impl WebhookError {
    pub fn status_code(&self) -> u16 {
        match self {
            WebhookError::Disabled
            | WebhookError::MissingFields
            | WebhookError::ValidationFailed
            | WebhookError::MissingOrderId => 400,
            WebhookError::InvalidIp | WebhookError::InvalidSignature => 403,
            WebhookError::PaymentNotFound => 404,
            WebhookError::Internal(_) => 500,
        }
    }

    /// True for failures raised before the payload is trusted.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::Disabled
                | WebhookError::MissingFields
                | WebhookError::InvalidIp
                | WebhookError::InvalidSignature
                | WebhookError::ValidationFailed
        )
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            WebhookError::InvalidIp | WebhookError::InvalidSignature => ErrorCode::Forbidden,
            WebhookError::PaymentNotFound => ErrorCode::PaymentNotFound,
            WebhookError::Internal(_) => ErrorCode::InternalError,
            _ => ErrorCode::ValidationFailed,
        }
    }
}
