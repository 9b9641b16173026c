//! Errors for payment creation and processing.

use thiserror::Error;

use super::PaymentStatus;
use crate::domain::foundation::{DomainError, ErrorCode};

#[derive(Debug, Clone, Error)]
pub enum PaymentError {
    #[error("Мероприятие не является платным")]
    EventNotPaid,

    #[error("Payment {0} not found")]
    NotFound(String),

    #[error("Event not found")]
    EventNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Недействительный токен")]
    InvalidToken,

    #[error("Платеж не может быть отменен (статус: {0})")]
    NotCancellable(PaymentStatus),

    #[error("Unknown payment status '{0}'")]
    UnknownStatus(String),

    #[error("Cannot move payment from {from} to {to}")]
    InvalidTransition { from: PaymentStatus, to: PaymentStatus },

    #[error("Недостаточно прав")]
    Forbidden,

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl PaymentError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PaymentError::EventNotPaid | PaymentError::UnknownStatus(_) => {
                ErrorCode::ValidationFailed
            }
            PaymentError::NotFound(_) => ErrorCode::PaymentNotFound,
            PaymentError::EventNotFound => ErrorCode::EventNotFound,
            PaymentError::UserNotFound => ErrorCode::UserNotFound,
            PaymentError::InvalidToken | PaymentError::Forbidden => ErrorCode::Forbidden,
            PaymentError::NotCancellable(_) | PaymentError::InvalidTransition { .. } => {
                ErrorCode::InvalidStateTransition
            }
            PaymentError::Gateway(_) => ErrorCode::ExternalServiceError,
            PaymentError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for PaymentError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::PaymentNotFound => PaymentError::NotFound(err.message),
            ErrorCode::ExternalServiceError => PaymentError::Gateway(err.message),
            _ => PaymentError::Infrastructure(err.to_string()),
        }
    }
}
