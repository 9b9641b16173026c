//! Errors for event registration.

use thiserror::Error;

use crate::domain::event::RegistrationBlock;
use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};
use crate::domain::payment::PaymentError;

#[derive(Debug, Clone, Error)]
pub enum RegistrationError {
    #[error("Мероприятие не найдено")]
    EventNotFound,

    #[error("{0}")]
    Blocked(RegistrationBlock),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Пользователь с таким email не найден")]
    UnknownEmail,

    #[error("Пользователь уже существует")]
    UserExists,

    #[error("Ошибка при создании платежа")]
    Payment(String),

    #[error("Ошибка регистрации. Попробуйте позже.")]
    Infrastructure(String),
}

impl RegistrationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RegistrationError::EventNotFound => ErrorCode::EventNotFound,
            RegistrationError::Blocked(_) => ErrorCode::RegistrationUnavailable,
            RegistrationError::Validation(_) => ErrorCode::ValidationFailed,
            RegistrationError::UnknownEmail => ErrorCode::UserNotFound,
            RegistrationError::UserExists => ErrorCode::DuplicateEmail,
            RegistrationError::Payment(_) => ErrorCode::ExternalServiceError,
            RegistrationError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }
}

impl From<DomainError> for RegistrationError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::DuplicateEmail => RegistrationError::UserExists,
            _ => RegistrationError::Infrastructure(err.to_string()),
        }
    }
}

impl From<PaymentError> for RegistrationError {
    fn from(err: PaymentError) -> Self {
        RegistrationError::Payment(err.to_string())
    }
}
