//! Errors for access-grant administration.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

#[derive(Debug, Clone, Error)]
pub enum AccessGrantError {
    #[error("У пользователя уже есть доступ к этому событию")]
    AlreadyGranted,

    #[error("У пользователя нет доступа к этому событию")]
    NotFound,

    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("Event {0} not found")]
    EventNotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Недостаточно прав")]
    Forbidden,

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl AccessGrantError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AccessGrantError::AlreadyGranted => ErrorCode::AlreadyExists,
            AccessGrantError::NotFound => ErrorCode::AccessGrantNotFound,
            AccessGrantError::UserNotFound(_) => ErrorCode::UserNotFound,
            AccessGrantError::EventNotFound(_) => ErrorCode::EventNotFound,
            AccessGrantError::Validation(_) => ErrorCode::ValidationFailed,
            AccessGrantError::Forbidden => ErrorCode::Forbidden,
            AccessGrantError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for AccessGrantError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::AlreadyExists => AccessGrantError::AlreadyGranted,
            ErrorCode::AccessGrantNotFound => AccessGrantError::NotFound,
            _ => AccessGrantError::Infrastructure(err.to_string()),
        }
    }
}
