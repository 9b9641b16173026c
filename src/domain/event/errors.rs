//! Errors for the public event pages and event maintenance.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

#[derive(Debug, Clone, Error)]
pub enum EventError {
    #[error("Event '{0}' not found")]
    NotFound(String),

    #[error("Для просмотра мероприятия необходимо зарегистрироваться")]
    NotRegistered,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Slug '{0}' is already taken")]
    DuplicateSlug(String),

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl EventError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EventError::NotFound(_) => ErrorCode::EventNotFound,
            EventError::NotRegistered => ErrorCode::Forbidden,
            EventError::Validation(_) => ErrorCode::ValidationFailed,
            EventError::DuplicateSlug(_) => ErrorCode::DuplicateSlug,
            EventError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for EventError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::DuplicateSlug => EventError::DuplicateSlug(err.message),
            ErrorCode::EventNotFound => EventError::NotFound(err.message),
            _ => EventError::Infrastructure(err.to_string()),
        }
    }
}
