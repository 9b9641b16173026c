//! Errors for account management.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

#[derive(Debug, Clone, Error)]
pub enum UserError {
    #[error("Пользователь не найден")]
    NotFound,

    #[error("Пользователь с таким email уже существует")]
    DuplicateEmail,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Недостаточно прав")]
    Forbidden,

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl UserError {
    pub fn code(&self) -> ErrorCode {
        match self {
            UserError::NotFound => ErrorCode::UserNotFound,
            UserError::DuplicateEmail => ErrorCode::DuplicateEmail,
            UserError::Validation(_) => ErrorCode::ValidationFailed,
            UserError::Forbidden => ErrorCode::Forbidden,
            UserError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for UserError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::DuplicateEmail | ErrorCode::AlreadyExists => UserError::DuplicateEmail,
            ErrorCode::Forbidden => UserError::Forbidden,
            _ if err.is_not_found() => UserError::NotFound,
            _ => UserError::Infrastructure(err.to_string()),
        }
    }
}
