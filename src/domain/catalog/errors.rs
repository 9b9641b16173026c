//! Errors for back-office catalog maintenance.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Failure while listing or editing catalog records.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Slug '{0}' is already taken")]
    DuplicateSlug(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl CatalogError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CatalogError::NotFound { .. } => ErrorCode::NotFound,
            CatalogError::Validation(_) => ErrorCode::ValidationFailed,
            CatalogError::DuplicateSlug(_) => ErrorCode::DuplicateSlug,
            CatalogError::Conflict(_) => ErrorCode::AlreadyExists,
            CatalogError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for CatalogError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::DuplicateSlug => CatalogError::DuplicateSlug(err.message),
            ErrorCode::AlreadyExists | ErrorCode::DuplicateEmail => CatalogError::Conflict(err.message),
            ErrorCode::ValidationFailed => {
                let field = err.details.get("field").cloned().unwrap_or_default();
                CatalogError::Validation(ValidationError::invalid_format(field, err.message))
            }
            code if err.is_not_found() => CatalogError::NotFound {
                entity: "record",
                id: format!("({})", code),
            },
            _ => CatalogError::Infrastructure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity() {
        let err = CatalogError::not_found("Speaker", 12);
        assert_eq!(err.to_string(), "Speaker 12 not found");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[test]
    fn duplicate_slug_maps_from_domain_error() {
        let err: CatalogError = DomainError::new(ErrorCode::DuplicateSlug, "cardio").into();
        assert!(matches!(err, CatalogError::DuplicateSlug(s) if s == "cardio"));
    }

    #[test]
    fn database_errors_become_infrastructure() {
        let err: CatalogError = DomainError::database("connection reset").into();
        assert!(matches!(err, CatalogError::Infrastructure(_)));
    }
}
