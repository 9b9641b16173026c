//! Foundation module - shared domain primitives.
//!
//! Identifiers, money, time, roles and the error vocabulary used by every
//! other domain module.

mod auth;
mod errors;
mod ids;
mod money;
mod pagination;
mod role;
mod slug;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{
    CategoryId, DocumentId, EventId, NotificationId, PartnerId, PaymentId, SpeakerId, UserId,
};
pub use money::{AmountInput, Money};
pub use pagination::{Page, PageRequest};
pub use role::{Role, RoleSet};
pub use slug::slugify;
pub use state_machine::StateMachine;
pub use timestamp::{LocalOffset, Timestamp};

/// Trims a field and returns `None` when nothing is left.
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validates a required text field with a maximum length in characters.
pub fn require_text(field: &str, value: Option<&str>, max: usize) -> Result<String, ValidationError> {
    let value = non_empty(value).ok_or_else(|| ValidationError::empty_field(field))?;
    optional_text(field, Some(&value), max).map(|v| v.unwrap_or_default())
}

/// Validates an optional text field with a maximum length in characters.
pub fn optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match non_empty(value) {
        Some(v) => {
            let len = v.chars().count();
            if len > max {
                Err(ValidationError::too_long(field, max, len))
            } else {
                Ok(Some(v))
            }
        }
        None => Ok(None),
    }
}

/// Minimal structural email check: one `@`, non-empty local part, dotted domain.
pub fn validate_email(value: Option<&str>) -> Result<String, ValidationError> {
    let email = require_text("email", value, 255)?;
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(ValidationError::invalid_format("email", "must be a valid email address"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_trims_and_drops_blank() {
        assert_eq!(non_empty(Some("  x ")), Some("x".to_string()));
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn require_text_enforces_presence_and_length() {
        assert!(matches!(
            require_text("city", None, 10),
            Err(ValidationError::EmptyField { .. })
        ));
        assert!(matches!(
            require_text("phone", Some("+7 999 123 45 67 890 12"), 20),
            Err(ValidationError::TooLong { .. })
        ));
        assert_eq!(require_text("city", Some(" Москва "), 255).unwrap(), "Москва");
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let cyrillic = "ж".repeat(20);
        assert!(optional_text("phone", Some(&cyrillic), 20).is_ok());
    }

    #[test]
    fn validate_email_accepts_ordinary_address() {
        assert_eq!(validate_email(Some("doc@clinic.ru")).unwrap(), "doc@clinic.ru");
    }

    #[test]
    fn validate_email_rejects_malformed() {
        for bad in ["doc", "doc@", "@clinic.ru", "doc@clinic", "a b@c.ru", "a@b@c.ru"] {
            assert!(validate_email(Some(bad)).is_err(), "{bad} should be rejected");
        }
    }
}
