//! Row decoding helpers shared by the PostgreSQL repositories.

use std::fmt::Display;
use std::str::FromStr;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Wraps a sqlx failure with the operation that produced it.
pub(super) fn db_error(action: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", action, e))
}

/// Maps a unique-constraint violation to `code`, anything else to a database error.
pub(super) fn unique_violation(
    action: &'static str,
    constraint: &'static str,
    code: ErrorCode,
    message: String,
) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.constraint() == Some(constraint) {
                return DomainError::new(code, message);
            }
        }
        db_error(action)(e)
    }
}

/// Parses a stored enum column.
pub(super) fn parse_column<T>(column: &'static str, raw: &str) -> Result<T, DomainError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse().map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid {} value '{}': {}", column, raw, e),
        )
    })
}

/// `%needle%` for ILIKE filters; `None` when there is nothing to match.
pub(super) fn like_pattern(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")))
}

pub(super) fn to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}
