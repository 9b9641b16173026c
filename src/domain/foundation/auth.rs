//! Authentication types for the domain layer.
//!
//! `AuthenticatedUser` is what the HTTP layer hands to handlers after a
//! bearer token has been validated. It carries the roles so that
//! authorization checks need no extra lookup.

use thiserror::Error;

use super::{Role, RoleSet, UserId};

/// User identity extracted from a validated access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub email: String,
    pub roles: RoleSet,
}

impl AuthenticatedUser {
    pub fn new(id: UserId, email: impl Into<String>, roles: RoleSet) -> Self {
        Self {
            id,
            email: email.into(),
            roles,
        }
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.roles.has_any_role(roles)
    }

    /// Fails with `InsufficientPermissions` unless one of `roles` is held.
    pub fn require_any_role(&self, roles: &[Role]) -> Result<(), AuthError> {
        if self.has_any_role(roles) {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermissions)
        }
    }
}

/// Authentication and authorization failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::UserNotFound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new(7), "m@example.com", RoleSet::new([Role::Manager]))
    }

    #[test]
    fn require_any_role_passes_for_held_role() {
        assert!(manager().require_any_role(&Role::ACCESS_MANAGERS).is_ok());
    }

    #[test]
    fn require_any_role_rejects_missing_role() {
        assert_eq!(
            manager().require_any_role(&[Role::Admin]),
            Err(AuthError::InsufficientPermissions)
        );
    }

    #[test]
    fn expired_token_requires_reauthentication() {
        assert!(AuthError::TokenExpired.requires_reauthentication());
        assert!(!AuthError::InsufficientPermissions.requires_reauthentication());
    }
}
