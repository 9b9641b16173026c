//! Token-map session validator for router tests.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, Role, RoleSet, UserId};
use crate::ports::SessionValidator;

/// Tokens not in the map return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.into(), user);
        self
    }

    /// Registers `token` for user `id` holding `roles`.
    pub fn with_roles(self, token: impl Into<String>, id: i64, roles: &[Role]) -> Self {
        let user = AuthenticatedUser::new(
            UserId::new(id),
            format!("user{}@test.example.com", id),
            RoleSet::new(roles.iter().copied()),
        );
        self.with_user(token, user)
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn known_token_maps_to_user() {
        let validator = MockSessionValidator::new().with_roles("t", 5, &[Role::Admin]);
        let user = validator.validate("t").await.unwrap();
        assert_eq!(user.id, UserId::new(5));
        assert!(user.roles.has_role(Role::Admin));
        assert_eq!(validator.validate("other").await.unwrap_err(), AuthError::InvalidToken);
    }
}
