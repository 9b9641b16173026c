//! LoginHandler - exchanges credentials for an access token.

use std::sync::Arc;

use crate::domain::foundation::{AuthError, Timestamp};
use crate::domain::user::{normalize_email, User};
use crate::ports::{PasswordHasher, TokenIssuer, UserRepository};

#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub token: String,
    pub expires_at: Timestamp,
    pub user: User,
}

pub struct LoginHandler {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
}

impl LoginHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    pub async fn handle(&self, cmd: LoginCommand) -> Result<LoginResult, AuthError> {
        let email = normalize_email(&cmd.email);
        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(|e| AuthError::service_unavailable(e.to_string()))?;

        let user = match user {
            Some(user) if self.hasher.verify(&cmd.password, &user.password_hash) => user,
            _ => {
                tracing::info!("Failed login attempt");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let issued = self.tokens.issue(&user).await?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginResult {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        })
    }
}
