//! Password hashing and access token issuing ports.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, DomainError, Timestamp};
use crate::domain::user::User;

pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// False for a wrong password or an unreadable hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: Timestamp,
}

#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn issue(&self, user: &User) -> Result<IssuedToken, AuthError>;
}
