//! Bearer token checks for the HTTP layer.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Resolves a bearer token to the signed-in user and their roles.
///
/// Bad signatures and malformed tokens give `InvalidToken`; a token past
/// its `exp` gives `TokenExpired`.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// `token` comes without the `Bearer ` prefix.
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
