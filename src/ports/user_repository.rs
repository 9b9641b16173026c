//! User repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Page, PageRequest, Role, RoleSet, Timestamp, UserId};
use crate::domain::user::{NewUser, User, UserFields};

/// Back-office user search.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    /// Matches first name, last name or email.
    pub search: Option<String>,
    pub role: Option<Role>,
    pub page: PageRequest,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError>;

    /// Lookup by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// # Errors
    ///
    /// - `DuplicateEmail` when the email is taken
    async fn create(&self, user: &NewUser) -> Result<User, DomainError>;

    /// Overwrites profile fields, and the hash when one is given.
    ///
    /// # Errors
    ///
    /// - `UserNotFound`, `DuplicateEmail`
    async fn update(
        &self,
        id: UserId,
        fields: &UserFields,
        password_hash: Option<&str>,
    ) -> Result<User, DomainError>;

    async fn set_roles(&self, id: UserId, roles: &RoleSet) -> Result<(), DomainError>;

    /// `None` marks the email as unconfirmed.
    async fn set_email_verified_at(&self, id: UserId, at: Option<Timestamp>) -> Result<(), DomainError>;

    async fn delete(&self, id: UserId) -> Result<(), DomainError>;

    async fn list(&self, query: &UserQuery) -> Result<Page<User>, DomainError>;

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, DomainError>;
}
