//! Access grant repository port.
//!
//! One row per (event, user) pair. Writers must honor that uniqueness.

use async_trait::async_trait;

use crate::domain::access::AccessGrant;
use crate::domain::foundation::{DomainError, EventId, Timestamp, UserId};

#[async_trait]
pub trait AccessGrantRepository: Send + Sync {
    async fn find(&self, event_id: EventId, user_id: UserId) -> Result<Option<AccessGrant>, DomainError>;

    /// Whether an existing grant currently lets the user in.
    async fn has_access(&self, event_id: EventId, user_id: UserId, now: Timestamp) -> Result<bool, DomainError> {
        Ok(self
            .find(event_id, user_id)
            .await?
            .map_or(false, |grant| grant.grants_access(now)))
    }

    /// Inserts the grant unless the pair already has one. Returns whether a
    /// row was written.
    async fn attach(&self, grant: &AccessGrant) -> Result<bool, DomainError>;

    /// Inserts or overwrites the pair's grant.
    async fn upsert(&self, grant: &AccessGrant) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `AccessGrantNotFound` when the pair has no grant
    async fn update(&self, grant: &AccessGrant) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `AccessGrantNotFound` when the pair has no grant
    async fn delete(&self, event_id: EventId, user_id: UserId) -> Result<(), DomainError>;

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<AccessGrant>, DomainError>;

    /// Number of active grants for the event.
    async fn count_active(&self, event_id: EventId) -> Result<i64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_grant_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn AccessGrantRepository) {}
    }
}
