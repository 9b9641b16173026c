//! Notification repository port. Every call is scoped to one recipient.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, NotificationId, Page, PageRequest, Timestamp, UserId};
use crate::domain::notification::{NewNotification, Notification};

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Newest first.
    async fn list(&self, user_id: UserId, page: PageRequest) -> Result<Page<Notification>, DomainError>;

    async fn find(&self, id: NotificationId, user_id: UserId) -> Result<Option<Notification>, DomainError>;

    async fn create(&self, notification: &NewNotification) -> Result<Notification, DomainError>;

    async fn save(&self, notification: &Notification) -> Result<(), DomainError>;

    /// Returns how many entries changed.
    async fn mark_all_read(&self, user_id: UserId, now: Timestamp) -> Result<u64, DomainError>;

    /// # Errors
    ///
    /// - `NotFound` when the entry does not belong to the user
    async fn delete(&self, id: NotificationId, user_id: UserId) -> Result<(), DomainError>;

    async fn clear(&self, user_id: UserId) -> Result<u64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn NotificationRepository) {}
    }
}
