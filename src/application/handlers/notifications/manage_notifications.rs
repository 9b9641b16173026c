//! ManageNotificationsHandler - the signed-in staff member's inbox.
//!
//! Every operation is scoped to the actor and needs a back-office role.

use std::sync::Arc;

use crate::domain::foundation::{AuthenticatedUser, NotificationId, Page, PageRequest, Role, Timestamp};
use crate::domain::notification::{Notification, NotificationError};
use crate::ports::NotificationRepository;

pub struct ManageNotificationsHandler {
    notifications: Arc<dyn NotificationRepository>,
}

fn authorize(actor: &AuthenticatedUser) -> Result<(), NotificationError> {
    actor
        .require_any_role(&Role::BACK_OFFICE)
        .map_err(|_| NotificationError::Forbidden)
}

impl ManageNotificationsHandler {
    pub fn new(notifications: Arc<dyn NotificationRepository>) -> Self {
        Self { notifications }
    }

    pub async fn list(
        &self,
        actor: &AuthenticatedUser,
        page: PageRequest,
    ) -> Result<Page<Notification>, NotificationError> {
        authorize(actor)?;
        Ok(self.notifications.list(actor.id, page).await?)
    }

    pub async fn mark_read(
        &self,
        actor: &AuthenticatedUser,
        id: NotificationId,
    ) -> Result<Notification, NotificationError> {
        authorize(actor)?;
        let mut notification = self
            .notifications
            .find(id, actor.id)
            .await?
            .ok_or(NotificationError::NotFound)?;
        if notification.mark_read(Timestamp::now()) {
            self.notifications.save(&notification).await?;
        }
        Ok(notification)
    }

    /// Returns how many entries were unread.
    pub async fn mark_all_read(&self, actor: &AuthenticatedUser) -> Result<u64, NotificationError> {
        authorize(actor)?;
        Ok(self.notifications.mark_all_read(actor.id, Timestamp::now()).await?)
    }

    pub async fn delete(&self, actor: &AuthenticatedUser, id: NotificationId) -> Result<(), NotificationError> {
        authorize(actor)?;
        self.notifications.delete(id, actor.id).await?;
        Ok(())
    }

    pub async fn clear(&self, actor: &AuthenticatedUser) -> Result<u64, NotificationError> {
        authorize(actor)?;
        let removed = self.notifications.clear(actor.id).await?;
        tracing::info!(user_id = %actor.id, removed, "Notifications cleared");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryNotifications;
    use crate::domain::foundation::{RoleSet, UserId};
    use crate::domain::notification::{NewNotification, NotificationKind};

    fn actor(id: i64, role: Role) -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new(id), "staff@portal.ru", RoleSet::new([role]))
    }

    async fn seeded() -> (Arc<InMemoryNotifications>, ManageNotificationsHandler) {
        let repo = Arc::new(InMemoryNotifications::new());
        for (user, title) in [(1, "first"), (1, "second"), (2, "other")] {
            repo.create(&NewNotification {
                user_id: UserId::new(user),
                kind: NotificationKind::System,
                title: title.into(),
                message: "m".into(),
                data: None,
                url: None,
            })
            .await
            .unwrap();
        }
        (repo.clone(), ManageNotificationsHandler::new(repo))
    }

    #[tokio::test]
    async fn list_is_scoped_to_actor() {
        let (_, handler) = seeded().await;
        let page = handler.list(&actor(1, Role::Editor), PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 2);
        assert!(page.items.iter().all(|n| n.user_id == UserId::new(1)));
    }

    #[tokio::test]
    async fn plain_users_are_forbidden() {
        let (_, handler) = seeded().await;
        let err = handler.list(&actor(1, Role::User), PageRequest::default()).await.unwrap_err();
        assert!(matches!(err, NotificationError::Forbidden));
    }

    #[tokio::test]
    async fn cannot_read_someone_elses_entry() {
        let (repo, handler) = seeded().await;
        let foreign = repo.all().into_iter().find(|n| n.user_id == UserId::new(2)).unwrap();
        let err = handler.mark_read(&actor(1, Role::Admin), foreign.id).await.unwrap_err();
        assert!(matches!(err, NotificationError::NotFound));
    }

    #[tokio::test]
    async fn mark_all_read_then_clear() {
        let (repo, handler) = seeded().await;
        let admin = actor(1, Role::Admin);
        assert_eq!(handler.mark_all_read(&admin).await.unwrap(), 2);
        assert_eq!(handler.mark_all_read(&admin).await.unwrap(), 0);
        assert_eq!(handler.clear(&admin).await.unwrap(), 2);
        assert_eq!(repo.all().len(), 1);
    }
}
