//! In-memory notification inbox.

use async_trait::async_trait;
use std::sync::Mutex;

use super::{guard, paginate};
use crate::domain::foundation::{
    DomainError, ErrorCode, NotificationId, Page, PageRequest, Timestamp, UserId,
};
use crate::domain::notification::{NewNotification, Notification};
use crate::ports::NotificationRepository;

#[derive(Default)]
pub struct InMemoryNotifications {
    entries: Mutex<Vec<Notification>>,
}

impl InMemoryNotifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Notification> {
        self.entries.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

fn missing(id: NotificationId) -> DomainError {
    DomainError::new(ErrorCode::NotFound, format!("Notification {} not found", id))
}

#[async_trait]
impl NotificationRepository for InMemoryNotifications {
    async fn list(&self, user_id: UserId, page: PageRequest) -> Result<Page<Notification>, DomainError> {
        let mut found: Vec<Notification> = guard(&self.entries)?
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(&found, page))
    }

    async fn find(&self, id: NotificationId, user_id: UserId) -> Result<Option<Notification>, DomainError> {
        Ok(guard(&self.entries)?
            .iter()
            .find(|n| n.id == id && n.user_id == user_id)
            .cloned())
    }

    async fn create(&self, notification: &NewNotification) -> Result<Notification, DomainError> {
        let mut entries = guard(&self.entries)?;
        let next = entries.iter().map(|n| n.id.as_i64()).max().unwrap_or(0) + 1;
        let created = Notification {
            id: NotificationId::new(next),
            user_id: notification.user_id,
            kind: notification.kind,
            title: notification.title.clone(),
            message: notification.message.clone(),
            data: notification.data.clone(),
            url: notification.url.clone(),
            read: false,
            read_at: None,
            created_at: Timestamp::now(),
        };
        entries.push(created.clone());
        Ok(created)
    }

    async fn save(&self, notification: &Notification) -> Result<(), DomainError> {
        let mut entries = guard(&self.entries)?;
        let slot = entries
            .iter_mut()
            .find(|n| n.id == notification.id && n.user_id == notification.user_id)
            .ok_or_else(|| missing(notification.id))?;
        *slot = notification.clone();
        Ok(())
    }

    async fn mark_all_read(&self, user_id: UserId, now: Timestamp) -> Result<u64, DomainError> {
        let mut changed = 0;
        for entry in guard(&self.entries)?.iter_mut().filter(|n| n.user_id == user_id) {
            if entry.mark_read(now) {
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn delete(&self, id: NotificationId, user_id: UserId) -> Result<(), DomainError> {
        let mut entries = guard(&self.entries)?;
        let before = entries.len();
        entries.retain(|n| !(n.id == id && n.user_id == user_id));
        if entries.len() == before {
            return Err(missing(id));
        }
        Ok(())
    }

    async fn clear(&self, user_id: UserId) -> Result<u64, DomainError> {
        let mut entries = guard(&self.entries)?;
        let before = entries.len();
        entries.retain(|n| n.user_id != user_id);
        Ok((before - entries.len()) as u64)
    }
}
