//! In-memory access grants keyed by (event, user).

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::guard;
use crate::domain::access::AccessGrant;
use crate::domain::foundation::{DomainError, ErrorCode, EventId, UserId};
use crate::ports::AccessGrantRepository;

#[derive(Default)]
pub struct InMemoryAccessGrants {
    grants: Mutex<HashMap<(EventId, UserId), AccessGrant>>,
}

impl InMemoryAccessGrants {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grant(self, grant: AccessGrant) -> Self {
        if let Ok(mut grants) = self.grants.lock() {
            grants.insert((grant.event_id, grant.user_id), grant);
        }
        self
    }

    /// Snapshot for assertions.
    pub fn all(&self) -> Vec<AccessGrant> {
        self.grants
            .lock()
            .map(|g| g.values().cloned().collect())
            .unwrap_or_default()
    }
}

fn missing() -> DomainError {
    DomainError::new(ErrorCode::AccessGrantNotFound, "Access grant not found")
}

#[async_trait]
impl AccessGrantRepository for InMemoryAccessGrants {
    async fn find(&self, event_id: EventId, user_id: UserId) -> Result<Option<AccessGrant>, DomainError> {
        Ok(guard(&self.grants)?.get(&(event_id, user_id)).cloned())
    }

    async fn attach(&self, grant: &AccessGrant) -> Result<bool, DomainError> {
        let mut grants = guard(&self.grants)?;
        let key = (grant.event_id, grant.user_id);
        if grants.contains_key(&key) {
            return Ok(false);
        }
        grants.insert(key, grant.clone());
        Ok(true)
    }

    async fn upsert(&self, grant: &AccessGrant) -> Result<(), DomainError> {
        guard(&self.grants)?.insert((grant.event_id, grant.user_id), grant.clone());
        Ok(())
    }

    async fn update(&self, grant: &AccessGrant) -> Result<(), DomainError> {
        let mut grants = guard(&self.grants)?;
        let slot = grants
            .get_mut(&(grant.event_id, grant.user_id))
            .ok_or_else(missing)?;
        *slot = grant.clone();
        Ok(())
    }

    async fn delete(&self, event_id: EventId, user_id: UserId) -> Result<(), DomainError> {
        guard(&self.grants)?
            .remove(&(event_id, user_id))
            .map(|_| ())
            .ok_or_else(missing)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<AccessGrant>, DomainError> {
        let mut found: Vec<AccessGrant> = guard(&self.grants)?
            .values()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn count_active(&self, event_id: EventId) -> Result<i64, DomainError> {
        let count = guard(&self.grants)?
            .values()
            .filter(|g| g.event_id == event_id && g.is_active)
            .count();
        Ok(count as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;

    #[tokio::test]
    async fn attach_keeps_existing_grant() {
        let repo = InMemoryAccessGrants::new();
        let first = AccessGrant::free(EventId::new(1), UserId::new(2), Timestamp::now());
        assert!(repo.attach(&first).await.unwrap());

        let mut second = first.clone();
        second.is_active = false;
        assert!(!repo.attach(&second).await.unwrap());
        assert!(repo.find(EventId::new(1), UserId::new(2)).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn delete_missing_pair_is_not_found() {
        let repo = InMemoryAccessGrants::new();
        let err = repo.delete(EventId::new(1), UserId::new(2)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AccessGrantNotFound);
    }
}
