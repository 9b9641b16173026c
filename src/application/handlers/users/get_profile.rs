//! GetProfileHandler - the signed-in user with the events they can open.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::event::Event;
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::user::{User, UserError};
use crate::ports::{AccessGrantRepository, EventRepository, UserRepository};

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user: User,
    pub events: Vec<Event>,
}

pub struct GetProfileHandler {
    users: Arc<dyn UserRepository>,
    grants: Arc<dyn AccessGrantRepository>,
    events: Arc<dyn EventRepository>,
}

impl GetProfileHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        grants: Arc<dyn AccessGrantRepository>,
        events: Arc<dyn EventRepository>,
    ) -> Self {
        Self {
            users,
            grants,
            events,
        }
    }

    pub async fn handle(&self, user_id: UserId) -> Result<Profile, UserError> {
        let user = self.users.find_by_id(user_id).await?.ok_or(UserError::NotFound)?;

        let now = Timestamp::now();
        let mut events = Vec::new();
        for grant in self.grants.list_for_user(user_id).await? {
            if !grant.grants_access(now) {
                continue;
            }
            match self.events.find_by_id(grant.event_id).await? {
                Some(event) if event.is_active => events.push(event),
                _ => {}
            }
        }
        events.sort_by(|a, b| b.start_date.cmp(&a.start_date));

        Ok(Profile { user, events })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryAccessGrants, InMemoryEventRepository, InMemoryUsers};
    use crate::domain::access::AccessGrant;
    use crate::domain::event::sample_event;
    use crate::domain::foundation::EventId;
    use crate::domain::user::sample_user;

    #[tokio::test]
    async fn lists_only_events_with_live_access() {
        let mut revoked = AccessGrant::free(EventId::new(2), UserId::new(7), Timestamp::now());
        revoked.is_active = false;
        let handler = GetProfileHandler::new(
            Arc::new(InMemoryUsers::new().with_user(sample_user(7, "doc@clinic.ru"))),
            Arc::new(
                InMemoryAccessGrants::new()
                    .with_grant(AccessGrant::free(EventId::new(1), UserId::new(7), Timestamp::now()))
                    .with_grant(revoked),
            ),
            Arc::new(
                InMemoryEventRepository::new()
                    .with_event(sample_event(1, "open"))
                    .with_event(sample_event(2, "revoked")),
            ),
        );

        let profile = handler.handle(UserId::new(7)).await.unwrap();
        assert_eq!(profile.user.email, "doc@clinic.ru");
        assert_eq!(profile.events.len(), 1);
        assert_eq!(profile.events[0].slug, "open");
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let handler = GetProfileHandler::new(
            Arc::new(InMemoryUsers::new()),
            Arc::new(InMemoryAccessGrants::new()),
            Arc::new(InMemoryEventRepository::new()),
        );
        assert!(matches!(
            handler.handle(UserId::new(1)).await.unwrap_err(),
            UserError::NotFound
        ));
    }
}
