//! ListRegistrationsHandler - back-office table of event registrations.

use std::sync::Arc;

use crate::domain::access::{
    AccessGrantError, Registration, RegistrationCriteria, RegistrationListQuery,
};
use crate::domain::foundation::Page;
use crate::ports::RegistrationListing;

/// One page of registrations with the criteria actually applied.
#[derive(Debug, Clone)]
pub struct RegistrationList {
    pub page: Page<Registration>,
    pub criteria: RegistrationCriteria,
}

pub struct ListRegistrationsHandler {
    registrations: Arc<dyn RegistrationListing>,
}

impl ListRegistrationsHandler {
    pub fn new(registrations: Arc<dyn RegistrationListing>) -> Self {
        Self { registrations }
    }

    pub async fn handle(&self, query: &RegistrationListQuery) -> Result<RegistrationList, AccessGrantError> {
        let criteria = query.normalize();
        let page = self.registrations.list(&criteria).await?;
        Ok(RegistrationList { page, criteria })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryAccessGrants, InMemoryEventRepository, InMemoryRegistrations, InMemoryUsers,
    };
    use crate::domain::access::{AccessGrant, RegistrationSort};
    use crate::domain::event::{sample_event, SortDirection};
    use crate::domain::foundation::{EventId, Timestamp, UserId};
    use crate::domain::user::sample_user;

    fn handler(grants: InMemoryAccessGrants) -> ListRegistrationsHandler {
        let listing = InMemoryRegistrations::new(
            Arc::new(grants),
            Arc::new(
                InMemoryUsers::new()
                    .with_user(sample_user(1, "one@example.com"))
                    .with_user(sample_user(2, "two@example.com")),
            ),
            Arc::new(InMemoryEventRepository::new().with_event(sample_event(5, "webinar"))),
        );
        ListRegistrationsHandler::new(Arc::new(listing))
    }

    #[tokio::test]
    async fn echoes_normalized_criteria() {
        let now = Timestamp::now();
        let grants = InMemoryAccessGrants::new()
            .with_grant(AccessGrant::free(EventId::new(5), UserId::new(1), now))
            .with_grant(AccessGrant::free(EventId::new(5), UserId::new(2), now));
        let query = RegistrationListQuery {
            sort: Some("email".into()),
            direction: Some("up".into()),
            per_page: Some(1),
            ..Default::default()
        };

        let list = handler(grants).handle(&query).await.unwrap();

        assert_eq!(list.criteria.sort, RegistrationSort::Email);
        assert_eq!(list.criteria.direction, SortDirection::Desc);
        assert_eq!(list.page.total, 2);
        assert_eq!(list.page.items.len(), 1);
        assert_eq!(list.page.items[0].user.email, "two@example.com");
    }

    #[tokio::test]
    async fn empty_store_gives_empty_page() {
        let list = handler(InMemoryAccessGrants::new())
            .handle(&RegistrationListQuery::default())
            .await
            .unwrap();
        assert_eq!(list.page.total, 0);
        assert!(list.page.items.is_empty());
    }
}
