//! In-memory registrations table joined from the grant, user and event stores.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::Arc;

use super::{paginate, InMemoryAccessGrants, InMemoryEventRepository, InMemoryUsers};
use crate::domain::access::{
    RegisteredEvent, RegisteredUser, Registration, RegistrationCriteria, RegistrationSort,
};
use crate::domain::event::{Event, SortDirection};
use crate::domain::foundation::{DomainError, Page};
use crate::domain::user::User;
use crate::ports::RegistrationListing;

pub struct InMemoryRegistrations {
    grants: Arc<InMemoryAccessGrants>,
    users: Arc<InMemoryUsers>,
    events: Arc<InMemoryEventRepository>,
}

impl InMemoryRegistrations {
    pub fn new(
        grants: Arc<InMemoryAccessGrants>,
        users: Arc<InMemoryUsers>,
        events: Arc<InMemoryEventRepository>,
    ) -> Self {
        Self { grants, users, events }
    }
}

fn registered_user(user: &User) -> RegisteredUser {
    RegisteredUser {
        id: user.id,
        full_name: user.full_name(),
        email: user.email.clone(),
        company: user.company.clone(),
        position: user.position.clone(),
        city: user.city.clone(),
        avatar: user.avatar.clone(),
    }
}

fn registered_event(event: &Event) -> RegisteredEvent {
    RegisteredEvent {
        id: event.id,
        title: event.title.clone(),
        slug: event.slug.clone(),
        start_date: event.start_date,
        start_time: event.start_time,
    }
}

fn matches_search(user: &User, needle: &str) -> bool {
    [
        Some(user.first_name.as_str()),
        Some(user.last_name.as_str()),
        user.middle_name.as_deref(),
        Some(user.email.as_str()),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}

fn compare(sort: RegistrationSort, a: &(Registration, User), b: &(Registration, User)) -> Ordering {
    let (ra, ua) = a;
    let (rb, ub) = b;
    match sort {
        RegistrationSort::GrantedAt => ra.grant.access_granted_at.cmp(&rb.grant.access_granted_at),
        RegistrationSort::User => ua
            .last_name
            .cmp(&ub.last_name)
            .then_with(|| ua.first_name.cmp(&ub.first_name)),
        RegistrationSort::Email => ua.email.cmp(&ub.email),
        RegistrationSort::EventStart => (ra.event.start_date, ra.event.start_time)
            .cmp(&(rb.event.start_date, rb.event.start_time)),
        RegistrationSort::PaymentStatus => ra
            .grant
            .payment_status
            .as_str()
            .cmp(rb.grant.payment_status.as_str()),
    }
}

#[async_trait]
impl RegistrationListing for InMemoryRegistrations {
    async fn list(&self, criteria: &RegistrationCriteria) -> Result<Page<Registration>, DomainError> {
        let users = self.users.all();
        let events = self.events.all();
        let needle = criteria.search.as_deref().map(str::to_lowercase);

        let mut rows: Vec<(Registration, User)> = self
            .grants
            .all()
            .into_iter()
            .filter(|g| criteria.event_id.map_or(true, |id| g.event_id == id))
            .filter_map(|grant| {
                let user = users.iter().find(|u| u.id == grant.user_id)?;
                let event = events.iter().find(|e| e.id == grant.event_id)?;
                Some((
                    Registration {
                        user: registered_user(user),
                        event: registered_event(event),
                        grant,
                    },
                    user.clone(),
                ))
            })
            .filter(|(_, user)| needle.as_deref().map_or(true, |n| matches_search(user, n)))
            .collect();

        rows.sort_by(|a, b| {
            let primary = compare(criteria.sort, a, b);
            let primary = match criteria.direction {
                SortDirection::Asc => primary,
                SortDirection::Desc => primary.reverse(),
            };
            primary
                .then_with(|| a.0.event.id.cmp(&b.0.event.id))
                .then_with(|| a.0.user.id.cmp(&b.0.user.id))
        });

        let rows: Vec<Registration> = rows.into_iter().map(|(r, _)| r).collect();
        Ok(paginate(&rows, criteria.page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::access::{AccessGrant, RegistrationListQuery};
    use crate::domain::event::sample_event;
    use crate::domain::foundation::{EventId, Timestamp, UserId};
    use crate::domain::user::sample_user;

    fn user(id: i64, last: &str, email: &str) -> User {
        User {
            last_name: last.to_string(),
            ..sample_user(id, email)
        }
    }

    fn listing() -> InMemoryRegistrations {
        let now = Timestamp::now();
        let grants = InMemoryAccessGrants::new()
            .with_grant(AccessGrant::free(EventId::new(1), UserId::new(10), now.minus_days(2)))
            .with_grant(AccessGrant::free(EventId::new(1), UserId::new(11), now.minus_days(1)))
            .with_grant(AccessGrant::free(EventId::new(2), UserId::new(10), now));
        let users = InMemoryUsers::new()
            .with_user(user(10, "Смирнов", "smirnov@example.com"))
            .with_user(user(11, "Алексеева", "alekseeva@example.com"));
        let events = InMemoryEventRepository::new()
            .with_event(sample_event(1, "first"))
            .with_event(sample_event(2, "second"));
        InMemoryRegistrations::new(Arc::new(grants), Arc::new(users), Arc::new(events))
    }

    fn query(sort: Option<&str>, direction: Option<&str>) -> RegistrationListQuery {
        RegistrationListQuery {
            sort: sort.map(String::from),
            direction: direction.map(String::from),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn newest_grants_come_first_by_default() {
        let page = listing().list(&query(None, None).normalize()).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items[0].event.id, EventId::new(2));
        assert_eq!(page.items[2].user.id, UserId::new(10));
        assert_eq!(page.items[2].event.id, EventId::new(1));
    }

    #[tokio::test]
    async fn filters_by_event_and_searches_names() {
        let criteria = RegistrationListQuery {
            event_id: Some("1".into()),
            search: Some("АЛЕКС".into()),
            ..Default::default()
        }
        .normalize();
        let page = listing().list(&criteria).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].user.email, "alekseeva@example.com");
        assert_eq!(page.items[0].event.slug, "first");
    }

    #[tokio::test]
    async fn sorts_by_user_name_ascending() {
        let page = listing()
            .list(&query(Some("user"), Some("asc")).normalize())
            .await
            .unwrap();
        let ids: Vec<i64> = page.items.iter().map(|r| r.user.id.as_i64()).collect();
        assert_eq!(ids, vec![11, 10, 10]);
    }

    #[tokio::test]
    async fn grants_without_a_user_are_skipped() {
        let grants = InMemoryAccessGrants::new().with_grant(AccessGrant::free(
            EventId::new(1),
            UserId::new(99),
            Timestamp::now(),
        ));
        let listing = InMemoryRegistrations::new(
            Arc::new(grants),
            Arc::new(InMemoryUsers::new()),
            Arc::new(InMemoryEventRepository::new().with_event(sample_event(1, "first"))),
        );
        let page = listing.list(&query(None, None).normalize()).await.unwrap();
        assert_eq!(page.total, 0);
    }
}
