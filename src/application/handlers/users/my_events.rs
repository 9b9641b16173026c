//! MyEventsHandler - the signed-in user's dashboard and their event library.

use std::cmp::Reverse;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::access::{AccessGrant, AccessType, GrantPaymentStatus};
use crate::domain::event::Event;
use crate::domain::foundation::{LocalOffset, Page, PageRequest, Timestamp, UserId};
use crate::domain::user::UserError;
use crate::ports::{AccessGrantRepository, EventRepository};

pub const MY_EVENTS_PER_PAGE: u32 = 20;
const DASHBOARD_LIVE: usize = 3;
const DASHBOARD_UPCOMING: usize = 5;

/// An event the user may open, with how they got in.
#[derive(Debug, Clone, Serialize)]
pub struct AccessibleEvent {
    pub event: Event,
    pub access_type: AccessType,
    pub payment_status: GrantPaymentStatus,
    pub access_granted_at: Option<Timestamp>,
    pub is_live: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MyEvents {
    pub events: Page<AccessibleEvent>,
    pub total_count: u64,
    pub live_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub live: Vec<AccessibleEvent>,
    pub upcoming: Vec<AccessibleEvent>,
}

pub struct MyEventsHandler {
    grants: Arc<dyn AccessGrantRepository>,
    events: Arc<dyn EventRepository>,
    offset: LocalOffset,
}

impl MyEventsHandler {
    pub fn new(
        grants: Arc<dyn AccessGrantRepository>,
        events: Arc<dyn EventRepository>,
        offset: LocalOffset,
    ) -> Self {
        Self {
            grants,
            events,
            offset,
        }
    }

    /// Every accessible active event: live ones first, then the most
    /// recently granted.
    pub async fn list(&self, user_id: UserId, page: PageRequest) -> Result<MyEvents, UserError> {
        let mut events = self.accessible(user_id, Timestamp::now()).await?;
        events.sort_by_key(|e| (!e.is_live, Reverse(e.access_granted_at)));

        let total_count = events.len() as u64;
        let live_count = events.iter().filter(|e| e.is_live).count() as u64;
        let items = events
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(MyEvents {
            events: Page::new(items, total_count, page),
            total_count,
            live_count,
        })
    }

    /// A few live events, then the next upcoming ones that are not live.
    pub async fn dashboard(&self, user_id: UserId) -> Result<Dashboard, UserError> {
        let now = Timestamp::now();
        let events = self.accessible(user_id, now).await?;

        let mut live: Vec<AccessibleEvent> = events.iter().filter(|e| e.is_live).cloned().collect();
        live.sort_by_key(|e| self.starts_at(&e.event));
        live.truncate(DASHBOARD_LIVE);

        let mut upcoming: Vec<AccessibleEvent> = events
            .into_iter()
            .filter(|e| !live.iter().any(|l| l.event.id == e.event.id))
            .filter(|e| self.is_upcoming(&e.event, now))
            .collect();
        upcoming.sort_by_key(|e| self.starts_at(&e.event));
        upcoming.truncate(DASHBOARD_UPCOMING);

        Ok(Dashboard { live, upcoming })
    }

    async fn accessible(&self, user_id: UserId, now: Timestamp) -> Result<Vec<AccessibleEvent>, UserError> {
        let mut found = Vec::new();
        for grant in self.grants.list_for_user(user_id).await? {
            if !grant.grants_access(now) {
                continue;
            }
            match self.events.find_by_id(grant.event_id).await? {
                Some(event) if event.is_active => found.push(self.entry(grant, event, now)),
                _ => {}
            }
        }
        Ok(found)
    }

    fn entry(&self, grant: AccessGrant, event: Event, now: Timestamp) -> AccessibleEvent {
        AccessibleEvent {
            is_live: event.is_live(now, self.offset),
            event,
            access_type: grant.access_type,
            payment_status: grant.payment_status,
            access_granted_at: grant.access_granted_at,
        }
    }

    fn starts_at(&self, event: &Event) -> Option<Timestamp> {
        event
            .start_date
            .map(|date| self.offset.to_timestamp(date, event.start_time.unwrap_or_default()))
    }

    /// Dated, not archived, and either still ahead or available on demand.
    fn is_upcoming(&self, event: &Event, now: Timestamp) -> bool {
        if event.is_archived {
            return false;
        }
        match self.starts_at(event) {
            Some(start) => event.is_on_demand || start.is_after(&now),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryAccessGrants, InMemoryEventRepository};
    use crate::domain::event::sample_event;
    use crate::domain::foundation::EventId;
    use chrono::{Duration, NaiveDate, NaiveTime};

    fn grant(event_id: i64, granted_days_ago: i64) -> AccessGrant {
        let mut grant = AccessGrant::free(EventId::new(event_id), UserId::new(7), Timestamp::now());
        grant.access_granted_at = Some(Timestamp::now().minus_days(granted_days_ago));
        grant
    }

    fn dated(id: i64, slug: &str, date: NaiveDate) -> Event {
        let mut event = sample_event(id, slug);
        event.start_date = Some(date);
        event.start_time = NaiveTime::from_hms_opt(10, 0, 0);
        event.is_live = Some(false);
        event
    }

    fn handler(events: Vec<Event>, grants: Vec<AccessGrant>) -> MyEventsHandler {
        let events = events
            .into_iter()
            .fold(InMemoryEventRepository::new(), |repo, e| repo.with_event(e));
        let grants = grants
            .into_iter()
            .fold(InMemoryAccessGrants::new(), |repo, g| repo.with_grant(g));
        MyEventsHandler::new(Arc::new(grants), Arc::new(events), LocalOffset::moscow())
    }

    #[tokio::test]
    async fn live_events_come_first_then_newest_grant() {
        let today = LocalOffset::moscow().today();
        let mut live = dated(1, "live", today);
        live.is_live = Some(true);
        live.start_time = None;
        let older = dated(2, "older", today + Duration::days(10));
        let newer = dated(3, "newer", today + Duration::days(20));
        let mut hidden = dated(4, "hidden", today);
        hidden.is_active = false;

        let handler = handler(
            vec![live, older, newer, hidden],
            vec![grant(1, 30), grant(2, 5), grant(3, 1), grant(4, 0)],
        );
        let result = handler.list(UserId::new(7), PageRequest::default()).await.unwrap();

        let slugs: Vec<&str> = result.events.items.iter().map(|e| e.event.slug.as_str()).collect();
        assert_eq!(slugs, vec!["live", "newer", "older"]);
        assert_eq!(result.total_count, 3);
        assert_eq!(result.live_count, 1);
        assert!(result.events.items[0].is_live);
    }

    #[tokio::test]
    async fn list_is_paginated() {
        let today = LocalOffset::moscow().today();
        let events = (1..=3).map(|id| dated(id, &format!("e{}", id), today)).collect();
        let grants = (1..=3).map(|id| grant(id, id)).collect();
        let result = handler(events, grants)
            .list(UserId::new(7), PageRequest::new(Some(2), Some(2), MY_EVENTS_PER_PAGE))
            .await
            .unwrap();
        assert_eq!(result.events.items.len(), 1);
        assert_eq!(result.events.items[0].event.slug, "e3");
        assert_eq!(result.events.last_page, 2);
    }

    #[tokio::test]
    async fn dashboard_splits_live_and_upcoming() {
        let today = LocalOffset::moscow().today();
        let mut live = dated(1, "live", today);
        live.is_live = Some(true);
        live.start_time = None;
        let soon = dated(2, "soon", today + Duration::days(3));
        let past = dated(3, "past", today - Duration::days(3));
        let mut recorded = dated(4, "recorded", today - Duration::days(30));
        recorded.is_on_demand = true;
        let mut archived = dated(5, "archived", today + Duration::days(3));
        archived.is_archived = true;

        let handler = handler(
            vec![live, soon, past, recorded, archived],
            (1..=5).map(|id| grant(id, 1)).collect(),
        );
        let dashboard = handler.dashboard(UserId::new(7)).await.unwrap();

        let live: Vec<&str> = dashboard.live.iter().map(|e| e.event.slug.as_str()).collect();
        let upcoming: Vec<&str> = dashboard.upcoming.iter().map(|e| e.event.slug.as_str()).collect();
        assert_eq!(live, vec!["live"]);
        assert_eq!(upcoming, vec!["recorded", "soon"]);
    }
}
