//! ListEventsHandler - Query handler for the public event listing.

use std::sync::Arc;

use crate::domain::event::{Event, EventError, EventListQuery};
use crate::domain::foundation::{LocalOffset, Page};
use crate::ports::EventRepository;

/// Query for the public listing; raw parameters are normalized here.
#[derive(Debug, Clone, Default)]
pub struct ListEventsQuery {
    pub params: EventListQuery,
}

pub struct ListEventsHandler {
    events: Arc<dyn EventRepository>,
    offset: LocalOffset,
}

impl ListEventsHandler {
    pub fn new(events: Arc<dyn EventRepository>, offset: LocalOffset) -> Self {
        Self { events, offset }
    }

    pub async fn handle(&self, query: ListEventsQuery) -> Result<Page<Event>, EventError> {
        let criteria = query.params.normalize();
        Ok(self.events.list(&criteria, self.offset.today()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryEventRepository;
    use crate::domain::event::sample_event;
    use chrono::Duration;

    fn handler(repo: InMemoryEventRepository) -> ListEventsHandler {
        ListEventsHandler::new(Arc::new(repo), LocalOffset::moscow())
    }

    fn dated(id: i64, days_from_today: i64) -> Event {
        let mut e = sample_event(id, &format!("e{}", id));
        let day = LocalOffset::moscow().today() + Duration::days(days_from_today);
        e.start_date = Some(day);
        e.end_date = Some(day);
        e
    }

    #[tokio::test]
    async fn upcoming_hides_past_and_inactive_events() {
        let mut inactive = dated(3, 5);
        inactive.is_active = false;
        let mut on_demand = dated(4, -30);
        on_demand.is_on_demand = true;
        let repo = InMemoryEventRepository::new()
            .with_event(dated(1, 5))
            .with_event(dated(2, -5))
            .with_event(inactive)
            .with_event(on_demand);

        let page = handler(repo).handle(ListEventsQuery::default()).await.unwrap();
        let ids: Vec<i64> = page.items.iter().map(|e| e.id.as_i64()).collect();
        assert_eq!(ids, vec![4, 1]);
    }

    #[tokio::test]
    async fn archive_lists_past_events_newest_first() {
        let mut archived = dated(3, 10);
        archived.is_archived = true;
        let repo = InMemoryEventRepository::new()
            .with_event(dated(1, -10))
            .with_event(dated(2, -2))
            .with_event(archived)
            .with_event(dated(4, 3));

        let query = ListEventsQuery {
            params: EventListQuery {
                filter: Some("archive".into()),
                ..Default::default()
            },
        };
        let page = handler(repo).handle(query).await.unwrap();
        let ids: Vec<i64> = page.items.iter().map(|e| e.id.as_i64()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn event_without_end_date_is_neither_upcoming_nor_archived() {
        let mut undated = sample_event(1, "undated");
        undated.start_date = None;
        let repo = InMemoryEventRepository::new().with_event(undated);
        let h = handler(repo);

        let upcoming = h.handle(ListEventsQuery::default()).await.unwrap();
        assert_eq!(upcoming.total, 0);
        let archive = h
            .handle(ListEventsQuery {
                params: EventListQuery {
                    filter: Some("archive".into()),
                    ..Default::default()
                },
            })
            .await
            .unwrap();
        assert_eq!(archive.total, 0);
    }

    #[tokio::test]
    async fn search_matches_location_case_insensitively() {
        let mut in_kazan = dated(1, 3);
        in_kazan.location = Some("Казань, Экспо".into());
        let repo = InMemoryEventRepository::new()
            .with_event(in_kazan)
            .with_event(dated(2, 3));

        let query = ListEventsQuery {
            params: EventListQuery {
                search: Some("КАЗАНЬ".into()),
                ..Default::default()
            },
        };
        let page = handler(repo).handle(query).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id.as_i64(), 1);
    }
}
