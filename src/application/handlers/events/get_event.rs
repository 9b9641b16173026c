//! GetEventHandler - Query handler for the public event page.

use std::sync::Arc;

use crate::domain::event::{EmbedSize, Event, EventError};
use crate::domain::foundation::{LocalOffset, Timestamp, UserId};
use crate::ports::{AccessGrantRepository, EventRepository};

pub const RELATED_EVENTS_LIMIT: i64 = 3;

#[derive(Debug, Clone)]
pub struct GetEventQuery {
    pub slug: String,
    pub viewer: Option<UserId>,
}

/// Event page data. Recording ids are blanked for viewers without access.
#[derive(Debug, Clone)]
pub struct EventDetail {
    pub event: Event,
    pub registered_count: i64,
    pub available_spots: Option<i64>,
    pub user_has_access: bool,
    pub has_recording: bool,
    pub embed_url: Option<String>,
    pub is_live: bool,
    pub related: Vec<Event>,
}

pub struct GetEventHandler {
    events: Arc<dyn EventRepository>,
    grants: Arc<dyn AccessGrantRepository>,
    offset: LocalOffset,
}

impl GetEventHandler {
    pub fn new(
        events: Arc<dyn EventRepository>,
        grants: Arc<dyn AccessGrantRepository>,
        offset: LocalOffset,
    ) -> Self {
        Self {
            events,
            grants,
            offset,
        }
    }

    pub async fn handle(&self, query: GetEventQuery) -> Result<EventDetail, EventError> {
        let mut event = self
            .events
            .find_by_slug(&query.slug)
            .await?
            .filter(|e| e.is_active)
            .ok_or_else(|| EventError::NotFound(query.slug.clone()))?;

        let now = Timestamp::now();
        let user_has_access = match query.viewer {
            Some(user_id) => self.grants.has_access(event.id, user_id, now).await?,
            None => false,
        };
        let registered_count = self.grants.count_active(event.id).await?;
        let available_spots = event
            .max_quantity
            .map(|max| (i64::from(max) - registered_count).max(0));
        let related = self.events.related(&event, RELATED_EVENTS_LIMIT).await?;

        let has_recording = event.has_recording();
        let embed_url = if user_has_access {
            event.embed_url(EmbedSize::Default)
        } else {
            event.kinescope_id = None;
            event.kinescope_playlist_id = None;
            None
        };
        let is_live = event.is_live(now, self.offset);

        Ok(EventDetail {
            event,
            registered_count,
            available_spots,
            user_has_access,
            has_recording,
            embed_url,
            is_live,
            related,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryAccessGrants, InMemoryEventRepository};
    use crate::domain::access::AccessGrant;
    use crate::domain::catalog::Category;
    use crate::domain::event::{sample_event, KinescopeType};
    use crate::domain::foundation::{CategoryId, EventId};

    fn recorded(id: i64, slug: &str) -> Event {
        let mut e = sample_event(id, slug);
        e.kinescope_type = Some(KinescopeType::Video);
        e.kinescope_id = Some("vid-1".into());
        e.max_quantity = Some(2);
        e
    }

    fn handler(events: InMemoryEventRepository, grants: InMemoryAccessGrants) -> GetEventHandler {
        GetEventHandler::new(Arc::new(events), Arc::new(grants), LocalOffset::moscow())
    }

    #[tokio::test]
    async fn guests_do_not_see_recording_ids() {
        let h = handler(
            InMemoryEventRepository::new().with_event(recorded(1, "cardio")),
            InMemoryAccessGrants::new(),
        );
        let detail = h
            .handle(GetEventQuery {
                slug: "cardio".into(),
                viewer: None,
            })
            .await
            .unwrap();

        assert!(!detail.user_has_access);
        assert!(detail.has_recording);
        assert_eq!(detail.event.kinescope_id, None);
        assert_eq!(detail.embed_url, None);
        assert_eq!(detail.available_spots, Some(2));
    }

    #[tokio::test]
    async fn registered_users_get_embed_url_and_spots_shrink() {
        let grants = InMemoryAccessGrants::new().with_grant(AccessGrant::free(
            EventId::new(1),
            UserId::new(5),
            Timestamp::now(),
        ));
        let h = handler(InMemoryEventRepository::new().with_event(recorded(1, "cardio")), grants);
        let detail = h
            .handle(GetEventQuery {
                slug: "cardio".into(),
                viewer: Some(UserId::new(5)),
            })
            .await
            .unwrap();

        assert!(detail.user_has_access);
        assert_eq!(
            detail.embed_url.as_deref(),
            Some("https://kinescope.io/embed/vid-1")
        );
        assert_eq!(detail.registered_count, 1);
        assert_eq!(detail.available_spots, Some(1));
    }

    #[tokio::test]
    async fn related_events_share_a_category() {
        let category = Category {
            id: CategoryId::new(9),
            name: "Кардиология".into(),
            slug: "kardiologiya".into(),
            description: None,
            is_active: true,
            sort_order: 0,
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
        };
        let mut main = sample_event(1, "main");
        main.categories = vec![category.clone()];
        let mut sibling = sample_event(2, "sibling");
        sibling.category_id = Some(category.id);
        let h = handler(
            InMemoryEventRepository::new()
                .with_event(main)
                .with_event(sibling)
                .with_event(sample_event(3, "other")),
            InMemoryAccessGrants::new(),
        );

        let detail = h
            .handle(GetEventQuery {
                slug: "main".into(),
                viewer: None,
            })
            .await
            .unwrap();
        let related: Vec<&str> = detail.related.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(related, vec!["sibling"]);
    }

    #[tokio::test]
    async fn inactive_event_is_not_found() {
        let mut hidden = sample_event(1, "hidden");
        hidden.is_active = false;
        let h = handler(
            InMemoryEventRepository::new().with_event(hidden),
            InMemoryAccessGrants::new(),
        );
        let err = h
            .handle(GetEventQuery {
                slug: "hidden".into(),
                viewer: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::NotFound(_)));
    }
}
