//! ViewEventHandler - Query handler for the "my events" page of a registered user.

use std::sync::Arc;

use crate::domain::event::{EmbedSize, Event, EventError};
use crate::domain::foundation::{LocalOffset, Timestamp, UserId};
use crate::ports::{AccessGrantRepository, EventRepository};

#[derive(Debug, Clone)]
pub struct ViewEventQuery {
    pub slug: String,
    pub user_id: UserId,
    pub size: EmbedSize,
}

#[derive(Debug, Clone)]
pub struct EventView {
    pub event: Event,
    pub embed_url: Option<String>,
    pub is_live: bool,
}

pub struct ViewEventHandler {
    events: Arc<dyn EventRepository>,
    grants: Arc<dyn AccessGrantRepository>,
    offset: LocalOffset,
}

impl ViewEventHandler {
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

    pub async fn handle(&self, query: ViewEventQuery) -> Result<EventView, EventError> {
        let event = self
            .events
            .find_by_slug(&query.slug)
            .await?
            .ok_or_else(|| EventError::NotFound(query.slug.clone()))?;

        let now = Timestamp::now();
        if !self.grants.has_access(event.id, query.user_id, now).await? {
            return Err(EventError::NotRegistered);
        }

        Ok(EventView {
            embed_url: event.embed_url(query.size),
            is_live: event.is_live(now, self.offset),
            event,
        })
    }
}
