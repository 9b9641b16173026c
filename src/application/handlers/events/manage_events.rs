//! Back-office event maintenance: search, show, create, update and delete.

use std::sync::Arc;

use crate::domain::event::{slug_candidate, Event, EventDraft, EventError, EventFields};
use crate::domain::foundation::{non_empty, EventId, Page, PageRequest};
use crate::ports::EventRepository;

/// Attempts made to find a free slug derived from the title.
const SLUG_ATTEMPTS: u32 = 20;

#[derive(Debug, Clone, Default)]
pub struct SearchEventsQuery {
    pub title: Option<String>,
    pub page: PageRequest,
}

#[derive(Debug, Clone)]
pub struct SaveEventCommand {
    /// `None` creates a new event.
    pub id: Option<EventId>,
    pub draft: EventDraft,
}

pub struct ManageEventsHandler {
    events: Arc<dyn EventRepository>,
}

impl ManageEventsHandler {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    pub async fn search(&self, query: SearchEventsQuery) -> Result<Page<Event>, EventError> {
        let title = non_empty(query.title.as_deref());
        Ok(self.events.search(title.as_deref(), query.page).await?)
    }

    pub async fn get(&self, id: EventId) -> Result<Event, EventError> {
        self.events
            .find_by_id(id)
            .await?
            .ok_or_else(|| EventError::NotFound(id.to_string()))
    }

    pub async fn save(&self, cmd: SaveEventCommand) -> Result<Event, EventError> {
        let fields = cmd.draft.validate()?;
        let explicit_slug = non_empty(cmd.draft.slug.as_deref()).is_some();
        let slug = self.free_slug(&fields, cmd.id, explicit_slug).await?;

        let event = match cmd.id {
            Some(id) => {
                self.get(id).await?;
                self.events.update(id, &fields, &slug).await?
            }
            None => self.events.create(&fields, &slug).await?,
        };
        tracing::info!(event_id = %event.id, slug = %event.slug, "Event saved");
        Ok(event)
    }

    pub async fn delete(&self, id: EventId) -> Result<(), EventError> {
        self.get(id).await?;
        self.events.delete(id).await?;
        tracing::info!(event_id = %id, "Event deleted");
        Ok(())
    }

    /// An explicit slug must be free as given; a generated one gets a numeric suffix.
    async fn free_slug(
        &self,
        fields: &EventFields,
        except: Option<EventId>,
        explicit: bool,
    ) -> Result<String, EventError> {
        if explicit {
            if self.events.slug_exists(&fields.slug, except).await? {
                return Err(EventError::DuplicateSlug(fields.slug.clone()));
            }
            return Ok(fields.slug.clone());
        }
        for attempt in 1..=SLUG_ATTEMPTS {
            let candidate = slug_candidate(&fields.slug, attempt);
            if !self.events.slug_exists(&candidate, except).await? {
                return Ok(candidate);
            }
        }
        Err(EventError::DuplicateSlug(fields.slug.clone()))
    }
}
