//! In-memory event repository.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::sync::Mutex;

use super::{guard, paginate};
use crate::domain::catalog::{Category, Speaker};
use crate::domain::event::{
    Event, EventFields, EventListCriteria, EventSpeaker, ListFilter, SortDirection, SortField,
};
use crate::domain::foundation::{DomainError, ErrorCode, EventId, Page, PageRequest, Timestamp};
use crate::ports::EventRepository;

#[derive(Default)]
pub struct InMemoryEventRepository {
    events: Mutex<Vec<Event>>,
    categories: Vec<Category>,
    speakers: Vec<Speaker>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an event as-is.
    pub fn with_event(self, event: Event) -> Self {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
        self
    }

    /// Snapshot for joins and assertions.
    pub fn all(&self) -> Vec<Event> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Catalog entries used to hydrate created or updated events.
    pub fn with_catalog(mut self, categories: Vec<Category>, speakers: Vec<Speaker>) -> Self {
        self.categories = categories;
        self.speakers = speakers;
        self
    }

    fn hydrate(&self, id: EventId, fields: &EventFields, slug: &str, created_at: Timestamp) -> Event {
        let now = Timestamp::now();
        Event {
            id,
            title: fields.title.clone(),
            slug: slug.to_string(),
            start_date: fields.start_date,
            end_date: fields.end_date,
            start_time: fields.start_time,
            end_time: fields.end_time,
            event_type: Some(fields.event_type.clone()),
            short_description: fields.short_description.clone(),
            full_description: fields.full_description.clone(),
            topic: fields.topic.clone(),
            location: fields.location.clone(),
            format: fields.format,
            image: fields.image.clone(),
            registration_enabled: fields.registration_enabled,
            category_id: fields.category_id,
            is_active: fields.is_active,
            sort_order: fields.sort_order,
            is_archived: fields.is_archived,
            price: fields.price,
            is_paid: fields.is_paid,
            show_price: fields.show_price,
            is_on_demand: fields.is_on_demand,
            kinescope_id: fields.kinescope_id.clone(),
            kinescope_playlist_id: fields.kinescope_playlist_id.clone(),
            kinescope_type: fields.kinescope_type,
            is_live: fields.is_live,
            letter_draft_id: fields.letter_draft_id.clone(),
            groupsensay: fields.groupsensay.clone(),
            max_quantity: fields.max_quantity,
            categories: self
                .categories
                .iter()
                .filter(|c| fields.categories.contains(&c.id))
                .cloned()
                .collect(),
            speakers: fields
                .speakers
                .iter()
                .filter_map(|link| {
                    self.speakers
                        .iter()
                        .find(|s| s.id == link.speaker_id)
                        .map(|speaker| EventSpeaker {
                            speaker: speaker.clone(),
                            role: link.role.clone(),
                            topic: link.topic.clone(),
                            sort_order: link.sort_order,
                        })
                })
                .collect(),
            created_at,
            updated_at: now,
        }
    }
}

fn matches(event: &Event, criteria: &EventListCriteria, today: NaiveDate) -> bool {
    if !event.is_active {
        return false;
    }
    let in_window = match criteria.filter {
        ListFilter::Upcoming => {
            !event.is_archived && (event.end_date.map_or(false, |d| d >= today) || event.is_on_demand)
        }
        ListFilter::Archive => {
            event.is_archived || (!event.is_on_demand && event.end_date.map_or(false, |d| d < today))
        }
        ListFilter::All => true,
    };
    if !in_window {
        return false;
    }
    if let Some(search) = &criteria.search {
        let hit = [Some(&event.title), event.short_description.as_ref(), event.location.as_ref()]
            .into_iter()
            .flatten()
            .any(|text| text.to_lowercase().contains(search.as_str()));
        if !hit {
            return false;
        }
    }
    if !criteria.categories.is_empty()
        && !event.category_ids().iter().any(|id| criteria.categories.contains(id))
    {
        return false;
    }
    if let Some(event_type) = &criteria.event_type {
        if event.event_type.as_ref() != Some(event_type) {
            return false;
        }
    }
    if let Some(format) = criteria.format {
        if event.format != format {
            return false;
        }
    }
    true
}

fn compare(a: &Event, b: &Event, field: SortField) -> Ordering {
    match field {
        SortField::Title => a.title.cmp(&b.title),
        SortField::StartDate => a.start_date.cmp(&b.start_date),
        SortField::EndDate => a.end_date.cmp(&b.end_date),
        SortField::Price => a.price.cmp(&b.price),
        SortField::EventType => a.event_type.cmp(&b.event_type),
        SortField::Format => a.format.as_str().cmp(b.format.as_str()),
        SortField::Location => a.location.cmp(&b.location),
        SortField::SortOrder => a.sort_order.cmp(&b.sort_order),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

fn not_found(id: EventId) -> DomainError {
    DomainError::new(ErrorCode::EventNotFound, format!("Event {} not found", id))
}

fn duplicate_slug(slug: &str) -> DomainError {
    DomainError::new(ErrorCode::DuplicateSlug, format!("Slug '{}' is already taken", slug))
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, DomainError> {
        Ok(guard(&self.events)?.iter().find(|e| e.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, DomainError> {
        Ok(guard(&self.events)?.iter().find(|e| e.slug == slug).cloned())
    }

    async fn list(&self, criteria: &EventListCriteria, today: NaiveDate) -> Result<Page<Event>, DomainError> {
        let mut found: Vec<Event> = guard(&self.events)?
            .iter()
            .filter(|e| matches(e, criteria, today))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            let ord = compare(a, b, criteria.sort);
            match criteria.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        Ok(paginate(&found, criteria.page))
    }

    async fn related(&self, event: &Event, limit: i64) -> Result<Vec<Event>, DomainError> {
        let ids = event.category_ids();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(guard(&self.events)?
            .iter()
            .filter(|e| e.id != event.id && e.is_active)
            .filter(|e| e.category_ids().iter().any(|id| ids.contains(id)))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn search(&self, title: Option<&str>, page: PageRequest) -> Result<Page<Event>, DomainError> {
        let needle = title.map(str::to_lowercase);
        let mut found: Vec<Event> = guard(&self.events)?
            .iter()
            .filter(|e| {
                needle
                    .as_deref()
                    .map_or(true, |n| e.title.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(&found, page))
    }

    async fn slug_exists(&self, slug: &str, except: Option<EventId>) -> Result<bool, DomainError> {
        Ok(guard(&self.events)?
            .iter()
            .any(|e| e.slug == slug && Some(e.id) != except))
    }

    async fn create(&self, fields: &EventFields, slug: &str) -> Result<Event, DomainError> {
        let mut events = guard(&self.events)?;
        if events.iter().any(|e| e.slug == slug) {
            return Err(duplicate_slug(slug));
        }
        let next = events.iter().map(|e| e.id.as_i64()).max().unwrap_or(0) + 1;
        let event = self.hydrate(EventId::new(next), fields, slug, Timestamp::now());
        events.push(event.clone());
        Ok(event)
    }

    async fn update(&self, id: EventId, fields: &EventFields, slug: &str) -> Result<Event, DomainError> {
        let mut events = guard(&self.events)?;
        if events.iter().any(|e| e.slug == slug && e.id != id) {
            return Err(duplicate_slug(slug));
        }
        let slot = events.iter_mut().find(|e| e.id == id).ok_or_else(|| not_found(id))?;
        let updated = self.hydrate(id, fields, slug, slot.created_at);
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: EventId) -> Result<(), DomainError> {
        let mut events = guard(&self.events)?;
        let before = events.len();
        events.retain(|e| e.id != id);
        if events.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }
}
