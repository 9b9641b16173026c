//! Event repository port.
//!
//! Reads back full aggregates with their categories and speakers. Writes take
//! validated [`EventFields`] plus the slug chosen by the caller.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::event::{Event, EventFields, EventListCriteria};
use crate::domain::foundation::{DomainError, EventId, Page, PageRequest};

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, DomainError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, DomainError>;

    /// Public listing. Only active events are returned; `today` anchors the
    /// upcoming/archive split.
    async fn list(
        &self,
        criteria: &EventListCriteria,
        today: NaiveDate,
    ) -> Result<Page<Event>, DomainError>;

    /// Active events other than `event` sharing one of its categories.
    async fn related(&self, event: &Event, limit: i64) -> Result<Vec<Event>, DomainError>;

    /// Back-office listing, newest first, optionally filtered by title.
    async fn search(&self, title: Option<&str>, page: PageRequest) -> Result<Page<Event>, DomainError>;

    async fn slug_exists(&self, slug: &str, except: Option<EventId>) -> Result<bool, DomainError>;

    /// # Errors
    ///
    /// - `DuplicateSlug` when the slug is taken
    async fn create(&self, fields: &EventFields, slug: &str) -> Result<Event, DomainError>;

    /// # Errors
    ///
    /// - `EventNotFound` when the event does not exist
    /// - `DuplicateSlug` when the slug is taken
    async fn update(&self, id: EventId, fields: &EventFields, slug: &str) -> Result<Event, DomainError>;

    async fn delete(&self, id: EventId) -> Result<(), DomainError>;
}
