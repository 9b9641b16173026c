//! Generic in-memory catalog table.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::Mutex;

use super::{guard, paginate};
use crate::domain::catalog::{
    Category, CategoryFields, LibraryDocument, LibraryDocumentFields, Partner, PartnerFields,
    Speaker, SpeakerFields,
};
use crate::domain::foundation::{
    CategoryId, DocumentId, DomainError, ErrorCode, Page, PartnerId, SpeakerId, Timestamp,
};
use crate::ports::{CatalogQuery, CatalogRepository};

/// What the in-memory table needs to know about a record type.
pub trait CatalogRecord: Clone + Send + Sync + 'static {
    type Id: Copy + Eq + Send + Sync + std::fmt::Display + From<i64> + 'static;
    type Fields: Send + Sync + 'static;

    const ENTITY: &'static str;

    fn id(&self) -> Self::Id;
    fn raw_id(&self) -> i64;
    fn build(id: Self::Id, fields: &Self::Fields, created_at: Timestamp, now: Timestamp) -> Self;
    fn created_at(&self) -> Timestamp;

    /// Case-insensitive match against the lowercased needle.
    fn matches(&self, needle: &str) -> bool;

    fn is_active(&self) -> bool {
        true
    }

    fn slug(&self) -> Option<&str> {
        None
    }

    fn fields_slug(_fields: &Self::Fields) -> Option<&str> {
        None
    }

    /// Listing order; newest first unless the record has a manual order.
    fn order(a: &Self, b: &Self) -> Ordering {
        b.created_at().cmp(&a.created_at()).then(b.raw_id().cmp(&a.raw_id()))
    }
}

pub struct InMemoryCatalog<R> {
    records: Mutex<Vec<R>>,
}

impl<R> Default for InMemoryCatalog<R> {
    fn default() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }
}

impl<R: CatalogRecord> InMemoryCatalog<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, record: R) -> Self {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
        self
    }

    fn missing(id: R::Id) -> DomainError {
        DomainError::new(ErrorCode::NotFound, format!("{} {} not found", R::ENTITY, id))
    }

    fn check_slug(records: &[R], fields: &R::Fields, except: Option<R::Id>) -> Result<(), DomainError> {
        if let Some(slug) = R::fields_slug(fields) {
            if records
                .iter()
                .any(|r| r.slug() == Some(slug) && Some(r.id()) != except)
            {
                return Err(DomainError::new(ErrorCode::DuplicateSlug, slug));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<R: CatalogRecord> CatalogRepository<R, R::Fields, R::Id> for InMemoryCatalog<R> {
    async fn list(&self, query: &CatalogQuery) -> Result<Page<R>, DomainError> {
        let needle = query.search.as_deref().map(str::to_lowercase);
        let mut found: Vec<R> = guard(&self.records)?
            .iter()
            .filter(|r| !query.active_only || r.is_active())
            .filter(|r| needle.as_deref().map_or(true, |n| r.matches(n)))
            .cloned()
            .collect();
        found.sort_by(R::order);
        Ok(paginate(&found, query.page))
    }

    async fn find(&self, id: R::Id) -> Result<Option<R>, DomainError> {
        Ok(guard(&self.records)?.iter().find(|r| r.id() == id).cloned())
    }

    async fn create(&self, fields: &R::Fields) -> Result<R, DomainError> {
        let mut records = guard(&self.records)?;
        Self::check_slug(&records, fields, None)?;
        let next = records.iter().map(R::raw_id).max().unwrap_or(0) + 1;
        let now = Timestamp::now();
        let record = R::build(R::Id::from(next), fields, now, now);
        records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: R::Id, fields: &R::Fields) -> Result<R, DomainError> {
        let mut records = guard(&self.records)?;
        Self::check_slug(&records, fields, Some(id))?;
        let slot = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| Self::missing(id))?;
        let updated = R::build(id, fields, slot.created_at(), Timestamp::now());
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: R::Id) -> Result<(), DomainError> {
        let mut records = guard(&self.records)?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(Self::missing(id));
        }
        Ok(())
    }
}

fn contains(value: &str, needle: &str) -> bool {
    value.to_lowercase().contains(needle)
}

fn by_manual_order(sort: (i32, i32), name: (&str, &str)) -> Ordering {
    sort.0.cmp(&sort.1).then_with(|| name.0.cmp(name.1))
}

impl CatalogRecord for Category {
    type Id = CategoryId;
    type Fields = CategoryFields;
    const ENTITY: &'static str = "Category";

    fn id(&self) -> CategoryId {
        self.id
    }

    fn raw_id(&self) -> i64 {
        self.id.as_i64()
    }

    fn build(id: CategoryId, f: &CategoryFields, created_at: Timestamp, now: Timestamp) -> Self {
        Category {
            id,
            name: f.name.clone(),
            slug: f.slug.clone(),
            description: f.description.clone(),
            is_active: f.is_active,
            sort_order: f.sort_order,
            created_at,
            updated_at: now,
        }
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn matches(&self, needle: &str) -> bool {
        contains(&self.name, needle)
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn slug(&self) -> Option<&str> {
        Some(&self.slug)
    }

    fn fields_slug(fields: &CategoryFields) -> Option<&str> {
        Some(&fields.slug)
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        by_manual_order((a.sort_order, b.sort_order), (&a.name, &b.name))
    }
}

impl CatalogRecord for Speaker {
    type Id = SpeakerId;
    type Fields = SpeakerFields;
    const ENTITY: &'static str = "Speaker";

    fn id(&self) -> SpeakerId {
        self.id
    }

    fn raw_id(&self) -> i64 {
        self.id.as_i64()
    }

    fn build(id: SpeakerId, f: &SpeakerFields, created_at: Timestamp, now: Timestamp) -> Self {
        Speaker {
            id,
            first_name: f.first_name.clone(),
            last_name: f.last_name.clone(),
            middle_name: f.middle_name.clone(),
            photo: f.photo.clone(),
            regalia: f.regalia.clone(),
            description: f.description.clone(),
            position: f.position.clone(),
            company: f.company.clone(),
            is_active: f.is_active,
            sort_order: f.sort_order,
            created_at,
            updated_at: now,
        }
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn matches(&self, needle: &str) -> bool {
        contains(&self.full_name(), needle)
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        by_manual_order((a.sort_order, b.sort_order), (&a.last_name, &b.last_name))
    }
}

impl CatalogRecord for Partner {
    type Id = PartnerId;
    type Fields = PartnerFields;
    const ENTITY: &'static str = "Partner";

    fn id(&self) -> PartnerId {
        self.id
    }

    fn raw_id(&self) -> i64 {
        self.id.as_i64()
    }

    fn build(id: PartnerId, f: &PartnerFields, created_at: Timestamp, now: Timestamp) -> Self {
        Partner {
            id,
            name: f.name.clone(),
            description: f.description.clone(),
            logo_path: f.logo_path.clone(),
            website_url: f.website_url.clone(),
            created_at,
            updated_at: now,
        }
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn matches(&self, needle: &str) -> bool {
        contains(&self.name, needle)
    }
}

impl CatalogRecord for LibraryDocument {
    type Id = DocumentId;
    type Fields = LibraryDocumentFields;
    const ENTITY: &'static str = "Document";

    fn id(&self) -> DocumentId {
        self.id
    }

    fn raw_id(&self) -> i64 {
        self.id.as_i64()
    }

    fn build(id: DocumentId, f: &LibraryDocumentFields, created_at: Timestamp, now: Timestamp) -> Self {
        LibraryDocument {
            id,
            title: f.title.clone(),
            description: f.description.clone(),
            file_path: f.file_path.clone(),
            image_path: f.image_path.clone(),
            publication_date: f.publication_date,
            language: f.language,
            created_at,
            updated_at: now,
        }
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn matches(&self, needle: &str) -> bool {
        contains(&self.title, needle)
            || self.description.as_deref().map_or(false, |d| contains(d, needle))
    }
}
