//! Catalog repository port.
//!
//! Categories, speakers, partners and library documents share one CRUD
//! shape, so a single generic trait covers them.

use async_trait::async_trait;

use crate::domain::catalog::{
    Category, CategoryFields, LibraryDocument, LibraryDocumentFields, Partner, PartnerFields,
    Speaker, SpeakerFields,
};
use crate::domain::foundation::{
    CategoryId, DocumentId, DomainError, Page, PageRequest, PartnerId, SpeakerId,
};

#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub search: Option<String>,
    /// Hides inactive records where the entity has an `is_active` flag.
    pub active_only: bool,
    pub page: PageRequest,
}

#[async_trait]
pub trait CatalogRepository<R, F, I>: Send + Sync
where
    R: Send + Sync + 'static,
    F: Send + Sync + 'static,
    I: Send + Sync + Copy + 'static,
{
    async fn list(&self, query: &CatalogQuery) -> Result<Page<R>, DomainError>;

    async fn find(&self, id: I) -> Result<Option<R>, DomainError>;

    async fn create(&self, fields: &F) -> Result<R, DomainError>;

    /// # Errors
    ///
    /// - `NotFound` when the record does not exist
    async fn update(&self, id: I, fields: &F) -> Result<R, DomainError>;

    /// # Errors
    ///
    /// - `NotFound` when the record does not exist
    async fn delete(&self, id: I) -> Result<(), DomainError>;
}

pub type CategoryRepository = dyn CatalogRepository<Category, CategoryFields, CategoryId>;
pub type SpeakerRepository = dyn CatalogRepository<Speaker, SpeakerFields, SpeakerId>;
pub type PartnerRepository = dyn CatalogRepository<Partner, PartnerFields, PartnerId>;
pub type LibraryRepository =
    dyn CatalogRepository<LibraryDocument, LibraryDocumentFields, DocumentId>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_repositories_are_object_safe() {
        fn _accepts_dyn(
            _c: &CategoryRepository,
            _s: &SpeakerRepository,
            _p: &PartnerRepository,
            _l: &LibraryRepository,
        ) {
        }
    }
}
