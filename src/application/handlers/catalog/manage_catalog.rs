//! ManageCatalogHandler - list, show, create, update and delete catalog records.

use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::domain::catalog::{
    CatalogDraft, CatalogError, Category, CategoryDraft, LibraryDocument, LibraryDocumentDraft,
    Partner, PartnerDraft, Speaker, SpeakerDraft,
};
use crate::domain::foundation::{
    non_empty, CategoryId, DocumentId, Page, PageRequest, PartnerId, SpeakerId,
};
use crate::ports::{CatalogQuery, CatalogRepository};

#[derive(Debug, Clone, Default)]
pub struct ListCatalogQuery {
    pub search: Option<String>,
    pub page: PageRequest,
}

pub struct ManageCatalogHandler<R, D: CatalogDraft, I> {
    repo: Arc<dyn CatalogRepository<R, D::Fields, I>>,
    _draft: PhantomData<fn() -> D>,
}

pub type CategoryCatalog = ManageCatalogHandler<Category, CategoryDraft, CategoryId>;
pub type SpeakerCatalog = ManageCatalogHandler<Speaker, SpeakerDraft, SpeakerId>;
pub type PartnerCatalog = ManageCatalogHandler<Partner, PartnerDraft, PartnerId>;
pub type LibraryCatalog = ManageCatalogHandler<LibraryDocument, LibraryDocumentDraft, DocumentId>;

impl<R, D, I> ManageCatalogHandler<R, D, I>
where
    R: Send + Sync + 'static,
    D: CatalogDraft,
    I: Copy + Display + Send + Sync + 'static,
{
    pub fn new(repo: Arc<dyn CatalogRepository<R, D::Fields, I>>) -> Self {
        Self {
            repo,
            _draft: PhantomData,
        }
    }

    /// Back-office listing, inactive records included.
    pub async fn list(&self, query: ListCatalogQuery) -> Result<Page<R>, CatalogError> {
        self.query(query, false).await
    }

    /// Public listing of active records.
    pub async fn list_public(&self, query: ListCatalogQuery) -> Result<Page<R>, CatalogError> {
        self.query(query, true).await
    }

    pub async fn get(&self, id: I) -> Result<R, CatalogError> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| CatalogError::not_found(D::ENTITY, id))
    }

    pub async fn create(&self, draft: &D) -> Result<R, CatalogError> {
        let fields = draft.validate_fields()?;
        let record = self.repo.create(&fields).await?;
        tracing::info!(entity = D::ENTITY, "Catalog record created");
        Ok(record)
    }

    pub async fn update(&self, id: I, draft: &D) -> Result<R, CatalogError> {
        let fields = draft.validate_fields()?;
        self.get(id).await?;
        let record = self.repo.update(id, &fields).await?;
        tracing::info!(entity = D::ENTITY, id = %id, "Catalog record updated");
        Ok(record)
    }

    pub async fn delete(&self, id: I) -> Result<(), CatalogError> {
        self.get(id).await?;
        self.repo.delete(id).await?;
        tracing::info!(entity = D::ENTITY, id = %id, "Catalog record deleted");
        Ok(())
    }

    async fn query(&self, query: ListCatalogQuery, active_only: bool) -> Result<Page<R>, CatalogError> {
        Ok(self
            .repo
            .list(&CatalogQuery {
                search: non_empty(query.search.as_deref()),
                active_only,
                page: query.page,
            })
            .await?)
    }
}
