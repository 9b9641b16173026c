//! HTTP handlers for catalog records.
//!
//! Generic over [`CatalogResource`]: each catalog picks its handler out of
//! [`AppState`] and the same functions serve all four.

use std::fmt::Display;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::adapters::http::error::{error_response, internal_error, validation_response};
use crate::adapters::http::events::PageResponse;
use crate::adapters::http::state::AppState;
use crate::application::handlers::catalog::{ListCatalogQuery, ManageCatalogHandler};
use crate::domain::catalog::{
    CatalogDraft, CatalogError, Category, CategoryDraft, LibraryDocument, LibraryDocumentDraft,
    Partner, PartnerDraft, Speaker, SpeakerDraft,
};
use crate::domain::foundation::{CategoryId, DocumentId, PageRequest, PartnerId, SpeakerId};

const ADMIN_PER_PAGE: u32 = 20;
const PUBLIC_PER_PAGE: u32 = 12;

/// A catalog exposed over HTTP.
pub trait CatalogResource: Send + Sync + 'static {
    type Record: Serialize + Send + Sync + 'static;
    type Draft: CatalogDraft + DeserializeOwned + 'static;
    type Id: Copy + Display + DeserializeOwned + Send + Sync + 'static;

    fn catalog(state: &AppState) -> ManageCatalogHandler<Self::Record, Self::Draft, Self::Id>;
}

pub struct Categories;
pub struct Speakers;
pub struct Partners;
pub struct Library;

impl CatalogResource for Categories {
    type Record = Category;
    type Draft = CategoryDraft;
    type Id = CategoryId;

    fn catalog(state: &AppState) -> ManageCatalogHandler<Category, CategoryDraft, CategoryId> {
        state.category_catalog()
    }
}

impl CatalogResource for Speakers {
    type Record = Speaker;
    type Draft = SpeakerDraft;
    type Id = SpeakerId;

    fn catalog(state: &AppState) -> ManageCatalogHandler<Speaker, SpeakerDraft, SpeakerId> {
        state.speaker_catalog()
    }
}

impl CatalogResource for Partners {
    type Record = Partner;
    type Draft = PartnerDraft;
    type Id = PartnerId;

    fn catalog(state: &AppState) -> ManageCatalogHandler<Partner, PartnerDraft, PartnerId> {
        state.partner_catalog()
    }
}

impl CatalogResource for Library {
    type Record = LibraryDocument;
    type Draft = LibraryDocumentDraft;
    type Id = DocumentId;

    fn catalog(
        state: &AppState,
    ) -> ManageCatalogHandler<LibraryDocument, LibraryDocumentDraft, DocumentId> {
        state.library_catalog()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogListParams {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl CatalogListParams {
    fn into_query(self, default_per_page: u32) -> ListCatalogQuery {
        ListCatalogQuery {
            search: self.search,
            page: PageRequest::new(self.page, self.per_page, default_per_page),
        }
    }
}

/// GET /api/categories, /api/documents
pub async fn list_public<K: CatalogResource>(
    State(state): State<AppState>,
    Query(params): Query<CatalogListParams>,
) -> Result<impl IntoResponse, CatalogApiError> {
    let page = K::catalog(&state)
        .list_public(params.into_query(PUBLIC_PER_PAGE))
        .await?;
    Ok(Json(PageResponse::from_page(page, |record| record)))
}

/// GET /api/admin/{catalog}
pub async fn list<K: CatalogResource>(
    State(state): State<AppState>,
    Query(params): Query<CatalogListParams>,
) -> Result<impl IntoResponse, CatalogApiError> {
    let page = K::catalog(&state)
        .list(params.into_query(ADMIN_PER_PAGE))
        .await?;
    Ok(Json(PageResponse::from_page(page, |record| record)))
}

/// GET /api/admin/{catalog}/:id, /api/documents/:id
pub async fn show<K: CatalogResource>(
    State(state): State<AppState>,
    Path(id): Path<K::Id>,
) -> Result<impl IntoResponse, CatalogApiError> {
    Ok(Json(K::catalog(&state).get(id).await?))
}

/// POST /api/admin/{catalog}
pub async fn create<K: CatalogResource>(
    State(state): State<AppState>,
    Json(draft): Json<K::Draft>,
) -> Result<impl IntoResponse, CatalogApiError> {
    let record = K::catalog(&state).create(&draft).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/admin/{catalog}/:id
pub async fn update<K: CatalogResource>(
    State(state): State<AppState>,
    Path(id): Path<K::Id>,
    Json(draft): Json<K::Draft>,
) -> Result<impl IntoResponse, CatalogApiError> {
    Ok(Json(K::catalog(&state).update(id, &draft).await?))
}

/// DELETE /api/admin/{catalog}/:id
pub async fn destroy<K: CatalogResource>(
    State(state): State<AppState>,
    Path(id): Path<K::Id>,
) -> Result<impl IntoResponse, CatalogApiError> {
    K::catalog(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct CatalogApiError(CatalogError);

impl From<CatalogError> for CatalogApiError {
    fn from(err: CatalogError) -> Self {
        Self(err)
    }
}

impl IntoResponse for CatalogApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            CatalogError::Validation(err) => validation_response(err),
            CatalogError::Infrastructure(cause) => internal_error(cause),
            err => error_response(err.code(), err.to_string()),
        }
    }
}
