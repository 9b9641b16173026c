//! Axum routes for catalog endpoints.

use axum::{routing::get, Router};

use super::handlers::{
    create, destroy, list, list_public, show, update, CatalogResource, Categories, Library,
    Partners, Speakers,
};
use crate::adapters::http::state::AppState;

/// Public listings, mounted under `/api`.
///
/// - `GET /categories` - active categories
/// - `GET /documents` - the medical library
/// - `GET /documents/:id` - one library document
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_public::<Categories>))
        .route("/documents", get(list_public::<Library>))
        .route("/documents/:id", get(show::<Library>))
}

/// Back-office CRUD for every catalog, mounted under `/api/admin`.
pub fn admin_catalog_routes() -> Router<AppState> {
    Router::new()
        .merge(crud::<Categories>("/categories"))
        .merge(crud::<Speakers>("/speakers"))
        .merge(crud::<Partners>("/partners"))
        .merge(crud::<Library>("/library"))
}

fn crud<K: CatalogResource>(base: &str) -> Router<AppState> {
    Router::new()
        .route(base, get(list::<K>).post(create::<K>))
        .route(
            &format!("{}/:id", base),
            get(show::<K>).put(update::<K>).delete(destroy::<K>),
        )
}
