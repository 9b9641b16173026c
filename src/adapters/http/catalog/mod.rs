//! HTTP adapter for categories, speakers, partners and the medical library.

pub mod handlers;
pub mod routes;

pub use handlers::CatalogApiError;
pub use routes::{admin_catalog_routes, catalog_routes};
