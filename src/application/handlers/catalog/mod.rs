//! Catalog handlers.
//!
//! One generic handler serves categories, speakers, partners and the
//! medical library, in the back office and on the public listings.

mod manage_catalog;

pub use manage_catalog::{
    CategoryCatalog, LibraryCatalog, ListCatalogQuery, ManageCatalogHandler, PartnerCatalog,
    SpeakerCatalog,
};
