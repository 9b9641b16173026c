//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresEventRepository` - events with their categories and speakers
//! - `PostgresUserRepository` - accounts and roles
//! - `PostgresAccessGrantRepository` - the event/user access pivot
//! - `PostgresPaymentRepository` - payment records
//! - `PostgresNotificationRepository` - back-office inbox
//! - `PostgresRegistrationListing` - grants joined with users and events
//! - Catalog repositories for categories, speakers, partners and documents

mod access_grant_repository;
mod catalog_repository;
mod event_repository;
mod notification_repository;
mod payment_repository;
mod registration_listing;
mod support;
mod user_repository;

pub use access_grant_repository::PostgresAccessGrantRepository;
pub use catalog_repository::{
    PostgresCategoryRepository, PostgresLibraryRepository, PostgresPartnerRepository,
    PostgresSpeakerRepository,
};
pub use event_repository::PostgresEventRepository;
pub use notification_repository::PostgresNotificationRepository;
pub use payment_repository::PostgresPaymentRepository;
pub use registration_listing::PostgresRegistrationListing;
pub use user_repository::PostgresUserRepository;
