//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application and the outside world. Adapters implement these ports.
//!
//! ## Persistence
//!
//! - `EventRepository`, `AccessGrantRepository`, `UserRepository`
//! - `PaymentRepository`, `NotificationRepository`
//! - `CatalogRepository` - categories, speakers, partners, library
//! - `RegistrationListing` - back-office registrations table
//!
//! ## Outbound integrations
//!
//! - `PaymentGateway` - PayKeeper invoices
//! - `CrmGateway` - Bitrix24 REST methods
//! - `Mailer` - Sendsay actions
//!
//! ## Security
//!
//! - `SessionValidator`, `TokenIssuer`, `PasswordHasher`
//! - `RateLimiter`

mod access_grant_repository;
mod catalog_repository;
mod credentials;
mod crm_gateway;
mod event_repository;
mod mailer;
mod notification_repository;
mod payment_gateway;
mod payment_repository;
mod rate_limiter;
mod registration_listing;
mod session_validator;
mod user_repository;

pub use access_grant_repository::AccessGrantRepository;
pub use catalog_repository::{
    CatalogQuery, CatalogRepository, CategoryRepository, LibraryRepository, PartnerRepository,
    SpeakerRepository,
};
pub use credentials::{IssuedToken, PasswordHasher, TokenIssuer};
pub use crm_gateway::{CrmGateway, Fields};
pub use event_repository::EventRepository;
pub use mailer::Mailer;
pub use notification_repository::NotificationRepository;
pub use payment_gateway::{Invoice, InvoiceRequest, PaymentGateway};
pub use payment_repository::PaymentRepository;
pub use rate_limiter::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter,
    ThrottledForm,
};
pub use registration_listing::RegistrationListing;
pub use session_validator::SessionValidator;
pub use user_repository::{UserQuery, UserRepository};
