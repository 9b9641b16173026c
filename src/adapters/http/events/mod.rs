//! HTTP adapter for events.
//!
//! - `GET /api/events` - listing
//! - `GET /api/events/:slug` - event page
//! - `GET /api/my-events/:slug` - viewing page for registered users
//! - `/api/admin/events` - back-office CRUD

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{EventResponse, PageResponse};
pub use handlers::EventApiError;
pub use routes::{admin_event_routes, event_routes};
