//! HTTP adapter for registration.
//!
//! - `POST /api/events/:slug/register`
//! - `POST /api/check-user-email`

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::registration_routes;
