//! HTTP adapter for gateway webhooks.
//!
//! - `POST /api/webhook/paykeeper` - form-encoded payment notification

pub mod handlers;
pub mod routes;

pub use routes::webhook_routes;
