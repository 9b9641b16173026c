//! HTTP adapter for payments.
//!
//! - `POST /api/payment/events/:slug/create`
//! - `GET /api/payment/:id/status`
//! - `POST /api/payment/:id/cancel`
//! - `GET /api/payment/:id/process?token=`
//! - `POST /api/payment/callback`

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::{payment_link_routes, payment_routes};
