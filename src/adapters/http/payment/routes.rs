//! Axum routes for payment endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    cancel_payment, create_payment, payment_callback, payment_status, process_test_payment,
};
use crate::adapters::http::state::AppState;

/// Payment endpoints, mounted under `/api/payment`.
///
/// - `POST /events/:slug/create` - payment link for a paid event (auth)
/// - `GET /:id/status` - status, refreshed from the gateway (token or owner)
/// - `POST /:id/cancel` - cancel a pending payment (owner)
/// - `GET /:id/process?token=` - complete a test payment
/// - `POST /callback` - test-system callback
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/events/:slug/create", post(create_payment))
        .route("/:id/status", get(payment_status))
        .route("/:id/cancel", post(cancel_payment))
        .route("/:id/process", get(process_test_payment))
        .route("/callback", post(payment_callback))
}

/// `GET /payment/:id/process`, the target of signed test-payment links.
pub fn payment_link_routes() -> Router<AppState> {
    Router::new().route("/payment/:id/process", get(process_test_payment))
}
