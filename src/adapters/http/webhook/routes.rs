//! Axum routes for gateway webhooks.

use axum::{routing::post, Router};

use super::handlers::paykeeper_webhook;
use crate::adapters::http::state::AppState;

/// Webhooks, mounted under `/api/webhook`. No user auth; the handler
/// verifies the source address and signature.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/paykeeper", post(paykeeper_webhook))
}
