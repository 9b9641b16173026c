//! Axum routes for event endpoints.

use axum::{routing::get, Router};

use super::handlers::{
    create_event, delete_event, get_event, list_events, search_events, show_event, update_event,
    view_event,
};
use crate::adapters::http::state::AppState;

/// Public event pages, mounted under `/api`.
///
/// - `GET /events` - listing with filters
/// - `GET /events/:slug` - event page (optional auth)
/// - `GET /my-events/:slug` - viewing page for users with access
pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/:slug", get(get_event))
        .route("/my-events/:slug", get(view_event))
}

/// Event maintenance, mounted under `/api/admin`.
pub fn admin_event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(search_events).post(create_event))
        .route(
            "/events/:id",
            get(show_event).put(update_event).delete(delete_event),
        )
}
