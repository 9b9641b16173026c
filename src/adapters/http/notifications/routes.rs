//! Axum routes for the notification inbox.

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::{
    clear_notifications, delete_notification, list_notifications, mark_all_read, mark_read,
};
use crate::adapters::http::state::AppState;

/// Inbox endpoints, mounted under `/api/admin`.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(list_notifications).delete(clear_notifications),
        )
        .route("/notifications/read-all", post(mark_all_read))
        .route("/notifications/:id", delete(delete_notification))
        .route("/notifications/:id/read", post(mark_read))
}
