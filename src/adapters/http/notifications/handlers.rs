//! HTTP handlers for the back-office notification inbox.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::adapters::http::error::{error_response, internal_error};
use crate::adapters::http::events::PageResponse;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::domain::foundation::{NotificationId, PageRequest};
use crate::domain::notification::NotificationError;

const PER_PAGE: u32 = 20;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Body for bulk operations.
#[derive(Debug, Clone, Serialize)]
pub struct AffectedResponse {
    pub success: bool,
    pub affected: u64,
}

/// GET /api/admin/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Query(params): Query<NotificationListParams>,
) -> Result<impl IntoResponse, NotificationApiError> {
    let page = state
        .notifications_handler()
        .list(&actor, PageRequest::new(params.page, params.per_page, PER_PAGE))
        .await?;
    Ok(Json(PageResponse::from_page(page, |n| n)))
}

/// POST /api/admin/notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<NotificationId>,
) -> Result<impl IntoResponse, NotificationApiError> {
    Ok(Json(state.notifications_handler().mark_read(&actor, id).await?))
}

/// POST /api/admin/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
) -> Result<impl IntoResponse, NotificationApiError> {
    let affected = state.notifications_handler().mark_all_read(&actor).await?;
    Ok(Json(AffectedResponse {
        success: true,
        affected,
    }))
}

/// DELETE /api/admin/notifications/:id
pub async fn delete_notification(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<NotificationId>,
) -> Result<impl IntoResponse, NotificationApiError> {
    state.notifications_handler().delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/admin/notifications
pub async fn clear_notifications(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
) -> Result<impl IntoResponse, NotificationApiError> {
    let affected = state.notifications_handler().clear(&actor).await?;
    Ok(Json(AffectedResponse {
        success: true,
        affected,
    }))
}

#[derive(Debug)]
pub struct NotificationApiError(NotificationError);

impl From<NotificationError> for NotificationApiError {
    fn from(err: NotificationError) -> Self {
        Self(err)
    }
}

impl IntoResponse for NotificationApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            NotificationError::Infrastructure(cause) => internal_error(cause),
            err => error_response(err.code(), err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_errors_map_to_statuses() {
        assert_eq!(
            NotificationApiError(NotificationError::NotFound).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            NotificationApiError(NotificationError::Forbidden).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            NotificationApiError(NotificationError::Infrastructure("db".into()))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
