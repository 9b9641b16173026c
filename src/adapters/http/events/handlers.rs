//! HTTP handlers for public event pages and event maintenance.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::adapters::http::error::{error_response, internal_error, validation_response};
use crate::adapters::http::middleware::{OptionalAuth, RequireAuth};
use crate::adapters::http::state::AppState;
use crate::application::handlers::events::{
    GetEventQuery, ListEventsQuery, SaveEventCommand, SearchEventsQuery, ViewEventQuery,
};
use crate::domain::event::{EventDraft, EventError, EventListQuery};
use crate::domain::foundation::{EventId, PageRequest};

use super::dto::{
    AdminEventSearchParams, EventDetailResponse, EventResponse, EventViewResponse, PageResponse,
    ViewEventParams,
};

const ADMIN_PER_PAGE: u32 = 20;

// ════════════════════════════════════════════════════════════════════════════════
// Public
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/events
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventListQuery>,
) -> Result<impl IntoResponse, EventApiError> {
    let page = state
        .list_events_handler()
        .handle(ListEventsQuery { params })
        .await?;
    Ok(Json(PageResponse::from_page(page, EventResponse::from)))
}

/// GET /api/events/:slug
pub async fn get_event(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, EventApiError> {
    let detail = state
        .get_event_handler()
        .handle(GetEventQuery {
            slug,
            viewer: user.map(|u| u.id),
        })
        .await?;
    Ok(Json(EventDetailResponse::from(detail)))
}

/// GET /api/my-events/:slug
pub async fn view_event(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(slug): Path<String>,
    Query(params): Query<ViewEventParams>,
) -> Result<impl IntoResponse, EventApiError> {
    let view = state
        .view_event_handler()
        .handle(ViewEventQuery {
            slug,
            user_id: user.id,
            size: params.size,
        })
        .await?;
    Ok(Json(EventViewResponse::from(view)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Back office
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/admin/events
pub async fn search_events(
    State(state): State<AppState>,
    Query(params): Query<AdminEventSearchParams>,
) -> Result<impl IntoResponse, EventApiError> {
    let page = state
        .manage_events_handler()
        .search(SearchEventsQuery {
            title: params.title,
            page: PageRequest::new(params.page, params.per_page, ADMIN_PER_PAGE),
        })
        .await?;
    Ok(Json(PageResponse::from_page(page, EventResponse::from)))
}

/// GET /api/admin/events/:id
pub async fn show_event(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<impl IntoResponse, EventApiError> {
    let event = state.manage_events_handler().get(id).await?;
    Ok(Json(EventResponse::from(event)))
}

/// POST /api/admin/events
pub async fn create_event(
    State(state): State<AppState>,
    Json(draft): Json<EventDraft>,
) -> Result<impl IntoResponse, EventApiError> {
    let event = state
        .manage_events_handler()
        .save(SaveEventCommand { id: None, draft })
        .await?;
    tracing::info!(event_id = %event.id, slug = %event.slug, "Event created");
    Ok((StatusCode::CREATED, Json(EventResponse::from(event))))
}

/// PUT /api/admin/events/:id
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
    Json(draft): Json<EventDraft>,
) -> Result<impl IntoResponse, EventApiError> {
    let event = state
        .manage_events_handler()
        .save(SaveEventCommand {
            id: Some(id),
            draft,
        })
        .await?;
    Ok(Json(EventResponse::from(event)))
}

/// DELETE /api/admin/events/:id
pub async fn delete_event(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<EventId>,
) -> Result<impl IntoResponse, EventApiError> {
    state.manage_events_handler().delete(id).await?;
    tracing::info!(event_id = %id, actor = %user.id, "Event deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error wrapper for event failures.
#[derive(Debug)]
pub struct EventApiError(EventError);

impl From<EventError> for EventApiError {
    fn from(err: EventError) -> Self {
        Self(err)
    }
}

impl IntoResponse for EventApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            EventError::Validation(err) => validation_response(err),
            EventError::Infrastructure(cause) => internal_error(cause),
            err => error_response(err.code(), err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ValidationError;

    #[test]
    fn not_found_maps_to_404() {
        let response = EventApiError(EventError::NotFound("x".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn not_registered_maps_to_403() {
        let response = EventApiError(EventError::NotRegistered).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn validation_maps_to_422() {
        let err = EventError::Validation(ValidationError::empty_field("title"));
        assert_eq!(EventApiError(err).into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn duplicate_slug_maps_to_409() {
        let response = EventApiError(EventError::DuplicateSlug("cardio".into())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn infrastructure_maps_to_500() {
        let response = EventApiError(EventError::Infrastructure("db".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
