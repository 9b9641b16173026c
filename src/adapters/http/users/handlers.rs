//! HTTP handlers for sign-in, the profile page and back-office users.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::adapters::http::error::{error_response, internal_error, validation_response};
use crate::adapters::http::events::PageResponse;
use crate::adapters::http::middleware::{AuthApiError, RequireAuth};
use crate::adapters::http::state::AppState;
use crate::application::handlers::access::{GrantKey, StoreGrantCommand, UpdateGrantCommand};
use crate::application::handlers::users::{LoginCommand, RoleChange, MY_EVENTS_PER_PAGE};
use crate::domain::access::{AccessGrantDraft, AccessGrantError, RegistrationListQuery};
use crate::domain::foundation::{EventId, PageRequest, Role, UserId};
use crate::domain::user::{ProfileDraft, SignupDraft, UserDraft, UserError};
use crate::ports::UserQuery;

use super::dto::{
    DashboardResponse, DeleteAccountRequest, LoginRequest, LoginResponse, MyEventsParams,
    MyEventsResponse, ProfileResponse, RegistrationListResponse, RoleChangeRequest,
    UserListParams,
};

const USERS_PER_PAGE: u32 = 20;

// ════════════════════════════════════════════════════════════════════════════════
// Account
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthApiError> {
    let result = state
        .login_handler()
        .handle(LoginCommand {
            email: request.email,
            password: request.password,
        })
        .await?;
    Ok(Json(LoginResponse::from(result)))
}

/// GET /api/me
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, UserApiError> {
    let profile = state.profile_handler().handle(user.id).await?;
    Ok(Json(ProfileResponse::from(profile)))
}

/// POST /api/auth/register
pub async fn sign_up(
    State(state): State<AppState>,
    Json(draft): Json<SignupDraft>,
) -> Result<impl IntoResponse, UserApiError> {
    let result = state.sign_up_handler().handle(&draft).await?;
    Ok((StatusCode::CREATED, Json(LoginResponse::from(result))))
}

/// PUT /api/me
pub async fn update_me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(draft): Json<ProfileDraft>,
) -> Result<impl IntoResponse, UserApiError> {
    Ok(Json(state.manage_profile_handler().update(user.id, &draft).await?))
}

/// DELETE /api/me
pub async fn delete_me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<DeleteAccountRequest>,
) -> Result<impl IntoResponse, UserApiError> {
    state
        .manage_profile_handler()
        .delete(user.id, &request.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/my-events
pub async fn my_events(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<MyEventsParams>,
) -> Result<impl IntoResponse, UserApiError> {
    let page = PageRequest::new(params.page, None, MY_EVENTS_PER_PAGE);
    let events = state.my_events_handler().list(user.id, page).await?;
    Ok(Json(MyEventsResponse::from(events)))
}

/// GET /api/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, UserApiError> {
    let dashboard = state.my_events_handler().dashboard(user.id).await?;
    Ok(Json(DashboardResponse::from(dashboard)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Back-office users
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> Result<impl IntoResponse, UserApiError> {
    let page = state
        .manage_users_handler()
        .list(UserQuery {
            search: params.search,
            role: params.role,
            page: PageRequest::new(params.page, params.per_page, USERS_PER_PAGE),
        })
        .await?;
    Ok(Json(PageResponse::from_page(page, |user| user)))
}

/// GET /api/admin/users/:id
pub async fn show_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse, UserApiError> {
    Ok(Json(state.manage_users_handler().show(id).await?))
}

/// POST /api/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(draft): Json<UserDraft>,
) -> Result<impl IntoResponse, UserApiError> {
    let user = state.manage_users_handler().create(&draft).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/admin/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(draft): Json<UserDraft>,
) -> Result<impl IntoResponse, UserApiError> {
    Ok(Json(state.manage_users_handler().update(id, &draft).await?))
}

/// DELETE /api/admin/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse, UserApiError> {
    state.manage_users_handler().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/users/:id/roles
pub async fn add_role(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<UserId>,
    Json(request): Json<RoleChangeRequest>,
) -> Result<impl IntoResponse, UserApiError> {
    let user = state
        .manage_users_handler()
        .change_role(&actor, id, RoleChange::Add(request.role))
        .await?;
    Ok(Json(user))
}

/// DELETE /api/admin/users/:id/roles/:role
pub async fn remove_role(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path((id, role)): Path<(UserId, Role)>,
) -> Result<impl IntoResponse, UserApiError> {
    let user = state
        .manage_users_handler()
        .change_role(&actor, id, RoleChange::Remove(role))
        .await?;
    Ok(Json(user))
}

// ════════════════════════════════════════════════════════════════════════════════
// Event access
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/admin/event-registrations
pub async fn list_registrations(
    State(state): State<AppState>,
    Query(query): Query<RegistrationListQuery>,
) -> Result<impl IntoResponse, AccessGrantApiError> {
    let list = state.list_registrations_handler().handle(&query).await?;
    Ok(Json(RegistrationListResponse::from(list)))
}

/// POST /api/admin/users/:id/events
pub async fn store_grant(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(user_id): Path<UserId>,
    Json(draft): Json<AccessGrantDraft>,
) -> Result<impl IntoResponse, AccessGrantApiError> {
    let grant = state
        .access_grants_handler()
        .store(&actor, StoreGrantCommand { user_id, draft })
        .await?;
    Ok((StatusCode::CREATED, Json(grant)))
}

/// PUT /api/admin/users/:id/events/:event_id
pub async fn update_grant(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path((user_id, event_id)): Path<(UserId, EventId)>,
    Json(draft): Json<AccessGrantDraft>,
) -> Result<impl IntoResponse, AccessGrantApiError> {
    let grant = state
        .access_grants_handler()
        .update(
            &actor,
            UpdateGrantCommand {
                key: GrantKey { user_id, event_id },
                draft,
            },
        )
        .await?;
    Ok(Json(grant))
}

/// POST /api/admin/users/:id/events/:event_id/toggle
pub async fn toggle_grant(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path((user_id, event_id)): Path<(UserId, EventId)>,
) -> Result<impl IntoResponse, AccessGrantApiError> {
    let grant = state
        .access_grants_handler()
        .toggle(&actor, GrantKey { user_id, event_id })
        .await?;
    Ok(Json(grant))
}

/// DELETE /api/admin/users/:id/events/:event_id
pub async fn destroy_grant(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path((user_id, event_id)): Path<(UserId, EventId)>,
) -> Result<impl IntoResponse, AccessGrantApiError> {
    state
        .access_grants_handler()
        .destroy(&actor, GrantKey { user_id, event_id })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct UserApiError(UserError);

impl From<UserError> for UserApiError {
    fn from(err: UserError) -> Self {
        Self(err)
    }
}

impl IntoResponse for UserApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            UserError::Validation(err) => validation_response(err),
            UserError::Infrastructure(cause) => internal_error(cause),
            err => error_response(err.code(), err.to_string()),
        }
    }
}

#[derive(Debug)]
pub struct AccessGrantApiError(AccessGrantError);

impl From<AccessGrantError> for AccessGrantApiError {
    fn from(err: AccessGrantError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AccessGrantApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            AccessGrantError::Validation(err) => validation_response(err),
            AccessGrantError::Infrastructure(cause) => internal_error(cause),
            err => error_response(err.code(), err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ValidationError;

    #[test]
    fn duplicate_email_is_409() {
        let response = UserApiError(UserError::DuplicateEmail).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn user_forbidden_is_403() {
        let response = UserApiError(UserError::Forbidden).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn user_validation_is_422() {
        let err = UserError::Validation(ValidationError::empty_field("email"));
        assert_eq!(
            UserApiError(err).into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn grant_errors_map_to_statuses() {
        let cases = [
            (AccessGrantError::AlreadyGranted, StatusCode::CONFLICT),
            (AccessGrantError::NotFound, StatusCode::NOT_FOUND),
            (AccessGrantError::UserNotFound("9".into()), StatusCode::NOT_FOUND),
            (AccessGrantError::EventNotFound("4".into()), StatusCode::NOT_FOUND),
            (AccessGrantError::Forbidden, StatusCode::FORBIDDEN),
            (AccessGrantError::Infrastructure("db".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(AccessGrantApiError(err).into_response().status(), status);
        }
    }
}
