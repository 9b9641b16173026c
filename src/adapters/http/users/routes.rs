//! Axum routes for account and user-management endpoints.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use super::handlers::{
    add_role, create_user, dashboard, delete_me, delete_user, destroy_grant, list_registrations,
    list_users, login, me, my_events, remove_role, show_user, sign_up, store_grant, toggle_grant,
    update_grant, update_me, update_user,
};
use crate::adapters::http::middleware::{
    rate_limit_middleware, require_roles, RateLimitState, ACCESS_MANAGER_ROLES,
};
use crate::adapters::http::state::AppState;
use crate::ports::{RateLimiter, ThrottledForm};

/// Account endpoints, mounted under `/api`.
///
/// - `POST /auth/login` - exchange credentials for a token
/// - `POST /auth/register` - create an account and sign in
/// - `GET|PUT|DELETE /me` - profile with accessible events, edits, deletion
/// - `GET /my-events`, `GET /dashboard` - the user's own events
pub fn account_routes(limiter: Option<Arc<dyn RateLimiter>>) -> Router<AppState> {
    let mut login_routes = Router::new().route("/auth/login", post(login));
    let mut sign_up_routes = Router::new().route("/auth/register", post(sign_up));
    if let Some(limiter) = limiter {
        login_routes = login_routes.route_layer(middleware::from_fn_with_state(
            RateLimitState::new(limiter.clone(), ThrottledForm::Login),
            rate_limit_middleware,
        ));
        sign_up_routes = sign_up_routes.route_layer(middleware::from_fn_with_state(
            RateLimitState::new(limiter, ThrottledForm::Register),
            rate_limit_middleware,
        ));
    }
    login_routes.merge(sign_up_routes).merge(
        Router::new()
            .route("/me", get(me).put(update_me).delete(delete_me))
            .route("/my-events", get(my_events))
            .route("/dashboard", get(dashboard)),
    )
}

/// Read-only user views, mounted under `/api/admin` with the back-office roles.
pub fn admin_user_read_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(show_user))
        .route("/event-registrations", get(list_registrations))
}

/// User management, mounted under `/api/admin`. Admins and managers only.
pub fn admin_user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/:id", put(update_user).delete(delete_user))
        .route("/users/:id/roles", post(add_role))
        .route("/users/:id/roles/:role", delete(remove_role))
        .route("/users/:id/events", post(store_grant))
        .route(
            "/users/:id/events/:event_id",
            put(update_grant).delete(destroy_grant),
        )
        .route("/users/:id/events/:event_id/toggle", post(toggle_grant))
        .route_layer(middleware::from_fn_with_state(ACCESS_MANAGER_ROLES, require_roles))
}
