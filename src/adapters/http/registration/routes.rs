//! Axum routes for registration endpoints.

use std::sync::Arc;

use axum::{middleware, routing::post, Router};

use super::handlers::{check_user_email, register};
use crate::adapters::http::middleware::{rate_limit_middleware, RateLimitState};
use crate::adapters::http::state::AppState;
use crate::ports::{RateLimiter, ThrottledForm};

/// Registration endpoints, mounted under `/api`.
///
/// - `POST /events/:slug/register` - register (optional auth)
/// - `POST /check-user-email` - does the email have an account
///
/// With a limiter, each endpoint counts against its own per-IP budget.
pub fn registration_routes(limiter: Option<Arc<dyn RateLimiter>>) -> Router<AppState> {
    let mut register_routes = Router::new().route("/events/:slug/register", post(register));
    let mut email_routes = Router::new().route("/check-user-email", post(check_user_email));

    if let Some(limiter) = limiter {
        register_routes = register_routes.route_layer(middleware::from_fn_with_state(
            RateLimitState::new(limiter.clone(), ThrottledForm::Register),
            rate_limit_middleware,
        ));
        email_routes = email_routes.route_layer(middleware::from_fn_with_state(
            RateLimitState::new(limiter, ThrottledForm::CheckEmail),
            rate_limit_middleware,
        ));
    }

    register_routes.merge(email_routes)
}
