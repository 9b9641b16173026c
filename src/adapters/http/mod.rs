//! HTTP adapters - REST API implementations.
//!
//! Each domain area has its own adapter (dto, handlers, routes); [`api_router`]
//! assembles them behind the shared middleware stack.

pub mod catalog;
pub mod error;
pub mod events;
pub mod middleware;
pub mod notifications;
pub mod payment;
pub mod registration;
pub mod state;
pub mod users;
pub mod webhook;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::ports::RateLimiter;

pub use error::ErrorResponse;
pub use state::AppState;

use self::middleware::{auth_middleware, require_roles, AuthState, BACK_OFFICE_ROLES};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Full application router.
///
/// - `GET /health`
/// - `/api/...` - public pages, registration, account
/// - `/api/payment/...`, `/api/webhook/...`
/// - `/api/admin/...` - back office (admin, editor, manager)
/// - `/payment/:id/process` - test-mode payment link
///
/// `limiter` is `None` when rate limiting is switched off.
pub fn api_router(
    state: AppState,
    sessions: AuthState,
    limiter: Option<Arc<dyn RateLimiter>>,
    server: &ServerConfig,
) -> Router {
    let admin = Router::new()
        .merge(events::admin_event_routes())
        .merge(catalog::admin_catalog_routes())
        .merge(notifications::notification_routes())
        .merge(users::admin_user_read_routes())
        .route_layer(from_fn_with_state(BACK_OFFICE_ROLES, require_roles))
        .merge(users::admin_user_routes());

    let api = Router::new()
        .merge(events::event_routes())
        .merge(registration::registration_routes(limiter.clone()))
        .merge(users::account_routes(limiter))
        .merge(catalog::catalog_routes())
        .nest("/payment", payment::payment_routes())
        .nest("/webhook", webhook::webhook_routes())
        .nest("/admin", admin);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .merge(payment::payment_link_routes())
        .layer(from_fn_with_state(sessions, auth_middleware))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    server.request_timeout_secs,
                )))
                .layer(CompressionLayer::new())
                .layer(cors_layer(server)),
        )
}

/// Configured origins, or any origin when none are set.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, ACCEPT])
        .max_age(Duration::from_secs(60 * 60));

    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(AllowOrigin::list(origins))
    }
}
