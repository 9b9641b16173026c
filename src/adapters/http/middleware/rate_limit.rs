//! Rate limiting middleware for axum.
//!
//! Public forms (registration, the email check, login) are limited per client
//! IP and form, behind a service-wide ceiling that is checked first.
//!
//! Rate limit status is returned in standard HTTP headers:
//! - `X-RateLimit-Limit`: Maximum requests allowed in the window
//! - `X-RateLimit-Remaining`: Requests remaining in the current window
//! - `X-RateLimit-Reset`: Unix timestamp when the window resets
//! - `Retry-After`: Seconds to wait (only on 429 response)
//!
//! # Example
//!
//! ```ignore
//! let state = RateLimitState::new(limiter, ThrottledForm::Register);
//! let routes = Router::new()
//!     .route("/events/:slug/register", post(register))
//!     .route_layer(middleware::from_fn_with_state(state, rate_limit_middleware));
//! ```

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::ports::{RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter, ThrottledForm};

/// Standard rate limit header names.
pub mod headers {
    use super::HeaderName;

    pub static X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
    pub static X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
    pub static X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");
}

/// Limiter plus the form it counts against.
#[derive(Clone)]
pub struct RateLimitState {
    limiter: Arc<dyn RateLimiter>,
    form: ThrottledForm,
}

impl RateLimitState {
    pub fn new(limiter: Arc<dyn RateLimiter>, form: ThrottledForm) -> Self {
        Self { limiter, form }
    }
}

/// Checks the global and per-IP limits for the state's form.
///
/// A limiter failure lets the request through.
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    match state.limiter.check(RateLimitKey::Global).await {
        Ok(RateLimitResult::Denied(denied)) => {
            return rate_limit_response(denied.limit, denied.retry_after_secs);
        }
        Err(e) => tracing::warn!("Rate limiter unavailable: {}", e),
        Ok(RateLimitResult::Allowed(_)) => {}
    }

    let ip = extract_client_ip(request.headers(), connect_info.map(|ci| ci.0))
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let status = match state
        .limiter
        .check(RateLimitKey::form(ip.clone(), state.form))
        .await
    {
        Ok(RateLimitResult::Denied(denied)) => {
            tracing::info!(ip = %ip, form = %state.form, "Rate limit exceeded");
            return rate_limit_response(denied.limit, denied.retry_after_secs);
        }
        Ok(RateLimitResult::Allowed(status)) => Some(status),
        Err(e) => {
            tracing::warn!("Rate limiter unavailable for IP check: {}", e);
            None
        }
    };

    let mut response = next.run(request).await;
    if let Some(status) = status {
        add_rate_limit_headers(response.headers_mut(), &status);
    }
    response
}

/// Client address: `X-Forwarded-For` first hop, then `X-Real-IP`, then the socket.
///
/// Header values that do not parse as an address are skipped.
pub fn extract_client_ip(headers: &HeaderMap, socket: Option<SocketAddr>) -> Option<IpAddr> {
    let forwarded = headers
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|first| first.trim().parse().ok());
    if forwarded.is_some() {
        return forwarded;
    }

    let real_ip = headers
        .get("X-Real-IP")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.trim().parse().ok());
    if real_ip.is_some() {
        return real_ip;
    }

    socket.map(|addr| addr.ip())
}

/// Create a 429 Too Many Requests response.
fn rate_limit_response(limit: u32, retry_after_secs: u32) -> Response {
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(serde_json::json!({
            "success": false,
            "message": "Слишком много запросов. Попробуйте позже.",
            "error_code": "RATE_LIMIT_EXCEEDED",
            "retry_after_secs": retry_after_secs
        })),
    )
        .into_response();

    let headers = response.headers_mut();
    headers.insert(headers::X_RATELIMIT_LIMIT.clone(), HeaderValue::from(limit));
    headers.insert(headers::X_RATELIMIT_REMAINING.clone(), HeaderValue::from(0u32));
    headers.insert(axum::http::header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
    response
}

fn add_rate_limit_headers(headers: &mut HeaderMap, status: &RateLimitStatus) {
    headers.insert(headers::X_RATELIMIT_LIMIT.clone(), HeaderValue::from(status.limit));
    headers.insert(
        headers::X_RATELIMIT_REMAINING.clone(),
        HeaderValue::from(status.remaining),
    );
    headers.insert(
        headers::X_RATELIMIT_RESET.clone(),
        HeaderValue::from(status.reset_at.as_unix_secs()),
    );
}
