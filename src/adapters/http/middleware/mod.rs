//! HTTP middleware for axum.
//!
//! - `auth` - bearer token validation, role gates and auth extractors
//! - `rate_limit` - per-IP limits for public form endpoints

pub mod auth;
pub mod rate_limit;

pub use auth::{
    auth_middleware, require_roles, ACCESS_MANAGER_ROLES, AuthApiError, AuthRejection, AuthState, OptionalAuth,
    RequireAuth, BACK_OFFICE_ROLES,
};
pub use rate_limit::{extract_client_ip, rate_limit_middleware, RateLimitState};
