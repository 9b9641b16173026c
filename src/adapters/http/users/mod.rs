//! HTTP adapter for accounts, back-office users and their event access.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{AccessGrantApiError, UserApiError};
pub use routes::{account_routes, admin_user_read_routes, admin_user_routes};
