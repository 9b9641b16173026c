//! HTTP adapter for the back-office notification inbox.

pub mod handlers;
pub mod routes;

pub use handlers::NotificationApiError;
pub use routes::notification_routes;
