//! Webhook handlers.
//!
//! ## Commands
//! - PayKeeper payment notifications

mod handle_paykeeper_notification;

pub use handle_paykeeper_notification::{
    HandlePayKeeperNotificationCommand, HandlePayKeeperNotificationHandler,
};
