//! Notification handlers for the back-office inbox.

mod manage_notifications;

pub use manage_notifications::ManageNotificationsHandler;
