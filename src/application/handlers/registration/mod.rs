//! Registration handlers.
//!
//! ## Commands
//! - Registering for an event (authenticated fast path and guest paths)
//!
//! ## Queries
//! - Checking whether an email already has an account

mod check_user_email;
mod register_for_event;

pub use check_user_email::{CheckUserEmailHandler, CheckUserEmailQuery};
pub use register_for_event::{RegisterForEventCommand, RegisterForEventHandler};
