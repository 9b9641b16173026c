//! Access grant handlers.
//!
//! ## Commands (admin or manager only)
//! - Store, update, toggle and destroy a user's grant for an event
//!
//! ## Queries (back office)
//! - Registrations table joined with users and events

mod list_registrations;
mod manage_access_grants;

pub use list_registrations::{ListRegistrationsHandler, RegistrationList};
pub use manage_access_grants::{GrantKey, ManageAccessGrantsHandler, StoreGrantCommand, UpdateGrantCommand};
