//! User and authentication handlers.
//!
//! ## Commands
//! - Login (email and password to bearer token)
//! - Self-registration
//! - Profile edits and account deletion by the owner
//! - Back-office user maintenance and role changes
//!
//! ## Queries
//! - The current user's profile and accessible events
//! - Personal event list and dashboard

mod get_profile;
mod login;
mod manage_profile;
mod manage_users;
mod my_events;
mod sign_up;

pub use get_profile::{GetProfileHandler, Profile};
pub use login::{LoginCommand, LoginHandler, LoginResult};
pub use manage_profile::ManageProfileHandler;
pub use manage_users::{GrantedEvent, ManageUsersHandler, RoleChange, UserDetail};
pub use my_events::{AccessibleEvent, Dashboard, MyEvents, MyEventsHandler, MY_EVENTS_PER_PAGE};
pub use sign_up::SignUpHandler;
