//! Event handlers.
//!
//! ## Queries
//! - Public listing and event page
//! - The registered user's event view
//!
//! ## Back office
//! - Event search and maintenance

mod get_event;
mod list_events;
mod manage_events;
mod view_event;

pub use get_event::{EventDetail, GetEventHandler, GetEventQuery, RELATED_EVENTS_LIMIT};
pub use list_events::{ListEventsHandler, ListEventsQuery};
pub use manage_events::{ManageEventsHandler, SaveEventCommand, SearchEventsQuery};
pub use view_event::{EventView, ViewEventHandler, ViewEventQuery};
