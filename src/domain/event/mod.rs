//! Event module - the schedulable things users register for.

mod aggregate;
mod draft;
mod errors;
mod listing;

pub use aggregate::{
    event_type_label, EmbedSize, Event, EventFormat, EventSpeaker, KinescopeType,
    RegistrationBlock, DEFAULT_DURATION_HOURS,
};
pub use draft::{
    slug_candidate, EventDraft, EventFields, SpeakerAssignment, SpeakerLink,
};
pub use errors::EventError;
pub use listing::{
    EventListCriteria, EventListQuery, ListFilter, SortDirection, SortField, DEFAULT_PER_PAGE,
};

#[cfg(test)]
pub(crate) use aggregate::sample_event;
