//! Access module - who may attend or watch which event.

mod errors;
mod grant;
mod registrations;

pub use errors::AccessGrantError;
pub use grant::{
    AccessGrant, AccessGrantDraft, AccessGrantFields, AccessType, GrantPaymentStatus,
};
pub use registrations::{
    join_full_name, RegisteredEvent, RegisteredUser, Registration, RegistrationCriteria,
    RegistrationListQuery, RegistrationSort, REGISTRATIONS_PER_PAGE,
};
