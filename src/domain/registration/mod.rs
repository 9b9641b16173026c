//! Registration module - turning a form submission into event access.

mod errors;
mod form;
mod outcome;

pub use errors::RegistrationError;
pub use form::{CheckEmailForm, GuestProfile, GuestRegistration, RegistrationForm};
pub use outcome::{
    EmailCheck, EmailCheckUser, RegistrationOutcome, MSG_ALREADY_REGISTERED, MSG_FAST_SUCCESS,
    MSG_GUEST_SUCCESS,
};
