//! User module - accounts, profile data and generated credentials.

mod account;
mod errors;
mod password;

pub use account::{
    normalize_email, NewUser, ProfileDraft, SignupDraft, User, UserDraft, UserFields,
    MIN_PASSWORD_LEN,
};
pub use errors::UserError;
pub use password::{generate_password, GENERATED_PASSWORD_LEN};

#[cfg(test)]
pub(crate) use account::sample_user;
