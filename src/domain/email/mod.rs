//! Email module - transactional letters delivered through Sendsay.

mod letter;
mod request;

pub use letter::{paid_order_extra, registration_letter, RegistrationLetter};
pub use request::{sanitize, IssueRequest, MemberUpdate, PERSONAL_GROUP};
