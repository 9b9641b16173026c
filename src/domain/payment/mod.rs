//! Payment module - paid registrations and their lifecycle.

mod aggregate;
mod errors;
mod order_reference;
mod status;

pub use aggregate::{metadata_keys, NewPayment, Payment, DEFAULT_CURRENCY};
pub use errors::PaymentError;
pub use order_reference::{order_reference, parse_order_reference};
pub use status::{PaymentStatus, PaymentSystem};

#[cfg(test)]
pub(crate) use aggregate::sample_payment;
