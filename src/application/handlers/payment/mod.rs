//! Payment handlers.
//!
//! ## Commands
//! - Creating payment links (gateway invoice or signed test link)
//! - Granting event access for completed payments
//! - Cancelling pending payments
//! - Test-system callbacks and test payments
//!
//! ## Queries
//! - Payment status, refreshed from the gateway

mod cancel_payment;
mod check_payment_status;
mod create_payment_link;
mod grant_event_access;
mod process_callback;
mod process_test_payment;

use crate::domain::foundation::UserId;
use crate::domain::payment::{Payment, PaymentError};

pub use cancel_payment::{CancelPaymentCommand, CancelPaymentHandler, MSG_PAYMENT_CANCELLED};
pub use check_payment_status::{CheckPaymentStatusHandler, CheckPaymentStatusQuery, PaymentStatusView};
pub use create_payment_link::{
    CreatePaymentForSlugCommand, CreatePaymentLinkCommand, CreatePaymentLinkHandler, PaymentLink,
    PaymentLinkSettings,
};
pub use grant_event_access::{GrantEventAccessHandler, GrantEventAccessResult};
pub use process_callback::{ProcessCallbackCommand, ProcessCallbackHandler};
pub use process_test_payment::{ProcessTestPaymentCommand, ProcessTestPaymentHandler};

/// How a caller proves it may look at or change a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentAccess {
    /// The secure token from the payment link.
    Token(String),
    /// An authenticated user; must own the payment.
    Owner(UserId),
}

fn authorize(payment: &Payment, access: &PaymentAccess, app_key: &str) -> Result<(), PaymentError> {
    match access {
        PaymentAccess::Token(token) if payment.verify_secure_token(token, app_key) => Ok(()),
        PaymentAccess::Token(_) => Err(PaymentError::InvalidToken),
        PaymentAccess::Owner(user_id) if *user_id == payment.user_id => Ok(()),
        PaymentAccess::Owner(_) => Err(PaymentError::Forbidden),
    }
}
