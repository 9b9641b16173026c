//! Webhook module - payment notifications pushed by PayKeeper.

mod errors;
mod notification;
mod verifier;

pub use errors::WebhookError;
pub use notification::{has_required_fields, ClientData, GatewayPaymentData, PayKeeperNotification};
pub use verifier::{
    acknowledgement, notification_signature, AllowedIp, IpAllowlist, WebhookVerifier,
};

#[cfg(test)]
pub(crate) use notification::form;
