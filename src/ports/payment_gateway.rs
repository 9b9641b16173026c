//! Payment gateway port (PayKeeper).
//!
//! Only invoice creation and status lookup are needed; the gateway pushes
//! completions through the webhook.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Money};

/// Data sent when opening an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRequest {
    pub amount: Money,
    pub service_name: String,
    /// Customer display name.
    pub client_id: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    /// Our order reference, e.g. `ORD000042`.
    pub order_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub invoice_id: String,
    pub payment_url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Disabled gateways are bypassed in favor of the test flow.
    fn is_enabled(&self) -> bool;

    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<Invoice, DomainError>;

    /// Raw gateway status string (`created`, `sent`, `paid`, `expired`, ...).
    async fn invoice_status(&self, invoice_id: &str) -> Result<String, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }
}
