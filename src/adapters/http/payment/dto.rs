//! Request and response DTOs for payment endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::payment::{PaymentLink, PaymentStatusView};
use crate::domain::foundation::{PaymentId, Timestamp};
use crate::domain::payment::{Payment, PaymentStatus};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePaymentRequest {
    pub return_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentLinkResponse {
    pub success: bool,
    pub payment_id: PaymentId,
    pub payment_url: String,
}

impl From<PaymentLink> for PaymentLinkResponse {
    fn from(link: PaymentLink) -> Self {
        Self {
            success: true,
            payment_id: link.payment_id,
            payment_url: link.payment_url,
        }
    }
}

/// `?token=` from the payment link.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenParams {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentStatusResponse {
    pub success: bool,
    pub payment_id: PaymentId,
    pub status: PaymentStatus,
    pub status_label: &'static str,
    /// Decimal rubles, e.g. "1500.00".
    pub amount: String,
    pub currency: String,
    pub paid_at: Option<Timestamp>,
}

impl From<PaymentStatusView> for PaymentStatusResponse {
    fn from(view: PaymentStatusView) -> Self {
        Self {
            success: true,
            payment_id: view.payment_id,
            status: view.status,
            status_label: view.status.label(),
            amount: view.amount.to_decimal_string(),
            currency: view.currency,
            paid_at: view.paid_at,
        }
    }
}

/// Outcome of cancelling, completing or calling back a payment.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentResultResponse {
    pub success: bool,
    pub payment_id: PaymentId,
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl PaymentResultResponse {
    pub fn new(payment: &Payment) -> Self {
        Self {
            success: true,
            payment_id: payment.id,
            status: payment.status,
            message: None,
        }
    }

    pub fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

/// Test-system callback. Everything posted is stored as callback data.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentCallbackRequest {
    pub payment_id: Option<PaymentId>,
    pub status: Option<String>,
    pub external_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Money;

    #[test]
    fn status_response_renders_decimal_amount() {
        let response = PaymentStatusResponse::from(PaymentStatusView {
            payment_id: PaymentId::new(3),
            status: PaymentStatus::Completed,
            amount: Money::from_kopecks(150_050),
            currency: "RUB".into(),
            paid_at: None,
        });
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["amount"], "1500.50");
        assert_eq!(json["status"], "completed");
    }

    #[test]
    fn callback_request_accepts_numeric_id() {
        let request: PaymentCallbackRequest =
            serde_json::from_str(r#"{"payment_id": 12, "status": "completed", "extra": 1}"#).unwrap();
        assert_eq!(request.payment_id, Some(PaymentId::new(12)));
        assert_eq!(request.status.as_deref(), Some("completed"));
    }
}
