//! CheckPaymentStatusHandler - Query handler that refreshes a payment from the gateway.

use std::sync::Arc;

use super::{authorize, PaymentAccess};
use crate::domain::foundation::{Money, PaymentId, Timestamp};
use crate::domain::payment::{PaymentError, PaymentStatus, PaymentSystem};
use crate::ports::{PaymentGateway, PaymentRepository};

#[derive(Debug, Clone)]
pub struct CheckPaymentStatusQuery {
    pub payment_id: PaymentId,
    pub access: PaymentAccess,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentStatusView {
    pub payment_id: PaymentId,
    pub status: PaymentStatus,
    pub amount: Money,
    pub currency: String,
    pub paid_at: Option<Timestamp>,
}

pub struct CheckPaymentStatusHandler {
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    app_key: String,
}

impl CheckPaymentStatusHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
        app_key: impl Into<String>,
    ) -> Self {
        Self {
            payments,
            gateway,
            app_key: app_key.into(),
        }
    }

    pub async fn handle(&self, query: CheckPaymentStatusQuery) -> Result<PaymentStatusView, PaymentError> {
        let mut payment = self
            .payments
            .find_by_id(query.payment_id)
            .await?
            .ok_or_else(|| PaymentError::NotFound(query.payment_id.to_string()))?;
        authorize(&payment, &query.access, &self.app_key)?;

        let invoice_id = payment
            .external_id
            .clone()
            .filter(|_| payment.payment_system == PaymentSystem::Paykeeper && self.gateway.is_enabled());
        if let Some(invoice_id) = invoice_id {
            match self.gateway.invoice_status(&invoice_id).await {
                Ok(raw) => {
                    let status = PaymentStatus::from_invoice_status(&raw);
                    if status != payment.status {
                        match payment.apply_status(status, Timestamp::now()) {
                            Ok(()) => {
                                self.payments.update(&payment).await?;
                                tracing::info!(payment_id = %payment.id, status = status.as_str(), "Payment status refreshed");
                            }
                            Err(e) => {
                                tracing::warn!(payment_id = %payment.id, "Ignoring gateway status: {}", e);
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(payment_id = %payment.id, "Invoice status lookup failed: {}", e);
                }
            }
        }

        Ok(PaymentStatusView {
            payment_id: payment.id,
            status: payment.status,
            amount: payment.amount,
            currency: payment.currency,
            paid_at: payment.paid_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryPayments, StubPaymentGateway};
    use crate::domain::payment::{sample_payment, Payment};

    fn invoiced(status: PaymentStatus) -> Payment {
        let mut p = sample_payment(1, status);
        p.external_id = Some("inv-9".into());
        p
    }

    fn query(payment: &Payment) -> CheckPaymentStatusQuery {
        CheckPaymentStatusQuery {
            payment_id: payment.id,
            access: PaymentAccess::Token(payment.secure_token("key")),
        }
    }

    #[tokio::test]
    async fn paid_invoice_completes_payment() {
        let payment = invoiced(PaymentStatus::Pending);
        let payments = Arc::new(InMemoryPayments::new().with_payment(payment.clone()));
        let gateway = Arc::new(StubPaymentGateway::new());
        gateway.set_status("paid");

        let view = CheckPaymentStatusHandler::new(payments.clone(), gateway, "key")
            .handle(query(&payment))
            .await
            .unwrap();
        assert_eq!(view.status, PaymentStatus::Completed);
        assert!(view.paid_at.is_some());
        assert_eq!(payments.all()[0].status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn disallowed_transition_keeps_stored_status() {
        let payment = invoiced(PaymentStatus::Cancelled);
        let payments = Arc::new(InMemoryPayments::new().with_payment(payment.clone()));
        let gateway = Arc::new(StubPaymentGateway::new());
        gateway.set_status("paid");

        let view = CheckPaymentStatusHandler::new(payments, gateway, "key")
            .handle(query(&payment))
            .await
            .unwrap();
        assert_eq!(view.status, PaymentStatus::Cancelled);
    }

    #[tokio::test]
    async fn wrong_token_is_rejected() {
        let payment = invoiced(PaymentStatus::Pending);
        let payments = Arc::new(InMemoryPayments::new().with_payment(payment.clone()));
        let err = CheckPaymentStatusHandler::new(payments, Arc::new(StubPaymentGateway::new()), "key")
            .handle(CheckPaymentStatusQuery {
                payment_id: payment.id,
                access: PaymentAccess::Token("nope".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidToken));
    }

    #[tokio::test]
    async fn unknown_payment_is_not_found() {
        let err = CheckPaymentStatusHandler::new(
            Arc::new(InMemoryPayments::new()),
            Arc::new(StubPaymentGateway::new()),
            "key",
        )
        .handle(CheckPaymentStatusQuery {
            payment_id: PaymentId::new(5),
            access: PaymentAccess::Token("x".into()),
        })
        .await
        .unwrap_err();
        assert!(matches!(err, PaymentError::NotFound(_)));
    }
}
