//! CancelPaymentHandler - Command handler for abandoning a pending payment.

use std::sync::Arc;

use super::{authorize, PaymentAccess};
use crate::domain::foundation::{PaymentId, Timestamp};
use crate::domain::payment::{Payment, PaymentError};
use crate::ports::PaymentRepository;

pub const MSG_PAYMENT_CANCELLED: &str = "Платеж отменен";

#[derive(Debug, Clone)]
pub struct CancelPaymentCommand {
    pub payment_id: PaymentId,
    pub access: PaymentAccess,
}

pub struct CancelPaymentHandler {
    payments: Arc<dyn PaymentRepository>,
    app_key: String,
}

impl CancelPaymentHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>, app_key: impl Into<String>) -> Self {
        Self {
            payments,
            app_key: app_key.into(),
        }
    }

    pub async fn handle(&self, cmd: CancelPaymentCommand) -> Result<Payment, PaymentError> {
        let mut payment = self
            .payments
            .find_by_id(cmd.payment_id)
            .await?
            .ok_or_else(|| PaymentError::NotFound(cmd.payment_id.to_string()))?;
        authorize(&payment, &cmd.access, &self.app_key)?;

        payment.cancel(Timestamp::now())?;
        self.payments.update(&payment).await?;
        tracing::info!(payment_id = %payment.id, "Payment cancelled");
        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryPayments;
    use crate::domain::foundation::UserId;
    use crate::domain::payment::{sample_payment, PaymentStatus};

    #[tokio::test]
    async fn owner_cancels_pending_payment() {
        let payments = Arc::new(InMemoryPayments::new().with_payment(sample_payment(1, PaymentStatus::Pending)));
        let cancelled = CancelPaymentHandler::new(payments.clone(), "key")
            .handle(CancelPaymentCommand {
                payment_id: PaymentId::new(1),
                access: PaymentAccess::Owner(UserId::new(7)),
            })
            .await
            .unwrap();
        assert_eq!(cancelled.status, PaymentStatus::Cancelled);
        assert!(payments.all()[0].cancelled_at.is_some());
    }

    #[tokio::test]
    async fn someone_else_cannot_cancel() {
        let payments = Arc::new(InMemoryPayments::new().with_payment(sample_payment(1, PaymentStatus::Pending)));
        let err = CancelPaymentHandler::new(payments, "key")
            .handle(CancelPaymentCommand {
                payment_id: PaymentId::new(1),
                access: PaymentAccess::Owner(UserId::new(8)),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::Forbidden));
    }

    #[tokio::test]
    async fn completed_payment_is_not_cancellable() {
        let payments = Arc::new(InMemoryPayments::new().with_payment(sample_payment(1, PaymentStatus::Completed)));
        let err = CancelPaymentHandler::new(payments, "key")
            .handle(CancelPaymentCommand {
                payment_id: PaymentId::new(1),
                access: PaymentAccess::Owner(UserId::new(7)),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::NotCancellable(PaymentStatus::Completed)));
    }
}
