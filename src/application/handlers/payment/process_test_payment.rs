//! ProcessTestPaymentHandler - completes a test-system payment from its signed link.

use serde_json::json;
use std::sync::Arc;

use super::{ProcessCallbackCommand, ProcessCallbackHandler};
use crate::domain::foundation::PaymentId;
use crate::domain::payment::{Payment, PaymentError, PaymentStatus};
use crate::ports::PaymentRepository;

#[derive(Debug, Clone)]
pub struct ProcessTestPaymentCommand {
    pub payment_id: PaymentId,
    pub token: String,
}

pub struct ProcessTestPaymentHandler {
    payments: Arc<dyn PaymentRepository>,
    callback: Arc<ProcessCallbackHandler>,
    app_key: String,
}

impl ProcessTestPaymentHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        callback: Arc<ProcessCallbackHandler>,
        app_key: impl Into<String>,
    ) -> Self {
        Self {
            payments,
            callback,
            app_key: app_key.into(),
        }
    }

    pub async fn handle(&self, cmd: ProcessTestPaymentCommand) -> Result<Payment, PaymentError> {
        let payment = self
            .payments
            .find_by_id(cmd.payment_id)
            .await?
            .ok_or_else(|| PaymentError::NotFound(cmd.payment_id.to_string()))?;
        if !payment.is_test_system() {
            return Err(PaymentError::NotFound(cmd.payment_id.to_string()));
        }
        if !payment.verify_secure_token(&cmd.token, &self.app_key) {
            tracing::warn!(payment_id = %payment.id, "Test payment with invalid token");
            return Err(PaymentError::InvalidToken);
        }
        if payment.is_completed() {
            return Ok(payment);
        }

        self.callback
            .handle(ProcessCallbackCommand {
                payment_id: payment.id,
                status: PaymentStatus::Completed.as_str().to_string(),
                external_id: Some(format!("test_{}", payment.id)),
                data: json!({ "test_payment": true, "payment_id": payment.id.as_i64() }),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryAccessGrants, InMemoryEventRepository, InMemoryPayments, InMemoryUsers,
        RecordingMailer,
    };
    use crate::application::handlers::payment::GrantEventAccessHandler;
    use crate::application::services::{EventMailer, MailSettings};
    use crate::domain::event::sample_event;
    use crate::domain::foundation::{EventId, Timestamp, UserId};
    use crate::domain::payment::{sample_payment, PaymentSystem};
    use crate::domain::user::sample_user;
    use crate::ports::AccessGrantRepository;

    struct Fixture {
        payments: Arc<InMemoryPayments>,
        grants: Arc<InMemoryAccessGrants>,
        handler: ProcessTestPaymentHandler,
    }

    fn fixture(status: PaymentStatus) -> Fixture {
        let mut payment = sample_payment(1, status);
        payment.payment_system = PaymentSystem::Test;
        fixture_with(payment)
    }

    fn fixture_with(payment: Payment) -> Fixture {
        let payments = Arc::new(InMemoryPayments::new().with_payment(payment));
        let grants = Arc::new(InMemoryAccessGrants::new());
        let grant_access = Arc::new(GrantEventAccessHandler::new(
            Arc::new(InMemoryEventRepository::new().with_event(sample_event(3, "paid"))),
            Arc::new(InMemoryUsers::new().with_user(sample_user(7, "buyer@clinic.ru"))),
            grants.clone(),
            Arc::new(EventMailer::new(Arc::new(RecordingMailer::new()), MailSettings::default())),
        ));
        let callback = Arc::new(ProcessCallbackHandler::new(payments.clone(), grant_access));
        Fixture {
            handler: ProcessTestPaymentHandler::new(payments.clone(), callback, "key"),
            payments,
            grants,
        }
    }

    #[tokio::test]
    async fn valid_token_completes_payment_and_grants_access() {
        let f = fixture(PaymentStatus::Pending);
        let token = f.payments.all()[0].secure_token("key");
        let payment = f
            .handler
            .handle(ProcessTestPaymentCommand {
                payment_id: PaymentId::new(1),
                token,
            })
            .await
            .unwrap();

        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.external_id.as_deref(), Some("test_1"));
        assert!(f
            .grants
            .has_access(EventId::new(3), UserId::new(7), Timestamp::now())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn invalid_token_changes_nothing() {
        let f = fixture(PaymentStatus::Pending);
        let err = f
            .handler
            .handle(ProcessTestPaymentCommand {
                payment_id: PaymentId::new(1),
                token: "0".repeat(64),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidToken));
        assert_eq!(f.payments.all()[0].status, PaymentStatus::Pending);
        assert!(f.grants.all().is_empty());
    }

    #[tokio::test]
    async fn signed_link_does_not_settle_gateway_payment() {
        let f = fixture_with(sample_payment(1, PaymentStatus::Pending));
        let token = f.payments.all()[0].secure_token("key");
        let err = f
            .handler
            .handle(ProcessTestPaymentCommand {
                payment_id: PaymentId::new(1),
                token,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::NotFound(_)));
        assert_eq!(f.payments.all()[0].status, PaymentStatus::Pending);
        assert!(f.grants.all().is_empty());
    }

    #[tokio::test]
    async fn cancelled_payment_cannot_be_completed() {
        let f = fixture(PaymentStatus::Cancelled);
        let token = f.payments.all()[0].secure_token("key");
        let err = f
            .handler
            .handle(ProcessTestPaymentCommand {
                payment_id: PaymentId::new(1),
                token,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidTransition { .. }));
    }
}
