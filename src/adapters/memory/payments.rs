//! In-memory payment store.

use async_trait::async_trait;
use std::sync::Mutex;

use super::guard;
use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, Timestamp};
use crate::domain::payment::{NewPayment, Payment, PaymentStatus, PaymentSystem};
use crate::ports::PaymentRepository;

#[derive(Default)]
pub struct InMemoryPayments {
    payments: Mutex<Vec<Payment>>,
}

impl InMemoryPayments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payment(self, payment: Payment) -> Self {
        if let Ok(mut payments) = self.payments.lock() {
            payments.push(payment);
        }
        self
    }

    pub fn all(&self) -> Vec<Payment> {
        self.payments.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPayments {
    async fn create(&self, payment: &NewPayment) -> Result<Payment, DomainError> {
        let mut payments = guard(&self.payments)?;
        let now = Timestamp::now();
        let next = payments.iter().map(|p| p.id.as_i64()).max().unwrap_or(0) + 1;
        let created = Payment {
            id: PaymentId::new(next),
            user_id: payment.user_id,
            event_id: payment.event_id,
            amount: payment.amount,
            currency: payment.currency.clone(),
            status: PaymentStatus::Pending,
            payment_system: payment.payment_system,
            external_id: None,
            order_id: None,
            description: Some(payment.description.clone()),
            metadata: payment.metadata.clone(),
            callback_data: None,
            refund_amount: None,
            paid_at: None,
            cancelled_at: None,
            refunded_at: None,
            created_at: now,
            updated_at: now,
        };
        payments.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, DomainError> {
        Ok(guard(&self.payments)?.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_order_id(
        &self,
        order_id: &str,
        system: PaymentSystem,
    ) -> Result<Option<Payment>, DomainError> {
        Ok(guard(&self.payments)?
            .iter()
            .find(|p| p.payment_system == system && p.order_id.as_deref() == Some(order_id))
            .cloned())
    }

    async fn update(&self, payment: &Payment) -> Result<(), DomainError> {
        let mut payments = guard(&self.payments)?;
        let slot = payments
            .iter_mut()
            .find(|p| p.id == payment.id)
            .ok_or_else(|| {
                DomainError::new(ErrorCode::PaymentNotFound, format!("Payment {} not found", payment.id))
            })?;
        *slot = payment.clone();
        Ok(())
    }
}
