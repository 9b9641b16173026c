//! Payment repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PaymentId};
use crate::domain::payment::{NewPayment, Payment, PaymentSystem};

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Inserts a pending payment and returns it with its id.
    async fn create(&self, payment: &NewPayment) -> Result<Payment, DomainError>;

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, DomainError>;

    async fn find_by_order_id(
        &self,
        order_id: &str,
        system: PaymentSystem,
    ) -> Result<Option<Payment>, DomainError>;

    /// Persists every mutable column.
    ///
    /// # Errors
    ///
    /// - `PaymentNotFound` when the row is gone
    async fn update(&self, payment: &Payment) -> Result<(), DomainError>;
}
