//! ProcessCallbackHandler - Command handler for test-system payment callbacks.

use serde_json::Value;
use std::sync::Arc;

use super::GrantEventAccessHandler;
use crate::domain::foundation::{non_empty, PaymentId, Timestamp};
use crate::domain::payment::{Payment, PaymentError, PaymentStatus};
use crate::ports::PaymentRepository;

#[derive(Debug, Clone)]
pub struct ProcessCallbackCommand {
    pub payment_id: PaymentId,
    pub status: String,
    pub external_id: Option<String>,
    pub data: Value,
}

pub struct ProcessCallbackHandler {
    payments: Arc<dyn PaymentRepository>,
    grant_access: Arc<GrantEventAccessHandler>,
}

impl ProcessCallbackHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>, grant_access: Arc<GrantEventAccessHandler>) -> Self {
        Self {
            payments,
            grant_access,
        }
    }

    pub async fn handle(&self, cmd: ProcessCallbackCommand) -> Result<Payment, PaymentError> {
        let status: PaymentStatus = cmd
            .status
            .trim()
            .parse()
            .map_err(|_| PaymentError::UnknownStatus(cmd.status.clone()))?;
        let mut payment = self
            .payments
            .find_by_id(cmd.payment_id)
            .await?
            .ok_or_else(|| PaymentError::NotFound(cmd.payment_id.to_string()))?;
        if !payment.is_test_system() {
            tracing::warn!(payment_id = %payment.id, system = payment.payment_system.as_str(), "Callback for a non-test payment refused");
            return Err(PaymentError::NotFound(cmd.payment_id.to_string()));
        }

        payment.apply_status(status, Timestamp::now())?;
        if let Some(external_id) = non_empty(cmd.external_id.as_deref()) {
            payment.external_id = Some(external_id);
        }
        payment.callback_data = Some(cmd.data);
        self.payments.update(&payment).await?;
        tracing::info!(payment_id = %payment.id, status = status.as_str(), "Payment callback processed");

        if payment.is_completed() {
            self.grant_access.handle(&payment).await?;
        }
        Ok(payment)
    }
}
