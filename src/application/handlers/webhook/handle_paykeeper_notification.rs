//! HandlePayKeeperNotificationHandler - confirms a payment pushed by the gateway.
//!
//! The gateway retries until it receives `OK <md5(id + secret)>`, so a
//! notification for an already completed payment is acknowledged without
//! side effects.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use crate::application::handlers::payment::GrantEventAccessHandler;
use crate::application::services::{CrmSync, EventMailer};
use crate::domain::email::paid_order_extra;
use crate::domain::foundation::{DomainError, Role, Timestamp};
use crate::domain::notification::NewNotification;
use crate::domain::payment::{parse_order_reference, Payment, PaymentSystem};
use crate::domain::webhook::{acknowledgement, PayKeeperNotification, WebhookError, WebhookVerifier};
use crate::ports::{NotificationRepository, PaymentRepository, UserRepository};

#[derive(Debug, Clone)]
pub struct HandlePayKeeperNotificationCommand {
    pub form: HashMap<String, String>,
    pub client_ip: Option<IpAddr>,
}

pub struct HandlePayKeeperNotificationHandler {
    verifier: WebhookVerifier,
    payments: Arc<dyn PaymentRepository>,
    users: Arc<dyn UserRepository>,
    notifications: Arc<dyn NotificationRepository>,
    grant_access: Arc<GrantEventAccessHandler>,
    crm: Arc<CrmSync>,
    mailer: Arc<EventMailer>,
}

fn internal(err: impl std::fmt::Display) -> WebhookError {
    WebhookError::Internal(err.to_string())
}

impl HandlePayKeeperNotificationHandler {
    pub fn new(
        verifier: WebhookVerifier,
        payments: Arc<dyn PaymentRepository>,
        users: Arc<dyn UserRepository>,
        notifications: Arc<dyn NotificationRepository>,
        grant_access: Arc<GrantEventAccessHandler>,
        crm: Arc<CrmSync>,
        mailer: Arc<EventMailer>,
    ) -> Self {
        Self {
            verifier,
            payments,
            users,
            notifications,
            grant_access,
            crm,
            mailer,
        }
    }

    /// Returns the acknowledgement body on success.
    pub async fn handle(&self, cmd: HandlePayKeeperNotificationCommand) -> Result<String, WebhookError> {
        let notification = self.verifier.verify(&cmd.form, cmd.client_ip).map_err(|e| {
            tracing::warn!(ip = ?cmd.client_ip, "PayKeeper notification rejected: {}", e);
            e
        })?;
        let order_id = notification
            .order_id()
            .map(str::to_string)
            .ok_or(WebhookError::MissingOrderId)?;

        let mut payment = self.locate(&order_id).await.map_err(internal)?.ok_or_else(|| {
            tracing::warn!(order_id = %order_id, "PayKeeper notification for unknown payment");
            WebhookError::PaymentNotFound
        })?;

        let ack = acknowledgement(&notification.invoice_id, self.verifier.secret());
        if payment.is_completed() {
            tracing::info!(payment_id = %payment.id, "Payment already completed, acknowledging");
            return Ok(ack);
        }

        self.complete(&mut payment, &notification).await?;
        Ok(ack)
    }

    async fn locate(&self, order_id: &str) -> Result<Option<Payment>, DomainError> {
        if let Some(payment) = self
            .payments
            .find_by_order_id(order_id, PaymentSystem::Paykeeper)
            .await?
        {
            return Ok(Some(payment));
        }
        let Some(id) = parse_order_reference(order_id) else {
            return Ok(None);
        };
        Ok(self
            .payments
            .find_by_id(id)
            .await?
            .filter(|p| p.payment_system == PaymentSystem::Paykeeper))
    }

    async fn complete(
        &self,
        payment: &mut Payment,
        notification: &PayKeeperNotification,
    ) -> Result<(), WebhookError> {
        let callback = serde_json::Value::Object(notification.original.clone());
        let previous = payment
            .confirm_by_gateway(&notification.invoice_id, notification.amount, callback, Timestamp::now())
            .map_err(internal)?;
        if let Some(previous) = previous {
            tracing::warn!(
                payment_id = %payment.id,
                expected = %previous.to_decimal_string(),
                received = %notification.amount.to_decimal_string(),
                "PayKeeper amount differs from payment"
            );
        }
        self.payments.update(payment).await.map_err(internal)?;
        tracing::info!(payment_id = %payment.id, invoice_id = %notification.invoice_id, "Payment completed by PayKeeper");

        self.grant_access.handle(payment).await.map_err(internal)?;

        match self.users.find_by_id(payment.user_id).await {
            Ok(Some(user)) => {
                if !self.crm.mark_paid(&user).await {
                    tracing::warn!(payment_id = %payment.id, "CRM was not updated for paid order");
                }
            }
            Ok(None) => tracing::warn!(payment_id = %payment.id, "Paid order has no user"),
            Err(e) => tracing::warn!(payment_id = %payment.id, "User lookup failed: {}", e),
        }

        self.mailer.notify_managers(paid_order_extra(payment)).await;
        self.notify_admins(payment).await;
        Ok(())
    }

    async fn notify_admins(&self, payment: &Payment) {
        let admins = match self.users.list_by_role(Role::Admin).await {
            Ok(admins) => admins,
            Err(e) => {
                tracing::warn!("Failed to load admins for payment notification: {}", e);
                return;
            }
        };
        for admin in admins {
            let entry = NewNotification::payment_received(admin.id, payment);
            if let Err(e) = self.notifications.create(&entry).await {
                tracing::warn!(user_id = %admin.id, "Failed to store payment notification: {}", e);
            }
        }
    }
}
