//! GrantEventAccessHandler - Command handler run once a payment is completed.

use std::sync::Arc;

use crate::application::services::EventMailer;
use crate::domain::access::AccessGrant;
use crate::domain::foundation::Timestamp;
use crate::domain::payment::{Payment, PaymentError};
use crate::ports::{AccessGrantRepository, EventRepository, UserRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantEventAccessResult {
    /// False when the user already had access.
    pub granted: bool,
    pub email_sent: bool,
}

pub struct GrantEventAccessHandler {
    events: Arc<dyn EventRepository>,
    users: Arc<dyn UserRepository>,
    grants: Arc<dyn AccessGrantRepository>,
    mailer: Arc<EventMailer>,
}

impl GrantEventAccessHandler {
    pub fn new(
        events: Arc<dyn EventRepository>,
        users: Arc<dyn UserRepository>,
        grants: Arc<dyn AccessGrantRepository>,
        mailer: Arc<EventMailer>,
    ) -> Self {
        Self {
            events,
            users,
            grants,
            mailer,
        }
    }

    pub async fn handle(&self, payment: &Payment) -> Result<GrantEventAccessResult, PaymentError> {
        let event = self
            .events
            .find_by_id(payment.event_id)
            .await?
            .ok_or(PaymentError::EventNotFound)?;
        let user = self
            .users
            .find_by_id(payment.user_id)
            .await?
            .ok_or(PaymentError::UserNotFound)?;

        let now = Timestamp::now();
        let granted = if self.grants.has_access(event.id, user.id, now).await? {
            false
        } else {
            let grant = AccessGrant::paid(event.id, user.id, payment.amount, payment.id, now);
            self.grants.upsert(&grant).await?;
            tracing::info!(payment_id = %payment.id, event_id = %event.id, user_id = %user.id, "Paid access granted");
            true
        };

        let password = payment.generated_password().unwrap_or_default();
        let email_sent = self
            .mailer
            .send_registration(&event, &user, password, payment.is_new_user())
            .await;

        Ok(GrantEventAccessResult {
            granted,
            email_sent,
        })
    }
}
