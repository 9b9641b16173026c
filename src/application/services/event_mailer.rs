//! EventMailer - transactional letters about registrations and payments.
//!
//! Delivery is best effort; callers only learn whether something was sent.

use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::email::{registration_letter, sanitize, IssueRequest};
use crate::domain::event::Event;
use crate::domain::user::User;
use crate::ports::Mailer;

/// Draft ids and recipients for the portal's letters.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub registration_draft: Option<String>,
    pub managers_draft: Option<String>,
    pub manager_emails: Vec<String>,
    pub default_group: String,
    pub delay_between_emails: Duration,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            registration_draft: None,
            managers_draft: None,
            manager_emails: Vec::new(),
            default_group: "pl4344".to_string(),
            delay_between_emails: Duration::from_millis(100),
        }
    }
}

pub struct EventMailer {
    mailer: Arc<dyn Mailer>,
    settings: MailSettings,
}

impl EventMailer {
    pub fn new(mailer: Arc<dyn Mailer>, settings: MailSettings) -> Self {
        Self { mailer, settings }
    }

    /// Sends the "you are registered" letter.
    pub async fn send_registration(
        &self,
        event: &Event,
        user: &User,
        password: &str,
        is_new_user: bool,
    ) -> bool {
        if !self.mailer.is_enabled() {
            return false;
        }
        let Some(letter) = registration_letter(
            event,
            user,
            password,
            is_new_user,
            self.settings.registration_draft.as_deref(),
            &self.settings.default_group,
        ) else {
            tracing::error!(event_id = %event.id, "No letter draft configured for event registration");
            return false;
        };

        if let Err(e) = self.mailer.set_member(&letter.member).await {
            tracing::warn!(email = %user.email, "Sendsay member update failed: {}", e);
        }

        tracing::debug!(payload = %sanitize(&letter.issue.to_request()), "Sending registration letter");
        match self.mailer.send(&letter.issue).await {
            Ok(()) => {
                tracing::info!(event_id = %event.id, user_id = %user.id, "Registration letter sent");
                true
            }
            Err(e) => {
                tracing::warn!(event_id = %event.id, user_id = %user.id, "Registration letter failed: {}", e);
                false
            }
        }
    }

    /// Sends one letter to every manager. Succeeds when at least one send did.
    pub async fn notify_managers(&self, extra: Map<String, Value>) -> bool {
        let Some(draft) = self.settings.managers_draft.as_deref().filter(|d| !d.trim().is_empty()) else {
            return false;
        };
        if !self.mailer.is_enabled() {
            return false;
        }
        if self.settings.manager_emails.is_empty() {
            tracing::warn!("Manager notification skipped: no manager emails configured");
            return false;
        }

        let mut delivered = 0usize;
        for (index, email) in self.settings.manager_emails.iter().enumerate() {
            if index > 0 && !self.settings.delay_between_emails.is_zero() {
                tokio::time::sleep(self.settings.delay_between_emails).await;
            }
            let issue = IssueRequest::new(email, draft).with_extra(extra.clone());
            match self.mailer.send(&issue).await {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(email = %email, "Manager notification failed: {}", e),
            }
        }
        tracing::info!(
            delivered,
            total = self.settings.manager_emails.len(),
            "Manager notifications sent"
        );
        delivered > 0
    }
}
