//! Sendsay email configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::services::MailSettings;
use crate::domain::foundation::validate_email;

/// Sendsay configuration. An empty `login` disables email delivery.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SendsayConfig {
    pub api_url: String,
    pub login: String,
    pub sublogin: String,
    pub password: SecretString,

    /// Comma-separated recipients of paid-order letters
    pub manager_emails: String,

    pub draft_event_registration: Option<String>,
    pub draft_order_paid_managers: Option<String>,

    /// Member group used when an event names none
    pub default_member_group: String,

    pub delay_between_emails_ms: u64,
    pub timeout_secs: u64,
}

impl SendsayConfig {
    pub fn is_enabled(&self) -> bool {
        !self.login.trim().is_empty()
    }

    pub fn manager_emails_list(&self) -> Vec<String> {
        self.manager_emails
            .split(',')
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn mail_settings(&self) -> MailSettings {
        MailSettings {
            registration_draft: non_blank(&self.draft_event_registration),
            managers_draft: non_blank(&self.draft_order_paid_managers),
            manager_emails: self.manager_emails_list(),
            default_group: self.default_member_group.clone(),
            delay_between_emails: Duration::from_millis(self.delay_between_emails_ms),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for email in self.manager_emails_list() {
            if validate_email(Some(&email)).is_err() {
                return Err(ValidationError::InvalidManagerEmail(email));
            }
        }
        if !self.is_enabled() {
            return Ok(());
        }
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(ValidationError::InvalidUrl("SENDSAY__API_URL"));
        }
        if self.password.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("SENDSAY__PASSWORD"));
        }
        Ok(())
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Default for SendsayConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.sendsay.ru/general/api/v100/json/".to_string(),
            login: String::new(),
            sublogin: "api".to_string(),
            password: SecretString::new(String::new()),
            manager_emails: String::new(),
            draft_event_registration: None,
            draft_order_paid_managers: None,
            default_member_group: "pl4344".to_string(),
            delay_between_emails_ms: 100,
            timeout_secs: 15,
        }
    }
}
