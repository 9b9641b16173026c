//! PayKeeper gateway configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::webhook::{IpAllowlist, WebhookVerifier};

/// PayKeeper gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaykeeperConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Gateway base URL, e.g. `https://demo.paykeeper.ru`
    #[serde(default)]
    pub server_url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default = "empty_secret")]
    pub password: SecretString,

    /// Notification signing secret; empty skips the signature check
    #[serde(default = "empty_secret")]
    pub webhook_secret: SecretString,

    /// Comma-separated addresses or IPv4 CIDR blocks; empty allows all
    #[serde(default)]
    pub allowed_ips: String,

    #[serde(default)]
    pub test_mode: bool,

    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,

    #[serde(default = "default_create_invoice_endpoint")]
    pub create_invoice_endpoint: String,

    #[serde(default = "default_invoice_info_endpoint")]
    pub invoice_info_endpoint: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl PaykeeperConfig {
    pub fn allowlist(&self) -> Result<IpAllowlist, ValidationError> {
        IpAllowlist::parse(self.allowed_ips.split(','))
            .map_err(|e| ValidationError::InvalidAllowedIp(e.to_string()))
    }

    /// Webhook verifier built from the gateway switch, secret and allowlist.
    pub fn webhook_verifier(&self) -> Result<WebhookVerifier, ValidationError> {
        Ok(WebhookVerifier::new(
            self.enabled,
            self.webhook_secret.expose_secret().clone(),
            self.allowlist()?,
        ))
    }

    /// `{server_url}/bill/{invoice_id}/`
    pub fn bill_url(&self, invoice_id: &str) -> String {
        format!("{}/bill/{}/", self.server_url.trim_end_matches('/'), invoice_id)
    }

    /// Validate gateway configuration. Nothing is required while disabled.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.allowlist()?;
        if !self.enabled {
            return Ok(());
        }
        if self.server_url.is_empty() {
            return Err(ValidationError::MissingRequired("PAYKEEPER__SERVER_URL"));
        }
        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            return Err(ValidationError::InvalidUrl("PAYKEEPER__SERVER_URL"));
        }
        if self.username.is_empty() {
            return Err(ValidationError::MissingRequired("PAYKEEPER__USERNAME"));
        }
        if self.password.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PAYKEEPER__PASSWORD"));
        }
        Ok(())
    }
}

impl Default for PaykeeperConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            server_url: String::new(),
            username: String::new(),
            password: empty_secret(),
            webhook_secret: empty_secret(),
            allowed_ips: String::new(),
            test_mode: false,
            token_endpoint: default_token_endpoint(),
            create_invoice_endpoint: default_create_invoice_endpoint(),
            invoice_info_endpoint: default_invoice_info_endpoint(),
            timeout_secs: default_timeout(),
        }
    }
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}

fn default_token_endpoint() -> String {
    "/info/settings/token/".to_string()
}

fn default_create_invoice_endpoint() -> String {
    "/change/invoice/preview/".to_string()
}

fn default_invoice_info_endpoint() -> String {
    "/info/invoice/byid/".to_string()
}

fn default_timeout() -> u64 {
    15
}
