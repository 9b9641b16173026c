//! Server configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};

use super::error::ValidationError;
use crate::domain::foundation::LocalOffset;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment name
    #[serde(default = "default_environment")]
    pub environment: Environment,

    /// Rust log filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// CORS allowed origins (comma-separated)
    pub cors_origins: Option<String>,

    /// Public base URL; test-payment links point here
    #[serde(default = "default_app_url")]
    pub app_url: String,

    /// Key mixed into payment secure tokens
    #[serde(default = "default_app_key")]
    pub app_key: SecretString,

    /// Offset of the wall clock event schedules are written in
    #[serde(default = "default_timezone_offset")]
    pub timezone_offset_hours: i32,
}

/// Application environment
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServerConfig {
    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Get CORS origins as a vector
    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .as_ref()
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn local_offset(&self) -> LocalOffset {
        LocalOffset::from_hours(self.timezone_offset_hours)
    }

    pub fn app_key(&self) -> &str {
        self.app_key.expose_secret()
    }

    /// Validate server configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if !(-12..=14).contains(&self.timezone_offset_hours) {
            return Err(ValidationError::InvalidTimezoneOffset(self.timezone_offset_hours));
        }
        if !self.app_url.starts_with("http://") && !self.app_url.starts_with("https://") {
            return Err(ValidationError::InvalidUrl("APP_URL"));
        }
        if self.is_production() && self.app_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("APP_KEY"));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            request_timeout_secs: default_request_timeout(),
            cors_origins: None,
            app_url: default_app_url(),
            app_key: default_app_key(),
            timezone_offset_hours: default_timezone_offset(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_environment() -> Environment {
    Environment::Development
}

fn default_log_level() -> String {
    "info,event_portal=debug,sqlx=warn".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_app_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_app_key() -> SecretString {
    SecretString::new(String::new())
}

fn default_timezone_offset() -> i32 {
    3
}
