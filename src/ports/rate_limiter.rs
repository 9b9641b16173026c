//! Throttling port for the public form endpoints.
//!
//! Registration, the email check and login are counted per client IP and
//! form, behind one service-wide ceiling. Counters use fixed windows.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::Timestamp;

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Counts one request against `key` and reports whether it may proceed.
    async fn check(&self, key: RateLimitKey) -> Result<RateLimitResult, RateLimitError>;
}

/// Public forms with their own per-IP budget.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrottledForm {
    Register,
    CheckEmail,
    Login,
}

impl ThrottledForm {
    pub const ALL: [ThrottledForm; 3] = [
        ThrottledForm::Register,
        ThrottledForm::CheckEmail,
        ThrottledForm::Login,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThrottledForm::Register => "register",
            ThrottledForm::CheckEmail => "check_email",
            ThrottledForm::Login => "login",
        }
    }
}

impl fmt::Display for ThrottledForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a request is counted against.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum RateLimitKey {
    /// Every throttled request in the service.
    Global,
    /// One client address submitting one form.
    Form { ip: String, form: ThrottledForm },
}

impl RateLimitKey {
    pub fn form(ip: impl Into<String>, form: ThrottledForm) -> Self {
        Self::Form {
            ip: ip.into(),
            form,
        }
    }

    /// Counter name, shared by every backend.
    pub fn storage_key(&self) -> String {
        match self {
            RateLimitKey::Global => "ratelimit:global".to_string(),
            RateLimitKey::Form { ip, form } => format!("ratelimit:{form}:{ip}"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum RateLimitResult {
    Allowed(RateLimitStatus),
    Denied(RateLimitDenied),
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed(_))
    }
}

/// Quota left after an allowed request.
#[derive(Debug, Clone)]
pub struct RateLimitStatus {
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct RateLimitDenied {
    pub limit: u32,
    pub retry_after_secs: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("rate limiter unavailable: {0}")]
    Unavailable(String),
}
