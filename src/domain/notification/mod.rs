//! Notification module - back-office inbox entries.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::foundation::{
    DomainError, ErrorCode, NotificationId, Timestamp, UserId, ValidationError,
};
use crate::domain::payment::{metadata_keys, Payment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Order,
    User,
    Payment,
    System,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Order => "order",
            NotificationKind::User => "user",
            NotificationKind::Payment => "payment",
            NotificationKind::System => "system",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" => Ok(NotificationKind::Order),
            "user" => Ok(NotificationKind::User),
            "payment" => Ok(NotificationKind::Payment),
            "system" => Ok(NotificationKind::System),
            other => Err(ValidationError::invalid_format(
                "type",
                format!("unknown notification type '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub data: Option<Value>,
    pub url: Option<String>,
    pub read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Notification {
    /// Marks the entry read. Returns false when it already was.
    pub fn mark_read(&mut self, now: Timestamp) -> bool {
        if self.read {
            return false;
        }
        self.read = true;
        self.read_at = Some(now);
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub data: Option<Value>,
    pub url: Option<String>,
}

impl NewNotification {
    /// Inbox entry announcing a completed payment.
    pub fn payment_received(recipient: UserId, payment: &Payment) -> Self {
        let title = payment
            .metadata_str(metadata_keys::EVENT_TITLE)
            .unwrap_or_default();
        let who = payment
            .metadata_str(metadata_keys::USER_EMAIL)
            .unwrap_or_default();
        Self {
            user_id: recipient,
            kind: NotificationKind::Payment,
            title: format!("Оплата {}", payment.order_reference()),
            message: format!(
                "{} оплатил(а) {} за «{}»",
                who,
                payment.amount.to_display_rubles(),
                title
            ),
            data: Some(json!({
                "payment_id": payment.id.as_i64(),
                "event_id": payment.event_id.as_i64(),
                "user_id": payment.user_id.as_i64(),
            })),
            url: None,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("Уведомление не найдено")]
    NotFound,

    #[error("Недостаточно прав")]
    Forbidden,

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl NotificationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            NotificationError::NotFound => ErrorCode::NotFound,
            NotificationError::Forbidden => ErrorCode::Forbidden,
            NotificationError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for NotificationError {
    fn from(err: DomainError) -> Self {
        if err.is_not_found() {
            NotificationError::NotFound
        } else {
            NotificationError::Infrastructure(err.to_string())
        }
    }
}
