//! Registration data forwarded to the CRM alongside the user record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::non_empty;

/// Default item status for a fresh registration.
pub const STATUS_REGISTERED: &str = "Зарегистрирован";
/// Item status written when nothing else is supplied.
pub const STATUS_AWAITING_PAYMENT: &str = "Ожидает оплаты";
/// Item status written by the payment webhook.
pub const STATUS_PAID: &str = "Оплачено";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utm {
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_content: Option<String>,
    pub utm_term: Option<String>,
}

impl Utm {
    pub(crate) fn write_into(&self, fields: &mut Map<String, Value>) {
        for (key, value) in [
            ("UTM_SOURCE", &self.utm_source),
            ("UTM_MEDIUM", &self.utm_medium),
            ("UTM_CAMPAIGN", &self.utm_campaign),
            ("UTM_CONTENT", &self.utm_content),
            ("UTM_TERM", &self.utm_term),
        ] {
            let value = non_empty(value.as_deref()).map_or(Value::Null, Value::String);
            fields.insert(key.to_string(), value);
        }
    }
}

/// Extra data for one registration sync. Every field is optional; user
/// profile values take precedence where both exist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrmPayload {
    pub utm: Utm,
    pub event_status: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub position: Option<String>,
    pub specialization: Option<String>,
    /// Applied to an existing deal instead of creating a new one.
    pub deal_update_fields: Option<Map<String, Value>>,
}

impl CrmPayload {
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.event_status = Some(status.into());
        self
    }
}
