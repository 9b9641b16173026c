//! PayKeeper payment notification payload.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::WebhookError;
use crate::domain::foundation::Money;

/// Customer fields echoed back by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClientData {
    pub clientid: String,
    pub orderid: String,
    pub service_name: String,
    pub client_email: String,
    pub client_phone: String,
}

/// Processing details reported by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GatewayPaymentData {
    pub ps_id: Option<String>,
    pub batch_date: Option<String>,
    pub fop_receipt_key: Option<String>,
    pub bank_id: Option<String>,
    pub card_number: Option<String>,
    pub card_holder: Option<String>,
    pub card_expiry: Option<String>,
}

/// A form-encoded "payment received" notification.
#[derive(Debug, Clone, PartialEq)]
pub struct PayKeeperNotification {
    pub invoice_id: String,
    pub amount: Money,
    pub key: String,
    pub client: ClientData,
    pub payment: GatewayPaymentData,
    /// Every submitted field, kept verbatim as callback data.
    pub original: Map<String, Value>,
}

fn field(form: &HashMap<String, String>, name: &str) -> String {
    form.get(name).map(|v| v.trim().to_string()).unwrap_or_default()
}

fn optional(form: &HashMap<String, String>, name: &str) -> Option<String> {
    form.get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// The three fields every notification must carry, non-empty.
pub fn has_required_fields(form: &HashMap<String, String>) -> bool {
    ["id", "sum", "key"]
        .iter()
        .all(|name| form.get(*name).map_or(false, |v| !v.trim().is_empty()))
}

impl PayKeeperNotification {
    pub fn parse(form: &HashMap<String, String>) -> Result<Self, WebhookError> {
        if !has_required_fields(form) {
            return Err(WebhookError::MissingFields);
        }
        let amount = Money::from_decimal_str(&field(form, "sum"))
            .map_err(|_| WebhookError::ValidationFailed)?;

        let mut original = Map::new();
        let mut keys: Vec<&String> = form.keys().collect();
        keys.sort();
        for key in keys {
            if let Some(value) = form.get(key) {
                original.insert(key.clone(), Value::String(value.clone()));
            }
        }

        Ok(Self {
            invoice_id: field(form, "id"),
            amount,
            key: field(form, "key"),
            client: ClientData {
                clientid: field(form, "clientid"),
                orderid: field(form, "orderid"),
                service_name: field(form, "service_name"),
                client_email: field(form, "client_email"),
                client_phone: field(form, "client_phone"),
            },
            payment: GatewayPaymentData {
                ps_id: optional(form, "ps_id"),
                batch_date: optional(form, "batch_date"),
                fop_receipt_key: optional(form, "fop_receipt_key"),
                bank_id: optional(form, "bank_id"),
                card_number: optional(form, "card_number"),
                card_holder: optional(form, "card_holder"),
                card_expiry: optional(form, "card_expiry"),
            },
            original,
        })
    }

    pub fn order_id(&self) -> Option<&str> {
        Some(self.client.orderid.as_str()).filter(|o| !o.is_empty())
    }
}

#[cfg(test)]
pub(crate) fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
