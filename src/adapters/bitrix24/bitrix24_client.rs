//! Bitrix24 REST client.
//!
//! Each method is a JSON POST to `{webhook_url}/{method}.json`. Transport
//! failures and 5xx answers are retried a fixed number of times; a body
//! carrying `error` is a failure even with status 200.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::Bitrix24Config;
use crate::domain::foundation::DomainError;
use crate::ports::{CrmGateway, Fields};

const SERVICE: &str = "Bitrix24";

pub struct Bitrix24Client {
    webhook_url: String,
    deal_category_id: i64,
    deal_type_id: String,
    event_entity_type_id: i64,
    retry_times: u32,
    retry_sleep: Duration,
    http_client: reqwest::Client,
}

impl Bitrix24Client {
    pub fn new(config: &Bitrix24Config) -> Result<Self, DomainError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| DomainError::external(SERVICE, format!("Failed to build client: {}", e)))?;

        Ok(Self {
            webhook_url: config.webhook_url.trim().trim_end_matches('/').to_string(),
            deal_category_id: config.deal_category_id,
            deal_type_id: config.deal_type_id.clone(),
            event_entity_type_id: config.event_entity_type_id,
            retry_times: config.retry_times,
            retry_sleep: config.retry_sleep(),
            http_client,
        })
    }

    async fn post(&self, method: &str, payload: Value) -> Result<Value, DomainError> {
        let url = format!("{}/{}", self.webhook_url, method.trim_start_matches('/'));
        tracing::debug!(method, payload = %payload, "Bitrix24 request");

        let mut attempt = 0;
        let response = loop {
            attempt += 1;
            let retries_left = attempt <= self.retry_times;
            match self.http_client.post(&url).json(&payload).send().await {
                Ok(response) if response.status().is_server_error() && retries_left => {
                    tracing::warn!(method, status = %response.status(), attempt, "Bitrix24 server error, retrying");
                }
                Ok(response) => break response,
                Err(e) if retries_left => {
                    tracing::warn!(method, error = %e, attempt, "Bitrix24 transport error, retrying");
                }
                Err(e) => return Err(DomainError::external(SERVICE, e.to_string())),
            }
            tokio::time::sleep(self.retry_sleep).await;
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(method, %status, body = %body, "Bitrix24 HTTP error");
            return Err(DomainError::external(SERVICE, format!("Bitrix24: HTTP {}", status)));
        }

        let data: Value = response.json().await.map_err(|e| {
            DomainError::external(SERVICE, format!("Failed to parse Bitrix24 response: {}", e))
        })?;
        tracing::debug!(method, %status, response = %data, "Bitrix24 response");

        if let Some(error) = data.get("error") {
            let description = data
                .get("error_description")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            tracing::error!(method, error = %data, "Bitrix24 API error");
            return Err(DomainError::external(
                SERVICE,
                format!("Bitrix24 API error: {}", description),
            ));
        }

        Ok(data)
    }
}

/// Reads an id that may arrive as a number or a numeric string.
fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn result_id(data: &Value) -> i64 {
    data.get("result").and_then(as_id).unwrap_or(0)
}

fn result_flag(data: &Value) -> bool {
    match data.get("result") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Null) | None => false,
        Some(other) => as_id(other).map_or(true, |n| n != 0),
    }
}

/// Ids from a list result made of records keyed by `ID` or `id`.
fn record_ids(records: &Value) -> Vec<i64> {
    records
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("ID").or_else(|| item.get("id")).and_then(as_id))
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl CrmGateway for Bitrix24Client {
    fn is_enabled(&self) -> bool {
        !self.webhook_url.is_empty()
    }

    async fn find_contact(&self, email: Option<&str>, phone: Option<&str>) -> Result<Option<i64>, DomainError> {
        let mut filter = Fields::new();
        if let Some(email) = email.filter(|e| !e.is_empty()) {
            filter.insert("EMAIL".into(), json!(email));
        }
        if let Some(phone) = phone.filter(|p| !p.is_empty()) {
            filter.insert("PHONE".into(), json!(phone));
        }

        let data = self
            .post(
                "crm.contact.list.json",
                json!({ "filter": filter, "select": ["ID", "NAME", "LAST_NAME", "EMAIL", "PHONE"] }),
            )
            .await?;
        Ok(data.get("result").map(record_ids).and_then(|ids| ids.first().copied()))
    }

    async fn add_contact(&self, fields: &Fields) -> Result<i64, DomainError> {
        let data = self.post("crm.contact.add.json", json!({ "fields": fields })).await?;
        Ok(result_id(&data))
    }

    async fn list_deals(&self, contact_id: i64) -> Result<Vec<i64>, DomainError> {
        let data = self
            .post(
                "crm.deal.list.json",
                json!({
                    "filter": {
                        "CONTACT_ID": contact_id,
                        "CATEGORY_ID": self.deal_category_id,
                        "TYPE_ID": self.deal_type_id,
                    },
                    "select": ["ID", "TITLE", "CATEGORY_ID", "STAGE_ID", "ASSIGNED_BY_ID"],
                }),
            )
            .await?;
        Ok(data.get("result").map(record_ids).unwrap_or_default())
    }

    async fn add_deal(&self, fields: &Fields) -> Result<i64, DomainError> {
        let data = self
            .post(
                "crm.deal.add.json",
                json!({ "fields": fields, "params": { "REGISTER_SONET_EVENT": "N" } }),
            )
            .await?;
        Ok(result_id(&data))
    }

    async fn update_deal(&self, deal_id: i64, fields: &Fields) -> Result<bool, DomainError> {
        let data = self
            .post("crm.deal.update.json", json!({ "id": deal_id, "fields": fields }))
            .await?;
        Ok(result_flag(&data))
    }

    async fn add_item(&self, fields: &Fields) -> Result<i64, DomainError> {
        let data = self
            .post(
                "crm.item.add.json",
                json!({ "entityTypeId": self.event_entity_type_id, "fields": fields }),
            )
            .await?;
        let id = data
            .pointer("/result/item/id")
            .and_then(as_id)
            .unwrap_or_else(|| result_id(&data));
        Ok(id)
    }

    async fn list_items(&self, filter: &Fields) -> Result<Vec<i64>, DomainError> {
        let data = self
            .post(
                "crm.item.list.json",
                json!({
                    "entityTypeId": self.event_entity_type_id,
                    "filter": filter,
                    "select": ["id", "title", "assignedById"],
                }),
            )
            .await?;
        let items = data
            .pointer("/result/items")
            .or_else(|| data.get("result"));
        Ok(items.map(record_ids).unwrap_or_default())
    }

    async fn update_item(&self, item_id: i64, fields: &Fields) -> Result<bool, DomainError> {
        let data = self
            .post(
                "crm.item.update.json",
                json!({ "entityTypeId": self.event_entity_type_id, "id": item_id, "fields": fields }),
            )
            .await?;
        Ok(result_flag(&data))
    }
}
