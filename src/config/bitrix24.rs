//! Bitrix24 CRM configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::crm::CrmSettings;

/// Bitrix24 CRM configuration. An empty `webhook_url` disables CRM sync.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Bitrix24Config {
    /// Inbound webhook base, e.g. `https://portal.bitrix24.ru/rest/1/abc123`
    pub webhook_url: String,

    pub deal_category_id: i64,
    pub deal_type_id: String,
    pub event_entity_type_id: i64,
    pub assigned_by_id: i64,
    pub source_id: String,
    pub source_description: String,

    pub uf_city: String,
    pub uf_post: String,
    pub uf_specialization: String,
    pub uf_format: String,

    pub deal_stage_registered: Option<String>,
    pub deal_stage_paid: Option<String>,

    pub event_uf_date_start: Option<String>,
    pub event_uf_format: Option<String>,
    pub event_uf_speakers: Option<String>,
    pub event_uf_status: Option<String>,

    pub retry_times: u32,
    pub retry_sleep_ms: u64,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,

    /// Reuse one event item per contact, deal and title
    pub event_unique: bool,
}

impl Bitrix24Config {
    pub fn is_enabled(&self) -> bool {
        !self.webhook_url.trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn retry_sleep(&self) -> Duration {
        Duration::from_millis(self.retry_sleep_ms)
    }

    pub fn crm_settings(&self) -> CrmSettings {
        CrmSettings {
            deal_category_id: self.deal_category_id,
            deal_type_id: self.deal_type_id.clone(),
            event_entity_type_id: self.event_entity_type_id,
            assigned_by_id: self.assigned_by_id,
            source_id: self.source_id.clone(),
            source_description: self.source_description.clone(),
            uf_city: self.uf_city.clone(),
            uf_post: self.uf_post.clone(),
            uf_specialization: self.uf_specialization.clone(),
            uf_format: self.uf_format.clone(),
            event_uf_date_start: self.event_uf_date_start.clone(),
            event_uf_format: self.event_uf_format.clone(),
            event_uf_speakers: self.event_uf_speakers.clone(),
            event_uf_status: self.event_uf_status.clone(),
            deal_stage_registered: self.deal_stage_registered.clone(),
            deal_stage_paid: self.deal_stage_paid.clone(),
            event_unique: self.event_unique,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.is_enabled() {
            return Ok(());
        }
        if !self.webhook_url.starts_with("http://") && !self.webhook_url.starts_with("https://") {
            return Err(ValidationError::InvalidUrl("BITRIX24__WEBHOOK_URL"));
        }
        if self.timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for Bitrix24Config {
    fn default() -> Self {
        let crm = CrmSettings::default();
        Self {
            webhook_url: String::new(),
            deal_category_id: crm.deal_category_id,
            deal_type_id: crm.deal_type_id,
            event_entity_type_id: crm.event_entity_type_id,
            assigned_by_id: crm.assigned_by_id,
            source_id: crm.source_id,
            source_description: crm.source_description,
            uf_city: crm.uf_city,
            uf_post: crm.uf_post,
            uf_specialization: crm.uf_specialization,
            uf_format: crm.uf_format,
            deal_stage_registered: crm.deal_stage_registered,
            deal_stage_paid: crm.deal_stage_paid,
            event_uf_date_start: crm.event_uf_date_start,
            event_uf_format: crm.event_uf_format,
            event_uf_speakers: crm.event_uf_speakers,
            event_uf_status: crm.event_uf_status,
            retry_times: 3,
            retry_sleep_ms: 250,
            timeout_secs: 15,
            connect_timeout_secs: 5,
            event_unique: crm.event_unique,
        }
    }
}
