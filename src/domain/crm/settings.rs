//! Portal-specific CRM field codes and pipeline identifiers.

use serde::{Deserialize, Serialize};

/// Which configured deal stage to move a deal into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealStageKey {
    Registered,
    Paid,
}

impl DealStageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealStageKey::Registered => "registered",
            DealStageKey::Paid => "paid",
        }
    }
}

/// Field codes and identifiers that vary between CRM portals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmSettings {
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
    pub event_uf_date_start: Option<String>,
    pub event_uf_format: Option<String>,
    pub event_uf_speakers: Option<String>,
    pub event_uf_status: Option<String>,
    pub deal_stage_registered: Option<String>,
    pub deal_stage_paid: Option<String>,
    pub event_unique: bool,
}

impl Default for CrmSettings {
    fn default() -> Self {
        Self {
            deal_category_id: 0,
            deal_type_id: "SALE".to_string(),
            event_entity_type_id: 1040,
            assigned_by_id: 41,
            source_id: "WEB".to_string(),
            source_description: "Регистрация на мероприятие".to_string(),
            uf_city: "UF_CRM_ITS_DICT_CITY".to_string(),
            uf_post: "UF_CRM_POST".to_string(),
            uf_specialization: "UF_CRM_1642077639".to_string(),
            uf_format: "UF_CRM_1719829830428".to_string(),
            event_uf_date_start: None,
            event_uf_format: None,
            event_uf_speakers: None,
            event_uf_status: Some("UF_CRM_15_STATUS".to_string()),
            deal_stage_registered: None,
            deal_stage_paid: None,
            event_unique: false,
        }
    }
}

impl CrmSettings {
    pub fn stage_id(&self, key: DealStageKey) -> Option<&str> {
        let stage = match key {
            DealStageKey::Registered => &self.deal_stage_registered,
            DealStageKey::Paid => &self.deal_stage_paid,
        };
        stage.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Camel-cased key of the event item status field.
    pub fn status_key(&self) -> Option<String> {
        self.event_uf_status.as_deref().and_then(normalize_uf_key)
    }
}

/// Converts an upper-snake field code into the camelCase form used by
/// smart-process items: `UF_CRM_15_STATUS` becomes `ufCrm15Status`.
/// Codes without underscores are returned as is.
pub fn normalize_uf_key(code: &str) -> Option<String> {
    let code = code.trim();
    if code.is_empty() {
        return None;
    }
    if !code.contains('_') {
        return Some(code.to_string());
    }

    let mut parts = code.split('_').map(str::to_lowercase);
    let mut camel = parts.next().unwrap_or_default();
    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            camel.extend(first.to_uppercase());
            camel.push_str(chars.as_str());
        }
    }
    Some(camel)
}
