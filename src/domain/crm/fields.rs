//! Field builders for contacts, deals and event items.

use serde_json::{json, Map, Value};

use super::payload::{CrmPayload, STATUS_AWAITING_PAYMENT};
use super::settings::{normalize_uf_key, CrmSettings};
use crate::domain::event::Event;
use crate::domain::foundation::{non_empty, LocalOffset};
use crate::domain::user::User;

pub const CONTACT_COMMENTS: &str = "Заявка с лендинга";
pub const DEAL_TITLE: &str = "Сделка по заявке с мероприятия";
pub const DEAL_COMMENTS: &str = "Создано из формы регистрации";
pub const DEAL_ADDITIONAL_INFO: &str = "Создано автоматически";
pub const ITEM_COMMENTS: &str = "Регистрация с лендинга";

fn first_present(a: Option<&str>, b: Option<&str>) -> Option<String> {
    non_empty(a).or_else(|| non_empty(b))
}

fn opt(value: Option<String>) -> Value {
    value.map_or(Value::Null, Value::String)
}

pub fn contact_fields(user: &User, payload: &CrmPayload, settings: &CrmSettings) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(
        "NAME".into(),
        json!(first_present(Some(&user.first_name), payload.first_name.as_deref()).unwrap_or_default()),
    );
    fields.insert(
        "SECOND_NAME".into(),
        json!(first_present(user.middle_name.as_deref(), payload.middle_name.as_deref())
            .unwrap_or_default()),
    );
    fields.insert(
        "LAST_NAME".into(),
        json!(first_present(Some(&user.last_name), payload.last_name.as_deref()).unwrap_or_default()),
    );
    fields.insert("SOURCE_ID".into(), json!(settings.source_id));
    fields.insert("SOURCE_DESCRIPTION".into(), json!(settings.source_description));
    fields.insert("COMMENTS".into(), json!(CONTACT_COMMENTS));
    fields.insert("ASSIGNED_BY_ID".into(), json!(settings.assigned_by_id));
    payload.utm.write_into(&mut fields);
    fields.insert(
        settings.uf_city.clone(),
        opt(first_present(user.city.as_deref(), payload.city.as_deref())),
    );

    let phones: Vec<Value> = first_present(user.phone.as_deref(), payload.phone.as_deref())
        .map(|phone| json!({ "VALUE": phone, "VALUE_TYPE": "MOBILE" }))
        .into_iter()
        .collect();
    let emails: Vec<Value> = non_empty(Some(&user.email))
        .map(|email| json!({ "VALUE": email, "VALUE_TYPE": "WORK" }))
        .into_iter()
        .collect();
    fields.insert("PHONE".into(), Value::Array(phones));
    fields.insert("EMAIL".into(), Value::Array(emails));
    fields
}

pub fn deal_fields(
    event: &Event,
    contact_id: i64,
    payload: &CrmPayload,
    settings: &CrmSettings,
) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("TITLE".into(), json!(DEAL_TITLE));
    fields.insert("CATEGORY_ID".into(), json!(settings.deal_category_id));
    fields.insert("CURRENCY_ID".into(), json!("RUB"));
    fields.insert("OPPORTUNITY".into(), json!(0.0));
    fields.insert("IS_MANUAL_OPPORTUNITY".into(), json!("Y"));
    fields.insert("ASSIGNED_BY_ID".into(), json!(settings.assigned_by_id));
    fields.insert("CONTACT_IDS".into(), json!([contact_id]));
    fields.insert("OPENED".into(), json!("Y"));
    fields.insert("CLOSED".into(), json!("N"));
    fields.insert("COMMENTS".into(), json!(DEAL_COMMENTS));
    fields.insert("SOURCE_ID".into(), json!(settings.source_id));
    fields.insert("SOURCE_DESCRIPTION".into(), json!(settings.source_description));
    fields.insert("ADDITIONAL_INFO".into(), json!(DEAL_ADDITIONAL_INFO));
    payload.utm.write_into(&mut fields);
    fields.insert(
        settings.uf_city.clone(),
        opt(first_present(payload.city.as_deref(), event.location.as_deref())),
    );
    fields.insert(settings.uf_post.clone(), opt(non_empty(payload.position.as_deref())));
    fields.insert(
        settings.uf_specialization.clone(),
        opt(non_empty(payload.specialization.as_deref())),
    );
    fields.insert(settings.uf_format.clone(), json!(event.format.as_str()));
    fields
}

/// Fields of the per-registration smart-process item. Custom keys are
/// written only when their code is configured.
pub fn event_item_fields(
    event: &Event,
    contact_id: i64,
    deal_id: Option<i64>,
    payload: &CrmPayload,
    settings: &CrmSettings,
    offset: LocalOffset,
) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("title".into(), json!(event.title));
    fields.insert("contactId".into(), json!(contact_id));
    fields.insert("comments".into(), json!(ITEM_COMMENTS));
    fields.insert("assignedById".into(), json!(settings.assigned_by_id));
    if let Some(deal_id) = deal_id {
        fields.insert("parentId2".into(), json!(deal_id));
    }

    let key = |code: &Option<String>| code.as_deref().and_then(normalize_uf_key);

    if let (Some(date_key), Some(start_date)) = (key(&settings.event_uf_date_start), event.start_date) {
        let time = event.start_time.unwrap_or_default();
        fields.insert(date_key, json!(offset.to_iso8601(start_date, time)));
    }
    if let Some(format_key) = key(&settings.event_uf_format) {
        fields.insert(format_key, json!(event.format.label()));
    }
    if let Some(speakers_key) = key(&settings.event_uf_speakers) {
        let speakers = event.speaker_names();
        if !speakers.is_empty() {
            fields.insert(speakers_key, json!(speakers));
        }
    }
    if let Some(status_key) = settings.status_key() {
        let status = non_empty(payload.event_status.as_deref())
            .unwrap_or_else(|| STATUS_AWAITING_PAYMENT.to_string());
        fields.insert(status_key, json!(status));
    }
    fields
}
