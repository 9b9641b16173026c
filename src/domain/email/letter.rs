//! Contents of the letters the portal sends.

use serde_json::{json, Map, Value};

use super::request::{IssueRequest, MemberUpdate};
use crate::domain::event::Event;
use crate::domain::foundation::non_empty;
use crate::domain::payment::{metadata_keys, Payment};
use crate::domain::user::User;

/// A subscriber update followed by the letter itself.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationLetter {
    pub member: MemberUpdate,
    pub issue: IssueRequest,
}

/// Builds the "you are registered" letter. Returns `None` when neither the
/// event nor the configuration names a draft.
pub fn registration_letter(
    event: &Event,
    user: &User,
    password: &str,
    is_new_user: bool,
    default_draft: Option<&str>,
    default_group: &str,
) -> Option<RegistrationLetter> {
    let draft = non_empty(event.letter_draft_id.as_deref()).or_else(|| non_empty(default_draft))?;

    let mut extra = Map::new();
    extra.insert("user_name".into(), json!(user.display_name()));
    extra.insert("user_email".into(), json!(user.email));
    extra.insert("is_new_user".into(), json!(is_new_user));
    extra.insert("event_slug".into(), json!(event.slug));
    extra.insert("tag".into(), json!(event.id.as_i64()));
    extra.extend(event_details(event));
    if !password.is_empty() {
        extra.insert("password".into(), json!(password));
    }
    let speakers = speaker_entries(event);
    if !speakers.is_empty() {
        extra.insert("speakers".into(), Value::Array(speakers));
    }

    let mut member = MemberUpdate::new(&user.email);
    member
        .custom
        .insert("event_title".into(), json!(event.title));
    if let Some(first_name) = non_empty(Some(&user.first_name)) {
        member.base.insert("firstName".into(), json!(first_name));
    }
    member.group = Some(
        non_empty(event.groupsensay.as_deref()).unwrap_or_else(|| default_group.to_string()),
    );

    Some(RegistrationLetter {
        member,
        issue: IssueRequest::new(&user.email, draft).with_extra(extra),
    })
}

fn event_details(event: &Event) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert("event_title".into(), json!(event.title));
    data.insert("is_paid".into(), json!(event.is_paid));
    if let Some(label) = event.event_type_label().filter(|l| !l.is_empty()) {
        data.insert("event_type".into(), json!(label));
    }
    data.insert("event_format".into(), json!(event.format.label()));
    if let Some(location) = non_empty(event.location.as_deref()) {
        data.insert("event_location".into(), json!(location));
    }
    if let Some(price) = event.formatted_price() {
        data.insert("price".into(), json!(price));
    }

    if !event.is_archived {
        if let Some(date) = event.start_date {
            data.insert("start_date".into(), json!(date.format("%d.%m.%Y").to_string()));
        }
        if let Some(time) = event.start_time {
            data.insert("start_time".into(), json!(time.format("%H:%M").to_string()));
        }
        if let Some(date) = event.end_date {
            data.insert("end_date".into(), json!(date.format("%d.%m.%Y").to_string()));
        }
        if let Some(time) = event.end_time {
            data.insert("end_time".into(), json!(time.format("%H:%M").to_string()));
        }
    }
    data
}

fn speaker_entries(event: &Event) -> Vec<Value> {
    event
        .speakers
        .iter()
        .map(|entry| {
            let mut item = Map::new();
            item.insert("name".into(), json!(entry.speaker.full_name()));
            for (key, value) in [
                ("position", &entry.speaker.position),
                ("company", &entry.speaker.company),
                ("regalia", &entry.speaker.regalia),
                ("role", &entry.role),
                ("topic", &entry.topic),
            ] {
                if let Some(v) = non_empty(value.as_deref()) {
                    item.insert(key.into(), json!(v));
                }
            }
            Value::Object(item)
        })
        .collect()
}

/// Extra data for the "order paid" letter sent to managers.
pub fn paid_order_extra(payment: &Payment) -> Map<String, Value> {
    let mut extra = Map::new();
    extra.insert("payment_id".into(), json!(payment.id.as_i64()));
    extra.insert("order_id".into(), json!(payment.order_reference()));
    extra.insert("amount".into(), json!(payment.amount.to_display_rubles()));
    extra.insert("currency".into(), json!(payment.currency));
    for key in [
        metadata_keys::EVENT_TITLE,
        metadata_keys::EVENT_SLUG,
        metadata_keys::USER_EMAIL,
        metadata_keys::USER_NAME,
    ] {
        if let Some(value) = payment.metadata_str(key) {
            extra.insert(key.into(), json!(value));
        }
    }
    if let Some(paid_at) = payment.paid_at {
        extra.insert("paid_at".into(), json!(paid_at.to_compact_string()));
    }
    extra
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::sample_speaker;
    use crate::domain::event::{sample_event, EventSpeaker};
    use crate::domain::foundation::Money;
    use crate::domain::payment::{sample_payment, PaymentStatus};
    use crate::domain::user::sample_user;
    use chrono::{NaiveDate, NaiveTime};

    fn event() -> Event {
        let mut event = sample_event(7, "cardio-2025");
        event.title = "Кардиошкола".into();
        event.start_date = NaiveDate::from_ymd_opt(2025, 9, 1);
        event.start_time = NaiveTime::from_hms_opt(10, 0, 0);
        event.location = Some("Москва".into());
        event.is_paid = true;
        event.show_price = true;
        event.price = Some(Money::from_rubles(12_500));
        let mut speaker = sample_speaker(1, "Иванов", "Пётр");
        speaker.company = Some("НМИЦ".into());
        event.speakers = vec![EventSpeaker {
            speaker,
            role: Some("Модератор".into()),
            topic: None,
            sort_order: 0,
        }];
        event
    }

    #[test]
    fn no_draft_means_no_letter() {
        let letter = registration_letter(&event(), &sample_user(1, "a@b.ru"), "", false, None, "pl4344");
        assert!(letter.is_none());
    }

    #[test]
    fn event_draft_overrides_configured_one() {
        let mut event = event();
        event.letter_draft_id = Some("99".into());
        let letter = registration_letter(&event, &sample_user(1, "a@b.ru"), "", false, Some("10"), "pl4344")
            .unwrap();
        assert_eq!(letter.issue.draft_id, "99");
    }

    #[test]
    fn extra_carries_event_and_user_details() {
        let letter = registration_letter(
            &event(),
            &sample_user(1, "doc@clinic.ru"),
            "Secret123abc",
            true,
            Some("10"),
            "pl4344",
        )
        .unwrap();
        let extra = &letter.issue.extra;

        assert_eq!(extra["user_name"], "Анна Петрова");
        assert_eq!(extra["is_new_user"], true);
        assert_eq!(extra["tag"], 7);
        assert_eq!(extra["event_type"], "Вебинар");
        assert_eq!(extra["event_format"], "Онлайн");
        assert_eq!(extra["price"], "12 500 ₽");
        assert_eq!(extra["start_date"], "01.09.2025");
        assert_eq!(extra["start_time"], "10:00");
        assert_eq!(extra["password"], "Secret123abc");
        assert_eq!(extra["speakers"][0]["name"], "Иванов Пётр");
        assert_eq!(extra["speakers"][0]["company"], "НМИЦ");
        assert_eq!(extra["speakers"][0]["role"], "Модератор");
        assert!(extra["speakers"][0].get("topic").is_none());
    }

    #[test]
    fn archived_events_omit_schedule_and_empty_password() {
        let mut event = event();
        event.is_archived = true;
        let letter =
            registration_letter(&event, &sample_user(1, "a@b.ru"), "", false, Some("10"), "pl4344")
                .unwrap();
        assert!(letter.issue.extra.get("start_date").is_none());
        assert!(letter.issue.extra.get("password").is_none());
    }

    #[test]
    fn member_goes_to_event_group_or_default() {
        let mut event = event();
        let user = sample_user(1, "a@b.ru");
        let letter = registration_letter(&event, &user, "", false, Some("10"), "pl4344").unwrap();
        assert_eq!(letter.member.group.as_deref(), Some("pl4344"));
        assert_eq!(letter.member.base["firstName"], "Анна");

        event.groupsensay = Some("pl9000".into());
        let letter = registration_letter(&event, &user, "", false, Some("10"), "pl4344").unwrap();
        assert_eq!(letter.member.group.as_deref(), Some("pl9000"));
        assert_eq!(letter.member.custom["event_title"], "Кардиошкола");
    }

    #[test]
    fn paid_order_extra_uses_metadata() {
        let mut payment = sample_payment(42, PaymentStatus::Completed);
        payment
            .metadata
            .insert(metadata_keys::EVENT_TITLE.into(), json!("Кардиошкола"));
        let extra = paid_order_extra(&payment);
        assert_eq!(extra["order_id"], "ORD000042");
        assert_eq!(extra["event_title"], "Кардиошкола");
        assert!(extra.get("user_email").is_none());
    }
}
