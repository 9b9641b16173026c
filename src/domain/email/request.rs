//! Sendsay action bodies.

use serde_json::{json, Map, Value};

/// Group every transactional letter is issued to.
pub const PERSONAL_GROUP: &str = "personal";

/// Draft ids are numeric in Sendsay but stored as text on events.
fn draft_value(draft_id: &str) -> Value {
    draft_id
        .trim()
        .parse::<i64>()
        .map_or_else(|_| json!(draft_id.trim()), |id| json!(id))
}

/// `member.set`: creates or updates a subscriber.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberUpdate {
    pub email: String,
    pub custom: Map<String, Value>,
    pub mailing_consent: Option<bool>,
    pub base: Map<String, Value>,
    pub group: Option<String>,
}

impl MemberUpdate {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    pub fn to_request(&self) -> Value {
        let mut custom = Map::new();
        if let Some(consent) = self.mailing_consent {
            custom.insert("mailing".into(), json!(if consent { "Да" } else { "Нет" }));
        }
        custom.extend(self.custom.clone());

        let mut obj = Map::new();
        obj.insert("custom".into(), Value::Object(custom));
        if !self.base.is_empty() {
            obj.insert("base".into(), Value::Object(self.base.clone()));
        }
        if let Some(group) = self.group.as_deref().filter(|g| !g.is_empty()) {
            obj.insert("-group".into(), json!({ group: "1" }));
        }

        json!({
            "action": "member.set",
            "email": self.email.to_lowercase(),
            "newbie.confirm": "0",
            "obj": obj,
        })
    }
}

/// `issue.send`: sends one letter built from a draft.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueRequest {
    pub email: String,
    pub draft_id: String,
    pub vars: Map<String, Value>,
    pub extra: Map<String, Value>,
}

impl IssueRequest {
    pub fn new(email: impl Into<String>, draft_id: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            draft_id: draft_id.into(),
            vars: Map::new(),
            extra: Map::new(),
        }
    }

    pub fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }

    pub fn to_request(&self) -> Value {
        let mut body = json!({
            "action": "issue.send",
            "sendwhen": "now",
            "letter": { "draft.id": draft_value(&self.draft_id) },
            "email": self.email.to_lowercase(),
            "group": PERSONAL_GROUP,
        });
        if let Value::Object(map) = &mut body {
            if !self.vars.is_empty() {
                map.insert("vars".into(), Value::Object(self.vars.clone()));
            }
            if !self.extra.is_empty() {
                map.insert("extra".into(), Value::Object(self.extra.clone()));
            }
        }
        body
    }
}

/// Masks password-like keys at any depth before a payload is logged.
pub fn sanitize(value: &Value) -> Value {
    const MASK: &str = "[СКРЫТ]";
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let lowered = k.to_lowercase();
                    if lowered == "password" || lowered == "passwd" {
                        (k.clone(), json!(MASK))
                    } else {
                        (k.clone(), sanitize(v))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_set_lowercases_and_adds_group() {
        let mut update = MemberUpdate::new("Doc@Clinic.RU");
        update.custom.insert("event_title".into(), json!("Кардиошкола"));
        update.base.insert("firstName".into(), json!("Анна"));
        update.group = Some("pl4344".into());
        let body = update.to_request();

        assert_eq!(body["action"], "member.set");
        assert_eq!(body["email"], "doc@clinic.ru");
        assert_eq!(body["newbie.confirm"], "0");
        assert_eq!(body["obj"]["custom"]["event_title"], "Кардиошкола");
        assert_eq!(body["obj"]["base"]["firstName"], "Анна");
        assert_eq!(body["obj"]["-group"]["pl4344"], "1");
    }

    #[test]
    fn member_set_consent_and_empty_base() {
        let mut update = MemberUpdate::new("a@b.ru");
        update.mailing_consent = Some(false);
        let body = update.to_request();
        assert_eq!(body["obj"]["custom"]["mailing"], "Нет");
        assert!(body["obj"].get("base").is_none());
        assert!(body["obj"].get("-group").is_none());
    }

    #[test]
    fn issue_send_uses_numeric_draft_when_possible() {
        let body = IssueRequest::new("A@B.ru", "42").to_request();
        assert_eq!(body["letter"]["draft.id"], 42);
        assert_eq!(body["group"], PERSONAL_GROUP);
        assert!(body.get("extra").is_none());

        let body = IssueRequest::new("a@b.ru", "draft-x").to_request();
        assert_eq!(body["letter"]["draft.id"], "draft-x");
    }

    #[test]
    fn sanitize_masks_nested_passwords() {
        let payload = json!({
            "action": "login",
            "passwd": "secret",
            "extra": { "Password": "abc", "speakers": [{ "password": "x", "name": "n" }] }
        });
        let clean = sanitize(&payload);
        assert_eq!(clean["passwd"], "[СКРЫТ]");
        assert_eq!(clean["extra"]["Password"], "[СКРЫТ]");
        assert_eq!(clean["extra"]["speakers"][0]["password"], "[СКРЫТ]");
        assert_eq!(clean["extra"]["speakers"][0]["name"], "n");
        assert_eq!(clean["action"], "login");
    }
}
