//! Speakers who present at events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{optional_text, require_text, SpeakerId, Timestamp, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    pub id: SpeakerId,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub photo: Option<String>,
    pub regalia: Option<String>,
    pub description: Option<String>,
    pub position: Option<String>,
    pub company: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Speaker {
    /// "Last First Middle", skipping empty parts.
    pub fn full_name(&self) -> String {
        [
            Some(self.last_name.as_str()),
            Some(self.first_name.as_str()),
            self.middle_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// "Last F. M."
    pub fn short_name(&self) -> String {
        let mut name = self.last_name.trim().to_string();
        for part in [Some(self.first_name.as_str()), self.middle_name.as_deref()]
            .into_iter()
            .flatten()
        {
            if let Some(initial) = part.trim().chars().next() {
                name.push(' ');
                name.push(initial);
                name.push('.');
            }
        }
        name
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeakerDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub photo: Option<String>,
    pub regalia: Option<String>,
    pub description: Option<String>,
    pub position: Option<String>,
    pub company: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerFields {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub photo: Option<String>,
    pub regalia: Option<String>,
    pub description: Option<String>,
    pub position: Option<String>,
    pub company: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
}

impl SpeakerDraft {
    pub fn validate(&self) -> Result<SpeakerFields, ValidationError> {
        Ok(SpeakerFields {
            first_name: require_text("first_name", self.first_name.as_deref(), 255)?,
            last_name: require_text("last_name", self.last_name.as_deref(), 255)?,
            middle_name: optional_text("middle_name", self.middle_name.as_deref(), 255)?,
            photo: optional_text("photo", self.photo.as_deref(), 1024)?,
            regalia: optional_text("regalia", self.regalia.as_deref(), 10_000)?,
            description: optional_text("description", self.description.as_deref(), 50_000)?,
            position: optional_text("position", self.position.as_deref(), 255)?,
            company: optional_text("company", self.company.as_deref(), 255)?,
            is_active: self.is_active.unwrap_or(true),
            sort_order: self.sort_order.unwrap_or(0),
        })
    }
}

#[cfg(test)]
pub(crate) fn sample_speaker(id: i64, last: &str, first: &str) -> Speaker {
    let now = Timestamp::now();
    Speaker {
        id: SpeakerId::new(id),
        first_name: first.to_string(),
        last_name: last.to_string(),
        middle_name: None,
        photo: None,
        regalia: None,
        description: None,
        position: None,
        company: None,
        is_active: true,
        sort_order: 0,
        created_at: now,
        updated_at: now,
    }
}
