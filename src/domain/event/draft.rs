//! Back-office event form.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

use super::{EventFormat, KinescopeType};
use crate::domain::foundation::{
    optional_text, require_text, slugify, AmountInput, CategoryId, Money, SpeakerId,
    ValidationError,
};

#[derive(Debug, Clone, Deserialize)]
pub struct SpeakerAssignment {
    pub id: SpeakerId,
    pub role: Option<String>,
    pub topic: Option<String>,
    pub sort_order: Option<i32>,
}

/// Unvalidated event input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventDraft {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub event_type: Option<String>,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub topic: Option<String>,
    pub location: Option<String>,
    pub format: Option<String>,
    pub image: Option<String>,
    pub registration_enabled: Option<bool>,
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub categories: Vec<CategoryId>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
    pub is_archived: Option<bool>,
    pub price: Option<AmountInput>,
    pub is_paid: Option<bool>,
    pub show_price: Option<bool>,
    pub is_on_demand: Option<bool>,
    pub kinescope_id: Option<String>,
    pub kinescope_playlist_id: Option<String>,
    pub kinescope_type: Option<String>,
    pub is_live: Option<bool>,
    pub letter_draft_id: Option<String>,
    pub groupsensay: Option<String>,
    pub max_quantity: Option<i32>,
    #[serde(default)]
    pub speakers: Vec<SpeakerAssignment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerLink {
    pub speaker_id: SpeakerId,
    pub role: Option<String>,
    pub topic: Option<String>,
    pub sort_order: i32,
}

/// Validated event fields. `slug` is a base slug; uniqueness is resolved on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFields {
    pub title: String,
    pub slug: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub event_type: String,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub topic: Option<String>,
    pub location: Option<String>,
    pub format: EventFormat,
    pub image: Option<String>,
    pub registration_enabled: bool,
    pub category_id: Option<CategoryId>,
    pub categories: Vec<CategoryId>,
    pub is_active: bool,
    pub sort_order: i32,
    pub is_archived: bool,
    pub price: Option<Money>,
    pub is_paid: bool,
    pub show_price: bool,
    pub is_on_demand: bool,
    pub kinescope_id: Option<String>,
    pub kinescope_playlist_id: Option<String>,
    pub kinescope_type: Option<KinescopeType>,
    pub is_live: Option<bool>,
    pub letter_draft_id: Option<String>,
    pub groupsensay: Option<String>,
    pub max_quantity: Option<i32>,
    pub speakers: Vec<SpeakerLink>,
}

impl EventDraft {
    pub fn validate(&self) -> Result<EventFields, ValidationError> {
        let title = require_text("title", self.title.as_deref(), 255)?;
        let slug = match optional_text("slug", self.slug.as_deref(), 255)? {
            Some(s) => slugify(&s),
            None => slugify(&title),
        };
        if slug.is_empty() {
            return Err(ValidationError::invalid_format(
                "slug",
                "could not derive a slug from the title",
            ));
        }

        let is_on_demand = self.is_on_demand.unwrap_or(false);
        if !is_on_demand && self.start_date.is_none() {
            return Err(ValidationError::empty_field("start_date"));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(ValidationError::invalid_format(
                    "end_date",
                    "must not be before start_date",
                ));
            }
        }

        let format = match self.format.as_deref().map(str::trim) {
            None | Some("") => EventFormat::default(),
            Some(raw) => raw.parse()?,
        };

        let kinescope_id = optional_text("kinescope_id", self.kinescope_id.as_deref(), 255)?;
        let kinescope_playlist_id = optional_text(
            "kinescope_playlist_id",
            self.kinescope_playlist_id.as_deref(),
            255,
        )?;
        let kinescope_type = match self.kinescope_type.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<KinescopeType>()?),
        };
        match kinescope_type {
            Some(KinescopeType::Video) if kinescope_id.is_none() => {
                return Err(ValidationError::empty_field("kinescope_id"));
            }
            Some(KinescopeType::Playlist) if kinescope_playlist_id.is_none() => {
                return Err(ValidationError::empty_field("kinescope_playlist_id"));
            }
            _ => {}
        }

        let price = match &self.price {
            Some(input) => input.to_money("price")?,
            None => None,
        };
        if let Some(max) = self.max_quantity {
            if max < 0 {
                return Err(ValidationError::invalid_format(
                    "max_quantity",
                    "must not be negative",
                ));
            }
        }

        let mut speakers = Vec::with_capacity(self.speakers.len());
        for (index, s) in self.speakers.iter().enumerate() {
            speakers.push(SpeakerLink {
                speaker_id: s.id,
                role: optional_text("speakers.role", s.role.as_deref(), 100)?,
                topic: optional_text("speakers.topic", s.topic.as_deref(), 255)?,
                sort_order: s.sort_order.unwrap_or(index as i32).max(0),
            });
        }

        let mut categories = self.categories.clone();
        if categories.is_empty() {
            categories.extend(self.category_id);
        }
        categories.sort();
        categories.dedup();

        Ok(EventFields {
            title,
            slug,
            start_date: self.start_date,
            end_date: self.end_date,
            start_time: self.start_time,
            end_time: self.end_time,
            event_type: require_text("event_type", self.event_type.as_deref(), 50)?,
            short_description: optional_text(
                "short_description",
                self.short_description.as_deref(),
                100_000,
            )?,
            full_description: optional_text(
                "full_description",
                self.full_description.as_deref(),
                1_000_000,
            )?,
            topic: optional_text("topic", self.topic.as_deref(), 255)?,
            location: optional_text("location", self.location.as_deref(), 255)?,
            format,
            image: optional_text("image", self.image.as_deref(), 1024)?,
            registration_enabled: self.registration_enabled.unwrap_or(true),
            category_id: self.category_id,
            categories,
            is_active: self.is_active.unwrap_or(true),
            sort_order: self.sort_order.unwrap_or(0).max(0),
            is_archived: self.is_archived.unwrap_or(false),
            price,
            is_paid: self.is_paid.unwrap_or(false),
            show_price: self.show_price.unwrap_or(false),
            is_on_demand,
            kinescope_id,
            kinescope_playlist_id,
            kinescope_type,
            is_live: self.is_live,
            letter_draft_id: optional_text("letter_draft_id", self.letter_draft_id.as_deref(), 255)?,
            groupsensay: optional_text("groupsensay", self.groupsensay.as_deref(), 255)?,
            max_quantity: self.max_quantity,
            speakers,
        })
    }
}

/// Candidate slug for the `attempt`-th collision: `base`, `base-2`, `base-3`...
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        base.to_string()
    } else {
        format!("{}-{}", base, attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> EventDraft {
        EventDraft {
            title: Some("Школа кардиологии".into()),
            event_type: Some("webinar".into()),
            start_date: NaiveDate::from_ymd_opt(2025, 9, 1),
            ..Default::default()
        }
    }

    #[test]
    fn minimal_draft_gets_defaults() {
        let fields = minimal().validate().unwrap();
        assert_eq!(fields.slug, "shkola-kardiologii");
        assert_eq!(fields.format, EventFormat::Offline);
        assert!(fields.registration_enabled);
        assert!(fields.is_active);
        assert_eq!(fields.price, None);
    }

    #[test]
    fn start_date_required_unless_on_demand() {
        let mut draft = minimal();
        draft.start_date = None;
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::EmptyField { field }) if field == "start_date"
        ));
        draft.is_on_demand = Some(true);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut draft = minimal();
        draft.end_date = NaiveDate::from_ymd_opt(2025, 8, 1);
        assert!(draft.validate().is_err());
    }

    #[test]
    fn unknown_format_is_rejected() {
        let mut draft = minimal();
        draft.format = Some("hologram".into());
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::InvalidFormat { field, .. }) if field == "format"
        ));
    }

    #[test]
    fn kinescope_type_must_match_id() {
        let mut draft = minimal();
        draft.kinescope_type = Some("playlist".into());
        draft.kinescope_id = Some("vid".into());
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::EmptyField { field }) if field == "kinescope_playlist_id"
        ));
        draft.kinescope_playlist_id = Some("pl".into());
        assert_eq!(
            draft.validate().unwrap().kinescope_type,
            Some(KinescopeType::Playlist)
        );
    }

    #[test]
    fn price_accepts_number_or_string() {
        let draft: EventDraft = serde_json::from_value(serde_json::json!({
            "title": "Paid",
            "event_type": "course",
            "is_on_demand": true,
            "price": 1500.5
        }))
        .unwrap();
        assert_eq!(
            draft.validate().unwrap().price,
            Some(Money::from_kopecks(150_050))
        );

        let mut draft = minimal();
        draft.price = Some(AmountInput::Text("2 000".into()));
        assert!(draft.validate().is_err());
        draft.price = Some(AmountInput::Text("2000,00".into()));
        assert_eq!(draft.validate().unwrap().price, Some(Money::from_rubles(2000)));
    }

    #[test]
    fn primary_category_fills_empty_pivot() {
        let mut draft = minimal();
        draft.category_id = Some(CategoryId::new(4));
        assert_eq!(draft.validate().unwrap().categories, vec![CategoryId::new(4)]);
    }

    #[test]
    fn speaker_order_defaults_to_position() {
        let mut draft = minimal();
        draft.speakers = vec![
            SpeakerAssignment {
                id: SpeakerId::new(9),
                role: Some("Модератор".into()),
                topic: None,
                sort_order: None,
            },
            SpeakerAssignment {
                id: SpeakerId::new(3),
                role: None,
                topic: None,
                sort_order: None,
            },
        ];
        let links = draft.validate().unwrap().speakers;
        assert_eq!(links[0].sort_order, 0);
        assert_eq!(links[1].sort_order, 1);
        assert_eq!(links[0].role.as_deref(), Some("Модератор"));
    }

    #[test]
    fn slug_candidates_append_counter() {
        assert_eq!(slug_candidate("cardio", 1), "cardio");
        assert_eq!(slug_candidate("cardio", 3), "cardio-3");
    }
}
