//! Event aggregate.
//!
//! Schedules are stored as local wall-clock dates and times. Everything that
//! compares them against "now" takes a [`LocalOffset`] so the interpretation
//! stays explicit.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::catalog::{Category, Speaker};
use crate::domain::foundation::{
    CategoryId, EventId, LocalOffset, Money, Timestamp, ValidationError,
};

/// Hours an event is assumed to run when no end time is set.
pub const DEFAULT_DURATION_HOURS: i64 = 3;

const KINESCOPE_EMBED_BASE: &str = "https://kinescope.io/embed";

/// Attendance format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventFormat {
    Online,
    #[default]
    Offline,
    Hybrid,
}

impl EventFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventFormat::Online => "online",
            EventFormat::Offline => "offline",
            EventFormat::Hybrid => "hybrid",
        }
    }

    /// Russian label used in letters and CRM items.
    pub fn label(&self) -> &'static str {
        match self {
            EventFormat::Online => "Онлайн",
            EventFormat::Offline => "Офлайн",
            EventFormat::Hybrid => "Гибридный",
        }
    }
}

impl fmt::Display for EventFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "online" => Ok(EventFormat::Online),
            "offline" => Ok(EventFormat::Offline),
            "hybrid" => Ok(EventFormat::Hybrid),
            other => Err(ValidationError::invalid_format(
                "format",
                format!("'{}' is not one of online, offline, hybrid", other),
            )),
        }
    }
}

/// Translates a known event type to Russian; unknown types pass through.
pub fn event_type_label(event_type: &str) -> &str {
    match event_type {
        "webinar" => "Вебинар",
        "conference" => "Конференция",
        "course" => "Курс",
        "workshop" => "Мастер-класс",
        "seminar" => "Семинар",
        "other" => "Другое",
        other => other,
    }
}

/// Kind of hosted recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KinescopeType {
    Video,
    Playlist,
}

impl KinescopeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KinescopeType::Video => "video",
            KinescopeType::Playlist => "playlist",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            KinescopeType::Video => "Видео",
            KinescopeType::Playlist => "Плейлист",
        }
    }
}

impl FromStr for KinescopeType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "video" => Ok(KinescopeType::Video),
            "playlist" => Ok(KinescopeType::Playlist),
            other => Err(ValidationError::invalid_format(
                "kinescope_type",
                format!("'{}' is not one of video, playlist", other),
            )),
        }
    }
}

/// Player size variant appended to the embed URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedSize {
    #[default]
    Default,
    Compact,
    Mini,
}

impl EmbedSize {
    fn query(&self) -> &'static str {
        match self {
            EmbedSize::Default => "",
            EmbedSize::Compact => "?compact=true",
            EmbedSize::Mini => "?mini=true",
        }
    }
}

/// A speaker attached to an event with per-event details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSpeaker {
    pub speaker: Speaker,
    pub role: Option<String>,
    pub topic: Option<String>,
    pub sort_order: i32,
}

/// Why registration is closed, in the order the rules are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationBlock {
    Inactive,
    RegistrationDisabled,
    RecordingUnavailable,
    AlreadyPassed,
}

impl RegistrationBlock {
    pub fn message(&self) -> &'static str {
        match self {
            RegistrationBlock::Inactive => "Мероприятие недоступно",
            RegistrationBlock::RegistrationDisabled => "Регистрация на мероприятие отключена",
            RegistrationBlock::RecordingUnavailable => "Запись мероприятия пока недоступна",
            RegistrationBlock::AlreadyPassed => "Мероприятие уже прошло",
        }
    }
}

impl fmt::Display for RegistrationBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub slug: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub event_type: Option<String>,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub topic: Option<String>,
    pub location: Option<String>,
    pub format: EventFormat,
    pub image: Option<String>,
    pub registration_enabled: bool,
    pub category_id: Option<CategoryId>,
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
    pub categories: Vec<Category>,
    pub speakers: Vec<EventSpeaker>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Event {
    pub fn has_recording(&self) -> bool {
        present(&self.kinescope_id).is_some() || present(&self.kinescope_playlist_id).is_some()
    }

    /// Player URL for the hosted recording, if the type matches a stored id.
    pub fn embed_url(&self, size: EmbedSize) -> Option<String> {
        match self.kinescope_type? {
            KinescopeType::Playlist => present(&self.kinescope_playlist_id)
                .map(|id| format!("{}/pl/{}{}", KINESCOPE_EMBED_BASE, id, size.query())),
            KinescopeType::Video => present(&self.kinescope_id)
                .map(|id| format!("{}/{}{}", KINESCOPE_EMBED_BASE, id, size.query())),
        }
    }

    pub fn recording_type_label(&self) -> Option<&'static str> {
        self.kinescope_type.map(|t| t.label())
    }

    /// Price for display, e.g. "12 500 ₽". Hidden prices and zero prices give `None`.
    pub fn formatted_price(&self) -> Option<String> {
        if !self.show_price {
            return None;
        }
        self.price
            .filter(Money::is_positive)
            .map(|p| p.to_display_rubles())
    }

    /// Paid events need a positive price before a payment can be created.
    pub fn requires_payment(&self) -> bool {
        self.is_paid && self.price.map_or(false, |p| p.is_positive())
    }

    pub fn event_type_label(&self) -> Option<&str> {
        self.event_type.as_deref().map(event_type_label)
    }

    /// First rule that closes registration, or `None` when it is open.
    pub fn registration_block(&self, today: NaiveDate) -> Option<RegistrationBlock> {
        if !self.is_active {
            return Some(RegistrationBlock::Inactive);
        }
        if !self.registration_enabled {
            return Some(RegistrationBlock::RegistrationDisabled);
        }
        if self.is_archived {
            if !self.has_recording() {
                return Some(RegistrationBlock::RecordingUnavailable);
            }
            return None;
        }
        if self.format == EventFormat::Offline && self.start_date.map_or(false, |d| d < today) {
            return Some(RegistrationBlock::AlreadyPassed);
        }
        None
    }

    /// Whether the event is streaming right now.
    pub fn is_live(&self, now: Timestamp, offset: LocalOffset) -> bool {
        if !self.is_active || self.is_archived {
            return false;
        }
        match self.is_live {
            Some(false) => false,
            Some(true) if self.start_date.is_none() || self.start_time.is_none() => true,
            _ => self.within_time_frame(now, offset),
        }
    }

    fn within_time_frame(&self, now: Timestamp, offset: LocalOffset) -> bool {
        let (Some(start_date), Some(start_time)) = (self.start_date, self.start_time) else {
            return false;
        };
        let start = offset.to_timestamp(start_date, start_time);
        let end = match (self.end_date, self.end_time) {
            (Some(end_date), Some(end_time)) => offset.to_timestamp(end_date, end_time),
            _ => start.plus_hours(DEFAULT_DURATION_HOURS),
        };
        !now.is_before(&start) && !now.is_after(&end)
    }

    pub fn payment_description(&self) -> String {
        if self.is_archived {
            format!("Оплата доступа к записи мероприятия: {}", self.title)
        } else {
            format!("Оплата участия в мероприятии: {}", self.title)
        }
    }

    /// Category ids from both the pivot and the primary category column.
    pub fn category_ids(&self) -> Vec<CategoryId> {
        let mut ids: Vec<CategoryId> = self.categories.iter().map(|c| c.id).collect();
        if let Some(primary) = self.category_id {
            if !ids.contains(&primary) {
                ids.push(primary);
            }
        }
        ids
    }

    /// Speaker full names joined with ", ".
    pub fn speaker_names(&self) -> String {
        self.speakers
            .iter()
            .map(|s| s.speaker.full_name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
pub(crate) fn sample_event(id: i64, slug: &str) -> Event {
    let now = Timestamp::now();
    Event {
        id: EventId::new(id),
        title: format!("Event {}", id),
        slug: slug.to_string(),
        start_date: None,
        end_date: None,
        start_time: None,
        end_time: None,
        event_type: Some("webinar".to_string()),
        short_description: None,
        full_description: None,
        topic: None,
        location: None,
        format: EventFormat::Online,
        image: None,
        registration_enabled: true,
        category_id: None,
        is_active: true,
        sort_order: 0,
        is_archived: false,
        price: None,
        is_paid: false,
        show_price: false,
        is_on_demand: false,
        kinescope_id: None,
        kinescope_playlist_id: None,
        kinescope_type: None,
        is_live: None,
        letter_draft_id: None,
        groupsensay: None,
        max_quantity: None,
        categories: Vec::new(),
        speakers: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::sample_speaker;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap())
    }

    // ═══════════════════════════════════════════════════════════════
    // Recording
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn playlist_embed_url_uses_pl_path() {
        let mut e = sample_event(1, "e");
        e.kinescope_type = Some(KinescopeType::Playlist);
        e.kinescope_playlist_id = Some("abc".into());
        assert_eq!(
            e.embed_url(EmbedSize::Default).as_deref(),
            Some("https://kinescope.io/embed/pl/abc")
        );
        assert_eq!(
            e.embed_url(EmbedSize::Compact).as_deref(),
            Some("https://kinescope.io/embed/pl/abc?compact=true")
        );
    }

    #[test]
    fn video_embed_url_with_mini_size() {
        let mut e = sample_event(1, "e");
        e.kinescope_type = Some(KinescopeType::Video);
        e.kinescope_id = Some("vid".into());
        assert_eq!(
            e.embed_url(EmbedSize::Mini).as_deref(),
            Some("https://kinescope.io/embed/vid?mini=true")
        );
        assert_eq!(e.recording_type_label(), Some("Видео"));
    }

    #[test]
    fn mismatched_type_has_no_embed_url() {
        let mut e = sample_event(1, "e");
        e.kinescope_type = Some(KinescopeType::Playlist);
        e.kinescope_id = Some("vid".into());
        assert!(e.has_recording());
        assert_eq!(e.embed_url(EmbedSize::Default), None);
    }

    #[test]
    fn blank_ids_do_not_count_as_recording() {
        let mut e = sample_event(1, "e");
        e.kinescope_id = Some("  ".into());
        assert!(!e.has_recording());
    }

    // ═══════════════════════════════════════════════════════════════
    // Price
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn formatted_price_groups_thousands() {
        let mut e = sample_event(1, "e");
        e.show_price = true;
        e.price = Some(Money::from_rubles(12_500));
        assert_eq!(e.formatted_price().as_deref(), Some("12 500 ₽"));
    }

    #[test]
    fn formatted_price_hidden_when_not_shown_or_zero() {
        let mut e = sample_event(1, "e");
        e.price = Some(Money::from_rubles(100));
        assert_eq!(e.formatted_price(), None);
        e.show_price = true;
        e.price = Some(Money::ZERO);
        assert_eq!(e.formatted_price(), None);
    }

    // ═══════════════════════════════════════════════════════════════
    // Registration rules
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn inactive_is_checked_first() {
        let mut e = sample_event(1, "e");
        e.is_active = false;
        e.registration_enabled = false;
        assert_eq!(
            e.registration_block(date(2025, 1, 1)),
            Some(RegistrationBlock::Inactive)
        );
    }

    #[test]
    fn disabled_registration_is_blocked() {
        let mut e = sample_event(1, "e");
        e.registration_enabled = false;
        let block = e.registration_block(date(2025, 1, 1)).unwrap();
        assert_eq!(block.message(), "Регистрация на мероприятие отключена");
    }

    #[test]
    fn archived_without_recording_is_blocked() {
        let mut e = sample_event(1, "e");
        e.is_archived = true;
        assert_eq!(
            e.registration_block(date(2025, 1, 1)),
            Some(RegistrationBlock::RecordingUnavailable)
        );
        e.kinescope_id = Some("vid".into());
        assert_eq!(e.registration_block(date(2025, 1, 1)), None);
    }

    #[test]
    fn past_offline_event_is_blocked() {
        let mut e = sample_event(1, "e");
        e.format = EventFormat::Offline;
        e.start_date = Some(date(2025, 1, 1));
        assert_eq!(
            e.registration_block(date(2025, 1, 2)),
            Some(RegistrationBlock::AlreadyPassed)
        );
        assert_eq!(e.registration_block(date(2025, 1, 1)), None);
    }

    #[test]
    fn past_online_event_stays_open() {
        let mut e = sample_event(1, "e");
        e.start_date = Some(date(2025, 1, 1));
        assert_eq!(e.registration_block(date(2025, 6, 1)), None);
    }

    // ═══════════════════════════════════════════════════════════════
    // Live status
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn live_within_default_three_hours() {
        let mut e = sample_event(1, "e");
        e.start_date = Some(date(2025, 8, 21));
        e.start_time = Some(time(10, 0));
        let msk = LocalOffset::moscow();

        // 10:00 MSK is 07:00 UTC
        assert!(e.is_live(utc(2025, 8, 21, 8, 30), msk));
        assert!(!e.is_live(utc(2025, 8, 21, 10, 1), msk));
        assert!(!e.is_live(utc(2025, 8, 21, 6, 59), msk));
    }

    #[test]
    fn live_uses_explicit_end() {
        let mut e = sample_event(1, "e");
        e.start_date = Some(date(2025, 8, 21));
        e.start_time = Some(time(10, 0));
        e.end_date = Some(date(2025, 8, 21));
        e.end_time = Some(time(18, 0));
        assert!(e.is_live(utc(2025, 8, 21, 14, 0), LocalOffset::moscow()));
    }

    #[test]
    fn live_flag_without_schedule_is_live() {
        let mut e = sample_event(1, "e");
        e.is_live = Some(true);
        assert!(e.is_live(Timestamp::now(), LocalOffset::moscow()));
        e.is_live = None;
        assert!(!e.is_live(Timestamp::now(), LocalOffset::moscow()));
    }

    #[test]
    fn live_flag_false_or_archived_is_never_live() {
        let mut e = sample_event(1, "e");
        e.is_live = Some(false);
        assert!(!e.is_live(Timestamp::now(), LocalOffset::moscow()));
        e.is_live = Some(true);
        e.is_archived = true;
        assert!(!e.is_live(Timestamp::now(), LocalOffset::moscow()));
    }

    // ═══════════════════════════════════════════════════════════════
    // Labels
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn payment_description_depends_on_archive() {
        let mut e = sample_event(1, "e");
        e.title = "Кардио".into();
        assert_eq!(e.payment_description(), "Оплата участия в мероприятии: Кардио");
        e.is_archived = true;
        assert_eq!(
            e.payment_description(),
            "Оплата доступа к записи мероприятия: Кардио"
        );
    }

    #[test]
    fn type_labels_translate_known_values() {
        assert_eq!(event_type_label("workshop"), "Мастер-класс");
        assert_eq!(event_type_label("хакатон"), "хакатон");
        assert_eq!(EventFormat::Hybrid.label(), "Гибридный");
    }

    #[test]
    fn speaker_names_join_full_names() {
        let mut e = sample_event(1, "e");
        for (i, last) in ["Иванов", "Петров"].iter().enumerate() {
            e.speakers.push(EventSpeaker {
                speaker: sample_speaker(i as i64, last, "Анна"),
                role: None,
                topic: None,
                sort_order: i as i32,
            });
        }
        assert_eq!(e.speaker_names(), "Иванов Анна, Петров Анна");
    }

    #[test]
    fn category_ids_include_primary_once() {
        let mut e = sample_event(1, "e");
        e.category_id = Some(CategoryId::new(5));
        assert_eq!(e.category_ids(), vec![CategoryId::new(5)]);
    }
}
