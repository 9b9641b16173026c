//! Timestamp value object and local-calendar helpers.
//!
//! Instants are stored in UTC. Event schedules are entered as local wall
//! clock dates and times, so conversions go through a fixed offset that is
//! configured once (Moscow time does not observe DST).

use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    pub fn plus_hours(&self, hours: i64) -> Self {
        Self(self.0 + Duration::hours(hours))
    }

    pub fn plus_secs(&self, secs: i64) -> Self {
        Self(self.0 + Duration::seconds(secs))
    }

    pub fn minus_days(&self, days: i64) -> Self {
        Self(self.0 - Duration::days(days))
    }

    pub fn as_unix_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Calendar date of this instant in the given local offset.
    pub fn local_date(&self, offset: LocalOffset) -> NaiveDate {
        self.0.with_timezone(&offset.as_fixed()).date_naive()
    }

    /// Stable textual form used when hashing (`YYYY-MM-DD HH:MM:SS`).
    pub fn to_compact_string(&self) -> String {
        self.0.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

/// Fixed UTC offset used to interpret event wall-clock schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalOffset(FixedOffset);

impl LocalOffset {
    /// Europe/Moscow (UTC+3).
    pub fn moscow() -> Self {
        Self::from_hours(3)
    }

    /// Offset in whole hours east of UTC. Out-of-range values fall back to UTC.
    pub fn from_hours(hours: i32) -> Self {
        Self(FixedOffset::east_opt(hours.saturating_mul(3600)).unwrap_or_else(|| Utc.fix()))
    }

    pub fn as_fixed(&self) -> FixedOffset {
        self.0
    }

    /// Converts a local wall-clock date/time to a UTC timestamp.
    pub fn to_timestamp(&self, date: NaiveDate, time: NaiveTime) -> Timestamp {
        Timestamp(Utc.from_utc_datetime(&self.utc_naive(date, time)))
    }

    /// ISO-8601 rendering of a local date/time, e.g. `2025-08-21T10:00:00+03:00`.
    pub fn to_iso8601(&self, date: NaiveDate, time: NaiveTime) -> String {
        self.0
            .from_utc_datetime(&self.utc_naive(date, time))
            .format("%Y-%m-%dT%H:%M:%S%:z")
            .to_string()
    }

    fn utc_naive(&self, date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
        NaiveDateTime::new(date, time) - Duration::seconds(i64::from(self.0.local_minus_utc()))
    }

    /// Today's calendar date in this offset.
    pub fn today(&self) -> NaiveDate {
        Timestamp::now().local_date(*self)
    }
}

impl Default for LocalOffset {
    fn default() -> Self {
        Self::moscow()
    }
}
