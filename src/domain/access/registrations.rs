//! Back-office view of who is registered for which event.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::AccessGrant;
use crate::domain::event::SortDirection;
use crate::domain::foundation::{non_empty, EventId, PageRequest, UserId};

pub const REGISTRATIONS_PER_PAGE: u32 = 20;

/// Whitelisted orderings for the registrations table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationSort {
    #[default]
    GrantedAt,
    /// Last name, then first name.
    User,
    Email,
    /// Event start date, then start time.
    EventStart,
    PaymentStatus,
}

impl RegistrationSort {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("user") => RegistrationSort::User,
            Some("email") => RegistrationSort::Email,
            Some("event_start") => RegistrationSort::EventStart,
            Some("payment_status") => RegistrationSort::PaymentStatus,
            _ => RegistrationSort::GrantedAt,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationSort::GrantedAt => "access_granted_at",
            RegistrationSort::User => "user",
            RegistrationSort::Email => "email",
            RegistrationSort::EventStart => "event_start",
            RegistrationSort::PaymentStatus => "payment_status",
        }
    }
}

/// Raw query-string parameters for the registrations table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationListQuery {
    pub event_id: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Normalized criteria. Unknown sorts and directions fall back to the
/// newest grants first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationCriteria {
    pub event_id: Option<EventId>,
    pub search: Option<String>,
    pub sort: RegistrationSort,
    pub direction: SortDirection,
    pub page: PageRequest,
}

impl RegistrationListQuery {
    pub fn normalize(&self) -> RegistrationCriteria {
        let direction = match self.direction.as_deref().map(|d| d.trim().to_ascii_lowercase()) {
            Some(d) if d == "asc" => SortDirection::Asc,
            _ => SortDirection::Desc,
        };
        RegistrationCriteria {
            event_id: self.event_id.as_deref().and_then(|id| id.trim().parse().ok()),
            search: non_empty(self.search.as_deref()),
            sort: RegistrationSort::parse(self.sort.as_deref()),
            direction,
            page: PageRequest::new(self.page, self.per_page, REGISTRATIONS_PER_PAGE),
        }
    }
}

/// The registered person as shown in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredUser {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub company: Option<String>,
    pub position: Option<String>,
    pub city: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredEvent {
    pub id: EventId,
    pub title: String,
    pub slug: String,
    pub start_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
}

/// One row: a grant joined with its user and event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub user: RegisteredUser,
    pub event: RegisteredEvent,
    pub grant: AccessGrant,
}

/// "Last First Middle" with blank parts skipped.
pub fn join_full_name(last: &str, first: &str, middle: Option<&str>) -> String {
    [Some(last), Some(first), middle]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
