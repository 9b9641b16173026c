//! Public event listing criteria.

use serde::Deserialize;

use super::EventFormat;
use crate::domain::foundation::{non_empty, CategoryId, PageRequest};

pub const DEFAULT_PER_PAGE: u32 = 12;

/// Which slice of the calendar to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFilter {
    /// Not archived and still running (or on-demand).
    #[default]
    Upcoming,
    /// Archived, or past and not on-demand.
    Archive,
    All,
}

impl ListFilter {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("archive") => ListFilter::Archive,
            Some("all") => ListFilter::All,
            _ => ListFilter::Upcoming,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ListFilter::Upcoming => "upcoming",
            ListFilter::Archive => "archive",
            ListFilter::All => "all",
        }
    }
}

/// Whitelisted sort columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Title,
    #[default]
    StartDate,
    EndDate,
    Price,
    EventType,
    Format,
    Location,
    SortOrder,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("title") => SortField::Title,
            Some("end_date") => SortField::EndDate,
            Some("price") => SortField::Price,
            Some("event_type") => SortField::EventType,
            Some("format") => SortField::Format,
            Some("location") => SortField::Location,
            Some("sort_order") => SortField::SortOrder,
            Some("created_at") => SortField::CreatedAt,
            Some("updated_at") => SortField::UpdatedAt,
            _ => SortField::StartDate,
        }
    }

    /// Column name; only ever one of the whitelisted identifiers.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::StartDate => "start_date",
            SortField::EndDate => "end_date",
            SortField::Price => "price",
            SortField::EventType => "event_type",
            SortField::Format => "format",
            SortField::Location => "location",
            SortField::SortOrder => "sort_order",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Raw query-string parameters for `GET /api/events`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventListQuery {
    pub filter: Option<String>,
    pub search: Option<String>,
    /// Comma-separated category ids.
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub format: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Normalized listing criteria. Invalid inputs fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventListCriteria {
    pub filter: ListFilter,
    pub search: Option<String>,
    pub categories: Vec<CategoryId>,
    pub event_type: Option<String>,
    pub format: Option<EventFormat>,
    pub sort: SortField,
    pub direction: SortDirection,
    pub page: PageRequest,
}

impl EventListQuery {
    pub fn normalize(&self) -> EventListCriteria {
        let filter = ListFilter::parse(self.filter.as_deref());
        let default_direction = match filter {
            ListFilter::Archive => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        let direction = match self.direction.as_deref().map(|d| d.trim().to_ascii_lowercase()) {
            Some(d) if d == "asc" => SortDirection::Asc,
            Some(d) if d == "desc" => SortDirection::Desc,
            _ => default_direction,
        };

        let categories = self
            .category
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|raw| raw.parse::<CategoryId>().ok())
            .collect();

        EventListCriteria {
            filter,
            search: non_empty(self.search.as_deref()).map(|s| s.to_lowercase()),
            categories,
            event_type: non_empty(self.event_type.as_deref()),
            format: self.format.as_deref().and_then(|f| f.parse().ok()),
            sort: SortField::parse(self.sort.as_deref()),
            direction,
            page: PageRequest::new(self.page, self.per_page, DEFAULT_PER_PAGE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_upcoming_by_start_date_ascending() {
        let criteria = EventListQuery::default().normalize();
        assert_eq!(criteria.filter, ListFilter::Upcoming);
        assert_eq!(criteria.sort, SortField::StartDate);
        assert_eq!(criteria.direction, SortDirection::Asc);
        assert_eq!(criteria.page.per_page, 12);
    }

    #[test]
    fn archive_defaults_to_descending() {
        let query = EventListQuery {
            filter: Some("archive".into()),
            ..Default::default()
        };
        assert_eq!(query.normalize().direction, SortDirection::Desc);
    }

    #[test]
    fn invalid_sort_and_direction_fall_back() {
        let query = EventListQuery {
            sort: Some("password; DROP TABLE".into()),
            direction: Some("sideways".into()),
            ..Default::default()
        };
        let criteria = query.normalize();
        assert_eq!(criteria.sort, SortField::StartDate);
        assert_eq!(criteria.direction, SortDirection::Asc);
    }

    #[test]
    fn direction_is_case_insensitive() {
        let query = EventListQuery {
            direction: Some("DESC".into()),
            sort: Some("price".into()),
            ..Default::default()
        };
        let criteria = query.normalize();
        assert_eq!(criteria.direction, SortDirection::Desc);
        assert_eq!(criteria.sort.column(), "price");
    }

    #[test]
    fn parses_category_list_and_skips_garbage() {
        let query = EventListQuery {
            category: Some("3, x,7".into()),
            ..Default::default()
        };
        assert_eq!(
            query.normalize().categories,
            vec![CategoryId::new(3), CategoryId::new(7)]
        );
    }

    #[test]
    fn search_is_lowercased_and_blank_ignored() {
        let query = EventListQuery {
            search: Some("  Кардио ".into()),
            event_type: Some(" ".into()),
            format: Some("online".into()),
            ..Default::default()
        };
        let criteria = query.normalize();
        assert_eq!(criteria.search.as_deref(), Some("кардио"));
        assert_eq!(criteria.event_type, None);
        assert_eq!(criteria.format, Some(EventFormat::Online));
    }
}
