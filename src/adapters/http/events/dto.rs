//! Request and response DTOs for event endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::events::{EventDetail, EventView};
use crate::domain::event::{EmbedSize, Event};
use crate::domain::foundation::Page;

/// An event plus the display strings the pages render.
#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    #[serde(flatten)]
    pub event: Event,
    pub formatted_price: Option<String>,
    pub event_type_label: Option<String>,
    pub format_label: &'static str,
    pub recording_type_label: Option<&'static str>,
    pub has_recording: bool,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            formatted_price: event.formatted_price(),
            event_type_label: event.event_type_label().map(str::to_string),
            format_label: event.format.label(),
            recording_type_label: event.recording_type_label(),
            has_recording: event.has_recording(),
            event,
        }
    }
}

/// Paginated list body shared by every listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub current_page: u32,
    pub per_page: u32,
    pub last_page: u32,
}

impl<T> PageResponse<T> {
    pub fn from_page<S>(page: Page<S>, f: impl FnMut(S) -> T) -> Self {
        let page = page.map(f);
        Self {
            data: page.items,
            total: page.total,
            current_page: page.page,
            per_page: page.per_page,
            last_page: page.last_page,
        }
    }
}

/// Public event page body.
#[derive(Debug, Clone, Serialize)]
pub struct EventDetailResponse {
    pub event: EventResponse,
    pub registered_count: i64,
    pub available_spots: Option<i64>,
    pub user_has_access: bool,
    pub has_recording: bool,
    pub embed_url: Option<String>,
    pub is_live: bool,
    pub related: Vec<EventResponse>,
}

impl From<EventDetail> for EventDetailResponse {
    fn from(detail: EventDetail) -> Self {
        Self {
            event: EventResponse::from(detail.event),
            registered_count: detail.registered_count,
            available_spots: detail.available_spots,
            user_has_access: detail.user_has_access,
            has_recording: detail.has_recording,
            embed_url: detail.embed_url,
            is_live: detail.is_live,
            related: detail.related.into_iter().map(EventResponse::from).collect(),
        }
    }
}

/// The registered user's viewing page body.
#[derive(Debug, Clone, Serialize)]
pub struct EventViewResponse {
    pub event: EventResponse,
    pub embed_url: Option<String>,
    pub is_live: bool,
}

impl From<EventView> for EventViewResponse {
    fn from(view: EventView) -> Self {
        Self {
            event: EventResponse::from(view.event),
            embed_url: view.embed_url,
            is_live: view.is_live,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewEventParams {
    #[serde(default)]
    pub size: EmbedSize,
}

/// Back-office event search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminEventSearchParams {
    pub title: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::sample_event;
    use crate::domain::foundation::{Money, PageRequest};

    #[test]
    fn event_response_flattens_event_and_adds_labels() {
        let mut event = sample_event(1, "cardio");
        event.price = Some(Money::from_rubles(12_500));
        event.show_price = true;

        let json = serde_json::to_value(EventResponse::from(event)).unwrap();
        assert_eq!(json["slug"], "cardio");
        assert_eq!(json["formatted_price"], "12 500 ₽");
        assert!(json["format_label"].is_string());
    }

    #[test]
    fn page_response_uses_pager_field_names() {
        let page = Page::new(vec![1, 2], 5, PageRequest::new(Some(2), Some(2), 12));
        let json = serde_json::to_value(PageResponse::from_page(page, |n| n * 10)).unwrap();
        assert_eq!(json["data"], serde_json::json!([10, 20]));
        assert_eq!(json["current_page"], 2);
        assert_eq!(json["last_page"], 3);
    }

    #[test]
    fn view_params_default_to_full_player() {
        let params: ViewEventParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.size, EmbedSize::Default);
    }
}
