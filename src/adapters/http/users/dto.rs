//! Request and response DTOs for account endpoints.

use serde::{Deserialize, Serialize};

use crate::adapters::http::events::{EventResponse, PageResponse};
use crate::application::handlers::access::RegistrationList;
use crate::application::handlers::users::{AccessibleEvent, Dashboard, LoginResult, MyEvents, Profile};
use crate::domain::access::{
    AccessType, GrantPaymentStatus, RegisteredEvent, RegisteredUser, Registration,
};
use crate::domain::foundation::{EventId, Money, Role, Timestamp};
use crate::domain::user::User;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: Timestamp,
    pub user: User,
}

impl From<LoginResult> for LoginResponse {
    fn from(result: LoginResult) -> Self {
        Self {
            token: result.token,
            token_type: "Bearer",
            expires_at: result.expires_at,
            user: result.user,
        }
    }
}

/// The signed-in user and the events they can open.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub user: User,
    pub events: Vec<EventResponse>,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            user: profile.user,
            events: profile.events.into_iter().map(EventResponse::from).collect(),
        }
    }
}

/// Back-office user search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListParams {
    pub search: Option<String>,
    pub role: Option<Role>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleChangeRequest {
    pub role: Role,
}

/// Body of `DELETE /api/me`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteAccountRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MyEventsParams {
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessibleEventResponse {
    #[serde(flatten)]
    pub event: EventResponse,
    pub access_type: AccessType,
    pub payment_status: GrantPaymentStatus,
    pub access_granted_at: Option<Timestamp>,
    pub is_live: bool,
}

impl From<AccessibleEvent> for AccessibleEventResponse {
    fn from(item: AccessibleEvent) -> Self {
        Self {
            event: EventResponse::from(item.event),
            access_type: item.access_type,
            payment_status: item.payment_status,
            access_granted_at: item.access_granted_at,
            is_live: item.is_live,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MyEventsResponse {
    pub events: PageResponse<AccessibleEventResponse>,
    pub total_count: u64,
    pub live_count: u64,
}

impl From<MyEvents> for MyEventsResponse {
    fn from(my: MyEvents) -> Self {
        Self {
            events: PageResponse::from_page(my.events, AccessibleEventResponse::from),
            total_count: my.total_count,
            live_count: my.live_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub live: Vec<AccessibleEventResponse>,
    pub upcoming: Vec<AccessibleEventResponse>,
}

impl From<Dashboard> for DashboardResponse {
    fn from(dashboard: Dashboard) -> Self {
        Self {
            live: dashboard.live.into_iter().map(Into::into).collect(),
            upcoming: dashboard.upcoming.into_iter().map(Into::into).collect(),
        }
    }
}

/// The grant half of a registrations row, with display labels.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationAccess {
    #[serde(rename = "type")]
    pub access_type: AccessType,
    pub type_label: &'static str,
    pub payment_status: GrantPaymentStatus,
    pub payment_status_label: &'static str,
    pub payment_amount: Option<Money>,
    pub formatted_amount: Option<String>,
    pub payment_id: Option<String>,
    pub access_granted_at: Option<Timestamp>,
    pub access_expires_at: Option<Timestamp>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationRow {
    /// `"{user_id}-{event_id}"`, stable across pages.
    pub key: String,
    pub user: RegisteredUser,
    pub event: RegisteredEvent,
    pub access: RegistrationAccess,
}

impl From<Registration> for RegistrationRow {
    fn from(row: Registration) -> Self {
        let grant = row.grant;
        Self {
            key: format!("{}-{}", row.user.id, row.event.id),
            user: row.user,
            event: row.event,
            access: RegistrationAccess {
                access_type: grant.access_type,
                type_label: grant.access_type.label(),
                payment_status: grant.payment_status,
                payment_status_label: grant.payment_status.label(),
                payment_amount: grant.payment_amount,
                formatted_amount: grant.payment_amount.map(|m| m.to_display_rubles()),
                payment_id: grant.payment_id,
                access_granted_at: grant.access_granted_at,
                access_expires_at: grant.access_expires_at,
                is_active: grant.is_active,
            },
        }
    }
}

/// Filters as applied, echoed back so the table can keep its state.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationFilters {
    pub event_id: Option<EventId>,
    pub search: Option<String>,
    pub sort: &'static str,
    pub direction: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationListResponse {
    #[serde(flatten)]
    pub page: PageResponse<RegistrationRow>,
    pub filters: RegistrationFilters,
}

impl From<RegistrationList> for RegistrationListResponse {
    fn from(list: RegistrationList) -> Self {
        let criteria = list.criteria;
        Self {
            page: PageResponse::from_page(list.page, RegistrationRow::from),
            filters: RegistrationFilters {
                event_id: criteria.event_id,
                search: criteria.search,
                sort: criteria.sort.as_str(),
                direction: criteria.direction.as_sql(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::sample_user;

    #[test]
    fn login_response_never_leaks_password_hash() {
        let response = LoginResponse::from(LoginResult {
            token: "jwt".into(),
            expires_at: Timestamp::now(),
            user: sample_user(3, "anna@example.com"),
        });
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["token_type"], "Bearer");
        assert_eq!(json["user"]["email"], "anna@example.com");
        assert!(json["user"].get("password_hash").is_none());
    }

    #[test]
    fn registration_row_carries_key_and_labels() {
        use crate::domain::access::{AccessGrant, RegistrationListQuery};
        use crate::domain::foundation::{Page, PaymentId, UserId};

        let grant = AccessGrant::paid(
            EventId::new(5),
            UserId::new(3),
            Money::from_rubles(1500),
            PaymentId::new(12),
            Timestamp::now(),
        );
        let row = Registration {
            user: RegisteredUser {
                id: UserId::new(3),
                full_name: "Петрова Анна".into(),
                email: "anna@example.com".into(),
                company: None,
                position: None,
                city: None,
                avatar: None,
            },
            event: RegisteredEvent {
                id: EventId::new(5),
                title: "Webinar".into(),
                slug: "webinar".into(),
                start_date: None,
                start_time: None,
            },
            grant,
        };
        let criteria = RegistrationListQuery::default().normalize();
        let page = Page::new(vec![row], 1, criteria.page);
        let json =
            serde_json::to_value(RegistrationListResponse::from(RegistrationList { page, criteria }))
                .unwrap();

        assert_eq!(json["data"][0]["key"], "3-5");
        assert_eq!(json["data"][0]["access"]["type"], "paid");
        assert_eq!(json["data"][0]["access"]["payment_status"], "completed");
        assert_eq!(json["filters"]["sort"], "access_granted_at");
        assert_eq!(json["filters"]["direction"], "DESC");
        assert_eq!(json["total"], 1);
    }

    #[test]
    fn list_params_parse_role_names() {
        let params: UserListParams =
            serde_json::from_value(serde_json::json!({ "role": "manager", "search": "anna" }))
                .unwrap();
        assert_eq!(params.role, Some(Role::Manager));
        assert_eq!(params.search.as_deref(), Some("anna"));
    }
}
