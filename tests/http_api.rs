//! End-to-end tests for the REST API over the in-memory adapters.
//!
//! Every request goes through the assembled router: auth middleware, role
//! gates, handlers and error mapping.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use event_portal::adapters::auth::{Argon2PasswordHasher, MockSessionValidator};
use event_portal::adapters::http::{api_router, AppState};
use event_portal::adapters::memory::{RecordingCrm, RecordingMailer, StubPaymentGateway};
use event_portal::bootstrap::{build_application, Application, Integrations, Repositories};
use event_portal::config::AppConfig;
use event_portal::domain::foundation::{PaymentId, Role, RoleSet, Timestamp};
use event_portal::domain::payment::PaymentStatus;
use event_portal::domain::user::NewUser;
use event_portal::ports::{PasswordHasher, PaymentRepository, UserRepository};

// =============================================================================
// Test Infrastructure
// =============================================================================

const EDITOR: &str = "editor-token";
const MANAGER: &str = "manager-token";
const VISITOR: &str = "visitor-token";

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.app_url = "https://portal.test".to_string();
    config.auth.jwt_secret = secrecy::Secret::new("integration-test-signing-key-0123456789".into());
    config.features.rate_limiting_enabled = false;
    config
}

async fn application(gateway: StubPaymentGateway) -> (Application, AppConfig) {
    let config = test_config();
    let integrations = Integrations {
        gateway: Arc::new(gateway),
        crm: Arc::new(RecordingCrm::new()),
        mailer: Arc::new(RecordingMailer::new()),
    };
    let app = build_application(&config, Repositories::in_memory(), integrations)
        .await
        .expect("application builds");
    (app, config)
}

/// Router whose bearer tokens come from a fixed table.
fn router_with_mock_sessions(state: AppState, config: &AppConfig) -> Router {
    let sessions = MockSessionValidator::new()
        .with_roles(EDITOR, 900, &[Role::Editor])
        .with_roles(MANAGER, 901, &[Role::Manager])
        .with_roles(VISITOR, 902, &[Role::User]);
    api_router(state, Arc::new(sessions), None, &config.server)
}

async fn test_router() -> Router {
    let (app, config) = application(StubPaymentGateway::new()).await;
    router_with_mock_sessions(app.state, &config)
}

async fn send(router: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, json)
}

async fn create_event(router: &Router, body: Value) -> Value {
    let (status, event) = send(router, Method::POST, "/api/admin/events", Some(EDITOR), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "event create failed: {event}");
    event
}

fn webinar(title: &str) -> Value {
    json!({
        "title": title,
        "event_type": "webinar",
        "format": "online",
        "start_date": "2031-03-15",
        "start_time": "18:00:00",
    })
}

fn guest_form(email: &str) -> Value {
    json!({
        "first_name": "Анна",
        "last_name": "Иванова",
        "email": email,
        "phone": "+79991234567",
        "city": "Москва",
        "utm_source": "newsletter",
    })
}

// =============================================================================
// Health and access control
// =============================================================================

#[tokio::test]
async fn health_reports_ok() {
    let router = test_router().await;
    let (status, body) = send(&router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn back_office_requires_staff_role() {
    let router = test_router().await;

    let (anonymous, _) = send(&router, Method::GET, "/api/admin/events", None, None).await;
    assert_eq!(anonymous, StatusCode::UNAUTHORIZED);

    let (visitor, _) = send(&router, Method::GET, "/api/admin/events", Some(VISITOR), None).await;
    assert_eq!(visitor, StatusCode::FORBIDDEN);

    let (editor, body) = send(&router, Method::GET, "/api/admin/events", Some(EDITOR), None).await;
    assert_eq!(editor, StatusCode::OK);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn editors_read_users_but_cannot_change_them() {
    let router = test_router().await;

    let (editor, body) = send(&router, Method::GET, "/api/admin/users", Some(EDITOR), None).await;
    assert_eq!(editor, StatusCode::OK);
    assert!(body["data"].is_array());

    let (missing, _) = send(&router, Method::GET, "/api/admin/users/4242", Some(EDITOR), None).await;
    assert_eq!(missing, StatusCode::NOT_FOUND);

    let (create, _) = send(
        &router,
        Method::POST,
        "/api/admin/users",
        Some(EDITOR),
        Some(json!({ "first_name": "Ирина", "last_name": "Смирнова", "email": "x@clinic.ru" })),
    )
    .await;
    assert_eq!(create, StatusCode::FORBIDDEN);

    let (delete, _) = send(&router, Method::DELETE, "/api/admin/users/1", Some(EDITOR), None).await;
    assert_eq!(delete, StatusCode::FORBIDDEN);

    let (visitor, _) = send(&router, Method::GET, "/api/admin/users", Some(VISITOR), None).await;
    assert_eq!(visitor, StatusCode::FORBIDDEN);

    let (manager, _) = send(&router, Method::GET, "/api/admin/users", Some(MANAGER), None).await;
    assert_eq!(manager, StatusCode::OK);
}

#[tokio::test]
async fn invalid_bearer_token_is_rejected() {
    let router = test_router().await;
    let (status, body) = send(&router, Method::GET, "/api/events", Some("forged"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error_code"].is_string());
}

// =============================================================================
// Events
// =============================================================================

#[tokio::test]
async fn created_event_is_listed_and_shown() {
    let router = test_router().await;
    let event = create_event(&router, webinar("Кардиология сегодня")).await;
    let slug = event["slug"].as_str().unwrap().to_string();

    let (status, list) = send(&router, Method::GET, "/api/events", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);
    assert_eq!(list["data"][0]["slug"], slug.as_str());

    let (status, detail) = send(&router, Method::GET, &format!("/api/events/{}", slug), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["event"]["title"], "Кардиология сегодня");
    assert_eq!(detail["user_has_access"], false);
}

#[tokio::test]
async fn unknown_event_is_404() {
    let router = test_router().await;
    let (status, _) = send(&router, Method::GET, "/api/events/no-such-event", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn event_without_title_fails_validation() {
    let router = test_router().await;
    let (status, body) = send(
        &router,
        Method::POST,
        "/api/admin/events",
        Some(EDITOR),
        Some(json!({ "event_type": "webinar", "start_date": "2031-01-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["field"], "title");
}

#[tokio::test]
async fn deleted_event_disappears() {
    let router = test_router().await;
    let event = create_event(&router, webinar("Неврология")).await;
    let id = event["id"].as_i64().unwrap();

    let (status, _) = send(&router, Method::DELETE, &format!("/api/admin/events/{}", id), Some(EDITOR), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&router, Method::GET, &format!("/api/admin/events/{}", id), Some(EDITOR), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn guest_registers_for_free_event() {
    let router = test_router().await;
    let event = create_event(&router, webinar("Бесплатный вебинар")).await;
    let slug = event["slug"].as_str().unwrap();

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/api/events/{}/register", slug),
        None,
        Some(guest_form("anna@clinic.ru")),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert!(body.get("payment_url").is_none());

    let (status, check) = send(
        &router,
        Method::POST,
        "/api/check-user-email",
        None,
        Some(json!({ "email": "ANNA@clinic.ru" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(check["exists"], true);

    let (_, again) = send(
        &router,
        Method::POST,
        &format!("/api/events/{}/register", slug),
        None,
        Some(json!({ "existing_user": true, "email": "anna@clinic.ru" })),
    )
    .await;
    assert_eq!(again["message"], "Вы уже зарегистрированы на это мероприятие");
}

#[tokio::test]
async fn incomplete_guest_form_is_422() {
    let router = test_router().await;
    let event = create_event(&router, webinar("Вебинар")).await;
    let slug = event["slug"].as_str().unwrap();

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/api/events/{}/register", slug),
        None,
        Some(json!({ "first_name": "Анна", "email": "anna@clinic.ru" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn registration_for_missing_event_is_404() {
    let router = test_router().await;
    let (status, body) = send(
        &router,
        Method::POST,
        "/api/events/missing/register",
        None,
        Some(guest_form("anna@clinic.ru")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn email_check_rejects_malformed_address() {
    let router = test_router().await;
    let (status, body) = send(
        &router,
        Method::POST,
        "/api/check-user-email",
        None,
        Some(json!({ "email": "not-an-email" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["email"].is_array());
}

#[tokio::test]
async fn paid_registration_completes_through_test_payment_link() {
    let (app, config) = application(StubPaymentGateway::disabled()).await;
    let router = router_with_mock_sessions(app.state, &config);

    let mut paid = webinar("Платный курс");
    paid["price"] = json!("1500.00");
    paid["is_paid"] = json!(true);
    let event = create_event(&router, paid).await;
    let slug = event["slug"].as_str().unwrap();

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/api/events/{}/register", slug),
        None,
        Some(guest_form("payer@clinic.ru")),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let payment_url = body["payment_url"].as_str().unwrap();
    let path = payment_url
        .strip_prefix("https://portal.test")
        .expect("test link points at the portal");
    assert!(path.starts_with("/payment/"));

    let (status, result) = send(&router, Method::GET, path, None, None).await;
    assert_eq!(status, StatusCode::OK, "{result}");
    assert_eq!(result["status"], "completed");

    let (_, again) = send(
        &router,
        Method::POST,
        &format!("/api/events/{}/register", slug),
        None,
        Some(json!({ "existing_user": true, "email": "payer@clinic.ru" })),
    )
    .await;
    assert_eq!(again["message"], "Вы уже зарегистрированы на это мероприятие");
}

#[tokio::test]
async fn test_payment_link_with_wrong_token_is_refused() {
    let (app, config) = application(StubPaymentGateway::disabled()).await;
    let router = router_with_mock_sessions(app.state, &config);

    let mut paid = webinar("Платный семинар");
    paid["price"] = json!(990);
    paid["is_paid"] = json!(true);
    let event = create_event(&router, paid).await;
    let slug = event["slug"].as_str().unwrap();

    let (_, body) = send(
        &router,
        Method::POST,
        &format!("/api/events/{}/register", slug),
        None,
        Some(guest_form("payer2@clinic.ru")),
    )
    .await;
    let payment_id = body["payment_id"].as_i64().unwrap();

    let (status, _) = send(
        &router,
        Method::GET,
        &format!("/payment/{}/process?token=forged", payment_id),
        None,
        None,
    )
    .await;
    assert!(status.is_client_error());
    assert_ne!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn callback_cannot_settle_gateway_payment() {
    let (app, config) = application(StubPaymentGateway::new()).await;
    let state = app.state.clone();
    let router = router_with_mock_sessions(app.state, &config);

    let mut paid = webinar("Платный вебинар");
    paid["price"] = json!("1500.00");
    paid["is_paid"] = json!(true);
    let event = create_event(&router, paid).await;
    let slug = event["slug"].as_str().unwrap();

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/api/events/{}/register", slug),
        None,
        Some(guest_form("gateway@clinic.ru")),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let payment_id = body["payment_id"].as_i64().unwrap();

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/payment/callback",
        None,
        Some(json!({ "payment_id": payment_id, "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let payment = state
        .payments
        .find_by_id(PaymentId::new(payment_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);
}

#[tokio::test]
async fn callback_without_payment_id_is_400() {
    let router = test_router().await;
    let (status, body) = send(
        &router,
        Method::POST,
        "/api/payment/callback",
        None,
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "payment_id is required");
}

// =============================================================================
// Webhook
// =============================================================================

#[tokio::test]
async fn paykeeper_webhook_refused_while_gateway_disabled() {
    let router = test_router().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/webhook/paykeeper")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("X-Forwarded-For", "185.71.76.5")
        .body(Body::from("id=1&sum=1500.00&orderid=7&key=abc"))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "PayKeeper disabled");
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn login_then_profile() {
    let (app, config) = application(StubPaymentGateway::new()).await;
    let hash = Argon2PasswordHasher::new().hash("correct horse battery").unwrap();
    app.state
        .users
        .create(&NewUser {
            first_name: "Олег".into(),
            last_name: "Петров".into(),
            middle_name: None,
            email: "oleg@clinic.ru".into(),
            phone: None,
            company: None,
            position: None,
            specialization: None,
            city: None,
            password_hash: hash,
            email_verified_at: Some(Timestamp::now()),
            roles: RoleSet::new([Role::User]),
        })
        .await
        .unwrap();
    let router = app.router(&config);

    let (status, wrong) = send(
        &router,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "oleg@clinic.ru", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(wrong.get("token").is_none());

    let (status, login) = send(
        &router,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "oleg@clinic.ru", "password": "correct horse battery" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{login}");
    assert_eq!(login["token_type"], "Bearer");
    let token = login["token"].as_str().unwrap();

    let (status, me) = send(&router, Method::GET, "/api/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["email"], "oleg@clinic.ru");
    assert_eq!(me["events"], json!([]));

    let (status, _) = send(&router, Method::GET, "/api/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn manager_creates_user_and_grants_event_access() {
    let router = test_router().await;
    let event = create_event(&router, webinar("Школа терапевта")).await;
    let event_id = event["id"].as_i64().unwrap();

    let (status, user) = send(
        &router,
        Method::POST,
        "/api/admin/users",
        Some(MANAGER),
        Some(json!({
            "first_name": "Ирина",
            "last_name": "Смирнова",
            "email": "irina@clinic.ru",
            "password": "long-enough-password",
            "password_confirmation": "long-enough-password",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{user}");
    let user_id = user["id"].as_i64().unwrap();

    let (status, grant) = send(
        &router,
        Method::POST,
        &format!("/api/admin/users/{}/events", user_id),
        Some(MANAGER),
        Some(json!({
            "event_id": event_id,
            "access_type": "free",
            "payment_status": "completed",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{grant}");

    let (status, duplicate) = send(
        &router,
        Method::POST,
        &format!("/api/admin/users/{}/events", user_id),
        Some(MANAGER),
        Some(json!({
            "event_id": event_id,
            "access_type": "free",
            "payment_status": "completed",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{duplicate}");

    let (status, detail) = send(&router, Method::GET, &format!("/api/admin/users/{}", user_id), Some(MANAGER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["grants"][0]["event_title"], "Школа терапевта");

    let (status, _) = send(
        &router,
        Method::DELETE,
        &format!("/api/admin/users/{}/events/{}", user_id, event_id),
        Some(MANAGER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

fn sign_up_form(email: &str) -> Value {
    json!({
        "first_name": "Мария",
        "last_name": "Кузнецова",
        "email": email,
        "city": "Казань",
        "password": "long-enough-password",
        "password_confirmation": "long-enough-password",
    })
}

#[tokio::test]
async fn self_registration_signs_in_once_per_email() {
    let (app, config) = application(StubPaymentGateway::new()).await;
    let router = app.router(&config);

    let (status, created) = send(&router, Method::POST, "/api/auth/register", None, Some(sign_up_form("maria@clinic.ru"))).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["token_type"], "Bearer");
    assert_eq!(created["user"]["email"], "maria@clinic.ru");
    assert!(created["user"]["email_verified_at"].is_null());
    let token = created["token"].as_str().unwrap();

    let (status, me) = send(&router, Method::GET, "/api/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["city"], "Казань");

    let (status, _) = send(&router, Method::POST, "/api/auth/register", None, Some(sign_up_form("MARIA@clinic.ru"))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let mut mismatched = sign_up_form("other@clinic.ru");
    mismatched["password_confirmation"] = json!("something-else-entirely");
    let (status, _) = send(&router, Method::POST, "/api/auth/register", None, Some(mismatched)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn profile_edit_and_account_deletion() {
    let (app, config) = application(StubPaymentGateway::new()).await;
    let router = app.router(&config);

    let (_, created) = send(&router, Method::POST, "/api/auth/register", None, Some(sign_up_form("owner@clinic.ru"))).await;
    let token = created["token"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &router,
        Method::PUT,
        "/api/me",
        Some(&token),
        Some(json!({
            "first_name": "Мария",
            "last_name": "Соколова",
            "email": "owner@clinic.ru",
            "city": "Самара",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["last_name"], "Соколова");
    assert_eq!(updated["city"], "Самара");

    let (status, _) = send(&router, Method::DELETE, "/api/me", Some(&token), Some(json!({ "password": "wrong-password" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &router,
        Method::DELETE,
        "/api/me",
        Some(&token),
        Some(json!({ "password": "long-enough-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "owner@clinic.ru", "password": "long-enough-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn my_events_and_dashboard_list_granted_events() {
    let (app, config) = application(StubPaymentGateway::new()).await;
    let router = app.router(&config);

    let (_, created) = send(&router, Method::POST, "/api/auth/register", None, Some(sign_up_form("viewer@clinic.ru"))).await;
    let token = created["token"].as_str().unwrap().to_string();

    let (status, empty) = send(&router, Method::GET, "/api/my-events", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK, "{empty}");
    assert_eq!(empty["total_count"], 0);
    assert_eq!(empty["events"]["data"], json!([]));

    let (status, dashboard) = send(&router, Method::GET, "/api/dashboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["live"], json!([]));
    assert_eq!(dashboard["upcoming"], json!([]));

    let (status, _) = send(&router, Method::GET, "/api/my-events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registrations_table_joins_users_and_events() {
    let router = test_router().await;
    let event = create_event(&router, webinar("Школа кардиолога")).await;
    let event_id = event["id"].as_i64().unwrap();
    let slug = event["slug"].as_str().unwrap();
    let other = create_event(&router, webinar("Другой вебинар")).await;
    let other_slug = other["slug"].as_str().unwrap();

    for (slug, email) in [(slug, "first@clinic.ru"), (other_slug, "second@clinic.ru")] {
        let (status, body) = send(
            &router,
            Method::POST,
            &format!("/api/events/{}/register", slug),
            None,
            Some(guest_form(email)),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    let (status, all) = send(&router, Method::GET, "/api/admin/event-registrations", Some(EDITOR), None).await;
    assert_eq!(status, StatusCode::OK, "{all}");
    assert_eq!(all["total"], 2);
    assert_eq!(all["filters"]["sort"], "access_granted_at");
    assert_eq!(all["filters"]["direction"], "DESC");

    let (status, filtered) = send(
        &router,
        Method::GET,
        &format!(
            "/api/admin/event-registrations?event_id={}&search=FIRST&sort=nonsense&direction=asc",
            event_id
        ),
        Some(EDITOR),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{filtered}");
    assert_eq!(filtered["total"], 1);
    let row = &filtered["data"][0];
    assert_eq!(row["user"]["email"], "first@clinic.ru");
    assert_eq!(row["user"]["full_name"], "Иванова Анна");
    assert_eq!(row["event"]["title"], "Школа кардиолога");
    assert_eq!(row["access"]["type"], "free");
    assert_eq!(filtered["filters"]["sort"], "access_granted_at");
    assert_eq!(filtered["filters"]["direction"], "ASC");

    let (status, _) = send(&router, Method::GET, "/api/admin/event-registrations", Some(VISITOR), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Catalog and notifications
// =============================================================================

#[tokio::test]
async fn library_document_is_public_by_id() {
    let router = test_router().await;
    let (status, document) = send(
        &router,
        Method::POST,
        "/api/admin/library",
        Some(EDITOR),
        Some(json!({ "title": "Клинические рекомендации", "language": "ru" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{document}");
    let id = document["id"].as_i64().unwrap();

    let (status, shown) = send(&router, Method::GET, &format!("/api/documents/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shown["title"], "Клинические рекомендации");

    let (status, _) = send(&router, Method::GET, "/api/documents/9999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn category_created_in_back_office_is_public() {
    let router = test_router().await;
    let (status, category) = send(
        &router,
        Method::POST,
        "/api/admin/categories",
        Some(EDITOR),
        Some(json!({ "name": "Кардиология" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{category}");

    let (status, list) = send(&router, Method::GET, "/api/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["data"][0]["name"], "Кардиология");

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/admin/categories",
        Some(EDITOR),
        Some(json!({ "name": "Кардиология" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn missing_speaker_is_404() {
    let router = test_router().await;
    let (status, body) = send(&router, Method::GET, "/api/admin/speakers/77", Some(EDITOR), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "NOT_FOUND");
}

#[tokio::test]
async fn empty_inbox_for_new_manager() {
    let router = test_router().await;

    let (status, list) = send(&router, Method::GET, "/api/admin/notifications", Some(MANAGER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 0);

    let (status, cleared) = send(&router, Method::DELETE, "/api/admin/notifications", Some(MANAGER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["affected"], 0);

    let (status, _) = send(&router, Method::POST, "/api/admin/notifications/5/read", Some(MANAGER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
