//! HTTP handler for PayKeeper payment notifications.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Form, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::adapters::http::middleware::extract_client_ip;
use crate::adapters::http::state::AppState;
use crate::application::handlers::webhook::HandlePayKeeperNotificationCommand;
use crate::domain::webhook::WebhookError;

/// POST /api/webhook/paykeeper
///
/// Answers `OK {hash}` as text/plain when the notification is accepted.
pub async fn paykeeper_webhook(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, WebhookApiError> {
    let client_ip = extract_client_ip(&headers, connect_info.map(|ci| ci.0));
    tracing::info!(
        client_ip = ?client_ip,
        invoice_id = form.get("id").map(String::as_str).unwrap_or(""),
        "PayKeeper notification received"
    );

    let body = state
        .paykeeper_webhook_handler()
        .handle(HandlePayKeeperNotificationCommand { form, client_ip })
        .await?;
    Ok(plain_text(StatusCode::OK, body))
}

fn plain_text(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

/// Verification failures answer `{"error": ...}`; handling failures answer
/// in the gateway's plain-text dialect.
#[derive(Debug)]
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if let WebhookError::Internal(cause) = &self.0 {
            tracing::error!(error = %cause, "PayKeeper notification failed");
        } else {
            tracing::warn!(reason = %self.0, "PayKeeper notification rejected");
        }

        if self.0.is_verification_failure() {
            (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
        } else {
            plain_text(status, self.0.to_string())
        }
    }
}
