//! HTTP handlers for event registration.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::adapters::http::middleware::OptionalAuth;
use crate::adapters::http::state::AppState;
use crate::application::handlers::registration::{CheckUserEmailQuery, RegisterForEventCommand};
use crate::domain::registration::{CheckEmailForm, RegistrationError};

use super::dto::{EmailCheckResponse, RegisterFailure, RegisterRequest, RegisterResponse};

/// POST /api/events/:slug/register
pub async fn register(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(slug): Path<String>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, RegistrationApiError> {
    let outcome = state
        .register_handler()
        .handle(RegisterForEventCommand {
            slug,
            actor: user.map(|u| u.id),
            form: request.form,
            return_url: request.return_url,
        })
        .await?;
    Ok(Json(RegisterResponse::from(outcome)))
}

/// POST /api/check-user-email
pub async fn check_user_email(
    State(state): State<AppState>,
    Json(form): Json<CheckEmailForm>,
) -> Result<impl IntoResponse, EmailCheckApiError> {
    let check = state
        .check_email_handler()
        .handle(CheckUserEmailQuery { form })
        .await?;
    Ok(Json(EmailCheckResponse {
        success: true,
        check,
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// Refused registrations answer `{success: false, message}` with 422.
///
/// A missing event is the one 404; infrastructure causes are logged and
/// replaced by the generic retry message.
#[derive(Debug)]
pub struct RegistrationApiError(RegistrationError);

impl From<RegistrationError> for RegistrationApiError {
    fn from(err: RegistrationError) -> Self {
        Self(err)
    }
}

impl IntoResponse for RegistrationApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RegistrationError::EventNotFound => StatusCode::NOT_FOUND,
            RegistrationError::Infrastructure(cause) | RegistrationError::Payment(cause) => {
                tracing::error!(error = %cause, "Registration failed");
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        let body = RegisterFailure {
            success: false,
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Email check failures: `{success: false, errors: {email: [...]}}` with 422.
#[derive(Debug)]
pub struct EmailCheckApiError(RegistrationError);

impl From<RegistrationError> for EmailCheckApiError {
    fn from(err: RegistrationError) -> Self {
        Self(err)
    }
}

impl IntoResponse for EmailCheckApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            RegistrationError::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({
                    "success": false,
                    "errors": { err.field(): [err.to_string()] }
                })),
            )
                .into_response(),
            err => {
                tracing::error!(error = %err, "Email check failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "success": false, "message": err.to_string() })),
                )
                    .into_response()
            }
        }
    }
}
