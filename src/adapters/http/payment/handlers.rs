//! HTTP handlers for payment links, status checks and test payments.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::adapters::http::error::{error_response, internal_error};
use crate::adapters::http::middleware::{OptionalAuth, RequireAuth};
use crate::adapters::http::state::AppState;
use crate::application::handlers::payment::{
    CancelPaymentCommand, CheckPaymentStatusQuery, CreatePaymentForSlugCommand, PaymentAccess,
    ProcessCallbackCommand, ProcessTestPaymentCommand, MSG_PAYMENT_CANCELLED,
};
use crate::domain::foundation::{non_empty, AuthenticatedUser, PaymentId};
use crate::domain::payment::PaymentError;

use super::dto::{
    CreatePaymentRequest, PaymentCallbackRequest, PaymentLinkResponse, PaymentResultResponse,
    PaymentStatusResponse, TokenParams,
};

/// The link token wins; otherwise the signed-in owner.
fn payment_access(
    user: Option<AuthenticatedUser>,
    token: Option<String>,
) -> Result<PaymentAccess, PaymentError> {
    match (non_empty(token.as_deref()), user) {
        (Some(token), _) => Ok(PaymentAccess::Token(token)),
        (None, Some(user)) => Ok(PaymentAccess::Owner(user.id)),
        (None, None) => Err(PaymentError::InvalidToken),
    }
}

/// POST /api/payment/events/:slug/create
pub async fn create_payment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(slug): Path<String>,
    body: Option<Json<CreatePaymentRequest>>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let link = state
        .create_payment_link_handler()
        .handle_for_slug(CreatePaymentForSlugCommand {
            slug,
            user_id: user.id,
            return_url: request.return_url,
        })
        .await?;
    Ok(Json(PaymentLinkResponse::from(link)))
}

/// GET /api/payment/:id/status
pub async fn payment_status(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(payment_id): Path<PaymentId>,
    Query(params): Query<TokenParams>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let access = payment_access(user, params.token)?;
    let view = state
        .payment_status_handler()
        .handle(CheckPaymentStatusQuery { payment_id, access })
        .await?;
    Ok(Json(PaymentStatusResponse::from(view)))
}

/// POST /api/payment/:id/cancel
pub async fn cancel_payment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(payment_id): Path<PaymentId>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let payment = state
        .cancel_payment_handler()
        .handle(CancelPaymentCommand {
            payment_id,
            access: PaymentAccess::Owner(user.id),
        })
        .await?;
    Ok(Json(
        PaymentResultResponse::new(&payment).with_message(MSG_PAYMENT_CANCELLED),
    ))
}

/// GET /api/payment/:id/process?token=
///
/// Completes a test-system payment from its signed link.
pub async fn process_test_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<PaymentId>,
    Query(params): Query<TokenParams>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let payment = state
        .process_test_payment_handler()
        .handle(ProcessTestPaymentCommand {
            payment_id,
            token: params.token.unwrap_or_default(),
        })
        .await?;
    Ok(Json(PaymentResultResponse::new(&payment)))
}

/// POST /api/payment/callback
pub async fn payment_callback(
    State(state): State<AppState>,
    Json(data): Json<Value>,
) -> Result<Response, PaymentApiError> {
    let request: PaymentCallbackRequest = match serde_json::from_value(data.clone()) {
        Ok(request) => request,
        Err(_) => return Ok(missing_payment_id()),
    };
    let Some(payment_id) = request.payment_id else {
        return Ok(missing_payment_id());
    };

    let payment = state
        .process_callback_handler()
        .handle(ProcessCallbackCommand {
            payment_id,
            status: request.status.unwrap_or_default(),
            external_id: request.external_id,
            data,
        })
        .await?;
    Ok(Json(PaymentResultResponse::new(&payment)).into_response())
}

fn missing_payment_id() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": "payment_id is required" })),
    )
        .into_response()
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error wrapper for payment failures.
#[derive(Debug)]
pub struct PaymentApiError(PaymentError);

impl From<PaymentError> for PaymentApiError {
    fn from(err: PaymentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            PaymentError::Infrastructure(cause) => internal_error(cause),
            PaymentError::Gateway(cause) => {
                tracing::error!(error = %cause, "Payment gateway failure");
                error_response(self.0.code(), "Ошибка платежной системы")
            }
            err => error_response(err.code(), err.to_string()),
        }
    }
}
