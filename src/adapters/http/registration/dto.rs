//! Request and response DTOs for registration endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::PaymentId;
use crate::domain::registration::{EmailCheck, RegistrationForm, RegistrationOutcome};

/// Registration form plus where the payment page should send the user back.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(flatten)]
    pub form: RegistrationForm,
    pub return_url: Option<String>,
}

/// `{success, message}` or, for paid events, `{success, payment_url, payment_id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<PaymentId>,
}

impl From<RegistrationOutcome> for RegisterResponse {
    fn from(outcome: RegistrationOutcome) -> Self {
        match outcome {
            RegistrationOutcome::Registered { message } => Self {
                success: true,
                message: Some(message.to_string()),
                payment_url: None,
                payment_id: None,
            },
            RegistrationOutcome::PaymentRequired {
                payment_id,
                payment_url,
            } => Self {
                success: true,
                message: None,
                payment_url: Some(payment_url),
                payment_id: Some(payment_id),
            },
        }
    }
}

/// `{success: false, message}` answer used for every refused registration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterFailure {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailCheckResponse {
    pub success: bool,
    #[serde(flatten)]
    pub check: EmailCheck,
}
