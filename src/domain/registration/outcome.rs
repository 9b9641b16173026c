//! Results of a registration attempt.

use serde::Serialize;

use crate::domain::foundation::PaymentId;

pub const MSG_ALREADY_REGISTERED: &str = "Вы уже зарегистрированы на это мероприятие";
pub const MSG_FAST_SUCCESS: &str = "Регистрация прошла успешно!";
pub const MSG_GUEST_SUCCESS: &str = "Регистрация успешна!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Access was granted, or already existed.
    Registered { message: &'static str },
    /// A payment was created; the user continues at `payment_url`.
    PaymentRequired {
        payment_id: PaymentId,
        payment_url: String,
    },
}

impl RegistrationOutcome {
    pub fn registered(message: &'static str) -> Self {
        RegistrationOutcome::Registered { message }
    }
}

/// `{success, exists, user?}` answer to the email check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailCheck {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<EmailCheckUser>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailCheckUser {
    pub id: i64,
    pub email: String,
}
