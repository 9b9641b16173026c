//! The public registration form and its two validation paths.

use serde::Deserialize;

use crate::domain::crm::{CrmPayload, Utm, STATUS_REGISTERED};
use crate::domain::foundation::{non_empty, optional_text, require_text, validate_email, ValidationError};
use crate::domain::user::normalize_email;

/// Raw form as posted by the event page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub fast: bool,
    #[serde(default)]
    pub existing_user: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub specialization: Option<String>,
    #[serde(flatten)]
    pub utm: Utm,
    pub event_status: Option<String>,
}

/// Profile data for an account created on the fly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestProfile {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub specialization: Option<String>,
}

/// What a guest submission resolves to after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuestRegistration {
    /// Registers an account that must already exist.
    Existing { email: String },
    /// Creates a new account first.
    New(GuestProfile),
}

impl GuestRegistration {
    pub fn email(&self) -> &str {
        match self {
            GuestRegistration::Existing { email } => email,
            GuestRegistration::New(profile) => &profile.email,
        }
    }
}

impl RegistrationForm {
    pub fn validate_guest(&self) -> Result<GuestRegistration, ValidationError> {
        if self.existing_user {
            let email = normalize_email(&validate_email(self.email.as_deref())?);
            return Ok(GuestRegistration::Existing { email });
        }

        Ok(GuestRegistration::New(GuestProfile {
            first_name: require_text("first_name", self.first_name.as_deref(), 255)?,
            last_name: require_text("last_name", self.last_name.as_deref(), 255)?,
            middle_name: optional_text("middle_name", self.middle_name.as_deref(), 255)?,
            email: normalize_email(&validate_email(self.email.as_deref())?),
            phone: require_text("phone", self.phone.as_deref(), 20)?,
            city: require_text("city", self.city.as_deref(), 255)?,
            specialization: optional_text("specialization", self.specialization.as_deref(), 255)?,
        }))
    }

    /// Data the CRM sync receives. Status defaults to "registered".
    pub fn crm_payload(&self) -> CrmPayload {
        CrmPayload {
            utm: self.utm.clone(),
            event_status: Some(
                non_empty(self.event_status.as_deref())
                    .unwrap_or_else(|| STATUS_REGISTERED.to_string()),
            ),
            first_name: non_empty(self.first_name.as_deref()),
            middle_name: non_empty(self.middle_name.as_deref()),
            last_name: non_empty(self.last_name.as_deref()),
            phone: non_empty(self.phone.as_deref()),
            city: non_empty(self.city.as_deref()),
            position: None,
            specialization: non_empty(self.specialization.as_deref()),
            deal_update_fields: None,
        }
    }

    /// Profile snapshot stored in payment metadata for paid registrations.
    pub fn user_data(&self) -> serde_json::Value {
        serde_json::json!({
            "first_name": self.first_name,
            "last_name": self.last_name,
            "middle_name": self.middle_name,
            "phone": self.phone,
            "city": self.city,
            "specialization": self.specialization,
        })
    }
}

/// Input for the "does this email have an account" check.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckEmailForm {
    pub email: Option<String>,
}

impl CheckEmailForm {
    pub fn validate(&self) -> Result<String, ValidationError> {
        validate_email(self.email.as_deref()).map(|e| normalize_email(&e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest() -> RegistrationForm {
        RegistrationForm {
            first_name: Some("Анна".into()),
            last_name: Some("Петрова".into()),
            email: Some("Anna@Clinic.ru".into()),
            phone: Some("+79990000000".into()),
            city: Some("Москва".into()),
            ..Default::default()
        }
    }

    #[test]
    fn new_guest_requires_contact_details() {
        let mut form = guest();
        form.city = None;
        let err = form.validate_guest().unwrap_err();
        assert_eq!(err.field(), "city");
    }

    #[test]
    fn new_guest_email_is_normalized() {
        match guest().validate_guest().unwrap() {
            GuestRegistration::New(profile) => assert_eq!(profile.email, "anna@clinic.ru"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn phone_over_twenty_chars_is_rejected() {
        let mut form = guest();
        form.phone = Some("+7 (999) 000-00-00 доб. 123".into());
        assert!(matches!(
            form.validate_guest(),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn existing_user_path_only_needs_email() {
        let form = RegistrationForm {
            existing_user: true,
            email: Some("doc@clinic.ru".into()),
            ..Default::default()
        };
        assert_eq!(
            form.validate_guest().unwrap(),
            GuestRegistration::Existing {
                email: "doc@clinic.ru".into()
            }
        );
    }

    #[test]
    fn existing_user_path_rejects_bad_email() {
        let form = RegistrationForm {
            existing_user: true,
            email: Some("nope".into()),
            ..Default::default()
        };
        assert!(form.validate_guest().is_err());
    }

    #[test]
    fn crm_payload_defaults_status_and_keeps_utm() {
        let form: RegistrationForm = serde_json::from_value(serde_json::json!({
            "email": "doc@clinic.ru",
            "utm_source": "telegram",
            "utm_campaign": "autumn"
        }))
        .unwrap();
        let payload = form.crm_payload();
        assert_eq!(payload.event_status.as_deref(), Some(STATUS_REGISTERED));
        assert_eq!(payload.utm.utm_source.as_deref(), Some("telegram"));
        assert_eq!(payload.utm.utm_campaign.as_deref(), Some("autumn"));
    }

    #[test]
    fn check_email_form_validates() {
        let ok = CheckEmailForm {
            email: Some(" Doc@Clinic.ru ".into()),
        };
        assert_eq!(ok.validate().unwrap(), "doc@clinic.ru");
        assert!(CheckEmailForm::default().validate().is_err());
    }
}
