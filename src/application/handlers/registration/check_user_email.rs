//! CheckUserEmailHandler - tells the registration form whether to ask for a profile.

use std::sync::Arc;

use crate::domain::registration::{CheckEmailForm, EmailCheck, EmailCheckUser, RegistrationError};
use crate::ports::UserRepository;

#[derive(Debug, Clone)]
pub struct CheckUserEmailQuery {
    pub form: CheckEmailForm,
}

pub struct CheckUserEmailHandler {
    users: Arc<dyn UserRepository>,
}

impl CheckUserEmailHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn handle(&self, query: CheckUserEmailQuery) -> Result<EmailCheck, RegistrationError> {
        let email = query.form.validate()?;
        let user = self.users.find_by_email(&email).await?;
        Ok(EmailCheck {
            exists: user.is_some(),
            user: user.map(|u| EmailCheckUser {
                id: u.id.as_i64(),
                email: u.email,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryUsers;
    use crate::domain::user::sample_user;

    fn handler() -> CheckUserEmailHandler {
        CheckUserEmailHandler::new(Arc::new(
            InMemoryUsers::new().with_user(sample_user(4, "doc@clinic.ru")),
        ))
    }

    fn query(email: &str) -> CheckUserEmailQuery {
        CheckUserEmailQuery {
            form: CheckEmailForm {
                email: Some(email.to_string()),
            },
        }
    }

    #[tokio::test]
    async fn known_email_returns_user() {
        let check = handler().handle(query("Doc@Clinic.ru")).await.unwrap();
        assert!(check.exists);
        assert_eq!(check.user.unwrap().id, 4);
    }

    #[tokio::test]
    async fn unknown_email_is_not_an_error() {
        let check = handler().handle(query("new@clinic.ru")).await.unwrap();
        assert_eq!(check, EmailCheck { exists: false, user: None });
    }

    #[tokio::test]
    async fn malformed_email_fails_validation() {
        let err = handler().handle(query("nope")).await.unwrap_err();
        assert!(matches!(err, RegistrationError::Validation(_)));
    }
}
