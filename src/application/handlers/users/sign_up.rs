//! SignUpHandler - public self-registration that signs the new user in.

use std::sync::Arc;

use super::LoginResult;
use crate::domain::foundation::{Role, RoleSet};
use crate::domain::user::{NewUser, SignupDraft, UserError};
use crate::ports::{PasswordHasher, TokenIssuer, UserRepository};

pub struct SignUpHandler {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
}

impl SignUpHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Creates an unverified `user` account and issues its first token.
    ///
    /// # Errors
    ///
    /// - `Validation` for a bad form or mismatched confirmation
    /// - `DuplicateEmail` when the address is already registered
    pub async fn handle(&self, draft: &SignupDraft) -> Result<LoginResult, UserError> {
        let fields = draft.validate()?;
        if self.users.find_by_email(&fields.email).await?.is_some() {
            return Err(UserError::DuplicateEmail);
        }
        let password = fields.password.as_deref().unwrap_or_default();
        let password_hash = self.hasher.hash(password)?;

        let user = self
            .users
            .create(&NewUser {
                first_name: fields.first_name,
                last_name: fields.last_name,
                middle_name: fields.middle_name,
                email: fields.email,
                phone: fields.phone,
                company: None,
                position: None,
                specialization: fields.specialization,
                city: fields.city,
                password_hash,
                email_verified_at: None,
                roles: RoleSet::new([Role::User]),
            })
            .await?;
        tracing::info!(user_id = %user.id, "User signed up");

        let issued = self
            .tokens
            .issue(&user)
            .await
            .map_err(|e| UserError::Infrastructure(e.to_string()))?;
        Ok(LoginResult {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::{Argon2PasswordHasher, JwtSettings, JwtTokenService};
    use crate::adapters::memory::InMemoryUsers;
    use crate::domain::foundation::ValidationError;
    use crate::domain::user::sample_user;
    use crate::ports::SessionValidator;
    use secrecy::Secret;
    use std::time::Duration;

    fn fixture() -> (SignUpHandler, Arc<InMemoryUsers>, Arc<JwtTokenService>) {
        let users = Arc::new(InMemoryUsers::new().with_user(sample_user(1, "taken@clinic.ru")));
        let tokens = Arc::new(JwtTokenService::new(JwtSettings {
            secret: Secret::new("k".into()),
            issuer: "event-portal".into(),
            ttl: Duration::from_secs(600),
        }));
        let handler = SignUpHandler::new(
            users.clone(),
            Arc::new(Argon2PasswordHasher::fast()),
            tokens.clone(),
        );
        (handler, users, tokens)
    }

    fn signup(email: &str) -> SignupDraft {
        SignupDraft {
            first_name: Some("Мария".into()),
            last_name: Some("Соколова".into()),
            email: Some(email.into()),
            city: Some("Казань".into()),
            password: Some("secret-pass".into()),
            password_confirmation: Some("secret-pass".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn creates_unverified_user_and_signs_in() {
        let (handler, users, tokens) = fixture();
        let result = handler.handle(&signup("Maria@Clinic.ru")).await.unwrap();

        assert_eq!(result.user.email, "maria@clinic.ru");
        assert!(result.user.email_verified_at.is_none());
        assert!(result.user.roles.has_role(Role::User));
        assert_eq!(users.all().len(), 2);
        let auth = tokens.validate(&result.token).await.unwrap();
        assert_eq!(auth.id, result.user.id);
    }

    #[tokio::test]
    async fn taken_email_is_duplicate() {
        let (handler, users, _) = fixture();
        let err = handler.handle(&signup(" TAKEN@clinic.ru")).await.unwrap_err();
        assert!(matches!(err, UserError::DuplicateEmail));
        assert_eq!(users.all().len(), 1);
    }

    #[tokio::test]
    async fn mismatched_confirmation_is_rejected() {
        let (handler, users, _) = fixture();
        let mut draft = signup("maria@clinic.ru");
        draft.password_confirmation = Some("other-pass".into());
        let err = handler.handle(&draft).await.unwrap_err();
        assert!(matches!(
            err,
            UserError::Validation(ValidationError::InvalidFormat { .. })
        ));
        assert_eq!(users.all().len(), 1);
    }
}
