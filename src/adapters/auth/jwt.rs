//! HS256 JWT adapter.
//!
//! Tokens carry `{sub, email, roles, exp, iat, iss, jti}`. The validator
//! checks signature, issuer and expiry, then maps the claims to an
//! `AuthenticatedUser`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{AuthError, AuthenticatedUser, Role, RoleSet, Timestamp, UserId};
use crate::domain::user::User;
use crate::ports::{IssuedToken, SessionValidator, TokenIssuer};

#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: Secret<String>,
    pub issuer: String,
    pub ttl: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    #[serde(default)]
    roles: Vec<String>,
    exp: i64,
    iat: i64,
    iss: String,
    jti: String,
}

pub struct JwtTokenService {
    settings: JwtSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtTokenService {
    pub fn new(settings: JwtSettings) -> Self {
        let secret = settings.secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            settings,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.settings.issuer]);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation
    }
}

impl std::fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("issuer", &self.settings.issuer)
            .field("ttl", &self.settings.ttl)
            .finish()
    }
}

#[async_trait]
impl TokenIssuer for JwtTokenService {
    async fn issue(&self, user: &User) -> Result<IssuedToken, AuthError> {
        let now = Utc::now().timestamp();
        let exp = now + self.settings.ttl.as_secs() as i64;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            roles: user.roles.to_strings(),
            exp,
            iat: now,
            iss: self.settings.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign access token: {}", e);
            AuthError::service_unavailable("token signing failed")
        })?;
        let expires_at = Utc
            .timestamp_opt(exp, 0)
            .single()
            .map(Timestamp::from_datetime)
            .unwrap_or_else(Timestamp::now);
        Ok(IssuedToken { token, expires_at })
    }
}

#[async_trait]
impl SessionValidator for JwtTokenService {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation()).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                ErrorKind::InvalidIssuer => {
                    tracing::warn!("Invalid issuer in token");
                    AuthError::InvalidToken
                }
                _ => {
                    tracing::debug!("Token validation failed: {}", e);
                    AuthError::InvalidToken
                }
            }
        })?;
        let claims = data.claims;

        let user_id: UserId = claims.sub.parse().map_err(|_| {
            tracing::warn!("Invalid user id in token: {}", claims.sub);
            AuthError::InvalidToken
        })?;
        let roles = RoleSet::new(claims.roles.iter().filter_map(|r| r.parse::<Role>().ok()));

        Ok(AuthenticatedUser::new(user_id, claims.email, roles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::sample_user;

    fn service(issuer: &str, ttl_secs: u64) -> JwtTokenService {
        JwtTokenService::new(JwtSettings {
            secret: Secret::new("test-secret".to_string()),
            issuer: issuer.to_string(),
            ttl: Duration::from_secs(ttl_secs),
        })
    }

    #[tokio::test]
    async fn issued_token_validates_back_to_user() {
        let svc = service("event-portal", 3600);
        let mut user = sample_user(12, "doc@clinic.ru");
        user.roles = RoleSet::new([Role::Manager, Role::User]);

        let issued = svc.issue(&user).await.unwrap();
        let auth = svc.validate(&issued.token).await.unwrap();

        assert_eq!(auth.id, UserId::new(12));
        assert_eq!(auth.email, "doc@clinic.ru");
        assert!(auth.roles.has_role(Role::Manager));
        assert!(issued.expires_at > Timestamp::now());
    }

    #[tokio::test]
    async fn token_from_other_issuer_is_rejected() {
        let issued = service("someone-else", 3600)
            .issue(&sample_user(1, "a@b.ru"))
            .await
            .unwrap();
        let err = service("event-portal", 3600).validate(&issued.token).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let err = service("event-portal", 60).validate("not.a.jwt").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn expired_token_is_reported_as_expired() {
        let svc = service("event-portal", 0);
        let issued = svc.issue(&sample_user(1, "a@b.ru")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(svc.validate(&issued.token).await.unwrap_err(), AuthError::TokenExpired);
    }
}
