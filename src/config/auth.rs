//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;
use crate::adapters::auth::JwtSettings;

/// Minimum HS256 key length accepted in production.
const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Authentication configuration (HS256 bearer tokens)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Signing key for issued tokens
    #[serde(default = "default_secret")]
    pub jwt_secret: SecretString,

    /// Lifetime of an issued token in seconds
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,

    /// `iss` claim written and required on tokens
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

impl AuthConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn jwt_settings(&self) -> JwtSettings {
        JwtSettings {
            secret: self.jwt_secret.clone(),
            issuer: self.issuer.clone(),
            ttl: self.token_ttl(),
        }
    }

    /// Validate authentication configuration
    ///
    /// Production requires a signing key of at least 32 bytes; elsewhere an
    /// empty key is tolerated for local runs.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret = self.jwt_secret.expose_secret();
        if *environment == Environment::Production {
            if secret.is_empty() {
                return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
            }
            if secret.len() < MIN_PRODUCTION_SECRET_LEN {
                return Err(ValidationError::WeakJwtSecret(MIN_PRODUCTION_SECRET_LEN));
            }
        }
        if self.token_ttl_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.issuer.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__ISSUER"));
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_secret(),
            token_ttl_secs: default_token_ttl(),
            issuer: default_issuer(),
        }
    }
}

fn default_secret() -> SecretString {
    SecretString::new(String::new())
}

fn default_token_ttl() -> u64 {
    86_400
}

fn default_issuer() -> String {
    "event-portal".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.token_ttl(), Duration::from_secs(86_400));
        assert_eq!(config.issuer, "event-portal");
    }

    #[test]
    fn test_empty_secret_allowed_in_development() {
        let config = AuthConfig::default();
        assert!(config.validate(&Environment::Development).is_ok());
        assert!(config.validate(&Environment::Production).is_err());
    }

    #[test]
    fn test_production_rejects_short_secret() {
        let config = AuthConfig {
            jwt_secret: SecretString::new("short".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(&Environment::Production),
            Err(ValidationError::WeakJwtSecret(32))
        ));

        let config = AuthConfig {
            jwt_secret: SecretString::new("x".repeat(48)),
            ..Default::default()
        };
        assert!(config.validate(&Environment::Production).is_ok());
    }

    #[test]
    fn test_jwt_settings_carry_ttl_and_issuer() {
        let config = AuthConfig {
            token_ttl_secs: 60,
            issuer: "portal-test".to_string(),
            ..Default::default()
        };
        let settings = config.jwt_settings();
        assert_eq!(settings.ttl, Duration::from_secs(60));
        assert_eq!(settings.issuer, "portal-test");
    }
}
