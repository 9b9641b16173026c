//! PostgreSQL connection settings.
//!
//! Either a full `url` or the individual host/port/name/credentials. The URL
//! wins when both are present.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "empty_secret")]
    pub password: SecretString,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Seconds to wait for a free connection
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Apply pending migrations before serving
    #[serde(default)]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    fn url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        if let Some(url) = self.url() {
            return url.parse();
        }
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .username(&self.username);
        let password = self.password.expose_secret();
        Ok(if password.is_empty() {
            options
        } else {
            options.password(password)
        })
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .min_connections(self.min_connections)
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
    }

    pub async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        self.pool_options()
            .connect_with(self.connect_options()?)
            .await
    }

    /// Pool that opens connections on first use.
    pub fn connect_lazy(&self) -> Result<PgPool, sqlx::Error> {
        Ok(self.pool_options().connect_lazy_with(self.connect_options()?))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.url() {
            Some(url) if !url.starts_with("postgres://") && !url.starts_with("postgresql://") => {
                return Err(ValidationError::InvalidDatabaseUrl);
            }
            Some(_) => {}
            None if self.host.trim().is_empty() => {
                return Err(ValidationError::MissingRequired("DATABASE__HOST"));
            }
            None if self.name.trim().is_empty() => {
                return Err(ValidationError::MissingRequired("DATABASE__NAME"));
            }
            None => {}
        }
        if self.max_connections == 0 || self.min_connections > self.max_connections {
            return Err(ValidationError::InvalidPoolSize);
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: default_host(),
            port: default_port(),
            name: default_name(),
            username: default_username(),
            password: empty_secret(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            run_migrations: false,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_name() -> String {
    "event_portal".to_string()
}

fn default_username() -> String {
    "postgres".to_string()
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_url(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: Some(url.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_point_at_local_server() {
        let config = DatabaseConfig::default();
        assert!(config.validate().is_ok());
        let options = config.connect_options().unwrap();
        assert_eq!(options.get_host(), "127.0.0.1");
        assert_eq!(options.get_port(), 5432);
        assert_eq!(options.get_database(), Some("event_portal"));
    }

    #[test]
    fn url_takes_precedence_over_parts() {
        let config = DatabaseConfig {
            host: "ignored".to_string(),
            ..with_url("postgresql://portal@db.internal:6543/portal")
        };
        let options = config.connect_options().unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
    }

    #[test]
    fn blank_url_falls_back_to_parts() {
        let config = with_url("   ");
        assert!(config.validate().is_ok());
        assert_eq!(config.connect_options().unwrap().get_host(), "127.0.0.1");
    }

    #[test]
    fn non_postgres_url_rejected() {
        assert!(matches!(
            with_url("mysql://localhost/test").validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        ));
    }

    #[test]
    fn missing_host_rejected_without_url() {
        let config = DatabaseConfig {
            host: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("DATABASE__HOST"))
        ));
    }

    #[test]
    fn pool_bounds_checked() {
        let config = DatabaseConfig {
            min_connections: 10,
            max_connections: 5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidPoolSize)));
    }

    #[tokio::test]
    async fn lazy_pool_does_not_touch_the_server() {
        let config = DatabaseConfig {
            port: 1,
            ..Default::default()
        };
        let pool = config.connect_lazy().unwrap();
        assert_eq!(pool.size(), 0);
    }
}
