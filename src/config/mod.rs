//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `EVENT_PORTAL` prefix
//! and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use event_portal::config::{AppConfig, ConfigError};
//!
//! fn settings() -> Result<AppConfig, ConfigError> {
//!     let config = AppConfig::load_validated()?;
//!     println!("listening on port {}", config.server.port);
//!     Ok(config)
//! }
//! ```

mod auth;
mod bitrix24;
mod database;
mod error;
mod features;
mod paykeeper;
mod redis;
mod sendsay;
mod server;

pub use auth::AuthConfig;
pub use bitrix24::Bitrix24Config;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use features::FeatureFlags;
pub use paykeeper::PaykeeperConfig;
pub use redis::RedisConfig;
pub use sendsay::SendsayConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load with [`AppConfig::load()`], then call [`AppConfig::validate()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (bind address, environment, public URL)
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL connection
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Optional Redis backing for rate limits
    #[serde(default)]
    pub redis: RedisConfig,

    /// Bearer token signing
    #[serde(default)]
    pub auth: AuthConfig,

    /// PayKeeper payment gateway
    #[serde(default)]
    pub paykeeper: PaykeeperConfig,

    /// Bitrix24 CRM
    #[serde(default)]
    pub bitrix24: Bitrix24Config,

    /// Sendsay email
    #[serde(default)]
    pub sendsay: SendsayConfig,

    /// Feature flags
    #[serde(default)]
    pub features: FeatureFlags,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` when present, then reads `EVENT_PORTAL__*` variables:
    ///
    /// - `EVENT_PORTAL__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `EVENT_PORTAL__DATABASE__HOST=db` -> `database.host = "db"`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("EVENT_PORTAL")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load and validate in one step
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration sections
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.paykeeper.validate()?;
        self.bitrix24.validate()?;
        self.sendsay.validate()?;
        self.features.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
