//! Composition root: wires repositories, integrations and auth into the
//! HTTP application.

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;
use thiserror::Error;

use crate::adapters::auth::{Argon2PasswordHasher, JwtTokenService};
use crate::adapters::bitrix24::Bitrix24Client;
use crate::adapters::http::{api_router, AppState};
use crate::adapters::memory::{
    InMemoryAccessGrants, InMemoryCatalog, InMemoryEventRepository, InMemoryNotifications,
    InMemoryPayments, InMemoryRegistrations, InMemoryUsers, RecordingCrm, RecordingMailer,
    StubPaymentGateway,
};
use crate::adapters::paykeeper::PaykeeperGateway;
use crate::adapters::postgres::{
    PostgresAccessGrantRepository, PostgresCategoryRepository, PostgresEventRepository,
    PostgresLibraryRepository, PostgresNotificationRepository, PostgresPartnerRepository,
    PostgresPaymentRepository, PostgresRegistrationListing, PostgresSpeakerRepository,
    PostgresUserRepository,
};
use crate::adapters::rate_limiter::{InMemoryRateLimiter, RateLimitConfig, RedisRateLimiter};
use crate::adapters::sendsay::SendsayMailer;
use crate::application::handlers::payment::PaymentLinkSettings;
use crate::application::services::{CrmSync, EventMailer};
use crate::config::{AppConfig, ConfigError, ValidationError};
use crate::domain::catalog::{Category, LibraryDocument, Partner, Speaker};
use crate::domain::foundation::DomainError;
use crate::ports::{
    AccessGrantRepository, CategoryRepository, CrmGateway, EventRepository, LibraryRepository,
    Mailer, NotificationRepository, PartnerRepository, PaymentGateway, PaymentRepository,
    RateLimiter, RegistrationListing, SessionValidator, SpeakerRepository, UserRepository,
};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Integration setup failed: {0}")]
    Integration(#[from] DomainError),

    #[error("Invalid bind address: {0}")]
    BindAddress(#[from] std::net::AddrParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage ports used by the application.
#[derive(Clone)]
pub struct Repositories {
    pub events: Arc<dyn EventRepository>,
    pub users: Arc<dyn UserRepository>,
    pub grants: Arc<dyn AccessGrantRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub registrations: Arc<dyn RegistrationListing>,
    pub categories: Arc<CategoryRepository>,
    pub speakers: Arc<SpeakerRepository>,
    pub partners: Arc<PartnerRepository>,
    pub library: Arc<LibraryRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            events: Arc::new(PostgresEventRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            grants: Arc::new(PostgresAccessGrantRepository::new(pool.clone())),
            payments: Arc::new(PostgresPaymentRepository::new(pool.clone())),
            notifications: Arc::new(PostgresNotificationRepository::new(pool.clone())),
            registrations: Arc::new(PostgresRegistrationListing::new(pool.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(pool.clone())),
            speakers: Arc::new(PostgresSpeakerRepository::new(pool.clone())),
            partners: Arc::new(PostgresPartnerRepository::new(pool.clone())),
            library: Arc::new(PostgresLibraryRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let events = Arc::new(InMemoryEventRepository::new());
        let users = Arc::new(InMemoryUsers::new());
        let grants = Arc::new(InMemoryAccessGrants::new());
        Self {
            registrations: Arc::new(InMemoryRegistrations::new(
                grants.clone(),
                users.clone(),
                events.clone(),
            )),
            events,
            users,
            grants,
            payments: Arc::new(InMemoryPayments::new()),
            notifications: Arc::new(InMemoryNotifications::new()),
            categories: Arc::new(InMemoryCatalog::<Category>::new()),
            speakers: Arc::new(InMemoryCatalog::<Speaker>::new()),
            partners: Arc::new(InMemoryCatalog::<Partner>::new()),
            library: Arc::new(InMemoryCatalog::<LibraryDocument>::new()),
        }
    }
}

/// Outbound services: payment gateway, CRM and mail.
#[derive(Clone)]
pub struct Integrations {
    pub gateway: Arc<dyn PaymentGateway>,
    pub crm: Arc<dyn CrmGateway>,
    pub mailer: Arc<dyn Mailer>,
}

impl Integrations {
    /// Real clients. Each one reports itself disabled when unconfigured.
    pub fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        Ok(Self {
            gateway: Arc::new(PaykeeperGateway::new(config.paykeeper.clone())?),
            crm: Arc::new(Bitrix24Client::new(&config.bitrix24)?),
            mailer: Arc::new(SendsayMailer::new(&config.sendsay)?),
        })
    }

    /// Recording doubles that keep every request in memory.
    pub fn recording() -> Self {
        Self {
            gateway: Arc::new(StubPaymentGateway::new()),
            crm: Arc::new(RecordingCrm::new()),
            mailer: Arc::new(RecordingMailer::new()),
        }
    }
}

/// Everything needed to serve requests.
#[derive(Clone)]
pub struct Application {
    pub state: AppState,
    pub sessions: Arc<dyn SessionValidator>,
    pub limiter: Option<Arc<dyn RateLimiter>>,
}

impl Application {
    pub fn router(&self, config: &AppConfig) -> Router {
        api_router(
            self.state.clone(),
            self.sessions.clone(),
            self.limiter.clone(),
            &config.server,
        )
    }
}

/// Builds the application from configuration and the chosen adapters.
///
/// The rate limiter uses Redis when a URL is configured and falls back to
/// the in-process limiter if Redis cannot be reached.
pub async fn build_application(
    config: &AppConfig,
    repos: Repositories,
    integrations: Integrations,
) -> Result<Application, StartupError> {
    let offset = config.server.local_offset();
    let jwt = Arc::new(JwtTokenService::new(config.auth.jwt_settings()));

    let state = AppState {
        events: repos.events,
        users: repos.users,
        grants: repos.grants,
        payments: repos.payments,
        notifications: repos.notifications,
        registrations: repos.registrations,
        categories: repos.categories,
        speakers: repos.speakers,
        partners: repos.partners,
        library: repos.library,
        gateway: integrations.gateway,
        hasher: Arc::new(Argon2PasswordHasher::new()),
        tokens: jwt.clone(),
        crm: Arc::new(CrmSync::new(
            integrations.crm,
            config.bitrix24.crm_settings(),
            offset,
        )),
        mailer: Arc::new(EventMailer::new(
            integrations.mailer,
            config.sendsay.mail_settings(),
        )),
        webhook_verifier: config.paykeeper.webhook_verifier()?,
        payment_links: PaymentLinkSettings {
            app_url: config.server.app_url.trim_end_matches('/').to_string(),
            app_key: config.server.app_key().to_string(),
        },
        offset,
    };

    Ok(Application {
        state,
        sessions: jwt,
        limiter: build_rate_limiter(config).await,
    })
}

async fn build_rate_limiter(config: &AppConfig) -> Option<Arc<dyn RateLimiter>> {
    if !config.features.rate_limiting_enabled {
        tracing::info!("Rate limiting disabled");
        return None;
    }

    let limits = RateLimitConfig::from_features(&config.features);
    if let Some(url) = config.redis.url() {
        let connect = RedisRateLimiter::connect(url, limits.clone());
        match tokio::time::timeout(config.redis.connect_timeout(), connect).await {
            Ok(Ok(limiter)) => {
                tracing::info!("Rate limiting backed by Redis");
                return Some(Arc::new(limiter));
            }
            Ok(Err(e)) => tracing::warn!(error = %e, "Redis unavailable, limiting in process"),
            Err(_) => tracing::warn!("Redis connect timed out, limiting in process"),
        }
    }
    Some(Arc::new(InMemoryRateLimiter::new(limits)))
}
