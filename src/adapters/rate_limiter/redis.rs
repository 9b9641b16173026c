//! Redis-backed rate limiter for deployments with several instances.
//!
//! Fixed-window counter: INCR the key, set EXPIRE on the first hit of a
//! window, deny once the count passes the limit.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::Timestamp;
use crate::ports::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter,
};

use super::config::RateLimitConfig;

#[derive(Clone)]
pub struct RedisRateLimiter {
    conn: MultiplexedConnection,
    config: RateLimitConfig,
}

fn unavailable(e: redis::RedisError) -> RateLimitError {
    RateLimitError::Unavailable(e.to_string())
}

impl RedisRateLimiter {
    /// Open a multiplexed connection to `url`.
    pub async fn connect(url: &str, config: RateLimitConfig) -> Result<Self, RateLimitError> {
        let client = redis::Client::open(url).map_err(unavailable)?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(unavailable)?;
        Ok(Self { conn, config })
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check(&self, key: RateLimitKey) -> Result<RateLimitResult, RateLimitError> {
        let counter = key.storage_key();
        let limit = self.config.limit_for(&key);
        let window_secs = i64::from(self.config.window_secs);
        let mut conn = self.conn.clone();

        let hits: i64 = conn.incr(&counter, 1_i64).await.map_err(unavailable)?;
        if hits == 1 {
            conn.expire::<_, ()>(&counter, window_secs)
                .await
                .map_err(unavailable)?;
        }

        let ttl: i64 = conn.ttl(&counter).await.map_err(unavailable)?;
        let reset_in = if ttl > 0 { ttl } else { window_secs };
        let hits = u32::try_from(hits).unwrap_or(u32::MAX);

        if hits > limit {
            return Ok(RateLimitResult::Denied(RateLimitDenied {
                limit,
                retry_after_secs: u32::try_from(reset_in).unwrap_or(self.config.window_secs),
            }));
        }

        Ok(RateLimitResult::Allowed(RateLimitStatus {
            limit,
            remaining: limit - hits,
            reset_at: Timestamp::now().plus_secs(reset_in),
        }))
    }
}

impl std::fmt::Debug for RedisRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRateLimiter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
