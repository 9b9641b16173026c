//! In-process rate limiter for tests and single-node deployments.
//!
//! Fixed-window counters in a HashMap. Instances do not share state.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::foundation::Timestamp;
use crate::ports::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter,
};

use super::config::RateLimitConfig;

#[derive(Debug)]
pub struct InMemoryRateLimiter {
    config: RateLimitConfig,
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    hits: u32,
    ends_at: i64,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: RateLimitKey) -> Result<RateLimitResult, RateLimitError> {
        let limit = self.config.limit_for(&key);
        let window_secs = i64::from(self.config.window_secs);
        let now = Timestamp::now().as_unix_secs();

        let mut windows = self.windows.lock().await;
        let window = windows.entry(key.storage_key()).or_insert(Window {
            hits: 0,
            ends_at: now + window_secs,
        });
        if now >= window.ends_at {
            *window = Window {
                hits: 0,
                ends_at: now + window_secs,
            };
        }

        let reset_in = (window.ends_at - now).max(1);
        if window.hits >= limit {
            return Ok(RateLimitResult::Denied(RateLimitDenied {
                limit,
                retry_after_secs: u32::try_from(reset_in).unwrap_or(self.config.window_secs),
            }));
        }

        window.hits += 1;
        Ok(RateLimitResult::Allowed(RateLimitStatus {
            limit,
            remaining: limit - window.hits,
            reset_at: Timestamp::now().plus_secs(reset_in),
        }))
    }
}
