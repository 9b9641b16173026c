//! Rate limiter adapters.
//!
//! - `InMemoryRateLimiter` - tests and single-node runs
//! - `RedisRateLimiter` - shared counters across instances

mod config;
mod in_memory;
mod redis;

pub use config::RateLimitConfig;
pub use in_memory::InMemoryRateLimiter;
pub use redis::RedisRateLimiter;
