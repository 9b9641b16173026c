//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - repositories over sqlx
//! - `memory` - in-process repositories and recording integrations
//! - `paykeeper`, `bitrix24`, `sendsay` - payment, CRM and mail clients
//! - `auth` - JWT sessions and Argon2 password hashing
//! - `rate_limiter` - in-memory and Redis request limits
//! - `http` - the axum REST API

pub mod auth;
pub mod bitrix24;
pub mod http;
pub mod memory;
pub mod paykeeper;
pub mod postgres;
pub mod rate_limiter;
pub mod sendsay;
