//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations, grouped
//! by the part of the portal they serve.

pub mod access;
pub mod catalog;
pub mod events;
pub mod notifications;
pub mod payment;
pub mod registration;
pub mod users;
pub mod webhook;
