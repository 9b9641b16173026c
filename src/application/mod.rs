//! Application layer - Commands, Queries, and Handlers.
//!
//! Handlers orchestrate domain operations over the ports. Services hold the
//! best-effort integration steps (CRM sync, transactional mail) that several
//! handlers share.

pub mod handlers;
pub mod services;
