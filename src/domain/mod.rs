//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, money, time, roles, errors)
//! - `catalog` - Categories, speakers, partners and library documents
//! - `event` - Event aggregate, listing rules and the admin form
//! - `access` - Access grants linking users to events
//! - `user` - Accounts and generated credentials
//! - `registration` - Registration form and outcomes
//! - `payment` - Payments, their status machine and secure tokens
//! - `webhook` - Gateway notification parsing and verification
//! - `crm` - CRM field mapping
//! - `email` - Transactional letter contents
//! - `notification` - Back-office inbox

pub mod access;
pub mod catalog;
pub mod crm;
pub mod email;
pub mod event;
pub mod foundation;
pub mod notification;
pub mod payment;
pub mod registration;
pub mod user;
pub mod webhook;
