//! Event Portal - registration, payment and CRM backend for medical and
//! educational events.
//!
//! Visitors register for webinars and offline events; paid events go through
//! PayKeeper, registrations and payments are mirrored into Bitrix24 and
//! confirmation letters go out through Sendsay. Staff maintain events,
//! catalogs, users and access grants through the back-office API.

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;
