//! Bitrix24 CRM adapter (inbound webhook REST API).

mod bitrix24_client;

pub use bitrix24_client::Bitrix24Client;
