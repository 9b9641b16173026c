//! CRM module - how registrations are mirrored into Bitrix24.
//!
//! Contacts, deals and the per-event smart-process items are plain JSON
//! field maps; this module decides their contents, the gateway port moves
//! them over the wire.

mod fields;
mod payload;
mod settings;

use serde::{Deserialize, Serialize};

pub use fields::{
    contact_fields, deal_fields, event_item_fields, CONTACT_COMMENTS, DEAL_ADDITIONAL_INFO,
    DEAL_COMMENTS, DEAL_TITLE, ITEM_COMMENTS,
};
pub use payload::{CrmPayload, Utm, STATUS_AWAITING_PAYMENT, STATUS_PAID, STATUS_REGISTERED};
pub use settings::{normalize_uf_key, CrmSettings, DealStageKey};

/// Ids touched by one registration sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub contact_id: i64,
    pub deal_id: Option<i64>,
    pub item_id: Option<i64>,
}
