//! Application services shared by several handlers.
//!
//! - `CrmSync` - best-effort CRM mirroring
//! - `EventMailer` - registration and manager letters

mod crm_sync;
mod event_mailer;

pub use crm_sync::CrmSync;
pub use event_mailer::{EventMailer, MailSettings};
