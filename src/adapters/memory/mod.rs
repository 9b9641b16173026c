//! In-memory adapters.
//!
//! Deterministic implementations of every persistence and integration port.
//! They back unit and router tests, and let the service boot without a
//! database for local demos.

mod catalog;
mod events;
mod grants;
mod integrations;
mod notifications;
mod payments;
mod registrations;
mod users;

use std::sync::{Mutex, MutexGuard};

use crate::domain::foundation::{DomainError, ErrorCode, Page, PageRequest};

pub use catalog::{CatalogRecord, InMemoryCatalog};
pub use events::InMemoryEventRepository;
pub use grants::InMemoryAccessGrants;
pub use integrations::{CrmCall, RecordingCrm, RecordingMailer, StubPaymentGateway};
pub use notifications::InMemoryNotifications;
pub use payments::InMemoryPayments;
pub use registrations::InMemoryRegistrations;
pub use users::InMemoryUsers;

fn guard<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, DomainError> {
    mutex
        .lock()
        .map_err(|_| DomainError::new(ErrorCode::InternalError, "in-memory store lock poisoned"))
}

/// Slices one page out of an already filtered and ordered list.
fn paginate<T: Clone>(items: &[T], page: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let slice = items
        .iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect();
    Page::new(slice, total, page)
}
