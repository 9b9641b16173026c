//! Registrations table port: grants joined with their users and events.

use async_trait::async_trait;

use crate::domain::access::{Registration, RegistrationCriteria};
use crate::domain::foundation::{DomainError, Page};

#[async_trait]
pub trait RegistrationListing: Send + Sync {
    /// Filters by event, matches the search against the user's names and
    /// email (case-insensitive), then orders by the criteria.
    async fn list(&self, criteria: &RegistrationCriteria) -> Result<Page<Registration>, DomainError>;
}
