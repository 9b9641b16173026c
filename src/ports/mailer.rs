//! Mailer port (Sendsay actions).

use async_trait::async_trait;

use crate::domain::email::{IssueRequest, MemberUpdate};
use crate::domain::foundation::DomainError;

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Whether delivery is configured.
    fn is_enabled(&self) -> bool;

    async fn set_member(&self, member: &MemberUpdate) -> Result<(), DomainError>;

    async fn send(&self, issue: &IssueRequest) -> Result<(), DomainError>;
}
