//! CRM gateway port (Bitrix24 REST methods).
//!
//! Field maps are built by the domain; this port only moves them.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::foundation::DomainError;

pub type Fields = Map<String, Value>;

#[async_trait]
pub trait CrmGateway: Send + Sync {
    /// Whether a portal is configured at all.
    fn is_enabled(&self) -> bool;

    /// First contact matching the email or phone.
    async fn find_contact(&self, email: Option<&str>, phone: Option<&str>) -> Result<Option<i64>, DomainError>;

    async fn add_contact(&self, fields: &Fields) -> Result<i64, DomainError>;

    /// Deal ids of the contact in the configured pipeline, oldest first.
    async fn list_deals(&self, contact_id: i64) -> Result<Vec<i64>, DomainError>;

    async fn add_deal(&self, fields: &Fields) -> Result<i64, DomainError>;

    async fn update_deal(&self, deal_id: i64, fields: &Fields) -> Result<bool, DomainError>;

    async fn add_item(&self, fields: &Fields) -> Result<i64, DomainError>;

    async fn list_items(&self, filter: &Fields) -> Result<Vec<i64>, DomainError>;

    async fn update_item(&self, item_id: i64, fields: &Fields) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crm_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn CrmGateway) {}
    }
}
