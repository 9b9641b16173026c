//! Recording doubles for the outbound integrations.
//!
//! Each one keeps a log of what it was asked to do so tests can assert on
//! the exact payloads that would have gone over the wire.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;

use super::guard;
use crate::domain::email::{IssueRequest, MemberUpdate};
use crate::domain::foundation::DomainError;
use crate::ports::{CrmGateway, Fields, Invoice, InvoiceRequest, Mailer, PaymentGateway};

// ═══════════════════════════════════════════════════════════════════
// CRM
// ═══════════════════════════════════════════════════════════════════

/// One CRM call: REST method name plus the payload it carried.
#[derive(Debug, Clone, PartialEq)]
pub struct CrmCall {
    pub method: &'static str,
    pub payload: Value,
}

pub struct RecordingCrm {
    enabled: bool,
    contact: Option<i64>,
    deals: Vec<i64>,
    items: Vec<i64>,
    next_id: Mutex<i64>,
    calls: Mutex<Vec<CrmCall>>,
}

impl Default for RecordingCrm {
    fn default() -> Self {
        Self {
            enabled: true,
            contact: None,
            deals: Vec::new(),
            items: Vec::new(),
            next_id: Mutex::new(100),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingCrm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Pretends the contact already exists.
    pub fn with_contact(mut self, id: i64) -> Self {
        self.contact = Some(id);
        self
    }

    pub fn with_deals(mut self, ids: Vec<i64>) -> Self {
        self.deals = ids;
        self
    }

    pub fn with_items(mut self, ids: Vec<i64>) -> Self {
        self.items = ids;
        self
    }

    pub fn calls(&self) -> Vec<CrmCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn methods(&self) -> Vec<&'static str> {
        self.calls().into_iter().map(|c| c.method).collect()
    }

    fn record(&self, method: &'static str, payload: Value) -> Result<(), DomainError> {
        guard(&self.calls)?.push(CrmCall { method, payload });
        Ok(())
    }

    fn allocate(&self) -> Result<i64, DomainError> {
        let mut next = guard(&self.next_id)?;
        *next += 1;
        Ok(*next)
    }
}

#[async_trait]
impl CrmGateway for RecordingCrm {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn find_contact(&self, email: Option<&str>, phone: Option<&str>) -> Result<Option<i64>, DomainError> {
        self.record("crm.contact.list", json!({ "email": email, "phone": phone }))?;
        Ok(self.contact)
    }

    async fn add_contact(&self, fields: &Fields) -> Result<i64, DomainError> {
        self.record("crm.contact.add", Value::Object(fields.clone()))?;
        self.allocate()
    }

    async fn list_deals(&self, contact_id: i64) -> Result<Vec<i64>, DomainError> {
        self.record("crm.deal.list", json!({ "CONTACT_ID": contact_id }))?;
        Ok(self.deals.clone())
    }

    async fn add_deal(&self, fields: &Fields) -> Result<i64, DomainError> {
        self.record("crm.deal.add", Value::Object(fields.clone()))?;
        self.allocate()
    }

    async fn update_deal(&self, deal_id: i64, fields: &Fields) -> Result<bool, DomainError> {
        self.record("crm.deal.update", json!({ "id": deal_id, "fields": fields }))?;
        Ok(true)
    }

    async fn add_item(&self, fields: &Fields) -> Result<i64, DomainError> {
        self.record("crm.item.add", Value::Object(fields.clone()))?;
        self.allocate()
    }

    async fn list_items(&self, filter: &Fields) -> Result<Vec<i64>, DomainError> {
        self.record("crm.item.list", Value::Object(filter.clone()))?;
        Ok(self.items.clone())
    }

    async fn update_item(&self, item_id: i64, fields: &Fields) -> Result<bool, DomainError> {
        self.record("crm.item.update", json!({ "id": item_id, "fields": fields }))?;
        Ok(true)
    }
}

// ═══════════════════════════════════════════════════════════════════
// Mailer
// ═══════════════════════════════════════════════════════════════════

pub struct RecordingMailer {
    enabled: bool,
    failing: bool,
    members: Mutex<Vec<MemberUpdate>>,
    issues: Mutex<Vec<IssueRequest>>,
}

impl Default for RecordingMailer {
    fn default() -> Self {
        Self {
            enabled: true,
            failing: false,
            members: Mutex::new(Vec::new()),
            issues: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Every send fails with an external service error.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn members(&self) -> Vec<MemberUpdate> {
        self.members.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn issues(&self) -> Vec<IssueRequest> {
        self.issues.lock().map(|i| i.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn set_member(&self, member: &MemberUpdate) -> Result<(), DomainError> {
        guard(&self.members)?.push(member.clone());
        Ok(())
    }

    async fn send(&self, issue: &IssueRequest) -> Result<(), DomainError> {
        if self.failing {
            return Err(DomainError::external("Sendsay", "send rejected"));
        }
        guard(&self.issues)?.push(issue.clone());
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════
// Payment gateway
// ═══════════════════════════════════════════════════════════════════

pub struct StubPaymentGateway {
    enabled: bool,
    failing: bool,
    status: Mutex<String>,
    requests: Mutex<Vec<InvoiceRequest>>,
}

impl Default for StubPaymentGateway {
    fn default() -> Self {
        Self {
            enabled: true,
            failing: false,
            status: Mutex::new("created".to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl StubPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Status reported by `invoice_status` from now on.
    pub fn set_status(&self, status: &str) {
        if let Ok(mut current) = self.status.lock() {
            *current = status.to_string();
        }
    }

    pub fn requests(&self) -> Vec<InvoiceRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PaymentGateway for StubPaymentGateway {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<Invoice, DomainError> {
        if self.failing {
            return Err(DomainError::external("PayKeeper", "invoice rejected"));
        }
        let mut requests = guard(&self.requests)?;
        requests.push(request.clone());
        let invoice_id = format!("inv-{}", requests.len());
        Ok(Invoice {
            payment_url: format!("https://pay.example.test/bill/{}/", invoice_id),
            invoice_id,
        })
    }

    async fn invoice_status(&self, _invoice_id: &str) -> Result<String, DomainError> {
        Ok(guard(&self.status)?.clone())
    }
}
