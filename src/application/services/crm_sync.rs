//! CrmSync - mirrors registrations and payments into the CRM.
//!
//! Every public method is best effort: failures are logged and reported as
//! `None`/`false`, never as errors, so a CRM outage cannot fail the
//! user-facing request that triggered the sync.

use serde_json::json;
use std::sync::Arc;

use crate::domain::crm::{
    contact_fields, deal_fields, event_item_fields, CrmPayload, CrmSettings, DealStageKey,
    SyncOutcome, STATUS_PAID,
};
use crate::domain::event::Event;
use crate::domain::foundation::{DomainError, LocalOffset};
use crate::domain::user::User;
use crate::ports::{CrmGateway, Fields};

pub struct CrmSync {
    gateway: Arc<dyn CrmGateway>,
    settings: CrmSettings,
    offset: LocalOffset,
}

impl CrmSync {
    pub fn new(gateway: Arc<dyn CrmGateway>, settings: CrmSettings, offset: LocalOffset) -> Self {
        Self {
            gateway,
            settings,
            offset,
        }
    }

    pub async fn sync_registration(
        &self,
        event: &Event,
        user: &User,
        payload: &CrmPayload,
    ) -> Option<SyncOutcome> {
        if !self.gateway.is_enabled() {
            return None;
        }
        match self.try_sync(event, user, payload).await {
            Ok(outcome) => {
                tracing::info!(
                    event_id = %event.id,
                    user_id = %user.id,
                    contact_id = outcome.contact_id,
                    deal_id = ?outcome.deal_id,
                    item_id = ?outcome.item_id,
                    "CRM registration synced"
                );
                Some(outcome)
            }
            Err(e) => {
                tracing::warn!(event_id = %event.id, user_id = %user.id, "CRM sync failed: {}", e);
                None
            }
        }
    }

    /// Moves the user's first deal to the configured stage.
    pub async fn move_first_deal_stage(&self, user: &User, key: DealStageKey) -> bool {
        if !self.gateway.is_enabled() {
            return false;
        }
        let Some(stage_id) = self.settings.stage_id(key).map(str::to_string) else {
            return false;
        };
        self.try_move_stage(user, &stage_id).await.unwrap_or_else(|e| {
            tracing::warn!(user_id = %user.id, stage = key.as_str(), "CRM stage move failed: {}", e);
            false
        })
    }

    /// Flags the user's event item as paid and advances the deal.
    pub async fn mark_paid(&self, user: &User) -> bool {
        if !self.gateway.is_enabled() {
            return false;
        }
        let updated = match self.mark_item_paid(user).await {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!(user_id = %user.id, "CRM paid status update failed: {}", e);
                false
            }
        };
        self.move_first_deal_stage(user, DealStageKey::Paid).await;
        updated
    }

    async fn try_sync(
        &self,
        event: &Event,
        user: &User,
        payload: &CrmPayload,
    ) -> Result<SyncOutcome, DomainError> {
        let contact_id = match self.find_contact(user).await? {
            Some(id) => id,
            None => {
                let fields = contact_fields(user, payload, &self.settings);
                self.gateway.add_contact(&fields).await?
            }
        };

        let deal_id = match self.gateway.list_deals(contact_id).await?.first().copied() {
            Some(id) => {
                if let Some(update) = payload.deal_update_fields.as_ref().filter(|f| !f.is_empty()) {
                    self.gateway.update_deal(id, update).await?;
                }
                id
            }
            None => {
                let fields = deal_fields(event, contact_id, payload, &self.settings);
                self.gateway.add_deal(&fields).await?
            }
        };

        let fields = event_item_fields(
            event,
            contact_id,
            Some(deal_id),
            payload,
            &self.settings,
            self.offset,
        );

        if self.settings.event_unique {
            let mut filter = Fields::new();
            filter.insert("contactId".into(), json!(contact_id));
            filter.insert("parentId2".into(), json!(deal_id));
            filter.insert("title".into(), json!(event.title));
            if let Some(item_id) = self.gateway.list_items(&filter).await?.first().copied() {
                if let Some(key) = self.settings.status_key() {
                    let mut status = Fields::new();
                    if let Some(value) = fields.get(&key) {
                        status.insert(key, value.clone());
                        self.gateway.update_item(item_id, &status).await?;
                    }
                }
                return Ok(SyncOutcome {
                    contact_id,
                    deal_id: Some(deal_id),
                    item_id: Some(item_id),
                });
            }
        }

        let item_id = self.gateway.add_item(&fields).await?;
        Ok(SyncOutcome {
            contact_id,
            deal_id: Some(deal_id),
            item_id: Some(item_id),
        })
    }

    async fn try_move_stage(&self, user: &User, stage_id: &str) -> Result<bool, DomainError> {
        let Some(deal_id) = self.first_deal(user).await? else {
            return Ok(false);
        };
        let mut fields = Fields::new();
        fields.insert("STAGE_ID".into(), json!(stage_id));
        self.gateway.update_deal(deal_id, &fields).await
    }

    async fn mark_item_paid(&self, user: &User) -> Result<bool, DomainError> {
        let Some(key) = self.settings.status_key() else {
            return Ok(false);
        };
        let Some(contact_id) = self.find_contact(user).await? else {
            return Ok(false);
        };
        let deal_id = self.gateway.list_deals(contact_id).await?.first().copied();

        let mut filter = Fields::new();
        filter.insert("contactId".into(), json!(contact_id));
        if let Some(deal_id) = deal_id {
            filter.insert("parentId2".into(), json!(deal_id));
        }
        let Some(item_id) = self.gateway.list_items(&filter).await?.first().copied() else {
            return Ok(false);
        };

        let mut fields = Fields::new();
        fields.insert(key, json!(STATUS_PAID));
        self.gateway.update_item(item_id, &fields).await
    }

    async fn find_contact(&self, user: &User) -> Result<Option<i64>, DomainError> {
        self.gateway
            .find_contact(Some(&user.email), user.phone.as_deref())
            .await
    }

    async fn first_deal(&self, user: &User) -> Result<Option<i64>, DomainError> {
        match self.find_contact(user).await? {
            Some(contact_id) => Ok(self.gateway.list_deals(contact_id).await?.first().copied()),
            None => Ok(None),
        }
    }
}
