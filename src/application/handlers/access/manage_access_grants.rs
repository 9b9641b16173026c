//! ManageAccessGrantsHandler - back-office editing of who may attend an event.

use std::sync::Arc;

use crate::domain::access::{AccessGrant, AccessGrantDraft, AccessGrantError, AccessGrantFields};
use crate::domain::foundation::{
    AuthenticatedUser, EventId, Role, Timestamp, UserId, ValidationError,
};
use crate::ports::{AccessGrantRepository, EventRepository, UserRepository};

#[derive(Debug, Clone)]
pub struct StoreGrantCommand {
    pub user_id: UserId,
    pub draft: AccessGrantDraft,
}

/// Identifies one grant: the pair is unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantKey {
    pub user_id: UserId,
    pub event_id: EventId,
}

#[derive(Debug, Clone)]
pub struct UpdateGrantCommand {
    pub key: GrantKey,
    pub draft: AccessGrantDraft,
}

pub struct ManageAccessGrantsHandler {
    users: Arc<dyn UserRepository>,
    events: Arc<dyn EventRepository>,
    grants: Arc<dyn AccessGrantRepository>,
}

fn authorize(actor: &AuthenticatedUser) -> Result<(), AccessGrantError> {
    actor
        .require_any_role(&Role::ACCESS_MANAGERS)
        .map_err(|_| AccessGrantError::Forbidden)
}

fn apply(grant: &mut AccessGrant, fields: AccessGrantFields, now: Timestamp) {
    grant.access_type = fields.access_type;
    grant.payment_amount = fields.payment_amount;
    grant.payment_id = fields.payment_id;
    grant.payment_status = fields.payment_status;
    grant.access_granted_at = fields.access_granted_at;
    grant.access_expires_at = fields.access_expires_at;
    grant.is_active = fields.is_active;
    grant.updated_at = now;
}

impl ManageAccessGrantsHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        events: Arc<dyn EventRepository>,
        grants: Arc<dyn AccessGrantRepository>,
    ) -> Self {
        Self {
            users,
            events,
            grants,
        }
    }

    pub async fn store(
        &self,
        actor: &AuthenticatedUser,
        cmd: StoreGrantCommand,
    ) -> Result<AccessGrant, AccessGrantError> {
        authorize(actor)?;
        let now = Timestamp::now();
        let event_id = cmd
            .draft
            .event_id
            .ok_or_else(|| ValidationError::empty_field("event_id"))?;
        let fields = cmd.draft.validate(now, true)?;

        if self.users.find_by_id(cmd.user_id).await?.is_none() {
            return Err(AccessGrantError::UserNotFound(cmd.user_id.to_string()));
        }
        if self.events.find_by_id(event_id).await?.is_none() {
            return Err(AccessGrantError::EventNotFound(event_id.to_string()));
        }

        let mut grant = AccessGrant::free(event_id, cmd.user_id, now);
        apply(&mut grant, fields, now);
        if !self.grants.attach(&grant).await? {
            return Err(AccessGrantError::AlreadyGranted);
        }
        tracing::info!(actor = %actor.id, user_id = %cmd.user_id, event_id = %event_id, access_type = grant.access_type.as_str(), "Access granted");
        Ok(grant)
    }

    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        cmd: UpdateGrantCommand,
    ) -> Result<AccessGrant, AccessGrantError> {
        authorize(actor)?;
        let now = Timestamp::now();
        let fields = cmd.draft.validate(now, false)?;
        let mut grant = self.find(cmd.key).await?;
        apply(&mut grant, fields, now);
        self.grants.update(&grant).await?;
        tracing::info!(actor = %actor.id, user_id = %cmd.key.user_id, event_id = %cmd.key.event_id, "Access grant updated");
        Ok(grant)
    }

    /// Flips `is_active` and returns the new state.
    pub async fn toggle(&self, actor: &AuthenticatedUser, key: GrantKey) -> Result<AccessGrant, AccessGrantError> {
        authorize(actor)?;
        let mut grant = self.find(key).await?;
        grant.is_active = !grant.is_active;
        grant.updated_at = Timestamp::now();
        self.grants.update(&grant).await?;
        tracing::info!(actor = %actor.id, user_id = %key.user_id, event_id = %key.event_id, active = grant.is_active, "Access grant toggled");
        Ok(grant)
    }

    pub async fn destroy(&self, actor: &AuthenticatedUser, key: GrantKey) -> Result<(), AccessGrantError> {
        authorize(actor)?;
        self.find(key).await?;
        self.grants.delete(key.event_id, key.user_id).await?;
        tracing::info!(actor = %actor.id, user_id = %key.user_id, event_id = %key.event_id, "Access grant removed");
        Ok(())
    }

    async fn find(&self, key: GrantKey) -> Result<AccessGrant, AccessGrantError> {
        self.grants
            .find(key.event_id, key.user_id)
            .await?
            .ok_or(AccessGrantError::NotFound)
    }
}
