//! ManageUsersHandler - back-office user list, show, create, update, delete and roles.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::access::AccessGrant;
use crate::domain::foundation::{AuthenticatedUser, Page, Role, RoleSet, Timestamp, UserId};
use crate::domain::user::{NewUser, User, UserDraft, UserError};
use crate::ports::{AccessGrantRepository, EventRepository, PasswordHasher, UserQuery, UserRepository};

/// A grant shown on the user page with its event title.
#[derive(Debug, Clone, Serialize)]
pub struct GrantedEvent {
    pub grant: AccessGrant,
    pub event_title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    pub user: User,
    pub grants: Vec<GrantedEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChange {
    Add(Role),
    Remove(Role),
}

pub struct ManageUsersHandler {
    users: Arc<dyn UserRepository>,
    grants: Arc<dyn AccessGrantRepository>,
    events: Arc<dyn EventRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl ManageUsersHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        grants: Arc<dyn AccessGrantRepository>,
        events: Arc<dyn EventRepository>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            users,
            grants,
            events,
            hasher,
        }
    }

    pub async fn list(&self, query: UserQuery) -> Result<Page<User>, UserError> {
        Ok(self.users.list(&query).await?)
    }

    pub async fn show(&self, id: UserId) -> Result<UserDetail, UserError> {
        let user = self.get(id).await?;
        let mut grants = Vec::new();
        for grant in self.grants.list_for_user(id).await? {
            let event_title = self.events.find_by_id(grant.event_id).await?.map(|e| e.title);
            grants.push(GrantedEvent { grant, event_title });
        }
        Ok(UserDetail { user, grants })
    }

    pub async fn create(&self, draft: &UserDraft) -> Result<User, UserError> {
        let fields = draft.validate(true)?;
        let password = fields.password.as_deref().unwrap_or_default();
        let password_hash = self.hasher.hash(password)?;

        let user = self
            .users
            .create(&NewUser {
                first_name: fields.first_name,
                last_name: fields.last_name,
                middle_name: fields.middle_name,
                email: fields.email,
                phone: fields.phone,
                company: fields.company,
                position: fields.position,
                specialization: fields.specialization,
                city: fields.city,
                password_hash,
                email_verified_at: Some(Timestamp::now()),
                roles: fields.roles.unwrap_or_else(|| RoleSet::new([Role::User])),
            })
            .await?;
        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    pub async fn update(&self, id: UserId, draft: &UserDraft) -> Result<User, UserError> {
        let fields = draft.validate(false)?;
        self.get(id).await?;

        let password_hash = match fields.password.as_deref() {
            Some(password) => Some(self.hasher.hash(password)?),
            None => None,
        };
        let mut user = self.users.update(id, &fields, password_hash.as_deref()).await?;
        if let Some(roles) = &fields.roles {
            self.users.set_roles(id, roles).await?;
            user.roles = roles.clone();
        }
        tracing::info!(user_id = %id, password_changed = password_hash.is_some(), "User updated");
        Ok(user)
    }

    pub async fn delete(&self, id: UserId) -> Result<(), UserError> {
        self.get(id).await?;
        self.users.delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Adds or removes one role. Only admins and managers may change roles.
    pub async fn change_role(
        &self,
        actor: &AuthenticatedUser,
        id: UserId,
        change: RoleChange,
    ) -> Result<User, UserError> {
        actor
            .require_any_role(&Role::ACCESS_MANAGERS)
            .map_err(|_| UserError::Forbidden)?;
        let mut user = self.get(id).await?;

        let changed = match change {
            RoleChange::Add(role) => user.roles.insert(role),
            RoleChange::Remove(role) => user.roles.remove(role),
        };
        if changed {
            self.users.set_roles(id, &user.roles).await?;
            tracing::info!(actor = %actor.id, user_id = %id, change = ?change, "User roles changed");
        }
        Ok(user)
    }

    async fn get(&self, id: UserId) -> Result<User, UserError> {
        self.users.find_by_id(id).await?.ok_or(UserError::NotFound)
    }
}
