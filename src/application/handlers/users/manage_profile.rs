//! ManageProfileHandler - the signed-in user edits or deletes their own account.

use std::sync::Arc;

use crate::domain::foundation::{UserId, ValidationError};
use crate::domain::user::{normalize_email, ProfileDraft, User, UserError};
use crate::ports::{PasswordHasher, UserRepository};

pub struct ManageProfileHandler {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl ManageProfileHandler {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// Saves the profile form. A new email address must be confirmed again.
    pub async fn update(&self, user_id: UserId, draft: &ProfileDraft) -> Result<User, UserError> {
        let current = self.get(user_id).await?;
        let fields = draft.apply_to(&current)?;
        let email_changed = fields.email != normalize_email(&current.email);

        let mut user = self.users.update(user_id, &fields, None).await?;
        if email_changed {
            self.users.set_email_verified_at(user_id, None).await?;
            user.email_verified_at = None;
        }
        tracing::info!(user_id = %user_id, email_changed, "Profile updated");
        Ok(user)
    }

    /// Deletes the account after checking the current password.
    pub async fn delete(&self, user_id: UserId, password: &str) -> Result<(), UserError> {
        if password.is_empty() {
            return Err(ValidationError::empty_field("password").into());
        }
        let current = self.get(user_id).await?;
        if !self.hasher.verify(password, &current.password_hash) {
            return Err(ValidationError::invalid_format("password", "current password is incorrect").into());
        }
        self.users.delete(user_id).await?;
        tracing::info!(user_id = %user_id, "Account deleted by its owner");
        Ok(())
    }

    async fn get(&self, user_id: UserId) -> Result<User, UserError> {
        self.users.find_by_id(user_id).await?.ok_or(UserError::NotFound)
    }
}
