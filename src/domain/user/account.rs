//! Portal user accounts.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    optional_text, require_text, validate_email, Role, RoleSet, Timestamp, UserId, ValidationError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub specialization: Option<String>,
    pub avatar: Option<String>,
    pub city: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email_verified_at: Option<Timestamp>,
    pub roles: RoleSet,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// "Last First Middle", skipping empty parts.
    pub fn full_name(&self) -> String {
        [
            Some(self.last_name.as_str()),
            Some(self.first_name.as_str()),
            self.middle_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// "First Last", the form used in letters and gateway invoices.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.roles.has_any_role(roles)
    }
}

/// A user about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub specialization: Option<String>,
    pub city: Option<String>,
    pub password_hash: String,
    pub email_verified_at: Option<Timestamp>,
    pub roles: RoleSet,
}

/// Lowercased, trimmed email used for lookups and uniqueness.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Back-office user form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub specialization: Option<String>,
    pub city: Option<String>,
    pub avatar: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Validated user profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFields {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub specialization: Option<String>,
    pub city: Option<String>,
    pub avatar: Option<String>,
    /// Plain password to hash; present on create and on password change.
    pub password: Option<String>,
    pub roles: Option<RoleSet>,
}

pub const MIN_PASSWORD_LEN: usize = 8;

impl UserDraft {
    /// Validates the form. A password is mandatory when `is_new`.
    pub fn validate(&self, is_new: bool) -> Result<UserFields, ValidationError> {
        let password = self.password.as_deref().filter(|p| !p.is_empty());
        match password {
            Some(p) => {
                if p.chars().count() < MIN_PASSWORD_LEN {
                    return Err(ValidationError::invalid_format(
                        "password",
                        format!("must be at least {} characters", MIN_PASSWORD_LEN),
                    ));
                }
                if self.password_confirmation.as_deref() != Some(p) {
                    return Err(ValidationError::invalid_format(
                        "password",
                        "confirmation does not match",
                    ));
                }
            }
            None if is_new => return Err(ValidationError::empty_field("password")),
            None => {}
        }

        let roles = if self.roles.is_empty() {
            None
        } else {
            let parsed = self
                .roles
                .iter()
                .map(|r| r.parse::<Role>())
                .collect::<Result<Vec<_>, _>>()?;
            Some(RoleSet::new(parsed))
        };

        Ok(UserFields {
            first_name: require_text("first_name", self.first_name.as_deref(), 255)?,
            last_name: require_text("last_name", self.last_name.as_deref(), 255)?,
            middle_name: optional_text("middle_name", self.middle_name.as_deref(), 255)?,
            email: normalize_email(&validate_email(self.email.as_deref())?),
            phone: optional_text("phone", self.phone.as_deref(), 20)?,
            company: optional_text("company", self.company.as_deref(), 255)?,
            position: optional_text("position", self.position.as_deref(), 255)?,
            specialization: optional_text("specialization", self.specialization.as_deref(), 255)?,
            city: optional_text("city", self.city.as_deref(), 255)?,
            avatar: optional_text("avatar", self.avatar.as_deref(), 1024)?,
            password: password.map(str::to_string),
            roles,
        })
    }
}

/// Public sign-up form. Roles are never read from it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub city: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

impl SignupDraft {
    /// Same rules as a back-office create; the password is mandatory.
    pub fn validate(&self) -> Result<UserFields, ValidationError> {
        UserDraft {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            middle_name: self.middle_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            specialization: self.specialization.clone(),
            city: self.city.clone(),
            password: self.password.clone(),
            password_confirmation: self.password_confirmation.clone(),
            ..Default::default()
        }
        .validate(true)
    }
}

/// Self-service profile form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub city: Option<String>,
    #[serde(default)]
    pub delete_avatar: bool,
}

impl ProfileDraft {
    /// Validated fields over `current`. Company and position are not
    /// editable here; the avatar is kept unless `delete_avatar` is set.
    pub fn apply_to(&self, current: &User) -> Result<UserFields, ValidationError> {
        UserDraft {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            middle_name: self.middle_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            company: current.company.clone(),
            position: current.position.clone(),
            specialization: self.specialization.clone(),
            city: self.city.clone(),
            avatar: if self.delete_avatar {
                None
            } else {
                current.avatar.clone()
            },
            ..Default::default()
        }
        .validate(false)
    }
}

#[cfg(test)]
pub(crate) fn sample_user(id: i64, email: &str) -> User {
    let now = Timestamp::now();
    User {
        id: UserId::new(id),
        first_name: "Анна".to_string(),
        last_name: "Петрова".to_string(),
        middle_name: None,
        email: email.to_string(),
        phone: Some("+79990000000".to_string()),
        company: None,
        position: None,
        specialization: Some("Кардиолог".to_string()),
        avatar: None,
        city: Some("Москва".to_string()),
        password_hash: "hash".to_string(),
        email_verified_at: Some(now),
        roles: RoleSet::new([Role::User]),
        created_at: now,
        updated_at: now,
    }
}
