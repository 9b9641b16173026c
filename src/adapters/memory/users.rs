//! In-memory user store with email uniqueness.

use async_trait::async_trait;
use std::sync::Mutex;

use super::{guard, paginate};
use crate::domain::foundation::{DomainError, ErrorCode, Page, Role, RoleSet, Timestamp, UserId};
use crate::domain::user::{normalize_email, NewUser, User, UserFields};
use crate::ports::{UserQuery, UserRepository};

#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<Vec<User>>,
}

impl InMemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: User) -> Self {
        if let Ok(mut users) = self.users.lock() {
            users.push(user);
        }
        self
    }

    pub fn all(&self) -> Vec<User> {
        self.users.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

fn duplicate(email: &str) -> DomainError {
    DomainError::new(ErrorCode::DuplicateEmail, format!("Email {} is already taken", email))
}

fn missing(id: UserId) -> DomainError {
    DomainError::new(ErrorCode::UserNotFound, format!("User {} not found", id))
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        Ok(guard(&self.users)?.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let email = normalize_email(email);
        Ok(guard(&self.users)?
            .iter()
            .find(|u| normalize_email(&u.email) == email)
            .cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<User, DomainError> {
        let mut users = guard(&self.users)?;
        let email = normalize_email(&user.email);
        if users.iter().any(|u| normalize_email(&u.email) == email) {
            return Err(duplicate(&email));
        }
        let now = Timestamp::now();
        let next = users.iter().map(|u| u.id.as_i64()).max().unwrap_or(0) + 1;
        let created = User {
            id: UserId::new(next),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            middle_name: user.middle_name.clone(),
            email,
            phone: user.phone.clone(),
            company: user.company.clone(),
            position: user.position.clone(),
            specialization: user.specialization.clone(),
            avatar: None,
            city: user.city.clone(),
            password_hash: user.password_hash.clone(),
            email_verified_at: user.email_verified_at,
            roles: user.roles.clone(),
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: UserId,
        fields: &UserFields,
        password_hash: Option<&str>,
    ) -> Result<User, DomainError> {
        let mut users = guard(&self.users)?;
        let email = normalize_email(&fields.email);
        if users
            .iter()
            .any(|u| u.id != id && normalize_email(&u.email) == email)
        {
            return Err(duplicate(&email));
        }
        let user = users.iter_mut().find(|u| u.id == id).ok_or_else(|| missing(id))?;
        user.first_name = fields.first_name.clone();
        user.last_name = fields.last_name.clone();
        user.middle_name = fields.middle_name.clone();
        user.email = email;
        user.phone = fields.phone.clone();
        user.company = fields.company.clone();
        user.position = fields.position.clone();
        user.specialization = fields.specialization.clone();
        user.city = fields.city.clone();
        user.avatar = fields.avatar.clone();
        if let Some(hash) = password_hash {
            user.password_hash = hash.to_string();
        }
        user.updated_at = Timestamp::now();
        Ok(user.clone())
    }

    async fn set_roles(&self, id: UserId, roles: &RoleSet) -> Result<(), DomainError> {
        let mut users = guard(&self.users)?;
        let user = users.iter_mut().find(|u| u.id == id).ok_or_else(|| missing(id))?;
        user.roles = roles.clone();
        Ok(())
    }

    async fn set_email_verified_at(&self, id: UserId, at: Option<Timestamp>) -> Result<(), DomainError> {
        let mut users = guard(&self.users)?;
        let user = users.iter_mut().find(|u| u.id == id).ok_or_else(|| missing(id))?;
        user.email_verified_at = at;
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), DomainError> {
        let mut users = guard(&self.users)?;
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(missing(id));
        }
        Ok(())
    }

    async fn list(&self, query: &UserQuery) -> Result<Page<User>, DomainError> {
        let needle = query.search.as_deref().map(str::to_lowercase);
        let mut found: Vec<User> = guard(&self.users)?
            .iter()
            .filter(|u| query.role.map_or(true, |r| u.roles.has_role(r)))
            .filter(|u| {
                needle.as_deref().map_or(true, |n| {
                    [&u.first_name, &u.last_name, &u.email]
                        .iter()
                        .any(|f| f.to_lowercase().contains(n))
                })
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(&found, query.page))
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, DomainError> {
        Ok(guard(&self.users)?
            .iter()
            .filter(|u| u.roles.has_role(role))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Анна".into(),
            last_name: "Петрова".into(),
            middle_name: None,
            email: email.into(),
            phone: None,
            company: None,
            position: None,
            specialization: None,
            city: None,
            password_hash: "hash".into(),
            email_verified_at: None,
            roles: RoleSet::new([Role::User]),
        }
    }

    #[tokio::test]
    async fn create_rejects_same_email_in_other_case() {
        let repo = InMemoryUsers::new();
        repo.create(&new_user("doc@clinic.ru")).await.unwrap();
        let err = repo.create(&new_user(" DOC@clinic.ru ")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateEmail);
    }

    #[tokio::test]
    async fn find_by_email_is_case_insensitive() {
        let repo = InMemoryUsers::new();
        let created = repo.create(&new_user("doc@clinic.ru")).await.unwrap();
        let found = repo.find_by_email("Doc@Clinic.ru").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
    }
}
