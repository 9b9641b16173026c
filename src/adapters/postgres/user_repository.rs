//! PostgreSQL implementation of UserRepository.
//!
//! Roles live in `user_roles` and are aggregated into each row on read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::support::{db_error, like_pattern, parse_column, to_u64, unique_violation};
use crate::domain::foundation::{
    DomainError, ErrorCode, Page, Role, RoleSet, Timestamp, UserId,
};
use crate::domain::user::{normalize_email, NewUser, User, UserFields};
use crate::ports::{UserQuery, UserRepository};

const EMAIL_CONSTRAINT: &str = "users_email_key";

const SELECT_USERS: &str = r#"
    SELECT u.id, u.first_name, u.last_name, u.middle_name, u.email, u.phone, u.company,
           u.position, u.specialization, u.avatar, u.city, u.password_hash,
           u.email_verified_at, u.created_at, u.updated_at,
           COALESCE(array_agg(r.role::text) FILTER (WHERE r.role IS NOT NULL), '{}'::text[]) AS roles
    FROM users u
    LEFT JOIN user_roles r ON r.user_id = u.id
"#;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one(&self, id: UserId) -> Result<User, DomainError> {
        self.find_by_id(id).await?.ok_or_else(|| {
            DomainError::new(ErrorCode::UserNotFound, format!("User {} not found", id))
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    first_name: String,
    last_name: String,
    middle_name: Option<String>,
    email: String,
    phone: Option<String>,
    company: Option<String>,
    position: Option<String>,
    specialization: Option<String>,
    avatar: Option<String>,
    city: Option<String>,
    password_hash: String,
    email_verified_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    roles: Vec<String>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let roles = row
            .roles
            .iter()
            .map(|r| parse_column::<Role>("role", r))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(User {
            id: UserId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            middle_name: row.middle_name,
            email: row.email,
            phone: row.phone,
            company: row.company,
            position: row.position,
            specialization: row.specialization,
            avatar: row.avatar,
            city: row.city,
            password_hash: row.password_hash,
            email_verified_at: row.email_verified_at.map(Timestamp::from_datetime),
            roles: RoleSet::new(roles),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

async fn replace_roles(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: UserId,
    roles: &RoleSet,
) -> Result<(), DomainError> {
    sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
        .bind(id.as_i64())
        .execute(&mut **tx)
        .await
        .map_err(db_error("clear roles"))?;

    for role in roles.iter() {
        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
            .bind(id.as_i64())
            .bind(role.as_str())
            .execute(&mut **tx)
            .await
            .map_err(db_error("insert role"))?;
    }
    Ok(())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{} WHERE u.id = $1 GROUP BY u.id", SELECT_USERS))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find user"))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("{} WHERE LOWER(u.email) = $1 GROUP BY u.id", SELECT_USERS))
                .bind(normalize_email(email))
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("find user by email"))?;

        row.map(User::try_from).transpose()
    }

    async fn create(&self, user: &NewUser) -> Result<User, DomainError> {
        let email = normalize_email(&user.email);
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO users (
                first_name, last_name, middle_name, email, phone, company, position,
                specialization, city, password_hash, email_verified_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.middle_name)
        .bind(&email)
        .bind(&user.phone)
        .bind(&user.company)
        .bind(&user.position)
        .bind(&user.specialization)
        .bind(&user.city)
        .bind(&user.password_hash)
        .bind(user.email_verified_at.as_ref().map(Timestamp::as_datetime))
        .fetch_one(&mut *tx)
        .await
        .map_err(unique_violation(
            "insert user",
            EMAIL_CONSTRAINT,
            ErrorCode::DuplicateEmail,
            format!("Email {} is already taken", email),
        ))?;

        let id = UserId::new(id);
        replace_roles(&mut tx, id, &user.roles).await?;
        tx.commit().await.map_err(db_error("commit transaction"))?;

        self.fetch_one(id).await
    }

    async fn update(
        &self,
        id: UserId,
        fields: &UserFields,
        password_hash: Option<&str>,
    ) -> Result<User, DomainError> {
        let email = normalize_email(&fields.email);
        let result = sqlx::query(
            r#"
            UPDATE users SET
                first_name = $2,
                last_name = $3,
                middle_name = $4,
                email = $5,
                phone = $6,
                company = $7,
                position = $8,
                specialization = $9,
                city = $10,
                avatar = $11,
                password_hash = COALESCE($12, password_hash),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.middle_name)
        .bind(&email)
        .bind(&fields.phone)
        .bind(&fields.company)
        .bind(&fields.position)
        .bind(&fields.specialization)
        .bind(&fields.city)
        .bind(&fields.avatar)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(unique_violation(
            "update user",
            EMAIL_CONSTRAINT,
            ErrorCode::DuplicateEmail,
            format!("Email {} is already taken", email),
        ))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::UserNotFound, format!("User {} not found", id)));
        }

        self.fetch_one(id).await
    }

    async fn set_roles(&self, id: UserId, roles: &RoleSet) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;
        replace_roles(&mut tx, id, roles).await?;
        tx.commit().await.map_err(db_error("commit transaction"))
    }

    async fn set_email_verified_at(&self, id: UserId, at: Option<Timestamp>) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE users SET email_verified_at = $2, updated_at = NOW() WHERE id = $1")
            .bind(id.as_i64())
            .bind(at.as_ref().map(Timestamp::as_datetime))
            .execute(&self.pool)
            .await
            .map_err(db_error("set email verification"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::UserNotFound, format!("User {} not found", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(db_error("delete user"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::UserNotFound, format!("User {} not found", id)));
        }
        Ok(())
    }

    async fn list(&self, query: &UserQuery) -> Result<Page<User>, DomainError> {
        let pattern = like_pattern(query.search.as_deref());
        let role = query.role.map(|r| r.as_str());
        let filter = r#"
            WHERE ($1::text IS NULL
                   OR u.first_name ILIKE $1 OR u.last_name ILIKE $1 OR u.email ILIKE $1)
              AND ($2::text IS NULL
                   OR EXISTS (SELECT 1 FROM user_roles f WHERE f.user_id = u.id AND f.role = $2))
        "#;

        let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM users u {}", filter))
            .bind(&pattern)
            .bind(role)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("count users"))?;

        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "{} {} GROUP BY u.id ORDER BY u.created_at DESC, u.id DESC LIMIT $3 OFFSET $4",
            SELECT_USERS, filter
        ))
        .bind(&pattern)
        .bind(role)
        .bind(query.page.limit())
        .bind(query.page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list users"))?;

        let users = rows.into_iter().map(User::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(users, to_u64(total), query.page))
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, DomainError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "{} WHERE EXISTS (SELECT 1 FROM user_roles f WHERE f.user_id = u.id AND f.role = $1) \
             GROUP BY u.id ORDER BY u.id",
            SELECT_USERS
        ))
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list users by role"))?;

        rows.into_iter().map(User::try_from).collect()
    }
}
