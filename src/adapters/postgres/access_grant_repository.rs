//! PostgreSQL implementation of AccessGrantRepository over the `event_user` pivot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::support::{db_error, parse_column};
use crate::domain::access::AccessGrant;
use crate::domain::foundation::{DomainError, ErrorCode, EventId, Money, Timestamp, UserId};
use crate::ports::AccessGrantRepository;

const SELECT_GRANTS: &str = r#"
    SELECT event_id, user_id, access_type, payment_amount, payment_id, payment_status,
           access_granted_at, access_expires_at, is_active, created_at, updated_at
    FROM event_user
"#;

pub struct PostgresAccessGrantRepository {
    pool: PgPool,
}

impl PostgresAccessGrantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GrantRow {
    event_id: i64,
    user_id: i64,
    access_type: String,
    payment_amount: Option<i64>,
    payment_id: Option<String>,
    payment_status: String,
    access_granted_at: Option<DateTime<Utc>>,
    access_expires_at: Option<DateTime<Utc>>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<GrantRow> for AccessGrant {
    type Error = DomainError;

    fn try_from(row: GrantRow) -> Result<Self, Self::Error> {
        Ok(AccessGrant {
            event_id: EventId::new(row.event_id),
            user_id: UserId::new(row.user_id),
            access_type: parse_column("access_type", &row.access_type)?,
            payment_amount: row.payment_amount.map(Money::from_kopecks),
            payment_id: row.payment_id,
            payment_status: parse_column("payment_status", &row.payment_status)?,
            access_granted_at: row.access_granted_at.map(Timestamp::from_datetime),
            access_expires_at: row.access_expires_at.map(Timestamp::from_datetime),
            is_active: row.is_active,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn missing() -> DomainError {
    DomainError::new(ErrorCode::AccessGrantNotFound, "Access grant not found")
}

/// Column list shared by insert statements; `$1..$11` follow [`bind_grant`].
const INSERT_GRANT: &str = r#"
    INSERT INTO event_user (
        event_id, user_id, access_type, payment_amount, payment_id, payment_status,
        access_granted_at, access_expires_at, is_active, created_at, updated_at
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
"#;

fn bind_grant<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    grant: &'q AccessGrant,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(grant.event_id.as_i64())
        .bind(grant.user_id.as_i64())
        .bind(grant.access_type.as_str())
        .bind(grant.payment_amount.map(|m| m.kopecks()))
        .bind(&grant.payment_id)
        .bind(grant.payment_status.as_str())
        .bind(grant.access_granted_at.as_ref().map(Timestamp::as_datetime))
        .bind(grant.access_expires_at.as_ref().map(Timestamp::as_datetime))
        .bind(grant.is_active)
        .bind(grant.created_at.as_datetime())
        .bind(grant.updated_at.as_datetime())
}

#[async_trait]
impl AccessGrantRepository for PostgresAccessGrantRepository {
    async fn find(&self, event_id: EventId, user_id: UserId) -> Result<Option<AccessGrant>, DomainError> {
        let row: Option<GrantRow> =
            sqlx::query_as(&format!("{} WHERE event_id = $1 AND user_id = $2", SELECT_GRANTS))
                .bind(event_id.as_i64())
                .bind(user_id.as_i64())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("find access grant"))?;

        row.map(AccessGrant::try_from).transpose()
    }

    async fn attach(&self, grant: &AccessGrant) -> Result<bool, DomainError> {
        let sql = format!("{} ON CONFLICT (event_id, user_id) DO NOTHING", INSERT_GRANT);
        let result = bind_grant(sqlx::query(&sql), grant)
            .execute(&self.pool)
            .await
            .map_err(db_error("attach access grant"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn upsert(&self, grant: &AccessGrant) -> Result<(), DomainError> {
        let sql = format!(
            r#"{} ON CONFLICT (event_id, user_id) DO UPDATE SET
                access_type = EXCLUDED.access_type,
                payment_amount = EXCLUDED.payment_amount,
                payment_id = EXCLUDED.payment_id,
                payment_status = EXCLUDED.payment_status,
                access_granted_at = EXCLUDED.access_granted_at,
                access_expires_at = EXCLUDED.access_expires_at,
                is_active = EXCLUDED.is_active,
                updated_at = EXCLUDED.updated_at"#,
            INSERT_GRANT
        );
        bind_grant(sqlx::query(&sql), grant)
            .execute(&self.pool)
            .await
            .map_err(db_error("upsert access grant"))?;

        Ok(())
    }

    async fn update(&self, grant: &AccessGrant) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE event_user SET
                access_type = $3,
                payment_amount = $4,
                payment_id = $5,
                payment_status = $6,
                access_granted_at = $7,
                access_expires_at = $8,
                is_active = $9,
                updated_at = $10
            WHERE event_id = $1 AND user_id = $2
            "#,
        )
        .bind(grant.event_id.as_i64())
        .bind(grant.user_id.as_i64())
        .bind(grant.access_type.as_str())
        .bind(grant.payment_amount.map(|m| m.kopecks()))
        .bind(&grant.payment_id)
        .bind(grant.payment_status.as_str())
        .bind(grant.access_granted_at.as_ref().map(Timestamp::as_datetime))
        .bind(grant.access_expires_at.as_ref().map(Timestamp::as_datetime))
        .bind(grant.is_active)
        .bind(grant.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("update access grant"))?;

        if result.rows_affected() == 0 {
            return Err(missing());
        }
        Ok(())
    }

    async fn delete(&self, event_id: EventId, user_id: UserId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM event_user WHERE event_id = $1 AND user_id = $2")
            .bind(event_id.as_i64())
            .bind(user_id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(db_error("delete access grant"))?;

        if result.rows_affected() == 0 {
            return Err(missing());
        }
        Ok(())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<AccessGrant>, DomainError> {
        let rows: Vec<GrantRow> =
            sqlx::query_as(&format!("{} WHERE user_id = $1 ORDER BY created_at DESC", SELECT_GRANTS))
                .bind(user_id.as_i64())
                .fetch_all(&self.pool)
                .await
                .map_err(db_error("list access grants"))?;

        rows.into_iter().map(AccessGrant::try_from).collect()
    }

    async fn count_active(&self, event_id: EventId) -> Result<i64, DomainError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM event_user WHERE event_id = $1 AND is_active")
                .bind(event_id.as_i64())
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("count access grants"))?;

        Ok(count)
    }
}
