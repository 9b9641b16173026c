//! PostgreSQL implementation of NotificationRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use super::support::{db_error, parse_column, to_u64};
use crate::domain::foundation::{
    DomainError, ErrorCode, NotificationId, Page, PageRequest, Timestamp, UserId,
};
use crate::domain::notification::{NewNotification, Notification};
use crate::ports::NotificationRepository;

const SELECT_NOTIFICATIONS: &str = r#"
    SELECT id, user_id, type AS kind, title, message, data, url, read, read_at, created_at
    FROM notifications
"#;

pub struct PostgresNotificationRepository {
    pool: PgPool,
}

impl PostgresNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: i64,
    user_id: i64,
    kind: String,
    title: String,
    message: String,
    data: Option<Value>,
    url: Option<String>,
    read: bool,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = DomainError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: NotificationId::new(row.id),
            user_id: UserId::new(row.user_id),
            kind: parse_column("type", &row.kind)?,
            title: row.title,
            message: row.message,
            data: row.data,
            url: row.url,
            read: row.read,
            read_at: row.read_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn missing(id: NotificationId) -> DomainError {
    DomainError::new(ErrorCode::NotFound, format!("Notification {} not found", id))
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn list(&self, user_id: UserId, page: PageRequest) -> Result<Page<Notification>, DomainError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
            .bind(user_id.as_i64())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("count notifications"))?;

        let rows: Vec<NotificationRow> = sqlx::query_as(&format!(
            "{} WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
            SELECT_NOTIFICATIONS
        ))
        .bind(user_id.as_i64())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list notifications"))?;

        let items = rows
            .into_iter()
            .map(Notification::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, to_u64(total), page))
    }

    async fn find(&self, id: NotificationId, user_id: UserId) -> Result<Option<Notification>, DomainError> {
        let row: Option<NotificationRow> = sqlx::query_as(&format!(
            "{} WHERE id = $1 AND user_id = $2",
            SELECT_NOTIFICATIONS
        ))
        .bind(id.as_i64())
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find notification"))?;

        row.map(Notification::try_from).transpose()
    }

    async fn create(&self, notification: &NewNotification) -> Result<Notification, DomainError> {
        let row: NotificationRow = sqlx::query_as(
            r#"
            INSERT INTO notifications (user_id, type, title, message, data, url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, type AS kind, title, message, data, url, read, read_at, created_at
            "#,
        )
        .bind(notification.user_id.as_i64())
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.data)
        .bind(&notification.url)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("insert notification"))?;

        Notification::try_from(row)
    }

    async fn save(&self, notification: &Notification) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE notifications SET read = $3, read_at = $4 WHERE id = $1 AND user_id = $2",
        )
        .bind(notification.id.as_i64())
        .bind(notification.user_id.as_i64())
        .bind(notification.read)
        .bind(notification.read_at.as_ref().map(Timestamp::as_datetime))
        .execute(&self.pool)
        .await
        .map_err(db_error("update notification"))?;

        if result.rows_affected() == 0 {
            return Err(missing(notification.id));
        }
        Ok(())
    }

    async fn mark_all_read(&self, user_id: UserId, now: Timestamp) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE, read_at = $2 WHERE user_id = $1 AND NOT read",
        )
        .bind(user_id.as_i64())
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("mark notifications read"))?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: NotificationId, user_id: UserId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id.as_i64())
            .bind(user_id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(db_error("delete notification"))?;

        if result.rows_affected() == 0 {
            return Err(missing(id));
        }
        Ok(())
    }

    async fn clear(&self, user_id: UserId) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM notifications WHERE user_id = $1")
            .bind(user_id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(db_error("clear notifications"))?;

        Ok(result.rows_affected())
    }
}
