//! PostgreSQL implementation of RegistrationListing: `event_user` joined
//! with `users` and `events`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;

use super::support::{db_error, like_pattern, parse_column, to_u64};
use crate::domain::access::{
    join_full_name, AccessGrant, RegisteredEvent, RegisteredUser, Registration,
    RegistrationCriteria, RegistrationSort,
};
use crate::domain::foundation::{DomainError, EventId, Money, Page, Timestamp, UserId};
use crate::ports::RegistrationListing;

const SELECT_REGISTRATIONS: &str = r#"
    SELECT eu.event_id, eu.user_id, eu.access_type, eu.payment_amount, eu.payment_id,
           eu.payment_status, eu.access_granted_at, eu.access_expires_at, eu.is_active,
           eu.created_at, eu.updated_at,
           u.first_name, u.last_name, u.middle_name, u.email, u.company, u.position,
           u.city, u.avatar,
           e.title AS event_title, e.slug AS event_slug,
           e.start_date AS event_start_date, e.start_time AS event_start_time
    FROM event_user eu
    JOIN users u ON u.id = eu.user_id
    JOIN events e ON e.id = eu.event_id
"#;

const FILTER: &str = r#"
    WHERE ($1::bigint IS NULL OR eu.event_id = $1)
      AND ($2::text IS NULL
           OR u.first_name ILIKE $2 OR u.last_name ILIKE $2
           OR u.middle_name ILIKE $2 OR u.email ILIKE $2)
"#;

pub struct PostgresRegistrationListing {
    pool: PgPool,
}

impl PostgresRegistrationListing {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RegistrationRow {
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
    first_name: String,
    last_name: String,
    middle_name: Option<String>,
    email: String,
    company: Option<String>,
    position: Option<String>,
    city: Option<String>,
    avatar: Option<String>,
    event_title: String,
    event_slug: String,
    event_start_date: Option<NaiveDate>,
    event_start_time: Option<NaiveTime>,
}

impl TryFrom<RegistrationRow> for Registration {
    type Error = DomainError;

    fn try_from(row: RegistrationRow) -> Result<Self, Self::Error> {
        Ok(Registration {
            user: RegisteredUser {
                id: UserId::new(row.user_id),
                full_name: join_full_name(&row.last_name, &row.first_name, row.middle_name.as_deref()),
                email: row.email,
                company: row.company,
                position: row.position,
                city: row.city,
                avatar: row.avatar,
            },
            event: RegisteredEvent {
                id: EventId::new(row.event_id),
                title: row.event_title,
                slug: row.event_slug,
                start_date: row.event_start_date,
                start_time: row.event_start_time,
            },
            grant: AccessGrant {
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
            },
        })
    }
}

/// ORDER BY body; identifiers come only from the whitelist.
fn order_clause(criteria: &RegistrationCriteria) -> String {
    let dir = criteria.direction.as_sql();
    match criteria.sort {
        RegistrationSort::GrantedAt => format!("eu.access_granted_at {dir}"),
        RegistrationSort::User => format!("u.last_name {dir}, u.first_name {dir}"),
        RegistrationSort::Email => format!("u.email {dir}"),
        RegistrationSort::EventStart => format!("e.start_date {dir}, e.start_time {dir}"),
        RegistrationSort::PaymentStatus => format!("eu.payment_status {dir}"),
    }
}

#[async_trait]
impl RegistrationListing for PostgresRegistrationListing {
    async fn list(&self, criteria: &RegistrationCriteria) -> Result<Page<Registration>, DomainError> {
        let event_id = criteria.event_id.map(|id| id.as_i64());
        let pattern = like_pattern(criteria.search.as_deref());

        let (total,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM event_user eu \
             JOIN users u ON u.id = eu.user_id JOIN events e ON e.id = eu.event_id {}",
            FILTER
        ))
        .bind(event_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("count registrations"))?;

        let rows: Vec<RegistrationRow> = sqlx::query_as(&format!(
            "{} {} ORDER BY {}, eu.event_id, eu.user_id LIMIT $3 OFFSET $4",
            SELECT_REGISTRATIONS,
            FILTER,
            order_clause(criteria)
        ))
        .bind(event_id)
        .bind(&pattern)
        .bind(criteria.page.limit())
        .bind(criteria.page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list registrations"))?;

        let items = rows
            .into_iter()
            .map(Registration::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, to_u64(total), criteria.page))
    }
}
