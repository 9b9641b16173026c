//! PostgreSQL implementation of PaymentRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::PgPool;

use super::support::{db_error, parse_column};
use crate::domain::foundation::{DomainError, ErrorCode, EventId, Money, PaymentId, Timestamp, UserId};
use crate::domain::payment::{NewPayment, Payment, PaymentStatus, PaymentSystem};
use crate::ports::PaymentRepository;

const SELECT_PAYMENTS: &str = r#"
    SELECT id, user_id, event_id, amount, currency, status, payment_system, external_id,
           order_id, description, metadata, callback_data, refund_amount, paid_at,
           cancelled_at, refunded_at, created_at, updated_at
    FROM payments
"#;

pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: i64,
    user_id: i64,
    event_id: i64,
    amount: i64,
    currency: String,
    status: String,
    payment_system: String,
    external_id: Option<String>,
    order_id: Option<String>,
    description: Option<String>,
    metadata: Value,
    callback_data: Option<Value>,
    refund_amount: Option<i64>,
    paid_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    refunded_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let metadata = match row.metadata {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Payment {} metadata is not an object: {}", row.id, other),
                ))
            }
        };

        Ok(Payment {
            id: PaymentId::new(row.id),
            user_id: UserId::new(row.user_id),
            event_id: EventId::new(row.event_id),
            amount: Money::from_kopecks(row.amount),
            currency: row.currency,
            status: parse_column::<PaymentStatus>("status", &row.status)?,
            payment_system: parse_column::<PaymentSystem>("payment_system", &row.payment_system)?,
            external_id: row.external_id,
            order_id: row.order_id,
            description: row.description,
            metadata,
            callback_data: row.callback_data,
            refund_amount: row.refund_amount.map(Money::from_kopecks),
            paid_at: row.paid_at.map(Timestamp::from_datetime),
            cancelled_at: row.cancelled_at.map(Timestamp::from_datetime),
            refunded_at: row.refunded_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn create(&self, payment: &NewPayment) -> Result<Payment, DomainError> {
        let row: PaymentRow = sqlx::query_as(
            r#"
            INSERT INTO payments (
                user_id, event_id, amount, currency, status, payment_system, description, metadata
            ) VALUES ($1, $2, $3, $4, 'pending', $5, $6, $7)
            RETURNING id, user_id, event_id, amount, currency, status, payment_system, external_id,
                      order_id, description, metadata, callback_data, refund_amount, paid_at,
                      cancelled_at, refunded_at, created_at, updated_at
            "#,
        )
        .bind(payment.user_id.as_i64())
        .bind(payment.event_id.as_i64())
        .bind(payment.amount.kopecks())
        .bind(&payment.currency)
        .bind(payment.payment_system.as_str())
        .bind(&payment.description)
        .bind(Value::Object(payment.metadata.clone()))
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("insert payment"))?;

        Payment::try_from(row)
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_PAYMENTS))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find payment"))?;

        row.map(Payment::try_from).transpose()
    }

    async fn find_by_order_id(
        &self,
        order_id: &str,
        system: PaymentSystem,
    ) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "{} WHERE order_id = $1 AND payment_system = $2 ORDER BY id DESC LIMIT 1",
            SELECT_PAYMENTS
        ))
        .bind(order_id)
        .bind(system.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find payment by order id"))?;

        row.map(Payment::try_from).transpose()
    }

    async fn update(&self, payment: &Payment) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payments SET
                amount = $2,
                status = $3,
                external_id = $4,
                order_id = $5,
                description = $6,
                metadata = $7,
                callback_data = $8,
                refund_amount = $9,
                paid_at = $10,
                cancelled_at = $11,
                refunded_at = $12,
                updated_at = $13
            WHERE id = $1
            "#,
        )
        .bind(payment.id.as_i64())
        .bind(payment.amount.kopecks())
        .bind(payment.status.as_str())
        .bind(&payment.external_id)
        .bind(&payment.order_id)
        .bind(&payment.description)
        .bind(Value::Object(payment.metadata.clone()))
        .bind(&payment.callback_data)
        .bind(payment.refund_amount.map(|m| m.kopecks()))
        .bind(payment.paid_at.as_ref().map(Timestamp::as_datetime))
        .bind(payment.cancelled_at.as_ref().map(Timestamp::as_datetime))
        .bind(payment.refunded_at.as_ref().map(Timestamp::as_datetime))
        .bind(payment.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("update payment"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::PaymentNotFound,
                format!("Payment {} not found", payment.id),
            ));
        }
        Ok(())
    }
}
