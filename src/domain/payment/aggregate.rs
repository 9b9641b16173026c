//! Payment aggregate.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::{order_reference, PaymentError, PaymentStatus, PaymentSystem};
use crate::domain::foundation::{EventId, Money, PaymentId, StateMachine, Timestamp, UserId};

pub const DEFAULT_CURRENCY: &str = "RUB";

/// Metadata keys written at creation and read back when granting access.
pub mod metadata_keys {
    pub const EVENT_TITLE: &str = "event_title";
    pub const EVENT_SLUG: &str = "event_slug";
    pub const USER_EMAIL: &str = "user_email";
    pub const USER_NAME: &str = "user_name";
    pub const RETURN_URL: &str = "return_url";
    pub const GENERATED_PASSWORD: &str = "generated_password";
    pub const IS_NEW_USER: &str = "is_new_user";
    pub const USER_DATA: &str = "user_data";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub user_id: UserId,
    pub event_id: EventId,
    pub amount: Money,
    pub currency: String,
    pub status: PaymentStatus,
    pub payment_system: PaymentSystem,
    pub external_id: Option<String>,
    pub order_id: Option<String>,
    pub description: Option<String>,
    pub metadata: Map<String, Value>,
    pub callback_data: Option<Value>,
    pub refund_amount: Option<Money>,
    pub paid_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub refunded_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A payment about to be inserted; the id comes from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub user_id: UserId,
    pub event_id: EventId,
    pub amount: Money,
    pub currency: String,
    pub payment_system: PaymentSystem,
    pub description: String,
    pub metadata: Map<String, Value>,
}

impl Payment {
    pub fn is_pending(&self) -> bool {
        self.status == PaymentStatus::Pending
    }

    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }

    /// Only test-system payments may be settled without the gateway.
    pub fn is_test_system(&self) -> bool {
        self.payment_system == PaymentSystem::Test
    }

    pub fn order_reference(&self) -> String {
        order_reference(self.id)
    }

    /// `sha256(id + created_at + app_key)` as lowercase hex.
    pub fn secure_token(&self, app_key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.id.to_string().as_bytes());
        hasher.update(self.created_at.to_compact_string().as_bytes());
        hasher.update(app_key.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn verify_secure_token(&self, token: &str, app_key: &str) -> bool {
        let expected = self.secure_token(app_key);
        let token = token.trim().as_bytes();
        if token.len() != expected.len() {
            return false;
        }
        expected.as_bytes().ct_eq(token).into()
    }

    /// Moves to `target` if the lifecycle allows it and stamps the matching time.
    /// Re-applying the current status is a no-op.
    pub fn apply_status(&mut self, target: PaymentStatus, now: Timestamp) -> Result<(), PaymentError> {
        if self.status == target {
            return Ok(());
        }
        self.status = self
            .status
            .transition_to(target)
            .map_err(|_| PaymentError::InvalidTransition {
                from: self.status,
                to: target,
            })?;
        match target {
            PaymentStatus::Completed => self.paid_at = Some(now),
            PaymentStatus::Cancelled => self.cancelled_at = Some(now),
            PaymentStatus::Refunded => self.refunded_at = Some(now),
            _ => {}
        }
        self.updated_at = now;
        Ok(())
    }

    /// Only pending payments may be cancelled.
    pub fn cancel(&mut self, now: Timestamp) -> Result<(), PaymentError> {
        if !self.is_pending() {
            return Err(PaymentError::NotCancellable(self.status));
        }
        self.apply_status(PaymentStatus::Cancelled, now)
    }

    /// Records a gateway-confirmed payment.
    ///
    /// The gateway only notifies about money actually received, so this
    /// completes the payment from any non-refunded state. Returns the previous
    /// amount when the received sum differs by more than one kopeck.
    pub fn confirm_by_gateway(
        &mut self,
        invoice_id: &str,
        received: Money,
        callback_data: Value,
        now: Timestamp,
    ) -> Result<Option<Money>, PaymentError> {
        if self.status == PaymentStatus::Refunded {
            return Err(PaymentError::InvalidTransition {
                from: self.status,
                to: PaymentStatus::Completed,
            });
        }
        self.status = PaymentStatus::Completed;
        self.paid_at = Some(now);
        self.callback_data = Some(callback_data);
        self.external_id = Some(invoice_id.to_string());
        self.updated_at = now;

        if received.is_positive() && self.amount.abs_diff(received) > 1 {
            let previous = self.amount;
            self.amount = received;
            return Ok(Some(previous));
        }
        Ok(None)
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn generated_password(&self) -> Option<&str> {
        self.metadata_str(metadata_keys::GENERATED_PASSWORD)
    }

    pub fn is_new_user(&self) -> bool {
        self.metadata
            .get(metadata_keys::IS_NEW_USER)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

#[cfg(test)]
pub(crate) fn sample_payment(id: i64, status: PaymentStatus) -> Payment {
    use chrono::{TimeZone, Utc};

    let created = Timestamp::from_datetime(Utc.with_ymd_and_hms(2025, 8, 5, 14, 35, 52).unwrap());
    Payment {
        id: PaymentId::new(id),
        user_id: UserId::new(7),
        event_id: EventId::new(3),
        amount: Money::from_rubles(1500),
        currency: DEFAULT_CURRENCY.to_string(),
        status,
        payment_system: PaymentSystem::Paykeeper,
        external_id: None,
        order_id: Some(order_reference(PaymentId::new(id))),
        description: Some("Оплата участия в мероприятии: Event".to_string()),
        metadata: Map::new(),
        callback_data: None,
        refund_amount: None,
        paid_at: None,
        cancelled_at: None,
        refunded_at: None,
        created_at: created,
        updated_at: created,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn secure_token_is_deterministic_sha256_hex() {
        let payment = sample_payment(42, PaymentStatus::Pending);
        let token = payment.secure_token("base64:key");
        assert_eq!(token.len(), 64);
        assert_eq!(token, payment.secure_token("base64:key"));
        assert_ne!(token, payment.secure_token("other"));

        let mut hasher = Sha256::new();
        hasher.update(b"422025-08-05 14:35:52base64:key");
        assert_eq!(token, hex::encode(hasher.finalize()));
    }

    #[test]
    fn verify_secure_token_rejects_tampering() {
        let payment = sample_payment(42, PaymentStatus::Pending);
        let token = payment.secure_token("k");
        assert!(payment.verify_secure_token(&token, "k"));
        assert!(!payment.verify_secure_token(&token[..63], "k"));
        let mut flipped = token.clone();
        let last = if flipped.ends_with('0') { "1" } else { "0" };
        flipped.replace_range(63.., last);
        assert!(!payment.verify_secure_token(&flipped, "k"));
        assert!(!payment.verify_secure_token("", "k"));
    }

    #[test]
    fn completing_sets_paid_at() {
        let mut payment = sample_payment(1, PaymentStatus::Pending);
        let now = Timestamp::now();
        payment.apply_status(PaymentStatus::Completed, now).unwrap();
        assert_eq!(payment.paid_at, Some(now));
    }

    #[test]
    fn invalid_transition_is_rejected() {
        let mut payment = sample_payment(1, PaymentStatus::Cancelled);
        assert!(matches!(
            payment.apply_status(PaymentStatus::Completed, Timestamp::now()),
            Err(PaymentError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn same_status_is_noop() {
        let mut payment = sample_payment(1, PaymentStatus::Completed);
        assert!(payment
            .apply_status(PaymentStatus::Completed, Timestamp::now())
            .is_ok());
        assert_eq!(payment.paid_at, None);
    }

    #[test]
    fn cancel_only_from_pending() {
        let mut payment = sample_payment(1, PaymentStatus::Pending);
        payment.cancel(Timestamp::now()).unwrap();
        assert_eq!(payment.status, PaymentStatus::Cancelled);
        assert!(payment.cancelled_at.is_some());

        let mut done = sample_payment(2, PaymentStatus::Completed);
        assert!(matches!(
            done.cancel(Timestamp::now()),
            Err(PaymentError::NotCancellable(PaymentStatus::Completed))
        ));
    }

    #[test]
    fn gateway_confirmation_keeps_amount_within_a_kopeck() {
        let mut payment = sample_payment(1, PaymentStatus::Pending);
        let changed = payment
            .confirm_by_gateway("inv-1", Money::from_kopecks(150_001), json!({}), Timestamp::now())
            .unwrap();
        assert_eq!(changed, None);
        assert_eq!(payment.amount, Money::from_rubles(1500));
        assert_eq!(payment.external_id.as_deref(), Some("inv-1"));
        assert!(payment.is_completed());
    }

    #[test]
    fn gateway_confirmation_stores_different_amount() {
        let mut payment = sample_payment(1, PaymentStatus::Expired);
        let changed = payment
            .confirm_by_gateway("inv-1", Money::from_rubles(1200), json!({"id": "inv-1"}), Timestamp::now())
            .unwrap();
        assert_eq!(changed, Some(Money::from_rubles(1500)));
        assert_eq!(payment.amount, Money::from_rubles(1200));
        assert_eq!(payment.callback_data, Some(json!({"id": "inv-1"})));
    }

    #[test]
    fn only_test_system_settles_without_gateway() {
        let mut payment = sample_payment(1, PaymentStatus::Pending);
        assert!(!payment.is_test_system());
        payment.payment_system = PaymentSystem::Test;
        assert!(payment.is_test_system());
    }

    #[test]
    fn metadata_accessors() {
        let mut payment = sample_payment(1, PaymentStatus::Pending);
        payment.metadata.insert("generated_password".into(), json!("Secret123abc"));
        payment.metadata.insert("is_new_user".into(), json!(true));
        assert_eq!(payment.generated_password(), Some("Secret123abc"));
        assert!(payment.is_new_user());
    }
}
