//! Access grants: the link between a user and an event they may attend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    optional_text, AmountInput, EventId, Money, PaymentId, Timestamp, UserId, ValidationError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    Free,
    Paid,
    Promotional,
    Admin,
    Invited,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessType::Free => "free",
            AccessType::Paid => "paid",
            AccessType::Promotional => "promotional",
            AccessType::Admin => "admin",
            AccessType::Invited => "invited",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AccessType::Free => "Бесплатный",
            AccessType::Paid => "Платный",
            AccessType::Promotional => "Промо",
            AccessType::Admin => "Админ",
            AccessType::Invited => "По приглашению",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(AccessType::Free),
            "paid" => Ok(AccessType::Paid),
            "promotional" => Ok(AccessType::Promotional),
            "admin" => Ok(AccessType::Admin),
            "invited" => Ok(AccessType::Invited),
            other => Err(ValidationError::invalid_format(
                "access_type",
                format!("unknown access type '{}'", other),
            )),
        }
    }
}

/// Payment state recorded on a grant (distinct from the payment record itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantPaymentStatus {
    Free,
    Pending,
    Completed,
    Failed,
    Refunded,
    Unpaid,
}

impl GrantPaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantPaymentStatus::Free => "free",
            GrantPaymentStatus::Pending => "pending",
            GrantPaymentStatus::Completed => "completed",
            GrantPaymentStatus::Failed => "failed",
            GrantPaymentStatus::Refunded => "refunded",
            GrantPaymentStatus::Unpaid => "unpaid",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GrantPaymentStatus::Free => "Бесплатно",
            GrantPaymentStatus::Pending => "Ожидает оплаты",
            GrantPaymentStatus::Completed => "Оплачено",
            GrantPaymentStatus::Failed => "Ошибка оплаты",
            GrantPaymentStatus::Refunded => "Возврат",
            GrantPaymentStatus::Unpaid => "unpaid",
        }
    }

    /// Statuses under which a grant lets the user in.
    pub fn permits_access(&self) -> bool {
        matches!(
            self,
            GrantPaymentStatus::Completed | GrantPaymentStatus::Free | GrantPaymentStatus::Unpaid
        )
    }
}

impl fmt::Display for GrantPaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrantPaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(GrantPaymentStatus::Free),
            "pending" => Ok(GrantPaymentStatus::Pending),
            "completed" => Ok(GrantPaymentStatus::Completed),
            "failed" => Ok(GrantPaymentStatus::Failed),
            "refunded" => Ok(GrantPaymentStatus::Refunded),
            "unpaid" => Ok(GrantPaymentStatus::Unpaid),
            other => Err(ValidationError::invalid_format(
                "payment_status",
                format!("unknown payment status '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub event_id: EventId,
    pub user_id: UserId,
    pub access_type: AccessType,
    pub payment_amount: Option<Money>,
    pub payment_id: Option<String>,
    pub payment_status: GrantPaymentStatus,
    pub access_granted_at: Option<Timestamp>,
    pub access_expires_at: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AccessGrant {
    /// Grant issued on free registration.
    pub fn free(event_id: EventId, user_id: UserId, now: Timestamp) -> Self {
        Self {
            event_id,
            user_id,
            access_type: AccessType::Free,
            payment_amount: None,
            payment_id: None,
            payment_status: GrantPaymentStatus::Free,
            access_granted_at: Some(now),
            access_expires_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Grant issued once a payment has completed.
    pub fn paid(
        event_id: EventId,
        user_id: UserId,
        amount: Money,
        payment_id: PaymentId,
        now: Timestamp,
    ) -> Self {
        Self {
            event_id,
            user_id,
            access_type: AccessType::Paid,
            payment_amount: Some(amount),
            payment_id: Some(payment_id.to_string()),
            payment_status: GrantPaymentStatus::Completed,
            access_granted_at: Some(now),
            access_expires_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the grant is active, unexpired and in a permitting payment state.
    pub fn grants_access(&self, now: Timestamp) -> bool {
        self.is_active
            && self.access_expires_at.map_or(true, |exp| exp.is_after(&now))
            && self.payment_status.permits_access()
    }
}

/// Back-office input for creating or editing a grant.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessGrantDraft {
    pub event_id: Option<EventId>,
    pub access_type: String,
    pub payment_amount: Option<AmountInput>,
    pub payment_id: Option<String>,
    pub payment_status: String,
    pub access_granted_at: Option<Timestamp>,
    pub access_expires_at: Option<Timestamp>,
    pub is_active: Option<bool>,
}

/// Validated grant fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrantFields {
    pub access_type: AccessType,
    pub payment_amount: Option<Money>,
    pub payment_id: Option<String>,
    pub payment_status: GrantPaymentStatus,
    pub access_granted_at: Option<Timestamp>,
    pub access_expires_at: Option<Timestamp>,
    pub is_active: bool,
}

impl AccessGrantDraft {
    /// Validates the form. New grants must expire in the future, if at all.
    pub fn validate(&self, now: Timestamp, is_new: bool) -> Result<AccessGrantFields, ValidationError> {
        let access_type: AccessType = self.access_type.trim().parse()?;
        if access_type == AccessType::Invited {
            return Err(ValidationError::invalid_format(
                "access_type",
                "invited grants are created by invitation only",
            ));
        }
        let payment_status: GrantPaymentStatus = self.payment_status.trim().parse()?;
        if payment_status == GrantPaymentStatus::Unpaid {
            return Err(ValidationError::invalid_format(
                "payment_status",
                "unpaid is reserved for imported grants",
            ));
        }
        let payment_amount = match &self.payment_amount {
            Some(input) => input.to_money("payment_amount")?,
            None => None,
        };
        if is_new {
            if let Some(expires) = self.access_expires_at {
                if !expires.is_after(&now) {
                    return Err(ValidationError::invalid_format(
                        "access_expires_at",
                        "must be in the future",
                    ));
                }
            }
        }

        Ok(AccessGrantFields {
            access_type,
            payment_amount,
            payment_id: optional_text("payment_id", self.payment_id.as_deref(), 255)?,
            payment_status,
            access_granted_at: if is_new {
                Some(self.access_granted_at.unwrap_or(now))
            } else {
                self.access_granted_at
            },
            access_expires_at: self.access_expires_at,
            is_active: self.is_active.unwrap_or(true),
        })
    }
}
