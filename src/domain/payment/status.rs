//! Payment lifecycle status and payment systems.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
    Refunded,
    Expired,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Expired => "expired",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Ожидает оплаты",
            PaymentStatus::Processing => "В процессе",
            PaymentStatus::Completed => "Оплачен",
            PaymentStatus::Failed => "Ошибка оплаты",
            PaymentStatus::Cancelled => "Отменен",
            PaymentStatus::Refunded => "Возврат",
            PaymentStatus::Expired => "Истек",
        }
    }

    /// Maps a gateway invoice status. Unknown statuses stay pending.
    pub fn from_invoice_status(status: &str) -> Self {
        match status.trim() {
            "created" | "sent" => PaymentStatus::Pending,
            "paid" => PaymentStatus::Completed,
            "expired" => PaymentStatus::Expired,
            _ => PaymentStatus::Pending,
        }
    }
}

impl StateMachine for PaymentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PaymentStatus::*;
        match self {
            Pending => vec![Processing, Completed, Failed, Cancelled, Expired],
            Processing => vec![Completed, Failed, Cancelled],
            Completed => vec![Refunded],
            Failed => vec![Pending],
            Expired => vec![Pending],
            Cancelled | Refunded => vec![],
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(PaymentStatus::Pending),
            "processing" => Ok(PaymentStatus::Processing),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            "cancelled" => Ok(PaymentStatus::Cancelled),
            "refunded" => Ok(PaymentStatus::Refunded),
            "expired" => Ok(PaymentStatus::Expired),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown payment status '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentSystem {
    Test,
    Yookassa,
    Stripe,
    Robokassa,
    Sberbank,
    Paykeeper,
}

impl PaymentSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentSystem::Test => "test",
            PaymentSystem::Yookassa => "yookassa",
            PaymentSystem::Stripe => "stripe",
            PaymentSystem::Robokassa => "robokassa",
            PaymentSystem::Sberbank => "sberbank",
            PaymentSystem::Paykeeper => "paykeeper",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentSystem::Test => "Тестовая система",
            PaymentSystem::Yookassa => "ЮKassa",
            PaymentSystem::Stripe => "Stripe",
            PaymentSystem::Robokassa => "Robokassa",
            PaymentSystem::Sberbank => "Сбербанк",
            PaymentSystem::Paykeeper => "PayKeeper",
        }
    }
}

impl fmt::Display for PaymentSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentSystem {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "test" => Ok(PaymentSystem::Test),
            "yookassa" => Ok(PaymentSystem::Yookassa),
            "stripe" => Ok(PaymentSystem::Stripe),
            "robokassa" => Ok(PaymentSystem::Robokassa),
            "sberbank" => Ok(PaymentSystem::Sberbank),
            "paykeeper" => Ok(PaymentSystem::Paykeeper),
            other => Err(ValidationError::invalid_format(
                "payment_system",
                format!("unknown payment system '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_complete_or_expire() {
        assert!(PaymentStatus::Pending.can_transition_to(&PaymentStatus::Completed));
        assert!(PaymentStatus::Pending.can_transition_to(&PaymentStatus::Expired));
    }

    #[test]
    fn completed_only_refunds() {
        assert_eq!(
            PaymentStatus::Completed.valid_transitions(),
            vec![PaymentStatus::Refunded]
        );
        assert!(PaymentStatus::Completed
            .transition_to(PaymentStatus::Pending)
            .is_err());
    }

    #[test]
    fn cancelled_and_refunded_are_terminal() {
        assert!(PaymentStatus::Cancelled.is_terminal());
        assert!(PaymentStatus::Refunded.is_terminal());
        assert!(!PaymentStatus::Expired.is_terminal());
    }

    #[test]
    fn invoice_statuses_normalize() {
        assert_eq!(PaymentStatus::from_invoice_status("created"), PaymentStatus::Pending);
        assert_eq!(PaymentStatus::from_invoice_status("sent"), PaymentStatus::Pending);
        assert_eq!(PaymentStatus::from_invoice_status("paid"), PaymentStatus::Completed);
        assert_eq!(PaymentStatus::from_invoice_status("expired"), PaymentStatus::Expired);
        assert_eq!(PaymentStatus::from_invoice_status("weird"), PaymentStatus::Pending);
    }

    #[test]
    fn statuses_round_trip_through_strings() {
        for s in ["pending", "processing", "completed", "failed", "cancelled", "refunded", "expired"] {
            assert_eq!(s.parse::<PaymentStatus>().unwrap().as_str(), s);
        }
        assert!("paid".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn system_labels() {
        assert_eq!(PaymentSystem::Test.label(), "Тестовая система");
        assert_eq!("paykeeper".parse::<PaymentSystem>().unwrap(), PaymentSystem::Paykeeper);
    }
}
