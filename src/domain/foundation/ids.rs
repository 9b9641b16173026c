//! Strongly-typed identifier value objects.
//!
//! Every table uses a `BIGSERIAL` key, so identifiers wrap an `i64`. The
//! numeric form matters for payments: the gateway order reference is derived
//! from the payment id.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw database key.
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw database key.
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// Identifier of an event (webinar, conference, course).
    EventId
);
numeric_id!(
    /// Identifier of a registered user.
    UserId
);
numeric_id!(
    /// Identifier of a payment record.
    PaymentId
);
numeric_id!(
    /// Identifier of an event category.
    CategoryId
);
numeric_id!(
    /// Identifier of a speaker.
    SpeakerId
);
numeric_id!(
    /// Identifier of a partner.
    PartnerId
);
numeric_id!(
    /// Identifier of a medical library document.
    DocumentId
);
numeric_id!(
    /// Identifier of an in-app notification.
    NotificationId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_displays_raw_value() {
        assert_eq!(EventId::new(42).to_string(), "42");
    }

    #[test]
    fn id_parses_from_trimmed_string() {
        let id: PaymentId = " 17 ".parse().unwrap();
        assert_eq!(id.as_i64(), 17);
    }

    #[test]
    fn id_rejects_non_numeric_string() {
        assert!("abc".parse::<UserId>().is_err());
    }

    #[test]
    fn id_serializes_transparently() {
        let json = serde_json::to_string(&SpeakerId::new(5)).unwrap();
        assert_eq!(json, "5");

        let back: SpeakerId = serde_json::from_str("5").unwrap();
        assert_eq!(back, SpeakerId::new(5));
    }

    #[test]
    fn ids_order_by_value() {
        assert!(CategoryId::new(1) < CategoryId::new(2));
    }
}
