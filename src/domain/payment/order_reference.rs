//! Gateway-facing order numbers.

use crate::domain::foundation::PaymentId;

/// `ORD` followed by the payment id zero-padded to six digits.
pub fn order_reference(id: PaymentId) -> String {
    format!("ORD{:06}", id.as_i64())
}

/// Recovers a payment id from `ORD<digits>` or the legacy `payment_<digits>`.
pub fn parse_order_reference(raw: &str) -> Option<PaymentId> {
    let raw = raw.trim();
    let digits = raw
        .strip_prefix("ORD")
        .or_else(|| raw.strip_prefix("payment_"))?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<i64>().ok().filter(|id| *id > 0).map(PaymentId::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pads_to_six_digits() {
        assert_eq!(order_reference(PaymentId::new(42)), "ORD000042");
        assert_eq!(order_reference(PaymentId::new(1234567)), "ORD1234567");
    }

    #[test]
    fn parses_both_formats() {
        assert_eq!(parse_order_reference("ORD000042"), Some(PaymentId::new(42)));
        assert_eq!(parse_order_reference("payment_7"), Some(PaymentId::new(7)));
    }

    #[test]
    fn rejects_other_shapes() {
        for bad in ["", "ORD", "ORD-1", "ord000042", "payment_", "payment_x1", "ORD000000", "42"] {
            assert_eq!(parse_order_reference(bad), None, "{bad}");
        }
    }

    proptest! {
        #[test]
        fn reference_round_trips(id in 1i64..10_000_000_000) {
            let reference = order_reference(PaymentId::new(id));
            prop_assert_eq!(parse_order_reference(&reference), Some(PaymentId::new(id)));
        }
    }
}
