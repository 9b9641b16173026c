//! Money amounts in rubles, stored as integer kopecks.
//!
//! The gateway transmits sums as decimal strings ("1500.00") and its
//! signature covers the two-decimal rendering, so parsing and formatting
//! are exact integer operations with no float round-trips.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Non-negative amount in kopecks (1/100 ruble).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_kopecks(kopecks: i64) -> Self {
        Self(kopecks)
    }

    pub const fn from_rubles(rubles: i64) -> Self {
        Self(rubles * 100)
    }

    pub const fn kopecks(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Absolute difference in kopecks.
    pub fn abs_diff(&self, other: Money) -> u64 {
        self.0.abs_diff(other.0)
    }

    /// Parses a decimal string such as `1500`, `1500.5` or `1500.00`.
    ///
    /// A comma is accepted as the decimal separator. More than two fractional
    /// digits are rejected rather than rounded.
    pub fn from_decimal_str(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("sum"));
        }
        let normalized = trimmed.replace(',', ".");
        let (whole, frac) = match normalized.split_once('.') {
            Some((w, f)) => (w, f),
            None => (normalized.as_str(), ""),
        };

        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::invalid_format("sum", "expected a decimal number"));
        }
        if frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::invalid_format(
                "sum",
                "at most two fractional digits are allowed",
            ));
        }

        let rubles: i64 = whole
            .parse()
            .map_err(|_| ValidationError::invalid_format("sum", "amount is too large"))?;
        let kopecks: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().unwrap_or(0) * 10,
            _ => frac.parse::<i64>().unwrap_or(0),
        };

        rubles
            .checked_mul(100)
            .and_then(|v| v.checked_add(kopecks))
            .map(Self)
            .ok_or_else(|| ValidationError::invalid_format("sum", "amount is too large"))
    }

    /// Two-decimal rendering with a dot separator (`1500.00`).
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }

    /// Whole-ruble rendering with space-separated thousands (`12 500 ₽`).
    ///
    /// Kopecks are rounded half-up, matching how prices are shown on the site.
    pub fn to_display_rubles(&self) -> String {
        let rubles = (self.0 + 50).div_euclid(100);
        format!("{} ₽", group_thousands(rubles))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal_string())
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

/// Amount as submitted by a form: a JSON number or a decimal string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(serde_json::Number),
    Text(String),
}

impl AmountInput {
    /// Parses into kopecks; a blank string means no amount.
    pub fn to_money(&self, field: &str) -> Result<Option<Money>, ValidationError> {
        let raw = match self {
            AmountInput::Number(n) => n.to_string(),
            AmountInput::Text(s) if s.trim().is_empty() => return Ok(None),
            AmountInput::Text(s) => s.clone(),
        };
        Money::from_decimal_str(&raw)
            .map(Some)
            .map_err(|_| ValidationError::invalid_format(field, "must be a non-negative amount"))
    }
}
