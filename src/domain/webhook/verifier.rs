//! PayKeeper notification verification.
//!
//! Checks run in a fixed order: gateway enabled, required fields, caller IP,
//! signature, then payload parsing. The first failing check decides the
//! response.

use md5::{Digest, Md5};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use subtle::ConstantTimeEq;

use super::{has_required_fields, PayKeeperNotification, WebhookError};
use crate::domain::foundation::{Money, ValidationError};

/// One allowlist entry: an exact address or an IPv4 network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowedIp {
    Exact(IpAddr),
    Cidr { network: u32, prefix: u8 },
}

impl AllowedIp {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        let invalid = || ValidationError::invalid_format("allowed_ips", format!("'{}' is not an IP or IPv4 CIDR", raw));
        match raw.split_once('/') {
            Some((addr, bits)) => {
                let addr: Ipv4Addr = addr.trim().parse().map_err(|_| invalid())?;
                let prefix: u8 = bits.trim().parse().map_err(|_| invalid())?;
                if prefix > 32 {
                    return Err(invalid());
                }
                Ok(AllowedIp::Cidr {
                    network: u32::from(addr) & mask(prefix),
                    prefix,
                })
            }
            None => raw.parse().map(AllowedIp::Exact).map_err(|_| invalid()),
        }
    }

    pub fn matches(&self, ip: IpAddr) -> bool {
        match (self, ip) {
            (AllowedIp::Exact(allowed), ip) => *allowed == ip,
            (AllowedIp::Cidr { network, prefix }, IpAddr::V4(v4)) => {
                u32::from(v4) & mask(*prefix) == *network
            }
            (AllowedIp::Cidr { .. }, IpAddr::V6(v6)) => v6
                .to_ipv4_mapped()
                .map_or(false, |v4| self.matches(IpAddr::V4(v4))),
        }
    }
}

fn mask(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    }
}

/// Caller allowlist. Empty means every address is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpAllowlist(Vec<AllowedIp>);

impl IpAllowlist {
    pub fn new(entries: Vec<AllowedIp>) -> Self {
        Self(entries)
    }

    /// Parses a list of entries, failing on the first invalid one.
    pub fn parse<'a>(entries: impl IntoIterator<Item = &'a str>) -> Result<Self, ValidationError> {
        entries
            .into_iter()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(AllowedIp::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn permits(&self, ip: Option<IpAddr>) -> bool {
        if self.0.is_empty() {
            return true;
        }
        ip.map_or(false, |ip| self.0.iter().any(|entry| entry.matches(ip)))
    }
}

/// `md5(id + sum + clientid + orderid + secret)` over the fields as submitted.
/// Only the sum is normalised, to two decimals.
pub fn notification_signature(
    id: &str,
    sum: &str,
    clientid: &str,
    orderid: &str,
    secret: &str,
) -> String {
    let mut hasher = Md5::new();
    hasher.update(id.as_bytes());
    hasher.update(signed_sum(sum).as_bytes());
    hasher.update(clientid.as_bytes());
    hasher.update(orderid.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Sum as the gateway signs it: `1500.5` becomes `1500.50`. Text that is not
/// a number is hashed unchanged.
fn signed_sum(raw: &str) -> String {
    if let Ok(money) = Money::from_decimal_str(raw) {
        return money.to_decimal_string();
    }
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => format!("{:.2}", value),
        _ => raw.to_string(),
    }
}

fn raw_field<'a>(form: &'a HashMap<String, String>, name: &str) -> &'a str {
    form.get(name).map(String::as_str).unwrap_or_default()
}

/// Body returned to the gateway after a notification was handled.
pub fn acknowledgement(invoice_id: &str, secret: &str) -> String {
    if secret.is_empty() {
        return "OK".to_string();
    }
    let mut hasher = Md5::new();
    hasher.update(invoice_id.as_bytes());
    hasher.update(secret.as_bytes());
    format!("OK {}", hex::encode(hasher.finalize()))
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Verifies incoming notifications against the gateway settings.
#[derive(Debug, Clone)]
pub struct WebhookVerifier {
    enabled: bool,
    secret: String,
    allowlist: IpAllowlist,
}

impl WebhookVerifier {
    pub fn new(enabled: bool, secret: impl Into<String>, allowlist: IpAllowlist) -> Self {
        Self {
            enabled,
            secret: secret.into(),
            allowlist,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn verify(
        &self,
        form: &HashMap<String, String>,
        client_ip: Option<IpAddr>,
    ) -> Result<PayKeeperNotification, WebhookError> {
        if !self.enabled {
            return Err(WebhookError::Disabled);
        }
        if !has_required_fields(form) {
            return Err(WebhookError::MissingFields);
        }
        if !self.allowlist.permits(client_ip) {
            return Err(WebhookError::InvalidIp);
        }

        if !self.secret.is_empty() {
            let expected = notification_signature(
                raw_field(form, "id"),
                raw_field(form, "sum"),
                raw_field(form, "clientid"),
                raw_field(form, "orderid"),
                &self.secret,
            );
            let provided = raw_field(form, "key").trim().to_ascii_lowercase();
            if !constant_time_compare(expected.as_bytes(), provided.as_bytes()) {
                return Err(WebhookError::InvalidSignature);
            }
        }
        PayKeeperNotification::parse(form)
    }
}
