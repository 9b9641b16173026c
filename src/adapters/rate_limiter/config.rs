//! Budgets for the throttled forms.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::FeatureFlags;
use crate::ports::{RateLimitKey, ThrottledForm};

const SERVICE_CEILING_PER_MINUTE: u32 = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests per window across the whole service.
    pub global_limit: u32,
    /// Requests per window for one IP on a form without an override.
    pub per_ip_limit: u32,
    pub form_limits: HashMap<ThrottledForm, u32>,
    pub window_secs: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_minute(10)
    }
}

impl RateLimitConfig {
    /// Same per-minute budget for every form.
    pub fn per_minute(requests: u32) -> Self {
        Self {
            global_limit: SERVICE_CEILING_PER_MINUTE,
            per_ip_limit: requests,
            form_limits: HashMap::new(),
            window_secs: 60,
        }
    }

    pub fn with_form_limit(mut self, form: ThrottledForm, requests: u32) -> Self {
        self.form_limits.insert(form, requests);
        self
    }

    pub fn from_features(features: &FeatureFlags) -> Self {
        Self::per_minute(features.registration_limit_per_minute)
    }

    pub fn limit_for(&self, key: &RateLimitKey) -> u32 {
        match key {
            RateLimitKey::Global => self.global_limit,
            RateLimitKey::Form { form, .. } => self
                .form_limits
                .get(form)
                .copied()
                .unwrap_or(self.per_ip_limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_limits_every_form_to_ten() {
        let config = RateLimitConfig::default();
        for form in ThrottledForm::ALL {
            assert_eq!(config.limit_for(&RateLimitKey::form("10.0.0.1", form)), 10);
        }
        assert_eq!(config.window_secs, 60);
    }

    #[test]
    fn global_key_uses_service_ceiling() {
        let config = RateLimitConfig::default();
        assert_eq!(config.limit_for(&RateLimitKey::Global), SERVICE_CEILING_PER_MINUTE);
    }

    #[test]
    fn form_override_beats_per_ip_default() {
        let config = RateLimitConfig::per_minute(3).with_form_limit(ThrottledForm::Login, 5);
        assert_eq!(config.limit_for(&RateLimitKey::form("ip", ThrottledForm::Login)), 5);
        assert_eq!(config.limit_for(&RateLimitKey::form("ip", ThrottledForm::Register)), 3);
    }

    #[test]
    fn features_drive_the_budget() {
        let features = FeatureFlags {
            registration_limit_per_minute: 25,
            ..Default::default()
        };
        let config = RateLimitConfig::from_features(&features);
        let key = RateLimitKey::form("10.0.0.1", ThrottledForm::Register);
        assert_eq!(config.limit_for(&key), 25);
    }
}
