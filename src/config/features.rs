//! Feature flags configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Feature flags for enabling/disabling functionality
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    /// Throttle registration, email-check and login requests per client IP
    #[serde(default = "default_rate_limiting_enabled")]
    pub rate_limiting_enabled: bool,

    /// Requests per minute allowed on each throttled route
    #[serde(default = "default_registration_limit")]
    pub registration_limit_per_minute: u32,
}

impl FeatureFlags {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.rate_limiting_enabled && self.registration_limit_per_minute == 0 {
            return Err(ValidationError::InvalidRateLimit);
        }
        Ok(())
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            rate_limiting_enabled: default_rate_limiting_enabled(),
            registration_limit_per_minute: default_registration_limit(),
        }
    }
}

fn default_rate_limiting_enabled() -> bool {
    true
}

fn default_registration_limit() -> u32 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_flags_defaults() {
        let flags = FeatureFlags::default();
        assert!(flags.rate_limiting_enabled);
        assert_eq!(flags.registration_limit_per_minute, 10);
    }

    #[test]
    fn test_feature_flags_deserialization() {
        let json = r#"{ "rate_limiting_enabled": false }"#;

        let flags: FeatureFlags = serde_json::from_str(json).unwrap();
        assert!(!flags.rate_limiting_enabled);
        assert_eq!(flags.registration_limit_per_minute, 10);
    }

    #[test]
    fn test_zero_limit_rejected_only_when_enabled() {
        let mut flags = FeatureFlags {
            rate_limiting_enabled: true,
            registration_limit_per_minute: 0,
        };
        assert!(flags.validate().is_err());

        flags.rate_limiting_enabled = false;
        assert!(flags.validate().is_ok());
    }
}
