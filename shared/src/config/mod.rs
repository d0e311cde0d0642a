//! Configuration module with per-concern sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `cache` - Redis connection used by the record store
//! - `delivery` - SMS and e-mail delivery providers
//! - `environment` - Environment detection and logging configuration
//! - `otp` - Backoff schedule, code width and record retention

pub mod cache;
pub mod delivery;
pub mod environment;
pub mod otp;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use cache::CacheConfig;
pub use delivery::{DeliveryConfig, DeliveryProvider};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use otp::OtpConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// OTP issuance policy
    #[serde(default)]
    pub otp: OtpConfig,

    /// Redis configuration for the record store
    #[serde(default)]
    pub cache: CacheConfig,

    /// Delivery provider selection
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            otp: OtpConfig::default(),
            cache: CacheConfig::default(),
            delivery: DeliveryConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            otp: OtpConfig::default(),
            cache: CacheConfig::default(),
            delivery: DeliveryConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            otp: OtpConfig::default(),
            cache: CacheConfig::new("redis://redis:6379").with_prefix("otpgate"),
            delivery: DeliveryConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Load configuration from environment
    ///
    /// Starts from the per-environment defaults and applies the
    /// `OTP_*`, `REDIS_*`, `SMS_*`/`EMAIL_*` and `LOG_LEVEL` overrides.
    pub fn from_env() -> Result<Self, String> {
        let env = Environment::from_env();
        let mut config = match env {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::development();
                config.environment = Environment::Staging;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        };

        config.otp = config.otp.merge_env()?;
        config.cache = config.cache.merge_env()?;
        config.delivery = config.delivery.merge_env()?;
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Validate every section that carries invariants
    pub fn validate(&self) -> Result<(), String> {
        self.otp.validate()?;
        self.cache.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.cache.key_prefix.as_deref(), Some("otpgate"));
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = AppConfig::development();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.otp.backoff_minutes, config.otp.backoff_minutes);
        assert_eq!(parsed.delivery.sms_provider, config.delivery.sms_provider);
    }

    #[test]
    fn test_sections_default_when_missing() {
        let parsed: AppConfig = serde_json::from_str(r#"{"environment":"staging"}"#).unwrap();
        assert_eq!(parsed.environment, Environment::Staging);
        assert_eq!(parsed.otp.code_length, 6);
    }
}
