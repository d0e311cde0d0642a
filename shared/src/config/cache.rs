//! Redis configuration module

use serde::{Deserialize, Serialize};

/// Redis connection configuration for the OTP record store
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,

    /// Maximum attempts for a single Redis operation on transient errors
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries in milliseconds (doubled per retry)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Enable cache key prefix
    #[serde(default)]
    pub key_prefix: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            key_prefix: None,
        }
    }
}

impl CacheConfig {
    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix for all cache keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Generate a cache key with prefix
    pub fn make_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }

    /// Apply `REDIS_URL`, `REDIS_MAX_RETRIES`, `REDIS_RETRY_DELAY_MS` and
    /// `REDIS_KEY_PREFIX` overrides
    pub fn merge_env(mut self) -> Result<Self, String> {
        if let Ok(url) = std::env::var("REDIS_URL") {
            self.url = url;
        }
        if let Ok(value) = std::env::var("REDIS_MAX_RETRIES") {
            self.max_retries = value
                .trim()
                .parse()
                .map_err(|_| format!("REDIS_MAX_RETRIES is not a number: {}", value))?;
        }
        if let Ok(value) = std::env::var("REDIS_RETRY_DELAY_MS") {
            self.retry_delay_ms = value
                .trim()
                .parse()
                .map_err(|_| format!("REDIS_RETRY_DELAY_MS is not a number: {}", value))?;
        }
        if let Ok(prefix) = std::env::var("REDIS_KEY_PREFIX") {
            self.key_prefix = Some(prefix).filter(|p| !p.is_empty());
        }
        Ok(self)
    }

    /// Check the connection settings
    pub fn validate(&self) -> Result<(), String> {
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err(format!("Invalid Redis URL scheme: {}", self.url));
        }
        if self.max_retries == 0 {
            return Err("Redis max_retries must be at least 1".to_string());
        }
        Ok(())
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.url, "redis://localhost:6379");
        assert_eq!(config.max_retries, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cache_config_with_prefix() {
        let config = CacheConfig::new("redis://cache:6379").with_prefix("otpgate");
        assert_eq!(config.make_key("otp:abc"), "otpgate:otp:abc");
    }

    #[test]
    fn test_cache_key_without_prefix() {
        let config = CacheConfig::default();
        assert_eq!(config.make_key("otp:abc"), "otp:abc");
    }

    #[test]
    fn test_invalid_scheme_rejected() {
        let config = CacheConfig::new("http://localhost:6379");
        assert!(config.validate().is_err());
    }
}
