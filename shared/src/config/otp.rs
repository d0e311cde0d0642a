//! OTP issuance policy configuration

use serde::{Deserialize, Serialize};

/// Smallest supported code width
pub const MIN_CODE_LENGTH: usize = 4;

/// Largest supported code width
pub const MAX_CODE_LENGTH: usize = 10;

/// OTP issuance policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Minimum wait before the next send, in minutes, indexed by the
    /// record's attempt count. Its length is the resend ceiling.
    #[serde(default = "default_backoff_minutes")]
    pub backoff_minutes: Vec<u64>,

    /// Number of digits in a generated code
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Lifetime of a record, measured from its creation
    #[serde(default = "default_retention_minutes")]
    pub retention_minutes: u64,

    /// Key namespace used by persistent stores
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            backoff_minutes: default_backoff_minutes(),
            code_length: default_code_length(),
            retention_minutes: default_retention_minutes(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl OtpConfig {
    /// Apply `OTP_BACKOFF_MINUTES` (comma separated), `OTP_CODE_LENGTH`,
    /// `OTP_RETENTION_MINUTES` and `OTP_KEY_PREFIX` overrides
    pub fn merge_env(mut self) -> Result<Self, String> {
        if let Ok(value) = std::env::var("OTP_BACKOFF_MINUTES") {
            self.backoff_minutes = parse_minutes_list(&value)?;
        }
        if let Ok(value) = std::env::var("OTP_CODE_LENGTH") {
            self.code_length = value
                .trim()
                .parse()
                .map_err(|_| format!("OTP_CODE_LENGTH is not a number: {}", value))?;
        }
        if let Ok(value) = std::env::var("OTP_RETENTION_MINUTES") {
            self.retention_minutes = value
                .trim()
                .parse()
                .map_err(|_| format!("OTP_RETENTION_MINUTES is not a number: {}", value))?;
        }
        if let Ok(prefix) = std::env::var("OTP_KEY_PREFIX") {
            self.key_prefix = prefix;
        }
        Ok(self)
    }

    /// Check the policy invariants: a non-empty, non-decreasing schedule,
    /// a supported code width and a positive retention window
    pub fn validate(&self) -> Result<(), String> {
        if self.backoff_minutes.is_empty() {
            return Err("Backoff schedule must contain at least one step".to_string());
        }
        if self.backoff_minutes.windows(2).any(|w| w[1] < w[0]) {
            return Err(format!(
                "Backoff schedule must be non-decreasing: {:?}",
                self.backoff_minutes
            ));
        }
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&self.code_length) {
            return Err(format!(
                "Code length must be between {} and {}, got {}",
                MIN_CODE_LENGTH, MAX_CODE_LENGTH, self.code_length
            ));
        }
        if self.retention_minutes == 0 {
            return Err("Retention window must be positive".to_string());
        }
        Ok(())
    }
}

/// Parse a comma separated list of minute values, e.g. `"1, 3, 5"`
pub fn parse_minutes_list(value: &str) -> Result<Vec<u64>, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>()
                .map_err(|_| format!("Invalid backoff step '{}'", part))
        })
        .collect()
}

fn default_backoff_minutes() -> Vec<u64> {
    vec![1, 3, 5, 8, 10]
}

fn default_code_length() -> usize {
    6
}

fn default_retention_minutes() -> u64 {
    60
}

fn default_key_prefix() -> String {
    String::from("otp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let config = OtpConfig::default();
        assert_eq!(config.backoff_minutes, vec![1, 3, 5, 8, 10]);
        assert_eq!(config.code_length, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minutes_list() {
        assert_eq!(parse_minutes_list("1,3, 5 ,8").unwrap(), vec![1, 3, 5, 8]);
        assert_eq!(parse_minutes_list("2,").unwrap(), vec![2]);
        assert!(parse_minutes_list("1,x").is_err());
    }

    #[test]
    fn test_decreasing_schedule_rejected() {
        let config = OtpConfig {
            backoff_minutes: vec![5, 1],
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("non-decreasing"));
    }

    #[test]
    fn test_empty_schedule_rejected() {
        let config = OtpConfig {
            backoff_minutes: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_code_length_bounds() {
        let short = OtpConfig {
            code_length: 3,
            ..Default::default()
        };
        let long = OtpConfig {
            code_length: 11,
            ..Default::default()
        };
        assert!(short.validate().is_err());
        assert!(long.validate().is_err());
    }

    #[test]
    fn test_zero_retention_rejected() {
        let config = OtpConfig {
            retention_minutes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
