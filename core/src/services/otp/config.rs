//! Configuration for the OTP services

use chrono::Duration;
use otp_shared::config::OtpConfig;

use crate::domain::entities::{CODE_LENGTH, DEFAULT_RETENTION_MINUTES};
use crate::domain::value_objects::BackoffSchedule;
use crate::errors::{DomainError, DomainResult};

/// Policy shared by issuance and status inspection
#[derive(Debug, Clone)]
pub struct OtpServiceConfig {
    /// Minimum waits between sends, indexed by attempt count
    pub schedule: BackoffSchedule,
    /// Number of digits in a generated code
    pub code_length: usize,
    /// Lifetime of a record from creation
    pub retention: Duration,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            schedule: BackoffSchedule::default(),
            code_length: CODE_LENGTH,
            retention: Duration::minutes(DEFAULT_RETENTION_MINUTES),
        }
    }
}

impl TryFrom<&OtpConfig> for OtpServiceConfig {
    type Error = DomainError;

    fn try_from(config: &OtpConfig) -> DomainResult<Self> {
        config
            .validate()
            .map_err(|message| DomainError::Validation { message })?;

        let retention = i64::try_from(config.retention_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .ok_or_else(|| DomainError::Validation {
                message: format!(
                    "Retention of {} minutes is out of range",
                    config.retention_minutes
                ),
            })?;

        Ok(Self {
            schedule: BackoffSchedule::from_minutes(&config.backoff_minutes)?,
            code_length: config.code_length,
            retention,
        })
    }
}
