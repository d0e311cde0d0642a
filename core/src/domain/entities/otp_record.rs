//! OTP record entity, the sole persisted state of an issuance cycle.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{BackoffSchedule, BackoffStep, OtpStatus};
use crate::errors::ThrottleError;

/// Default width of a generated code
pub const CODE_LENGTH: usize = 6;

/// Default lifetime of a record, measured from creation
pub const DEFAULT_RETENTION_MINUTES: i64 = 60;

/// Persisted throttle and verification state for one identity key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    /// Opaque correlation token supplied by the caller
    pub identity_key: String,

    /// The most recently issued code
    pub code: String,

    /// Set once a successful verification consumed the code; never unset
    pub used: bool,

    /// Number of resends since creation; never decremented
    pub attempts: u32,

    /// Time of the most recent accepted send
    pub last_request_time: DateTime<Utc>,

    /// Time the record was created
    pub created_at: DateTime<Utc>,

    /// Absolute time after which the store discards the record
    pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
    /// Creates the record for the first send of an identity key
    ///
    /// # Arguments
    ///
    /// * `identity_key` - Correlation token of the verification session
    /// * `code` - The freshly generated code
    /// * `now` - Creation time, also the first `last_request_time`
    /// * `retention` - Lifetime of the record from `now`
    pub fn new(
        identity_key: impl Into<String>,
        code: impl Into<String>,
        now: DateTime<Utc>,
        retention: Duration,
    ) -> Self {
        Self {
            identity_key: identity_key.into(),
            code: code.into(),
            used: false,
            attempts: 0,
            last_request_time: now,
            created_at: now,
            expires_at: now + retention,
        }
    }

    /// Checks if the record has outlived its retention window
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Earliest time a resend is allowed, `None` once the schedule is exhausted
    pub fn next_send_at(&self, schedule: &BackoffSchedule) -> Option<DateTime<Utc>> {
        schedule.next_allowed_at(self.attempts, self.last_request_time)
    }

    /// Applies the throttle policy for a resend at `now`
    ///
    /// # Returns
    ///
    /// `Ok(())` when the wait for the current attempt count has elapsed,
    /// `ThrottleError::MustWait` with the remaining seconds rounded up while
    /// the window is open, `ThrottleError::AttemptsExhausted` once the
    /// attempt count has reached the end of the schedule.
    pub fn check_resend(
        &self,
        schedule: &BackoffSchedule,
        now: DateTime<Utc>,
    ) -> Result<(), ThrottleError> {
        let wait = match schedule.step(self.attempts) {
            BackoffStep::Wait(wait) => wait,
            BackoffStep::Exhausted => {
                return Err(ThrottleError::AttemptsExhausted {
                    attempts: self.attempts,
                })
            }
        };

        let next_allowed_at = self.last_request_time + wait;
        if now < next_allowed_at {
            return Err(ThrottleError::MustWait {
                wait_seconds: ceil_seconds(next_allowed_at - now),
                next_allowed_at,
            });
        }

        Ok(())
    }

    /// Records an accepted resend: bumps the attempt count, stamps the
    /// request time and swaps in the new code
    pub fn record_resend(&mut self, code: impl Into<String>, now: DateTime<Utc>) {
        self.attempts = self.attempts.saturating_add(1);
        self.last_request_time = now;
        self.code = code.into();
    }

    /// Compares a candidate against the stored code in constant time
    pub fn matches(&self, candidate: &str) -> bool {
        constant_time_eq::constant_time_eq(self.code.as_bytes(), candidate.as_bytes())
    }

    pub fn mark_used(&mut self) {
        self.used = true;
    }

    /// Lifecycle state of this record at `now`
    pub fn status(&self, schedule: &BackoffSchedule, now: DateTime<Utc>) -> OtpStatus {
        if self.is_expired(now) {
            return OtpStatus::Absent;
        }
        if self.used {
            return OtpStatus::Consumed {
                expires_at: self.expires_at,
            };
        }
        match self.next_send_at(schedule) {
            Some(next_send_at) => OtpStatus::Active {
                attempts: self.attempts,
                next_send_at,
                expires_at: self.expires_at,
            },
            None => OtpStatus::Locked {
                attempts: self.attempts,
                expires_at: self.expires_at,
            },
        }
    }
}

/// Whole seconds in `remaining`, rounded up
fn ceil_seconds(remaining: Duration) -> i64 {
    let seconds = remaining.num_seconds();
    if remaining > Duration::seconds(seconds) {
        seconds + 1
    } else {
        seconds
    }
}
