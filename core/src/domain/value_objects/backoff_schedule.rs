//! Resend backoff schedule.

use chrono::{DateTime, Duration, Utc};

use crate::errors::{DomainError, DomainResult};

/// Default resend schedule in minutes
pub const DEFAULT_BACKOFF_MINUTES: [u64; 5] = [1, 3, 5, 8, 10];

/// Result of looking up the schedule for an attempt count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffStep {
    /// A resend is allowed once this much time has passed since the last request
    Wait(Duration),
    /// The attempt count has reached the end of the schedule
    Exhausted,
}

/// Ordered, non-decreasing sequence of minimum waits between sends.
///
/// Step `i` is the wait required before a resend when the record has
/// already accumulated `i` resend attempts. Once the attempt count reaches
/// the schedule length no further sends are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffSchedule {
    steps: Vec<Duration>,
}

impl BackoffSchedule {
    /// Build a schedule from explicit durations
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the schedule is empty, contains a
    /// negative step, or decreases anywhere.
    pub fn new(steps: Vec<Duration>) -> DomainResult<Self> {
        if steps.is_empty() {
            return Err(DomainError::Validation {
                message: "Backoff schedule must contain at least one step".to_string(),
            });
        }
        if steps.iter().any(|step| *step < Duration::zero()) {
            return Err(DomainError::Validation {
                message: "Backoff schedule steps must not be negative".to_string(),
            });
        }
        if steps.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(DomainError::Validation {
                message: "Backoff schedule must be non-decreasing".to_string(),
            });
        }
        Ok(Self { steps })
    }

    /// Build a schedule from whole minutes
    pub fn from_minutes(minutes: &[u64]) -> DomainResult<Self> {
        let steps = minutes
            .iter()
            .map(|m| {
                i64::try_from(*m)
                    .ok()
                    .and_then(Duration::try_minutes)
                    .ok_or_else(|| DomainError::Validation {
                        message: format!("Backoff step of {} minutes is out of range", m),
                    })
            })
            .collect::<DomainResult<Vec<_>>>()?;
        Self::new(steps)
    }

    /// Number of resends allowed after the first send
    pub fn ceiling(&self) -> u32 {
        self.steps.len() as u32
    }

    /// The configured steps, in order
    pub fn steps(&self) -> &[Duration] {
        &self.steps
    }

    /// Look up the wait that applies at `attempts`
    pub fn step(&self, attempts: u32) -> BackoffStep {
        match self.steps.get(attempts as usize) {
            Some(wait) => BackoffStep::Wait(*wait),
            None => BackoffStep::Exhausted,
        }
    }

    /// Earliest instant a resend is allowed, or `None` once exhausted
    pub fn next_allowed_at(
        &self,
        attempts: u32,
        last_request_time: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        match self.step(attempts) {
            BackoffStep::Wait(wait) => Some(last_request_time + wait),
            BackoffStep::Exhausted => None,
        }
    }
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self {
            steps: DEFAULT_BACKOFF_MINUTES
                .iter()
                .map(|m| Duration::minutes(*m as i64))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let schedule = BackoffSchedule::default();
        assert_eq!(schedule.ceiling(), 5);
        assert_eq!(schedule.step(0), BackoffStep::Wait(Duration::minutes(1)));
        assert_eq!(schedule.step(1), BackoffStep::Wait(Duration::minutes(3)));
        assert_eq!(schedule.step(4), BackoffStep::Wait(Duration::minutes(10)));
    }

    #[test]
    fn test_exhaustion_is_explicit() {
        let schedule = BackoffSchedule::default();
        assert_eq!(schedule.step(5), BackoffStep::Exhausted);
        assert_eq!(schedule.step(u32::MAX), BackoffStep::Exhausted);
        assert!(schedule.next_allowed_at(5, Utc::now()).is_none());
    }

    #[test]
    fn test_next_allowed_at() {
        let schedule = BackoffSchedule::from_minutes(&[2, 4]).unwrap();
        let last = Utc::now();
        assert_eq!(schedule.next_allowed_at(0, last), Some(last + Duration::minutes(2)));
        assert_eq!(schedule.next_allowed_at(1, last), Some(last + Duration::minutes(4)));
    }

    #[test]
    fn test_invalid_schedules_rejected() {
        assert!(BackoffSchedule::new(vec![]).is_err());
        assert!(BackoffSchedule::from_minutes(&[5, 3]).is_err());
        assert!(BackoffSchedule::new(vec![Duration::seconds(-1)]).is_err());
    }

    #[test]
    fn test_equal_steps_allowed() {
        let schedule = BackoffSchedule::from_minutes(&[1, 1, 1]).unwrap();
        assert_eq!(schedule.ceiling(), 3);
    }
}
