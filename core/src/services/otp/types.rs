//! Types for OTP service results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Channel;

/// Result of an accepted send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOutcome {
    /// Identity key the code was issued for
    pub identity_key: String,
    /// Channel the code was delivered through
    pub channel: Channel,
    /// Attempt count after this send (0 for the first send)
    pub attempts: u32,
    /// Message id returned by the delivery provider
    pub message_id: String,
    /// When the next send will be accepted; `None` if this send used the
    /// last step of the schedule
    pub next_send_at: Option<DateTime<Utc>>,
    /// When the record expires
    pub expires_at: DateTime<Utc>,
}

/// Result of comparing a candidate code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOutcome {
    pub valid: bool,
}
