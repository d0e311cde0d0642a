use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Observable lifecycle state of the record behind an identity key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OtpStatus {
    /// No live record; the next send starts a new cycle
    Absent,
    /// Sends and verifies are accepted
    Active {
        attempts: u32,
        next_send_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    },
    /// Resend ceiling reached; only expiry releases the key
    Locked {
        attempts: u32,
        expires_at: DateTime<Utc>,
    },
    /// A successful verification consumed the code
    Consumed { expires_at: DateTime<Utc> },
}
