//! Specific error types surfaced by the issuance and verification services
//!
//! Every kind carries the data the calling workflow needs to render a
//! response: the wait hint or exhaustion flag for throttling, the rejected
//! channel name, the failing channel for delivery errors.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Send throttling errors. Always safe to retry later.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThrottleError {
    #[error("Must wait {wait_seconds} seconds before requesting a new code")]
    MustWait {
        wait_seconds: i64,
        next_allowed_at: DateTime<Utc>,
    },

    #[error("Attempts exhausted after {attempts} resends")]
    AttemptsExhausted { attempts: u32 },
}

impl ThrottleError {
    /// Seconds the caller must wait, if the window is still open
    pub fn wait_seconds(&self) -> Option<i64> {
        match self {
            ThrottleError::MustWait { wait_seconds, .. } => Some(*wait_seconds),
            ThrottleError::AttemptsExhausted { .. } => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, ThrottleError::AttemptsExhausted { .. })
    }
}

/// The requested delivery channel is not supported or not configured
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported delivery channel: {channel}")]
pub struct ChannelError {
    pub channel: String,
}

/// The delivery collaborator failed to hand the message off
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Delivery via {channel} failed: {message}")]
pub struct DeliveryError {
    pub channel: String,
    pub message: String,
}

/// Verification errors. The caller should restart the send flow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("No live code for identity key {identity_key}")]
    NotFound { identity_key: String },

    #[error("Code for identity key {identity_key} has already been used")]
    AlreadyUsed { identity_key: String },
}
