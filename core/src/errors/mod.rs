//! Domain-specific error types and error handling.

mod types;


// Re-export all error types
pub use types::{ChannelError, DeliveryError, ThrottleError, VerificationError};

use otp_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};
use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A concurrent writer changed the record between read and write
    #[error("Concurrent update for identity key {identity_key}")]
    Conflict { identity_key: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Throttle(#[from] ThrottleError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Verification(#[from] VerificationError),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Whether the same call may succeed later without changing its input
    pub fn is_retriable(&self) -> bool {
        match self {
            DomainError::Throttle(ThrottleError::MustWait { .. }) => true,
            // Exhaustion clears once the record expires
            DomainError::Throttle(ThrottleError::AttemptsExhausted { .. }) => true,
            DomainError::Delivery(_) | DomainError::Conflict { .. } => true,
            DomainError::Internal { .. } => true,
            DomainError::Channel(_)
            | DomainError::Validation { .. }
            | DomainError::Verification(_) => false,
        }
    }

    /// Stable code for the boundary response
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => error_codes::VALIDATION_ERROR,
            DomainError::Conflict { .. } => error_codes::CONFLICT,
            DomainError::Internal { .. } => error_codes::INTERNAL_ERROR,
            DomainError::Throttle(ThrottleError::MustWait { .. }) => error_codes::OTP_THROTTLED,
            DomainError::Throttle(ThrottleError::AttemptsExhausted { .. }) => {
                error_codes::OTP_ATTEMPTS_EXHAUSTED
            }
            DomainError::Channel(_) => error_codes::CHANNEL_UNSUPPORTED,
            DomainError::Delivery(_) => error_codes::DELIVERY_FAILED,
            DomainError::Verification(VerificationError::NotFound { .. }) => {
                error_codes::OTP_NOT_FOUND
            }
            DomainError::Verification(VerificationError::AlreadyUsed { .. }) => {
                error_codes::OTP_ALREADY_USED
            }
        }
    }
}

impl IntoErrorResponse for DomainError {
    fn to_error_response(&self) -> ErrorResponse {
        let mut response = ErrorResponse::new(self.error_code(), self.to_string())
            .add_detail("retriable", self.is_retriable());

        match self {
            DomainError::Throttle(ThrottleError::MustWait {
                wait_seconds,
                next_allowed_at,
            }) => {
                response = response
                    .add_detail("wait_seconds", wait_seconds)
                    .add_detail("next_allowed_at", next_allowed_at)
                    .add_detail("exhausted", false);
            }
            DomainError::Throttle(ThrottleError::AttemptsExhausted { attempts }) => {
                response = response
                    .add_detail("attempts", attempts)
                    .add_detail("exhausted", true);
            }
            DomainError::Channel(ChannelError { channel }) => {
                response = response.add_detail("channel", channel);
            }
            DomainError::Delivery(DeliveryError { channel, .. }) => {
                response = response.add_detail("channel", channel);
            }
            _ => {}
        }

        response
    }
}

impl From<DomainError> for ErrorResponse {
    fn from(err: DomainError) -> Self {
        err.to_error_response()
    }
}
