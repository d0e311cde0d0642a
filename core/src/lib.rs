//! # OtpGate Core
//!
//! Core domain and business logic for one-time password issuance and
//! verification. This crate contains the OTP record entity, the backoff
//! schedule that throttles resends, the record-store and delivery seams,
//! the error taxonomy, and the two services built on top of them.

pub mod clock;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::entities::OtpRecord;
pub use domain::value_objects::{BackoffSchedule, BackoffStep, Channel, OtpStatus};
pub use errors::{
    ChannelError, DeliveryError, DomainError, DomainResult, ThrottleError, VerificationError,
};
pub use repositories::{InMemoryOtpStore, OtpRecordStore};
pub use services::{
    DeliveryChannel, DeliveryChannels, IssuanceService, MessageRenderer, OtpServiceConfig,
    PlainTextRenderer, SendOutcome, VerificationService, VerifyOutcome,
};
