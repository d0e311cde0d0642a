//! Domain entities representing persisted state.

pub mod otp_record;

pub use otp_record::{OtpRecord, CODE_LENGTH, DEFAULT_RETENTION_MINUTES};
