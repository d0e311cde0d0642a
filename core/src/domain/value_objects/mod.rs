//! Value objects used by the issuance and verification services.

pub mod backoff_schedule;
pub mod channel;
pub mod otp_status;

pub use backoff_schedule::{BackoffSchedule, BackoffStep, DEFAULT_BACKOFF_MINUTES};
pub use channel::Channel;
pub use otp_status::OtpStatus;
