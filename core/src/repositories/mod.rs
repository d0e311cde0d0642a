pub mod otp;

pub use otp::{InMemoryOtpStore, OtpRecordStore};
