//! OTP issuance and verification services
//!
//! This module provides the two operations the calling workflow uses:
//! - `IssuanceService::send` gates resends with the backoff schedule,
//!   persists the new code and hands it to a delivery channel
//! - `VerificationService::verify` compares a candidate against the stored
//!   code; consuming the code is a separate, explicit step (`mark_used`)

mod code;
mod config;
mod issuance;
mod traits;
mod types;
mod verification;

#[cfg(test)]
mod tests;

pub use code::generate_code;
pub use config::OtpServiceConfig;
pub use issuance::IssuanceService;
pub use traits::{DeliveryChannel, DeliveryChannels, MessageRenderer, PlainTextRenderer};
pub use types::{SendOutcome, VerifyOutcome};
pub use verification::VerificationService;
