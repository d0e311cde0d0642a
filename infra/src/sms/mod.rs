//! SMS Service Module
//!
//! This module provides the SMS provider interface, a mock implementation for
//! development, and the adapter that exposes any provider as the core `sms`
//! delivery channel.
//!
//! ## Features
//!
//! - **SMS Service Trait**: Common interface for all SMS providers
//! - **Mock Implementation**: Recorded messages with optional console output
//! - **Security**: Phone number masking in logs

pub mod adapter;
pub mod mock_sms;
pub mod sms_service;

pub use adapter::SmsDeliveryChannel;
pub use mock_sms::MockSmsService;
pub use sms_service::SmsService;

#[cfg(test)]
mod tests;
