//! Shared utilities and common types for OtpGate
//!
//! This crate provides common functionality used across the workspace:
//! - Configuration types (environment, logging, OTP policy, Redis, delivery)
//! - Boundary error response structure and error codes
//! - Destination utilities (phone and e-mail validation, masking)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, DeliveryConfig, Environment, LogFormat, LoggingConfig, OtpConfig,
};
pub use errors::{error_codes, ErrorResponse, IntoErrorResponse};
pub use utils::{email, phone};
