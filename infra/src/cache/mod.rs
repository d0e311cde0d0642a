//! Cache module for Redis-based storage
//!
//! This module provides the Redis client with connection retry logic and the
//! Redis-backed OTP record store built on it.

pub mod otp_store;
pub mod redis_client;

#[cfg(test)]
mod tests;

pub use otp_store::RedisOtpStore;
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use otp_shared::config::CacheConfig;
