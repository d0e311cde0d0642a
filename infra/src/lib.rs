//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for OtpGate. It provides
//! concrete implementations for the seams the core defines.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Cache**: Redis client with retry and the Redis-backed record store
//! - **SMS**: SMS service trait and mock/console provider
//! - **Email**: E-mail service trait and mock/console provider
//! - **Delivery**: Adapters from the services above to the core delivery
//!   seam, and the factory that builds them from configuration
//! - **Telemetry**: tracing subscriber setup

use std::sync::Arc;

use otp_core::{DomainError, IssuanceService, OtpServiceConfig, VerificationService};
use otp_shared::config::AppConfig;

/// Cache module - Redis client and record store
pub mod cache;

/// Delivery module - channel adapters and factory
pub mod delivery;

/// E-mail service module
pub mod email;

/// SMS service module
pub mod sms;

/// Tracing subscriber setup
pub mod telemetry;

pub use cache::{RedisClient, RedisOtpStore};
pub use delivery::create_delivery_channels;

/// Issuance and verification services wired to the Redis store
pub struct InfrastructureServices {
    pub issuance: IssuanceService<RedisOtpStore>,
    pub verification: VerificationService<RedisOtpStore>,
    pub store: Arc<RedisOtpStore>,
}

/// Initialize infrastructure services
///
/// This function sets up:
/// - The Redis connection and record store
/// - The delivery channels named in the configuration
/// - The issuance and verification services on top of them
pub async fn initialize(config: &AppConfig) -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!(
        environment = %config.environment,
        "Initializing infrastructure services..."
    );

    let service_config = OtpServiceConfig::try_from(&config.otp)
        .map_err(|e| InfrastructureError::Config(e.to_string()))?;

    let client = RedisClient::new(config.cache.clone()).await?;
    let store = Arc::new(RedisOtpStore::new(client, &config.otp.key_prefix));
    let channels = create_delivery_channels(&config.delivery);

    tracing::info!(
        channels = ?channels.channels(),
        backoff_minutes = ?config.otp.backoff_minutes,
        "Infrastructure services initialized successfully"
    );

    Ok(InfrastructureServices {
        issuance: IssuanceService::new(store.clone(), channels, service_config),
        verification: VerificationService::new(store.clone()),
        store,
    })
}

/// Load configuration from `.env` and the process environment
///
/// The environment-specific file (`.env.development`, `.env.production`, ...)
/// is loaded first, then `.env`; variables already set in the process win.
pub fn load_config() -> Result<AppConfig, InfrastructureError> {
    let environment = otp_shared::config::Environment::from_env();
    dotenvy::from_filename(environment.env_file()).ok();
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().map_err(InfrastructureError::Config)?;
    config.validate().map_err(InfrastructureError::Config)?;
    Ok(config)
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SMS service error
    #[error("SMS service error: {0}")]
    Sms(String),

    /// E-mail service error
    #[error("Email service error: {0}")]
    Email(String),

    /// Stored data could not be decoded
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::Internal {
            message: err.to_string(),
        }
    }
}
