//! Issuance service: throttled generation and delivery of codes

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::domain::entities::OtpRecord;
use crate::domain::value_objects::{Channel, OtpStatus};
use crate::errors::{DeliveryError, DomainError, DomainResult, ThrottleError, VerificationError};
use crate::repositories::OtpRecordStore;

use super::code::generate_code;
use super::config::OtpServiceConfig;
use super::traits::{DeliveryChannels, MessageRenderer, PlainTextRenderer};
use super::types::SendOutcome;

/// Rounds of read-decide-write before a lost race is reported as a conflict
const WRITE_ROUNDS: usize = 2;

/// Stored state after an accepted send, before delivery
struct Issued {
    code: String,
    record: OtpRecord,
}

/// Issuance service deciding whether a code may be sent for an identity key
pub struct IssuanceService<S: OtpRecordStore + ?Sized> {
    /// Record store holding throttle state
    store: Arc<S>,
    /// Configured delivery transports
    channels: DeliveryChannels,
    /// Message body renderer
    renderer: Arc<dyn MessageRenderer>,
    /// Time source for throttle decisions
    clock: Arc<dyn Clock>,
    /// Service configuration
    config: OtpServiceConfig,
}

impl<S: OtpRecordStore + ?Sized> IssuanceService<S> {
    /// Create a new issuance service
    ///
    /// # Arguments
    ///
    /// * `store` - Record store implementation
    /// * `channels` - Delivery transports keyed by channel
    /// * `config` - Schedule, code width and retention
    pub fn new(store: Arc<S>, channels: DeliveryChannels, config: OtpServiceConfig) -> Self {
        Self {
            store,
            channels,
            renderer: Arc::new(PlainTextRenderer),
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the message renderer
    pub fn with_renderer(mut self, renderer: Arc<dyn MessageRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &OtpServiceConfig {
        &self.config
    }

    /// Send a code to `destination` for `identity_key`
    ///
    /// This method:
    /// 1. Rejects an unconfigured channel or a destination the channel
    ///    cannot address, before touching the store. The transport receives
    ///    the normalized destination
    /// 2. Creates the record on the first send, or applies the backoff
    ///    schedule to an existing one
    /// 3. Generates a fresh code and persists it with the throttle state in
    ///    a single write
    /// 4. Delivers the rendered message
    ///
    /// A delivery failure does not roll back the stored state.
    ///
    /// # Returns
    ///
    /// * `Ok(SendOutcome)` - Code stored and handed to the transport
    /// * `Err(DomainError::Throttle)` - Backoff window open or attempts exhausted
    /// * `Err(DomainError::Channel)` - Channel not configured
    /// * `Err(DomainError::Delivery)` - Transport failed after the state was stored
    /// * `Err(DomainError::Verification(AlreadyUsed))` - The record was consumed
    pub async fn send(
        &self,
        destination: &str,
        identity_key: &str,
        channel: Channel,
    ) -> DomainResult<SendOutcome> {
        let transport = self.channels.get(channel)?;
        let masked = channel.mask_destination(destination);

        if identity_key.trim().is_empty() {
            return Err(DomainError::Validation {
                message: "Identity key must not be empty".to_string(),
            });
        }
        let destination = channel.normalize_destination(destination).ok_or_else(|| {
            DomainError::Validation {
                message: format!("Invalid {} destination: {}", channel, masked),
            }
        })?;
        let masked = channel.mask_destination(&destination);

        let Issued { code, record } = self.issue(identity_key).await?;

        tracing::info!(
            identity_key = identity_key,
            channel = %channel,
            destination = %masked,
            attempts = record.attempts,
            event = "otp_generated",
            "Stored new verification code"
        );

        let message = self.renderer.render(channel, &code);
        let message_id = transport
            .deliver(&destination, &message)
            .await
            .map_err(|e| {
                tracing::error!(
                    identity_key = identity_key,
                    channel = %channel,
                    provider = transport.provider_name(),
                    destination = %masked,
                    error = %e,
                    event = "otp_delivery_failed",
                    "Failed to deliver verification code"
                );
                DeliveryError {
                    channel: channel.to_string(),
                    message: e,
                }
            })?;

        tracing::info!(
            identity_key = identity_key,
            channel = %channel,
            provider = transport.provider_name(),
            destination = %masked,
            message_id = %message_id,
            event = "otp_delivered",
            "Delivered verification code"
        );

        Ok(SendOutcome {
            identity_key: identity_key.to_string(),
            channel,
            attempts: record.attempts,
            message_id,
            next_send_at: record.next_send_at(&self.config.schedule),
            expires_at: record.expires_at,
        })
    }

    /// Same as `send`, with the channel given by its wire name
    pub async fn send_via(
        &self,
        destination: &str,
        identity_key: &str,
        channel: &str,
    ) -> DomainResult<SendOutcome> {
        let channel: Channel = channel.parse()?;
        self.send(destination, identity_key, channel).await
    }

    /// Lifecycle state of the record behind `identity_key`
    pub async fn status(&self, identity_key: &str) -> DomainResult<OtpStatus> {
        let now = self.clock.now();
        Ok(self
            .store
            .get(identity_key)
            .await?
            .map_or(OtpStatus::Absent, |record| {
                record.status(&self.config.schedule, now)
            }))
    }

    /// Create or advance the record, re-reading once if a concurrent writer
    /// got there first
    async fn issue(&self, identity_key: &str) -> DomainResult<Issued> {
        for round in 1..=WRITE_ROUNDS {
            let retry = round < WRITE_ROUNDS;
            let now = self.clock.now();

            match self.store.get(identity_key).await? {
                None => {
                    let code = generate_code(self.config.code_length);
                    let record =
                        OtpRecord::new(identity_key, code.clone(), now, self.config.retention);
                    match self.store.create(record.clone()).await {
                        Ok(()) => return Ok(Issued { code, record }),
                        Err(DomainError::Conflict { .. }) if retry => {
                            tracing::debug!(
                                identity_key = identity_key,
                                "Lost create race, re-reading record"
                            );
                        }
                        Err(e) => return Err(e),
                    }
                }
                Some(mut record) => {
                    if record.used {
                        return Err(VerificationError::AlreadyUsed {
                            identity_key: identity_key.to_string(),
                        }
                        .into());
                    }

                    if let Err(throttle) = record.check_resend(&self.config.schedule, now) {
                        self.log_throttled(identity_key, &throttle);
                        return Err(throttle.into());
                    }

                    let code = generate_code(self.config.code_length);
                    match self
                        .store
                        .increment_attempts(identity_key, record.attempts, &code, now)
                        .await
                    {
                        Ok(attempts) => {
                            record.record_resend(code.clone(), now);
                            record.attempts = attempts;
                            return Ok(Issued { code, record });
                        }
                        Err(DomainError::Conflict { .. })
                        | Err(DomainError::Verification(VerificationError::NotFound { .. }))
                            if retry =>
                        {
                            tracing::debug!(
                                identity_key = identity_key,
                                "Record changed during resend, re-reading"
                            );
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        Err(DomainError::Conflict {
            identity_key: identity_key.to_string(),
        })
    }

    fn log_throttled(&self, identity_key: &str, throttle: &ThrottleError) {
        match throttle {
            ThrottleError::MustWait { wait_seconds, .. } => tracing::warn!(
                identity_key = identity_key,
                wait_seconds = wait_seconds,
                event = "otp_throttled",
                "Verification code requested inside backoff window"
            ),
            ThrottleError::AttemptsExhausted { attempts } => tracing::warn!(
                identity_key = identity_key,
                attempts = attempts,
                event = "otp_exhausted",
                "Verification code resends exhausted"
            ),
        }
    }
}
