//! Delivery channel factory
//!
//! Builds the set of channels a deployment offers from `DeliveryConfig`.
//! A channel whose provider is `disabled` is left unregistered, so sends on
//! it fail with a channel error before any record is touched.

use std::sync::Arc;

use otp_core::{Channel, DeliveryChannel, DeliveryChannels};
use otp_shared::config::{DeliveryConfig, DeliveryProvider};
use tracing::info;

use crate::email::{EmailDeliveryChannel, MockEmailService};
use crate::sms::{MockSmsService, SmsDeliveryChannel};

/// A message accepted by a mock provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub message_id: String,
    pub recipient: String,
    pub body: String,
}

/// Create the delivery channels named in the configuration
pub fn create_delivery_channels(config: &DeliveryConfig) -> DeliveryChannels {
    let mut channels = DeliveryChannels::new();

    if let Some(sms) = sms_channel(config.sms_provider) {
        channels.register(Channel::Sms, sms);
    }
    if let Some(email) = email_channel(config) {
        channels.register(Channel::Email, email);
    }

    info!(
        sms_provider = ?config.sms_provider,
        email_provider = ?config.email_provider,
        "Delivery channels configured"
    );

    channels
}

fn sms_channel(provider: DeliveryProvider) -> Option<Arc<dyn DeliveryChannel>> {
    let service = match provider {
        DeliveryProvider::Mock => MockSmsService::with_options(false, false),
        DeliveryProvider::Console => MockSmsService::with_options(true, false),
        DeliveryProvider::Disabled => return None,
    };
    Some(Arc::new(SmsDeliveryChannel::new(Arc::new(service))))
}

fn email_channel(config: &DeliveryConfig) -> Option<Arc<dyn DeliveryChannel>> {
    let from = config.email_from.as_str();
    let service = match config.email_provider {
        DeliveryProvider::Mock => MockEmailService::with_options(from, false, false),
        DeliveryProvider::Console => MockEmailService::with_options(from, true, false),
        DeliveryProvider::Disabled => return None,
    };
    Some(Arc::new(EmailDeliveryChannel::new(
        Arc::new(service),
        config.email_subject.clone(),
    )))
}
