//! Seams for delivery transports and message rendering

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::value_objects::Channel;
use crate::errors::ChannelError;

/// Trait for delivery transport integration
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Hand a rendered message to the transport, returning its message id
    async fn deliver(&self, destination: &str, message: &str) -> Result<String, String>;
    /// Name of the backing provider, for logs
    fn provider_name(&self) -> &str;
}

/// Turns a code into the message body for a channel
pub trait MessageRenderer: Send + Sync {
    fn render(&self, channel: Channel, code: &str) -> String;
}

/// Single-line message carrying only the code
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

impl MessageRenderer for PlainTextRenderer {
    fn render(&self, _channel: Channel, code: &str) -> String {
        format!("Your verification code is {}", code)
    }
}

/// The delivery channels a deployment offers, keyed by kind
#[derive(Clone, Default)]
pub struct DeliveryChannels {
    channels: HashMap<Channel, Arc<dyn DeliveryChannel>>,
}

impl DeliveryChannels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration
    pub fn with(mut self, channel: Channel, transport: Arc<dyn DeliveryChannel>) -> Self {
        self.register(channel, transport);
        self
    }

    /// Register or replace the transport for `channel`
    pub fn register(&mut self, channel: Channel, transport: Arc<dyn DeliveryChannel>) {
        self.channels.insert(channel, transport);
    }

    /// Transport for `channel`, or `ChannelError` if none is configured
    pub fn get(&self, channel: Channel) -> Result<&Arc<dyn DeliveryChannel>, ChannelError> {
        self.channels.get(&channel).ok_or_else(|| ChannelError {
            channel: channel.to_string(),
        })
    }

    pub fn supports(&self, channel: Channel) -> bool {
        self.channels.contains_key(&channel)
    }

    /// Configured channel kinds
    pub fn channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|channel| self.supports(*channel))
            .collect()
    }
}

impl std::fmt::Debug for DeliveryChannels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.channels
                    .iter()
                    .map(|(channel, transport)| (channel, transport.provider_name())),
            )
            .finish()
    }
}
