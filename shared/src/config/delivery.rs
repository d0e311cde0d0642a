//! Delivery provider configuration

use serde::{Deserialize, Serialize};

/// Delivery provider implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryProvider {
    /// Records messages in memory and logs them (development, tests)
    Mock,
    /// Prints messages to stdout in addition to logging them
    Console,
    /// Channel not offered
    Disabled,
}

impl std::str::FromStr for DeliveryProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(DeliveryProvider::Mock),
            "console" => Ok(DeliveryProvider::Console),
            "disabled" | "none" | "off" => Ok(DeliveryProvider::Disabled),
            other => Err(format!("Unknown delivery provider: {}", other)),
        }
    }
}

/// Delivery configuration for the SMS and e-mail channels
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeliveryConfig {
    /// SMS provider
    #[serde(default = "default_provider")]
    pub sms_provider: DeliveryProvider,

    /// E-mail provider
    #[serde(default = "default_provider")]
    pub email_provider: DeliveryProvider,

    /// Sender address for e-mail delivery
    #[serde(default = "default_email_from")]
    pub email_from: String,

    /// Subject line for e-mail delivery
    #[serde(default = "default_email_subject")]
    pub email_subject: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            sms_provider: default_provider(),
            email_provider: default_provider(),
            email_from: default_email_from(),
            email_subject: default_email_subject(),
        }
    }
}

impl DeliveryConfig {
    /// Apply `SMS_PROVIDER`, `EMAIL_PROVIDER`, `EMAIL_FROM` and
    /// `EMAIL_SUBJECT` overrides
    pub fn merge_env(mut self) -> Result<Self, String> {
        if let Ok(value) = std::env::var("SMS_PROVIDER") {
            self.sms_provider = value.parse()?;
        }
        if let Ok(value) = std::env::var("EMAIL_PROVIDER") {
            self.email_provider = value.parse()?;
        }
        if let Ok(value) = std::env::var("EMAIL_FROM") {
            self.email_from = value;
        }
        if let Ok(value) = std::env::var("EMAIL_SUBJECT") {
            self.email_subject = value;
        }
        Ok(self)
    }
}

fn default_provider() -> DeliveryProvider {
    DeliveryProvider::Mock
}

fn default_email_from() -> String {
    String::from("no-reply@otpgate.local")
}

fn default_email_subject() -> String {
    String::from("Your verification code")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Mock".parse::<DeliveryProvider>().unwrap(), DeliveryProvider::Mock);
        assert_eq!("console".parse::<DeliveryProvider>().unwrap(), DeliveryProvider::Console);
        assert_eq!("off".parse::<DeliveryProvider>().unwrap(), DeliveryProvider::Disabled);
        assert!("twilio".parse::<DeliveryProvider>().is_err());
    }

    #[test]
    fn test_default_delivery_config() {
        let config = DeliveryConfig::default();
        assert_eq!(config.sms_provider, DeliveryProvider::Mock);
        assert_eq!(config.email_provider, DeliveryProvider::Mock);
        assert!(config.email_from.contains('@'));
    }
}
