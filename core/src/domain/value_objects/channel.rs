//! Delivery channel kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use otp_shared::utils::{email, phone};

use crate::errors::ChannelError;

/// The fixed set of channels a code can be delivered through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sms,
    Email,
}

impl Channel {
    /// All supported channels
    pub const ALL: [Channel; 2] = [Channel::Sms, Channel::Email];

    /// Wire name of the channel
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Sms => "sms",
            Channel::Email => "email",
        }
    }

    /// Canonical form of `destination`, or `None` if this channel cannot
    /// address it. Phone numbers lose their spacing and grouping characters,
    /// e-mail addresses their surrounding whitespace.
    pub fn normalize_destination(&self, destination: &str) -> Option<String> {
        match self {
            Channel::Sms => {
                let normalized = phone::normalize_phone_number(destination);
                phone::is_valid_international_phone(&normalized).then_some(normalized)
            }
            Channel::Email => {
                let trimmed = destination.trim();
                email::is_valid_email(trimmed).then(|| trimmed.to_string())
            }
        }
    }

    /// Mask a destination of this channel for logging
    pub fn mask_destination(&self, destination: &str) -> String {
        match self {
            Channel::Sms => phone::mask_phone_number(destination),
            Channel::Email => email::mask_email(destination),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sms" => Ok(Channel::Sms),
            "email" => Ok(Channel::Email),
            _ => Err(ChannelError {
                channel: s.to_string(),
            }),
        }
    }
}
