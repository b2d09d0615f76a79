//! Module dedicated to the transport configuration.

use serde::{Deserialize, Serialize};

use super::{
    local::LocalBinaryConfig, oauth2::OAuth2Config, relay::RelayConfig, smtp::SmtpConfig,
    TransportKind,
};
use crate::config::ValidationError;

/// The transport configuration.
///
/// Exactly one transport is configured at a time. The variant is
/// given by the `kind` field of the YAML document.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TransportConfig {
    /// Gmail through SMTP, authenticated with XOAUTH2.
    #[serde(rename = "oauth2")]
    OAuth2(OAuth2Config),

    /// ISP relay, usually unauthenticated.
    Relay(RelayConfig),

    /// SMTP server authenticated with a login and a password.
    Smtp(SmtpConfig),

    /// Local `sendmail`-like binary.
    LocalBinary(LocalBinaryConfig),
}

impl TransportConfig {
    pub fn kind(&self) -> TransportKind {
        match self {
            Self::OAuth2(_) => TransportKind::OAuth2,
            Self::Relay(_) => TransportKind::Relay,
            Self::Smtp(_) => TransportKind::Smtp,
            Self::LocalBinary(_) => TransportKind::LocalBinary,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::OAuth2(config) => config.validate(),
            Self::Relay(config) => config.validate(),
            Self::Smtp(config) => config.validate(),
            Self::LocalBinary(config) => config.validate(),
        }
    }

    /// Returns the address the transport authenticates as, if any.
    pub fn sender(&self) -> Option<&str> {
        match self {
            Self::OAuth2(config) => Some(config.sender.as_str()),
            _ => None,
        }
    }
}

impl From<OAuth2Config> for TransportConfig {
    fn from(config: OAuth2Config) -> Self {
        Self::OAuth2(config)
    }
}

impl From<RelayConfig> for TransportConfig {
    fn from(config: RelayConfig) -> Self {
        Self::Relay(config)
    }
}

impl From<SmtpConfig> for TransportConfig {
    fn from(config: SmtpConfig) -> Self {
        Self::Smtp(config)
    }
}

impl From<LocalBinaryConfig> for TransportConfig {
    fn from(config: LocalBinaryConfig) -> Self {
        Self::LocalBinary(config)
    }
}
