//! Module dedicated to the SMTP transport configuration.

use std::fmt;

use secret::Secret;
use serde::{Deserialize, Serialize};

use crate::config::{validate_host, validate_port, validate_secret, ValidationError};

/// The SMTP transport configuration.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SmtpConfig {
    /// The SMTP server host name.
    pub host: String,

    /// The SMTP server host port.
    pub port: u16,

    /// The SMTP encryption protocol to use.
    ///
    /// Defaults to STARTTLS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<SmtpEncryptionKind>,

    /// The SMTP server login.
    ///
    /// Usually, the login is either the email address or its left
    /// part (before @).
    pub login: String,

    /// The SMTP server password, usually an application password.
    pub password: Secret,
}

impl SmtpConfig {
    pub fn encryption(&self) -> SmtpEncryptionKind {
        self.encryption.clone().unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_host("SMTP host", &self.host)?;
        validate_port("SMTP port", self.port)?;
        validate_host("SMTP login", &self.login)?;
        validate_secret("SMTP password", &self.password)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SmtpEncryptionKind {
    #[default]
    #[serde(alias = "starttls")]
    StartTls,
    #[serde(alias = "ssl")]
    Tls,
    None,
}

impl SmtpEncryptionKind {
    pub const ALL: [SmtpEncryptionKind; 3] = [Self::StartTls, Self::Tls, Self::None];
}

impl fmt::Display for SmtpEncryptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tls => write!(f, "SSL/TLS"),
            Self::StartTls => write!(f, "StartTLS"),
            Self::None => write!(f, "None"),
        }
    }
}
