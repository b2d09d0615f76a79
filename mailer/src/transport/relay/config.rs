//! Module dedicated to the ISP relay transport configuration.

use secret::Secret;
use serde::{Deserialize, Serialize};

use crate::config::{validate_host, validate_port, validate_secret, ValidationError};

/// The SMTP port used when none is configured.
pub const RELAY_DEFAULT_PORT: u16 = 25;

fn default_port() -> u16 {
    RELAY_DEFAULT_PORT
}

/// The ISP relay transport configuration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RelayConfig {
    /// The relay host name.
    pub host: String,

    /// The relay port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// The login, when the relay requires authentication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,

    /// The password matching the login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<Secret>,

    /// Wraps the whole session in TLS. The session is plain
    /// otherwise.
    #[serde(default)]
    pub tls: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: RELAY_DEFAULT_PORT,
            login: None,
            password: None,
            tls: false,
        }
    }
}

impl RelayConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_host("relay host", &self.host)?;
        validate_port("relay port", self.port)?;

        match (&self.login, &self.password) {
            (None, None) => Ok(()),
            (Some(login), Some(passwd)) => {
                validate_host("relay login", login)?;
                validate_secret("relay password", passwd)
            }
            (Some(_), None) => Err(ValidationError::EmptyFieldError("relay password")),
            (None, Some(_)) => Err(ValidationError::EmptyFieldError("relay login")),
        }
    }
}
