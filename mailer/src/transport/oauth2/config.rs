//! Module dedicated to the OAuth 2.0 transport configuration.

use secret::Secret;
use serde::{Deserialize, Serialize};

use crate::{
    config::{validate_address, validate_host, validate_port, validate_secret, ValidationError},
    transport::SmtpEncryptionKind,
};

/// The token endpoint used when none is configured.
pub const GMAIL_TOKEN_URL: &str = "https://www.googleapis.com/oauth2/v3/token";

/// The SMTP server used when none is configured.
pub const GMAIL_SMTP_HOST: &str = "smtp.gmail.com";

/// The SMTP submission port used when none is configured.
pub const GMAIL_SMTP_PORT: u16 = 587;

/// The SMTP port wrapped in TLS from the first byte.
const IMPLICIT_TLS_PORT: u16 = 465;

/// The OAuth 2.0 transport configuration.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct OAuth2Config {
    /// Client identifier issued by the authorization server.
    pub client_id: String,

    /// Client password issued by the authorization server.
    pub client_secret: Secret,

    /// Long-lived token exchanged for an access token before every
    /// delivery.
    pub refresh_token: Secret,

    /// The address the access token was issued for.
    pub sender: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// The SMTP encryption protocol. Defaults to SSL/TLS on port
    /// 465, StartTLS otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<SmtpEncryptionKind>,
}

impl OAuth2Config {
    pub fn token_url(&self) -> &str {
        self.token_url.as_deref().unwrap_or(GMAIL_TOKEN_URL)
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(GMAIL_SMTP_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(GMAIL_SMTP_PORT)
    }

    pub fn encryption(&self) -> SmtpEncryptionKind {
        match &self.encryption {
            Some(encryption) => encryption.clone(),
            None if self.port() == IMPLICIT_TLS_PORT => SmtpEncryptionKind::Tls,
            None => SmtpEncryptionKind::StartTls,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_host("OAuth 2.0 client id", &self.client_id)?;
        validate_secret("OAuth 2.0 client secret", &self.client_secret)?;
        validate_secret("OAuth 2.0 refresh token", &self.refresh_token)?;
        validate_address("OAuth 2.0 sender address", &self.sender)?;

        if let Some(url) = &self.token_url {
            validate_host("OAuth 2.0 token url", url)?;
        }

        if let Some(host) = &self.host {
            validate_host("OAuth 2.0 SMTP host", host)?;
        }

        if let Some(port) = self.port {
            validate_port("OAuth 2.0 SMTP port", port)?;
        }

        // access tokens are never sent in clear
        if self.encryption() == SmtpEncryptionKind::None {
            return Err(ValidationError::UnencryptedFieldError("OAuth 2.0 SMTP encryption"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use secret::Secret;

    use super::OAuth2Config;
    use crate::{config::ValidationError, transport::SmtpEncryptionKind};

    fn config() -> OAuth2Config {
        OAuth2Config {
            client_id: String::from("client-id"),
            client_secret: Secret::new_raw("client-secret"),
            refresh_token: Secret::new_raw("refresh-token"),
            sender: String::from("me@gmail.com"),
            ..Default::default()
        }
    }

    #[test]
    fn encryption_follows_port() {
        assert_eq!(config().encryption(), SmtpEncryptionKind::StartTls);

        let config = OAuth2Config {
            port: Some(465),
            ..config()
        };
        assert_eq!(config.encryption(), SmtpEncryptionKind::Tls);

        let config = OAuth2Config {
            encryption: Some(SmtpEncryptionKind::StartTls),
            ..config
        };
        assert_eq!(config.encryption(), SmtpEncryptionKind::StartTls);
    }

    #[test]
    fn unencrypted_session_is_refused() {
        let config = OAuth2Config {
            encryption: Some(SmtpEncryptionKind::None),
            ..config()
        };

        assert_eq!(
            config.validate(),
            Err(ValidationError::UnencryptedFieldError("OAuth 2.0 SMTP encryption"))
        );
    }
}
