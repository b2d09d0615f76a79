//! Module dedicated to the ISP relay transport.

mod config;

use async_trait::async_trait;
use mail_send::Credentials;
use tracing::info;

#[doc(inline)]
pub use self::config::{RelayConfig, RELAY_DEFAULT_PORT};
use super::{
    session::{Security, Session},
    Deliver, Error, Result,
};
use crate::{config::Identity, MailMessage};

/// The ISP relay transport.
///
/// Relays usually accept messages from their own network without
/// authentication. Credentials are only sent when a login is
/// configured.
pub struct Relay {
    config: RelayConfig,
}

impl Relay {
    pub fn new(config: RelayConfig) -> Self {
        Self { config }
    }

    async fn credentials(&self) -> Result<Option<Credentials<String>>> {
        let (Some(login), Some(passwd)) = (&self.config.login, &self.config.password) else {
            return Ok(None);
        };

        let passwd = passwd
            .get()
            .await
            .map_err(|err| Error::GetSecretError(err, "relay password"))?;

        Ok(Some(Credentials::new(login.clone(), passwd)))
    }
}

#[async_trait]
impl Deliver for Relay {
    async fn deliver(&self, msg: &MailMessage, identity: Option<&Identity>) -> Result<()> {
        info!(host = %self.config.host, "deliver message through relay");

        let security = if self.config.tls {
            Security::Tls
        } else {
            Security::Plain
        };

        Session {
            host: &self.config.host,
            port: self.config.port,
            security,
            credentials: self.credentials().await?,
        }
        .send(msg, identity)
        .await
    }
}
