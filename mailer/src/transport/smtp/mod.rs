//! Module dedicated to the SMTP transport.

mod config;

use async_trait::async_trait;
use mail_send::Credentials;
use tracing::info;

#[doc(inline)]
pub use self::config::{SmtpConfig, SmtpEncryptionKind};
use super::{session::Session, Deliver, Error, Result};
use crate::{config::Identity, MailMessage};

/// The SMTP transport, authenticated with a login and a password.
pub struct Smtp {
    config: SmtpConfig,
}

impl Smtp {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Builds the SMTP credentials from the login and the first line
    /// of the password.
    async fn credentials(&self) -> Result<Credentials<String>> {
        let passwd = self
            .config
            .password
            .get()
            .await
            .map_err(|err| Error::GetSecretError(err, "SMTP password"))?;
        let passwd = passwd.lines().next().unwrap_or_default().to_owned();

        Ok(Credentials::new(self.config.login.clone(), passwd))
    }
}

#[async_trait]
impl Deliver for Smtp {
    async fn deliver(&self, msg: &MailMessage, identity: Option<&Identity>) -> Result<()> {
        info!(host = %self.config.host, "deliver message through smtp");

        Session {
            host: &self.config.host,
            port: self.config.port,
            security: self.config.encryption().into(),
            credentials: Some(self.credentials().await?),
        }
        .send(msg, identity)
        .await
    }
}
