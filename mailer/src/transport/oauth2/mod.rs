//! Module dedicated to the OAuth 2.0 transport.
//!
//! Gmail accepts SMTP sessions authenticated with the XOAUTH2
//! mechanism. A fresh access token is obtained from the long-lived
//! refresh token before every delivery.

mod config;

use std::sync::Arc;

use async_trait::async_trait;
use mail_send::Credentials;
use oauth::v2_0::{Client, RefreshAccessToken};
use tracing::{debug, info};

#[doc(inline)]
pub use self::config::{OAuth2Config, GMAIL_SMTP_HOST, GMAIL_SMTP_PORT, GMAIL_TOKEN_URL};
use super::{session::Session, Deliver, Error, Result};
use crate::{config::Identity, MailMessage};

/// Exchanges a refresh token for an access token.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn refresh(
        &self,
        token_url: &str,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<String>;
}

/// Access token provider sending refresh requests to the token
/// endpoint.
#[derive(Clone, Debug, Default)]
pub struct RefreshAccessTokenProvider;

#[async_trait]
impl AccessTokenProvider for RefreshAccessTokenProvider {
    async fn refresh(
        &self,
        token_url: &str,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<String> {
        let client = Client::new(client_id, Some(client_secret), token_url)
            .map_err(Error::BuildOAuth2ClientError)?;

        let (access_token, new_refresh_token) = RefreshAccessToken::new()
            .refresh_access_token(&client, refresh_token)
            .await
            .map_err(|err| {
                if err.is_rejected() {
                    Error::RefreshAccessTokenRejectedError(err)
                } else {
                    Error::RefreshAccessTokenError(err)
                }
            })?;

        // delivery never writes the configuration, the configured
        // refresh token stays valid after rotation
        if new_refresh_token.is_some() {
            debug!("ignore rotated refresh token");
        }

        Ok(access_token)
    }
}

/// The OAuth 2.0 transport.
pub struct OAuth2 {
    config: OAuth2Config,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl OAuth2 {
    pub fn new(config: OAuth2Config, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        Self { config, tokens }
    }

    async fn access_token(&self) -> Result<String> {
        let client_secret = self
            .config
            .client_secret
            .get()
            .await
            .map_err(|err| Error::GetSecretError(err, "OAuth 2.0 client secret"))?;
        let refresh_token = self
            .config
            .refresh_token
            .get()
            .await
            .map_err(|err| Error::GetSecretError(err, "OAuth 2.0 refresh token"))?;

        debug!(url = self.config.token_url(), "refresh access token");

        self.tokens
            .refresh(
                self.config.token_url(),
                &self.config.client_id,
                &client_secret,
                &refresh_token,
            )
            .await
    }
}

#[async_trait]
impl Deliver for OAuth2 {
    async fn deliver(&self, msg: &MailMessage, identity: Option<&Identity>) -> Result<()> {
        info!(sender = %self.config.sender, "deliver message through gmail");

        let access_token = self.access_token().await?;
        let credentials = Credentials::new_xoauth2(self.config.sender.clone(), access_token);

        Session {
            host: self.config.host(),
            port: self.config.port(),
            security: self.config.encryption().into(),
            credentials: Some(credentials),
        }
        .send(msg, identity)
        .await
    }
}
