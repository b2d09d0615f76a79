//! Module dedicated to transports.
//!
//! A transport delivers one message. The set of transports is closed:
//! the configured [`TransportConfig`] maps to exactly one
//! [`Transport`] variant, and there is no fallback from one variant to
//! another.

mod config;
pub mod local;
pub mod oauth2;
pub mod relay;
mod session;
pub mod smtp;

use std::{fmt, path::PathBuf, result, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;

#[doc(inline)]
pub use self::{
    config::TransportConfig,
    local::{LocalBinary, LocalBinaryConfig},
    oauth2::{AccessTokenProvider, OAuth2, OAuth2Config, RefreshAccessTokenProvider},
    relay::{Relay, RelayConfig, RELAY_DEFAULT_PORT},
    smtp::{Smtp, SmtpConfig, SmtpEncryptionKind},
};
use crate::{config::Identity, message, ErrorKind, MailMessage};

/// The global `Error` enum of the module.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot refresh OAuth 2.0 access token, run `mailer --configure` to renew the refresh token")]
    RefreshAccessTokenRejectedError(#[source] oauth::v2_0::Error),
    #[error("cannot refresh OAuth 2.0 access token: token endpoint is unreachable")]
    RefreshAccessTokenError(#[source] oauth::v2_0::Error),
    #[error("cannot build OAuth 2.0 client")]
    BuildOAuth2ClientError(#[source] oauth::v2_0::Error),
    #[error("cannot get {1}")]
    GetSecretError(#[source] secret::Error, &'static str),

    #[error("smtp server {1}:{2} is unreachable")]
    ConnectError(#[source] mail_send::Error, String, u16),
    #[error("cannot authenticate to smtp server {1}:{2}")]
    AuthenticateError(#[source] mail_send::Error, String, u16),
    #[error("smtp server rejected the message")]
    SendMessageError(#[source] mail_send::Error),
    #[error("cannot send message: connection to smtp server lost")]
    ConnectionLostError(#[source] mail_send::Error),

    #[error("cannot find local binary {1}")]
    FindBinaryError(#[source] process::Error, PathBuf),
    #[error("local binary {1} failed")]
    ExecuteBinaryError(#[source] process::Error, PathBuf),

    #[error(transparent)]
    MessageError(#[from] message::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RefreshAccessTokenRejectedError(_) => ErrorKind::AuthExpired,
            Self::RefreshAccessTokenError(_) => ErrorKind::TransportUnreachable,
            Self::BuildOAuth2ClientError(_) | Self::GetSecretError(..) => ErrorKind::ConfigInvalid,
            Self::ConnectError(..) | Self::ConnectionLostError(_) => {
                ErrorKind::TransportUnreachable
            }
            Self::AuthenticateError(..) => ErrorKind::AuthRejected,
            Self::SendMessageError(_) => ErrorKind::MessageRejected,
            Self::FindBinaryError(..) => ErrorKind::BinaryNotFound,
            Self::ExecuteBinaryError(..) => ErrorKind::BinaryExecutionFailed,
            Self::MessageError(_) => ErrorKind::InvalidMessage,
        }
    }
}

/// The global `Result` alias of the module.
pub type Result<T> = result::Result<T, Error>;

/// The kind of a transport, as written in the `kind` field of the
/// configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TransportKind {
    OAuth2,
    Relay,
    Smtp,
    LocalBinary,
}

impl TransportKind {
    pub const ALL: [TransportKind; 4] = [Self::OAuth2, Self::Relay, Self::Smtp, Self::LocalBinary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OAuth2 => "oauth2",
            Self::Relay => "relay",
            Self::Smtp => "smtp",
            Self::LocalBinary => "local-binary",
        }
    }

    /// Human readable description, used by the interactive
    /// configuration.
    pub fn label(&self) -> &'static str {
        match self {
            Self::OAuth2 => "Gmail (OAuth 2.0)",
            Self::Relay => "ISP relay",
            Self::Smtp => "SMTP server (login and app password)",
            Self::LocalBinary => "Local binary (ssmtp, sendmail…)",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivers one message.
///
/// Implementations make exactly one attempt and never retry.
#[async_trait]
pub trait Deliver: Send + Sync {
    async fn deliver(&self, msg: &MailMessage, identity: Option<&Identity>) -> Result<()>;
}

/// The closed set of transports.
pub enum Transport {
    OAuth2(OAuth2),
    Relay(Relay),
    Smtp(Smtp),
    LocalBinary(LocalBinary),
}

impl Transport {
    /// Builds the transport matching the given configuration.
    ///
    /// The token provider is only used by the OAuth 2.0 transport.
    pub fn new(config: &TransportConfig, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        match config {
            TransportConfig::OAuth2(config) => Self::OAuth2(OAuth2::new(config.clone(), tokens)),
            TransportConfig::Relay(config) => Self::Relay(Relay::new(config.clone())),
            TransportConfig::Smtp(config) => Self::Smtp(Smtp::new(config.clone())),
            TransportConfig::LocalBinary(config) => {
                Self::LocalBinary(LocalBinary::new(config.clone()))
            }
        }
    }

    pub fn kind(&self) -> TransportKind {
        match self {
            Self::OAuth2(_) => TransportKind::OAuth2,
            Self::Relay(_) => TransportKind::Relay,
            Self::Smtp(_) => TransportKind::Smtp,
            Self::LocalBinary(_) => TransportKind::LocalBinary,
        }
    }
}

#[async_trait]
impl Deliver for Transport {
    async fn deliver(&self, msg: &MailMessage, identity: Option<&Identity>) -> Result<()> {
        match self {
            Self::OAuth2(transport) => transport.deliver(msg, identity).await,
            Self::Relay(transport) => transport.deliver(msg, identity).await,
            Self::Smtp(transport) => transport.deliver(msg, identity).await,
            Self::LocalBinary(transport) => transport.deliver(msg, identity).await,
        }
    }
}
