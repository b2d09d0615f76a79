//! SMTP session shared by the OAuth 2.0, relay and SMTP transports.
//!
//! A session is opened for one message then closed: connect, greet,
//! upgrade to TLS and authenticate (all done by
//! [`SmtpClientBuilder`]), send the envelope and the message, quit.

use mail_send::{
    smtp::message::{Address, Message},
    Credentials, SmtpClient, SmtpClientBuilder,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use super::{Error, Result, SmtpEncryptionKind};
use crate::{config::Identity, MailMessage};

/// How the session is protected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Security {
    /// Plain TCP session, never upgraded.
    Plain,
    /// Plain TCP session upgraded with the STARTTLS command.
    StartTls,
    /// Session wrapped in TLS from the first byte.
    Tls,
}

impl From<SmtpEncryptionKind> for Security {
    fn from(encryption: SmtpEncryptionKind) -> Self {
        match encryption {
            SmtpEncryptionKind::StartTls => Self::StartTls,
            SmtpEncryptionKind::Tls => Self::Tls,
            SmtpEncryptionKind::None => Self::Plain,
        }
    }
}

pub(crate) struct Session<'a> {
    pub host: &'a str,
    pub port: u16,
    pub security: Security,
    pub credentials: Option<Credentials<String>>,
}

impl Session<'_> {
    /// Opens the session, sends the given message then closes the
    /// session.
    pub async fn send(self, msg: &MailMessage, identity: Option<&Identity>) -> Result<()> {
        let mime = msg.to_vec(identity)?;
        let envelope = envelope(msg, &mime);

        let host = self.host;
        let port = self.port;
        let security = self.security;

        let mut builder = SmtpClientBuilder::new(host.to_owned(), port)
            .implicit_tls(security == Security::Tls);

        if let Some(credentials) = self.credentials {
            builder = builder.credentials(credentials);
        }

        info!(host, port, ?security, "connect to smtp server");

        match security {
            Security::Plain => {
                let client = builder
                    .connect_plain()
                    .await
                    .map_err(|err| connect_error(err, host, port))?;
                send(client, envelope).await
            }
            Security::StartTls | Security::Tls => {
                let client = builder
                    .connect()
                    .await
                    .map_err(|err| connect_error(err, host, port))?;
                send(client, envelope).await
            }
        }
    }
}

async fn send<T>(mut client: SmtpClient<T>, envelope: Message<'_>) -> Result<()>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let rcpt_count = envelope.rcpt_to.len();
    debug!(rcpt_count, "send message");

    client.send(envelope).await.map_err(send_error)?;

    // the message is accepted at this point
    if let Err(err) = client.quit().await {
        debug!("cannot quit smtp session: {err}");
        debug!("{err:?}");
    }

    info!(rcpt_count, "message sent");
    Ok(())
}

/// Builds the SMTP envelope: the message sender as `MAIL FROM`, its
/// recipients as `RCPT TO`.
fn envelope<'a>(msg: &'a MailMessage, mime: &'a [u8]) -> Message<'a> {
    Message {
        mail_from: Address {
            email: msg.sender().into(),
            ..Default::default()
        },
        rcpt_to: msg
            .recipients()
            .iter()
            .map(|rcpt| Address {
                email: rcpt.as_str().into(),
                ..Default::default()
            })
            .collect(),
        body: mime.into(),
    }
}

fn is_auth_error(err: &mail_send::Error) -> bool {
    matches!(
        err,
        mail_send::Error::AuthenticationFailed(_)
            | mail_send::Error::MissingCredentials
            | mail_send::Error::UnsupportedAuthMechanism
            | mail_send::Error::Auth(_)
    )
}

fn is_connection_error(err: &mail_send::Error) -> bool {
    matches!(
        err,
        mail_send::Error::Io(_) | mail_send::Error::Tls(_) | mail_send::Error::Timeout
    )
}

fn connect_error(err: mail_send::Error, host: &str, port: u16) -> Error {
    if is_auth_error(&err) {
        Error::AuthenticateError(err, host.to_owned(), port)
    } else {
        Error::ConnectError(err, host.to_owned(), port)
    }
}

fn send_error(err: mail_send::Error) -> Error {
    if is_connection_error(&err) {
        Error::ConnectionLostError(err)
    } else {
        Error::SendMessageError(err)
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::{connect_error, envelope, send_error};
    use crate::{ErrorKind, MailMessage};

    #[test]
    fn classify_connect_errors() {
        let err = connect_error(mail_send::Error::MissingCredentials, "localhost", 25);
        assert_eq!(err.kind(), ErrorKind::AuthRejected);

        let err = connect_error(mail_send::Error::UnsupportedAuthMechanism, "localhost", 25);
        assert_eq!(err.kind(), ErrorKind::AuthRejected);

        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        let err = connect_error(mail_send::Error::Io(refused), "localhost", 25);
        assert_eq!(err.kind(), ErrorKind::TransportUnreachable);
        assert_eq!(err.to_string(), "smtp server localhost:25 is unreachable");

        let err = connect_error(mail_send::Error::MissingStartTls, "localhost", 587);
        assert_eq!(err.kind(), ErrorKind::TransportUnreachable);
    }

    #[test]
    fn classify_send_errors() {
        let err = send_error(mail_send::Error::Timeout);
        assert_eq!(err.kind(), ErrorKind::TransportUnreachable);

        let err = send_error(mail_send::Error::UnparseableReply);
        assert_eq!(err.kind(), ErrorKind::MessageRejected);
    }

    #[test]
    fn envelope_from_message() {
        let msg = MailMessage::new("me@localhost", ["a@localhost", "b@localhost"], "", "").unwrap();
        let envelope = envelope(&msg, b"raw");

        assert_eq!(envelope.mail_from.email, "me@localhost");
        assert_eq!(
            envelope
                .rcpt_to
                .iter()
                .map(|rcpt| &*rcpt.email)
                .collect::<Vec<_>>(),
            vec!["a@localhost", "b@localhost"]
        );
        assert_eq!(&*envelope.body, b"raw");
    }
}
