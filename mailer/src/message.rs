//! Module dedicated to the message handed over to transports.

use std::{
    fs, io,
    path::{Path, PathBuf},
    result,
};

use mail_builder::MessageBuilder;
use thiserror::Error;
use tracing::debug;

use crate::config::{validate_address, Identity, ValidationError};

/// The global `Error` enum of the module.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot build message without a sender")]
    MissingSenderError,
    #[error("cannot build message without a recipient")]
    MissingRecipientError,
    #[error("cannot build message")]
    InvalidAddressError(#[source] ValidationError),
    #[error("cannot read attachment {1}")]
    ReadAttachmentError(#[source] io::Error, PathBuf),
    #[error("cannot build message")]
    BuildMessageError(#[source] io::Error),
}

/// The global `Result` alias of the module.
pub type Result<T> = result::Result<T, Error>;

/// A file attached to a message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attachment {
    path: PathBuf,
    name: String,
}

impl Attachment {
    /// Creates an attachment named after the file name of the given
    /// path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| String::from("attachment"));

        Self { path, name }
    }

    pub fn with_name(mut self, name: impl ToString) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The message to deliver.
///
/// A message always has a sender and at least one recipient. It is
/// built once then only read by the transports.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MailMessage {
    sender: String,
    recipients: Vec<String>,
    subject: String,
    text_body: String,
    html_body: Option<String>,
    reply_to: Option<String>,
    attachments: Vec<Attachment>,
}

impl MailMessage {
    pub fn new<I, R>(
        sender: impl ToString,
        recipients: I,
        subject: impl ToString,
        text_body: impl ToString,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: ToString,
    {
        let sender = sender.to_string().trim().to_owned();
        if sender.is_empty() {
            return Err(Error::MissingSenderError);
        }

        let recipients: Vec<String> = recipients
            .into_iter()
            .map(|rcpt| rcpt.to_string().trim().to_owned())
            .filter(|rcpt| !rcpt.is_empty())
            .collect();
        if recipients.is_empty() {
            return Err(Error::MissingRecipientError);
        }

        validate_address("sender address", &sender).map_err(Error::InvalidAddressError)?;
        for rcpt in &recipients {
            validate_address("recipient address", rcpt).map_err(Error::InvalidAddressError)?;
        }

        Ok(Self {
            sender,
            recipients,
            subject: subject.to_string(),
            text_body: text_body.to_string(),
            html_body: None,
            reply_to: None,
            attachments: Vec::new(),
        })
    }

    pub fn with_html_body(mut self, html: impl ToString) -> Self {
        self.html_body = Some(html.to_string());
        self
    }

    pub fn with_reply_to(mut self, addr: impl ToString) -> Self {
        self.reply_to = Some(addr.to_string());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn text_body(&self) -> &str {
        &self.text_body
    }

    pub fn html_body(&self) -> Option<&str> {
        self.html_body.as_deref()
    }

    pub fn reply_to(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Serializes the message into raw RFC 5322 bytes.
    ///
    /// The identity, when it matches the sender, gives the display
    /// name of the `From` header and the default `Reply-To` address.
    pub fn to_vec(&self, identity: Option<&Identity>) -> Result<Vec<u8>> {
        let identity = identity.filter(|id| id.address.eq_ignore_ascii_case(&self.sender));

        let mut builder = match identity.and_then(|id| id.name.as_deref()) {
            Some(name) => MessageBuilder::new().from((name, self.sender.as_str())),
            None => MessageBuilder::new().from(self.sender.as_str()),
        };

        builder = builder
            .to(self
                .recipients
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>())
            .subject(self.subject.as_str())
            .text_body(self.text_body.as_str());

        match (self.reply_to.as_deref(), identity) {
            (Some(addr), _) => builder = builder.reply_to(addr),
            (None, Some(id)) => match (id.reply_to.as_deref(), id.reply_to_name.as_deref()) {
                (Some(addr), Some(name)) => builder = builder.reply_to((name, addr)),
                (Some(addr), None) => builder = builder.reply_to(addr),
                (None, _) => (),
            },
            (None, None) => (),
        }

        if let Some(html) = &self.html_body {
            builder = builder.html_body(html.as_str());
        }

        for attachment in &self.attachments {
            let path = &attachment.path;
            let content =
                fs::read(path).map_err(|err| Error::ReadAttachmentError(err, path.clone()))?;
            let ctype = tree_magic_mini::from_u8(&content);
            debug!(?path, ctype, "attach file");

            builder = builder.attachment(ctype, attachment.name.as_str(), content);
        }

        builder.write_to_vec().map_err(Error::BuildMessageError)
    }
}

#[cfg(test)]
mod tests {
    use std::{error::Error as _, io::Write};

    use super::{Attachment, Error, MailMessage};
    use crate::config::Identity;

    #[test]
    fn message_without_recipient() {
        let err = MailMessage::new("me@localhost", Vec::<String>::new(), "", "").unwrap_err();
        assert!(matches!(err, Error::MissingRecipientError));

        let err = MailMessage::new("me@localhost", [" "], "", "").unwrap_err();
        assert!(matches!(err, Error::MissingRecipientError));
    }

    #[test]
    fn message_with_invalid_address() {
        let err = MailMessage::new("me@localhost", ["-C/tmp/evil.conf"], "s", "b").unwrap_err();
        assert!(matches!(err, Error::InvalidAddressError(_)));
        assert!(err
            .source()
            .unwrap()
            .to_string()
            .contains("\"-C/tmp/evil.conf\""));

        let err = MailMessage::new("-me@localhost", ["you@localhost"], "s", "b").unwrap_err();
        assert!(matches!(err, Error::InvalidAddressError(_)));

        let err = MailMessage::new("me", ["you@localhost"], "s", "b").unwrap_err();
        assert!(matches!(err, Error::InvalidAddressError(_)));
    }

    #[test]
    fn message_without_sender() {
        let err = MailMessage::new("", ["you@localhost"], "", "").unwrap_err();
        assert!(matches!(err, Error::MissingSenderError));
    }

    #[test]
    fn serialize_message_with_identity() {
        let identity = Identity {
            address: String::from("me@localhost"),
            name: Some(String::from("Me")),
            reply_to: Some(String::from("noreply@localhost")),
            reply_to_name: Some(String::from("No Reply")),
        };

        let msg = MailMessage::new("me@localhost", ["a@localhost", "b@localhost"], "Hi", "Hello!")
            .unwrap()
            .to_vec(Some(&identity))
            .unwrap();
        let msg = String::from_utf8(msg).unwrap();

        let header = |name: &str| {
            msg.lines()
                .find(|line| line.starts_with(name))
                .unwrap_or_default()
                .to_owned()
        };

        assert!(header("From:").contains("Me"), "{msg}");
        assert!(header("From:").contains("<me@localhost>"), "{msg}");
        assert!(msg.contains("a@localhost"), "{msg}");
        assert!(msg.contains("b@localhost"), "{msg}");
        assert!(header("Reply-To:").contains("No Reply"), "{msg}");
        assert!(header("Reply-To:").contains("<noreply@localhost>"), "{msg}");
        assert!(msg.contains("Subject: Hi"), "{msg}");
        assert!(msg.contains("Hello!"), "{msg}");
    }

    #[test]
    fn identity_of_another_sender_is_ignored() {
        let identity = Identity {
            address: String::from("other@localhost"),
            name: Some(String::from("Other")),
            ..Default::default()
        };

        let msg = MailMessage::new("me@localhost", ["you@localhost"], "", "")
            .unwrap()
            .to_vec(Some(&identity))
            .unwrap();
        let msg = String::from_utf8(msg).unwrap();

        assert!(!msg.contains("Other"), "{msg}");
    }

    #[test]
    fn serialize_message_with_html_and_attachment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "attached content").unwrap();

        let msg = MailMessage::new("me@localhost", ["you@localhost"], "Report", "See attached.")
            .unwrap()
            .with_html_body("<p>See attached.</p>")
            .with_attachment(Attachment::new(file.path()).with_name("report.txt"))
            .to_vec(None)
            .unwrap();
        let msg = String::from_utf8(msg).unwrap();

        assert!(msg.contains("multipart/mixed"), "{msg}");
        assert!(msg.contains("text/html"), "{msg}");
        assert!(msg.contains("report.txt"), "{msg}");
    }

    #[test]
    fn missing_attachment() {
        let err = MailMessage::new("me@localhost", ["you@localhost"], "", "")
            .unwrap()
            .with_attachment(Attachment::new("/nonexistent/report.pdf"))
            .to_vec(None)
            .unwrap_err();

        assert!(matches!(err, Error::ReadAttachmentError(..)));
    }
}
