//! Asynchronous library to send personal emails.
//!
//! Callers hand a [`MailMessage`] to the [`Mailer`] facade without
//! knowing how it leaves the machine: the [`ConfigStore`] loads the
//! configured transport (Gmail through OAuth 2.0, an ISP relay, an
//! authenticated SMTP server or a local `sendmail`-like binary) and
//! the message is delivered exactly once through it.
//!
//! ```rust,no_run
//! use mailer::{ConfigStore, MailMessage, Mailer};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = ConfigStore::from_default_path()?;
//! let msg = MailMessage::new("me@localhost", ["you@localhost"], "Hello", "Hello, world!")?;
//!
//! let res = Mailer::new(&store).send(&msg).await;
//! assert!(res.success, "{:?}", res.diagnostic);
//! # Ok(())
//! # }
//! ```

pub mod config;
mod error;
mod expand;
mod mailer;
pub mod message;
pub mod transport;

#[doc(inline)]
pub use crate::{
    config::{ConfigFile, ConfigStore, Identity, MigrationPolicy},
    error::{Error, ErrorKind, Result},
    mailer::{DeliveryResult, Mailer},
    message::{Attachment, MailMessage},
    transport::{Transport, TransportConfig, TransportKind},
};
