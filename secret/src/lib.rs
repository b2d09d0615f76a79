//! Asynchronous library to retrieve credentials.
//!
//! A [`Secret`] is either stored raw, or produced by a shell command
//! whose first output line is the secret (for example `pass show
//! mail/app-password`), which keeps the credential itself out of
//! configuration files.

#[cfg(feature = "derive")]
mod derive;
mod error;

use std::fmt;

use process::Command;
use tracing::debug;

#[doc(inline)]
pub use crate::error::{Error, Result};

/// The secret enum.
#[derive(Clone, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "derive::Secret", into = "derive::Secret")
)]
pub enum Secret {
    /// The secret is contained in a raw string.
    Raw(String),

    /// The secret is the first line of the output of a shell command.
    Command(Command),
}

impl Default for Secret {
    fn default() -> Self {
        Self::Raw(String::new())
    }
}

impl Secret {
    pub fn new_raw(raw: impl ToString) -> Self {
        Self::Raw(raw.to_string())
    }

    pub fn new_command(cmd: impl Into<Command>) -> Self {
        Self::Command(cmd.into())
    }

    /// Returns `true` if the secret has no value nor command.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Raw(raw) => raw.trim().is_empty(),
            Self::Command(cmd) => cmd.is_empty(),
        }
    }

    /// Gets the secret value.
    pub async fn get(&self) -> Result<String> {
        match self {
            Self::Raw(raw) if raw.is_empty() => Err(Error::GetUndefinedSecretError),
            Self::Raw(raw) => Ok(raw.clone()),
            Self::Command(cmd) => {
                debug!(%cmd, "getting secret from command");

                let secret = cmd
                    .run()
                    .await
                    .map_err(Error::GetSecretFromCommandError)?
                    .first_line()
                    .filter(|line| !line.trim().is_empty())
                    .ok_or(Error::GetSecretFromCommandEmptyOutputError)?;

                Ok(secret)
            }
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(raw) if raw.is_empty() => f.write_str("Raw(\"\")"),
            Self::Raw(_) => f.write_str("Raw(<redacted>)"),
            Self::Command(cmd) => f.debug_tuple("Command").field(cmd).finish(),
        }
    }
}
