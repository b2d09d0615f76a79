use process::Command;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Serde representation of a secret.
///
/// A raw secret is a plain string, a command secret is a map with a
/// single `command` key:
///
/// ```yaml
/// password: hunter2
/// # or
/// password:
///   command: pass show mail/app-password
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Secret {
    Raw(String),
    Command {
        #[serde(alias = "cmd")]
        command: Command,
    },
}

impl TryFrom<Secret> for crate::Secret {
    type Error = Error;

    fn try_from(secret: Secret) -> Result<Self, Self::Error> {
        match secret {
            Secret::Raw(raw) => Ok(Self::Raw(raw)),
            Secret::Command { command } if command.is_empty() => Err(Error::ParseEmptyCommandError),
            Secret::Command { command } => Ok(Self::Command(command)),
        }
    }
}

impl From<crate::Secret> for Secret {
    fn from(secret: crate::Secret) -> Self {
        match secret {
            crate::Secret::Raw(raw) => Self::Raw(raw),
            crate::Secret::Command(command) => Self::Command { command },
        }
    }
}
