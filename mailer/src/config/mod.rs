//! Module dedicated to the configuration.
//!
//! The configuration is a YAML document holding an optional sender
//! [`Identity`] and exactly one transport. It is written by the
//! interactive [`ConfigStore::interactive_configure`] flow (or by the
//! legacy migration) and only read by delivery code.

pub mod legacy;
mod store;
pub mod wizard;

use std::{io, path::PathBuf, result};

use secret::Secret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[doc(inline)]
pub use self::{
    store::{ConfigStore, MigrationPolicy},
    wizard::{DialoguerPrompt, Prompt},
};
use crate::{transport::TransportConfig, ErrorKind};

/// The version of the configuration document written by this
/// library. The flat `key=value` format is implicitly version 1.
pub const SCHEMA_VERSION: u32 = 2;

/// The global `Error` enum of the module.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot find user configuration directory")]
    GetConfigDirError,
    #[error("cannot find configuration file {0}, run `mailer --configure` to create it")]
    ReadMissingConfigError(PathBuf),
    #[error("cannot read configuration file {1}")]
    ReadConfigError(#[source] io::Error, PathBuf),
    #[error("cannot parse configuration file {1}")]
    ParseConfigError(#[source] serde_yaml::Error, PathBuf),
    #[error("cannot load configuration file {1}: unsupported version {0}")]
    UnsupportedVersionError(u32, PathBuf),
    #[error("cannot load configuration file {1}")]
    InvalidConfigError(#[source] ValidationError, PathBuf),
    #[error("cannot load legacy configuration file {0}, run `mailer --migrate` to convert it")]
    MigrationRequiredError(PathBuf),
    #[error("cannot migrate legacy configuration file {1}")]
    MigrateConfigError(#[source] legacy::Error, PathBuf),
    #[error("cannot migrate configuration file {0}: file is not in the legacy format")]
    MigrateNonLegacyConfigError(PathBuf),
    #[error("cannot backup legacy configuration file to {1}")]
    BackupConfigError(#[source] io::Error, PathBuf),

    #[error("cannot save invalid configuration")]
    ValidateConfigError(#[source] ValidationError),
    #[error("cannot serialize configuration")]
    SerializeConfigError(#[source] serde_yaml::Error),
    #[error("cannot create configuration directory {1}")]
    CreateConfigDirError(#[source] io::Error, PathBuf),
    #[error("cannot create temporary configuration file in {1}")]
    CreateTempFileError(#[source] io::Error, PathBuf),
    #[error("cannot write temporary configuration file {1}")]
    WriteTempFileError(#[source] io::Error, PathBuf),
    #[error("cannot replace configuration file {1}")]
    PersistConfigError(#[source] io::Error, PathBuf),
    #[error("cannot prompt configuration")]
    PromptError(#[source] io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::GetConfigDirError | Self::ReadMissingConfigError(_) => ErrorKind::ConfigMissing,
            Self::ReadConfigError(..)
            | Self::ParseConfigError(..)
            | Self::UnsupportedVersionError(..)
            | Self::InvalidConfigError(..) => ErrorKind::ConfigCorrupt,
            Self::MigrationRequiredError(_) => ErrorKind::ConfigMigrationRequired,
            Self::MigrateConfigError(..)
            | Self::MigrateNonLegacyConfigError(_)
            | Self::BackupConfigError(..) => ErrorKind::ConfigMigrationError,
            Self::ValidateConfigError(_)
            | Self::SerializeConfigError(_)
            | Self::CreateConfigDirError(..)
            | Self::CreateTempFileError(..)
            | Self::WriteTempFileError(..)
            | Self::PersistConfigError(..)
            | Self::PromptError(_) => ErrorKind::ConfigInvalid,
        }
    }
}

/// The global `Result` alias of the module.
pub type Result<T> = result::Result<T, Error>;

/// A configuration field holding an unusable value.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyFieldError(&'static str),
    #[error("{0} must be between 1 and 65535")]
    InvalidPortError(&'static str),
    #[error("{0} {1:?} is not an email address")]
    InvalidAddressError(&'static str, String),
    #[error("{0} must not be none")]
    UnencryptedFieldError(&'static str),
}

/// Checks that the given host is not blank.
pub fn validate_host(field: &'static str, host: &str) -> result::Result<(), ValidationError> {
    if host.trim().is_empty() {
        return Err(ValidationError::EmptyFieldError(field));
    }
    Ok(())
}

/// Checks that the given port is a valid, non-zero TCP port.
pub fn validate_port(field: &'static str, port: u16) -> result::Result<(), ValidationError> {
    if port == 0 {
        return Err(ValidationError::InvalidPortError(field));
    }
    Ok(())
}

/// Checks that the given address looks like an email address.
///
/// Addresses are handed over as arguments to local binaries, so they
/// cannot start with `-` nor contain whitespace.
pub fn validate_address(field: &'static str, addr: &str) -> result::Result<(), ValidationError> {
    let addr = addr.trim();

    if addr.is_empty() {
        return Err(ValidationError::EmptyFieldError(field));
    }

    if addr.starts_with('-') || addr.contains(char::is_whitespace) {
        return Err(ValidationError::InvalidAddressError(field, addr.to_owned()));
    }

    match addr.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidAddressError(field, addr.to_owned())),
    }
}

/// Checks that the given secret is either a non-blank raw value or a
/// command.
pub fn validate_secret(field: &'static str, secret: &Secret) -> result::Result<(), ValidationError> {
    if secret.is_empty() {
        return Err(ValidationError::EmptyFieldError(field));
    }
    Ok(())
}

/// The sender identity.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Identity {
    /// The sender email address.
    pub address: String,

    /// The sender display name, used in the `From` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The default `Reply-To` address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,

    /// The display name of the default `Reply-To` address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_name: Option<String>,
}

impl Identity {
    pub fn validate(&self) -> result::Result<(), ValidationError> {
        validate_address("sender address", &self.address)?;

        if let Some(addr) = &self.reply_to {
            validate_address("reply-to address", addr)?;
        }

        Ok(())
    }
}

/// The configuration document.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    /// The schema version of the document.
    pub version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,

    /// The one and only transport used to deliver messages.
    pub transport: TransportConfig,
}

impl ConfigFile {
    pub fn new(transport: impl Into<TransportConfig>) -> Self {
        Self {
            version: SCHEMA_VERSION,
            identity: None,
            transport: transport.into(),
        }
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn validate(&self) -> result::Result<(), ValidationError> {
        if let Some(identity) = &self.identity {
            identity.validate()?;
        }

        self.transport.validate()
    }

    /// Returns the address messages are sent from when the caller
    /// does not give one: the identity address, then the address the
    /// transport authenticates as.
    pub fn default_sender(&self) -> Option<&str> {
        self.identity
            .as_ref()
            .map(|identity| identity.address.as_str())
            .or_else(|| self.transport.sender())
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_address, validate_port, ValidationError};

    #[test]
    fn address_validation() {
        assert_eq!(validate_address("sender", "me@localhost"), Ok(()));
        assert_eq!(
            validate_address("sender", " "),
            Err(ValidationError::EmptyFieldError("sender"))
        );
        assert_eq!(
            validate_address("sender", "me"),
            Err(ValidationError::InvalidAddressError("sender", "me".into()))
        );
        assert_eq!(
            validate_address("sender", "@localhost"),
            Err(ValidationError::InvalidAddressError("sender", "@localhost".into()))
        );
        assert_eq!(
            validate_address("recipient", "-C/tmp/evil.conf@localhost"),
            Err(ValidationError::InvalidAddressError(
                "recipient",
                "-C/tmp/evil.conf@localhost".into()
            ))
        );
        assert_eq!(
            validate_address("recipient", "a b@localhost"),
            Err(ValidationError::InvalidAddressError("recipient", "a b@localhost".into()))
        );
    }

    #[test]
    fn port_validation() {
        assert_eq!(validate_port("port", 25), Ok(()));
        assert_eq!(
            validate_port("port", 0),
            Err(ValidationError::InvalidPortError("port"))
        );
    }
}
