use std::{error::Error as StdError, fmt, result};

use thiserror::Error;

use crate::{config, message, transport};

/// The global `Result` alias of the library.
pub type Result<T> = result::Result<T, Error>;

/// The global `Error` enum of the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    ConfigError(#[from] config::Error),
    #[error(transparent)]
    TransportError(#[from] transport::Error),
    #[error(transparent)]
    MessageError(#[from] message::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigError(err) => err.kind(),
            Self::TransportError(err) => err.kind(),
            Self::MessageError(_) => ErrorKind::InvalidMessage,
        }
    }

    /// Renders the error and its whole source chain on one line.
    pub fn diagnostic(&self) -> String {
        diagnostic(self)
    }
}

/// Renders the given error and its whole source chain on one line,
/// joined by colons.
pub(crate) fn diagnostic(err: &dyn StdError) -> String {
    let mut diag = err.to_string();
    let mut source = err.source();

    while let Some(err) = source {
        let msg = err.to_string();
        // transparent wrappers repeat the message of their source
        if !diag.ends_with(&msg) {
            diag.push_str(": ");
            diag.push_str(&msg);
        }
        source = err.source();
    }

    diag.replace('\n', " ")
}

/// The closed set of failures a caller can react to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    ConfigMissing,
    ConfigCorrupt,
    ConfigMigrationRequired,
    ConfigMigrationError,
    ConfigInvalid,
    AuthExpired,
    AuthRejected,
    TransportUnreachable,
    MessageRejected,
    InvalidMessage,
    BinaryNotFound,
    BinaryExecutionFailed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigMissing => "ConfigMissing",
            Self::ConfigCorrupt => "ConfigCorrupt",
            Self::ConfigMigrationRequired => "ConfigMigrationRequired",
            Self::ConfigMigrationError => "ConfigMigrationError",
            Self::ConfigInvalid => "ConfigInvalid",
            Self::AuthExpired => "AuthExpired",
            Self::AuthRejected => "AuthRejected",
            Self::TransportUnreachable => "TransportUnreachable",
            Self::MessageRejected => "MessageRejected",
            Self::InvalidMessage => "InvalidMessage",
            Self::BinaryNotFound => "BinaryNotFound",
            Self::BinaryExecutionFailed => "BinaryExecutionFailed",
        }
    }

    /// Returns `true` for failures that need the user to fix the
    /// configuration (or migrate it) before anything can be sent.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigMissing
                | Self::ConfigCorrupt
                | Self::ConfigMigrationRequired
                | Self::ConfigMigrationError
                | Self::ConfigInvalid
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use thiserror::Error;

    use super::diagnostic;

    #[derive(Debug, Error)]
    enum Outer {
        #[error("cannot do outer thing")]
        Outer(#[source] Inner),
    }

    #[derive(Debug, Error)]
    enum Inner {
        #[error(transparent)]
        Io(#[from] io::Error),
    }

    #[test]
    fn diagnostic_joins_source_chain() {
        let err = Outer::Outer(Inner::Io(io::Error::other("connection refused")));
        assert_eq!(
            diagnostic(&err),
            "cannot do outer thing: connection refused"
        );
    }
}
