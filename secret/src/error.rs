use std::result;

use thiserror::Error;

/// The global `Result` alias of the library.
pub type Result<T> = result::Result<T, Error>;

/// The global `Error` enum of the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot get secret: secret is not defined")]
    GetUndefinedSecretError,
    #[error("cannot get secret from command")]
    GetSecretFromCommandError(#[source] process::Error),
    #[error("cannot get secret from command: output is empty")]
    GetSecretFromCommandEmptyOutputError,
    #[cfg(feature = "derive")]
    #[error("cannot parse secret: command is empty")]
    ParseEmptyCommandError,
}
