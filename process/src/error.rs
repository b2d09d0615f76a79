//! # Error
//!
//! Module dedicated to process errors. It contains an [`Error`] enum
//! based on [`thiserror::Error`] and a type alias [`Result`].

use std::{io, string::FromUtf8Error};

use thiserror::Error;

/// The global `Result` alias of the library.
pub type Result<T> = std::result::Result<T, Error>;

/// The global `Error` enum of the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot find program {1}")]
    FindProgramError(#[source] which::Error, String),
    #[error("cannot spawn process for command {1}")]
    SpawnProcessError(#[source] io::Error, String),
    #[error("cannot get standard input")]
    GetStdinError,
    #[error("cannot write data to standard input")]
    WriteStdinError(#[source] io::Error),
    #[error("cannot wait for exit status code of command {1}")]
    WaitForExitStatusCodeError(#[source] io::Error, String),
    #[error("cannot get exit status code of command {0}")]
    GetExitStatusCodeNotAvailableError(String),
    #[error("command {0} returned non-zero exit status code {1}: {2}")]
    GetExitStatusCodeNonZeroError(String, i32, String),
    #[error("cannot parse command output as string")]
    ParseOutputAsUtf8StringError(#[source] FromUtf8Error),
}

impl Error {
    /// Return `true` if the program of the command could not be
    /// found, either at resolution time or at spawn time.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::FindProgramError(..) => true,
            Self::SpawnProcessError(err, _) => err.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
