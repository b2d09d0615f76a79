//! Asynchronous library to deal with OAuth 2.0 tokens.
//!
//! Only the refresh token flow is covered: a long-lived refresh token
//! obtained once by the user is exchanged for a short-lived access
//! token every time a protected resource needs to be accessed.

pub mod v2_0;

use std::result;

use thiserror::Error;

/// The global `Result` alias of the library.
pub type Result<T> = result::Result<T, Error>;

/// The global `Error` enum of the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    V2_0Error(#[from] v2_0::Error),
}
