use oauth2::{reqwest, HttpClientError};
use thiserror::Error;

/// The global `Result` alias of the module.
pub type Result<T> = std::result::Result<T, Error>;

/// The global `Error` enum of the module.
#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot build token url")]
    BuildTokenUrlError(#[source] oauth2::url::ParseError),
    #[error("cannot build http client")]
    BuildHttpClientError(#[source] reqwest::Error),

    #[error("cannot send refresh access token request")]
    SendRefreshAccessTokenRequestError(#[source] Box<HttpClientError<reqwest::Error>>),
    #[error("cannot refresh access token: token endpoint answered {0}{}", .1.as_ref().map(|d| format!(" ({d})")).unwrap_or_default())]
    RefreshAccessTokenRejectedError(String, Option<String>),
    #[error("cannot parse refresh access token response")]
    ParseRefreshAccessTokenResponseError(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("cannot refresh access token: {0}")]
    RefreshAccessTokenError(String),
}

impl Error {
    /// Returns `true` if the token endpoint was reached and refused
    /// the refresh token (expired, revoked or unknown client).
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::RefreshAccessTokenRejectedError(..))
    }
}
