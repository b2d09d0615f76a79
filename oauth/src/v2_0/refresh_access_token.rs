//! # Refresh access token
//!
//! Exchange of a refresh token against a fresh access token, see
//! [section 6 of RFC6749](https://datatracker.ietf.org/doc/html/rfc6749#section-6).

use oauth2::{RefreshToken, RequestTokenError, TokenResponse};
use tracing::debug;

use super::{Client, Error, Result};

/// Refresh token flow.
///
/// The token endpoint answers with an access token, and sometimes
/// with a rotated refresh token that replaces the one sent.
#[derive(Debug, Default)]
pub struct RefreshAccessToken;

impl RefreshAccessToken {
    pub fn new() -> Self {
        Self
    }

    /// Sends the refresh request, returning the access token and the
    /// rotated refresh token if any.
    ///
    /// An error answer of the token endpoint (for example
    /// `invalid_grant` for a revoked token) gives
    /// [`Error::RefreshAccessTokenRejectedError`].
    pub async fn refresh_access_token(
        &self,
        client: &Client,
        refresh_token: impl ToString,
    ) -> Result<(String, Option<String>)> {
        debug!(url = client.token_uri().as_str(), "refresh access token");

        let res = client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(client.http_client())
            .await
            .map_err(|err| match err {
                RequestTokenError::ServerResponse(res) => Error::RefreshAccessTokenRejectedError(
                    res.error().to_string(),
                    res.error_description().cloned(),
                ),
                RequestTokenError::Request(err) => {
                    Error::SendRefreshAccessTokenRequestError(Box::new(err))
                }
                RequestTokenError::Parse(err, _) => {
                    Error::ParseRefreshAccessTokenResponseError(Box::new(err))
                }
                RequestTokenError::Other(err) => Error::RefreshAccessTokenError(err),
            })?;

        let access_token = res.access_token().secret().clone();
        let rotated = res.refresh_token().map(|token| token.secret().clone());
        debug!(rotated = rotated.is_some(), "access token refreshed");

        Ok((access_token, rotated))
    }
}
