//! Client builder, used by the refresh flow to send requests to the
//! token endpoint.

use std::ops::Deref;

use oauth2::{reqwest, ClientId, ClientSecret, EndpointNotSet, EndpointSet, TokenUrl};

use super::{Error, Result};

type BasicClient = oauth2::basic::BasicClient<
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Client builder, used by the refresh flow to send requests to the
/// token endpoint.
#[derive(Clone, Debug)]
pub struct Client {
    inner: BasicClient,
    http: reqwest::Client,
}

impl Client {
    pub fn new(
        client_id: impl ToString,
        client_secret: Option<impl ToString>,
        token_url: impl ToString,
    ) -> Result<Self> {
        let mut client = oauth2::basic::BasicClient::new(ClientId::new(client_id.to_string()))
            .set_token_uri(
                TokenUrl::new(token_url.to_string()).map_err(Error::BuildTokenUrlError)?,
            );

        if let Some(secret) = client_secret {
            client = client.set_client_secret(ClientSecret::new(secret.to_string()));
        }

        // following redirects would expose the client secret to
        // whatever the token endpoint points to
        let http = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(Error::BuildHttpClientError)?;

        Ok(Self {
            inner: client,
            http,
        })
    }

    pub(crate) fn http_client(&self) -> &reqwest::Client {
        &self.http
    }
}

impl Deref for Client {
    type Target = BasicClient;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::Client;
    use crate::v2_0::Error;

    #[test]
    fn invalid_token_url() {
        let err = Client::new("id", Some("secret"), "not a url").unwrap_err();
        assert!(matches!(err, Error::BuildTokenUrlError(_)));
    }

    #[test]
    fn client_without_secret() {
        let client = Client::new("id", None::<String>, "https://localhost/token").unwrap();
        assert_eq!(client.client_id().as_str(), "id");
        assert_eq!(client.token_uri().as_str(), "https://localhost/token");
    }
}
