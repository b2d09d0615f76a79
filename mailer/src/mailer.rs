//! Module dedicated to the mailer facade.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    error::diagnostic,
    transport::{AccessTokenProvider, Deliver, RefreshAccessTokenProvider, Transport},
    ConfigStore, Error, ErrorKind, MailMessage, TransportKind,
};

/// The outcome of one [`Mailer::send`] call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeliveryResult {
    pub success: bool,

    /// The transport delivery was attempted with. Absent when the
    /// configuration could not be loaded.
    pub transport: Option<TransportKind>,

    pub error: Option<ErrorKind>,

    /// One-line description of the failure and its causes.
    pub diagnostic: Option<String>,
}

impl DeliveryResult {
    fn success(transport: TransportKind) -> Self {
        Self {
            success: true,
            transport: Some(transport),
            error: None,
            diagnostic: None,
        }
    }

    fn failure(transport: Option<TransportKind>, err: Error) -> Self {
        Self {
            success: false,
            transport,
            error: Some(err.kind()),
            diagnostic: Some(diagnostic(&err)),
        }
    }

    /// Returns the name of the attempted transport, as written in the
    /// configuration.
    pub fn transport_name(&self) -> Option<&'static str> {
        self.transport.as_ref().map(TransportKind::as_str)
    }

    /// Returns `true` if nothing was sent because of the
    /// configuration.
    pub fn is_configuration_error(&self) -> bool {
        self.error
            .as_ref()
            .is_some_and(ErrorKind::is_configuration_error)
    }
}

/// The mailer facade.
///
/// The configuration is loaded on every call, and each message is
/// delivered with exactly one attempt through the configured
/// transport.
pub struct Mailer<'a> {
    store: &'a ConfigStore,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl<'a> Mailer<'a> {
    pub fn new(store: &'a ConfigStore) -> Self {
        Self::with_token_provider(store, Arc::new(RefreshAccessTokenProvider))
    }

    pub fn with_token_provider(
        store: &'a ConfigStore,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self { store, tokens }
    }

    /// Sends the given message.
    ///
    /// Failures are reported in the returned [`DeliveryResult`],
    /// never retried.
    pub async fn send(&self, msg: &MailMessage) -> DeliveryResult {
        let config = match self.store.load() {
            Ok(config) => config,
            Err(err) => {
                let err = Error::from(err);
                warn!(kind = %err.kind(), "cannot load configuration: {err}");
                return DeliveryResult::failure(None, err);
            }
        };

        let transport = Transport::new(&config.transport, self.tokens.clone());
        let kind = transport.kind();
        info!(%kind, rcpt_count = msg.recipients().len(), "send message");

        match transport.deliver(msg, config.identity.as_ref()).await {
            Ok(()) => {
                info!(%kind, "message delivered");
                DeliveryResult::success(kind)
            }
            Err(err) => {
                let err = Error::from(err);
                warn!(%kind, error = %err.kind(), "cannot deliver message: {err}");
                debug!("{err:?}");
                DeliveryResult::failure(Some(kind), err)
            }
        }
    }
}
