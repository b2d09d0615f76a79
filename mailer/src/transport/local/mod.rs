//! Module dedicated to the local binary transport.

mod config;

use async_trait::async_trait;
use process::Command;
use tracing::{debug, info};

#[doc(inline)]
pub use self::config::LocalBinaryConfig;
use super::{Deliver, Error, Result};
use crate::{config::Identity, expand, MailMessage};

/// The local binary transport.
///
/// The binary is spawned with the configured arguments, then `--`,
/// then the recipients, and receives the message on its standard
/// input.
pub struct LocalBinary {
    config: LocalBinaryConfig,
}

impl LocalBinary {
    pub fn new(config: LocalBinaryConfig) -> Self {
        Self { config }
    }

    fn command(&self, msg: &MailMessage) -> Command {
        Command::new(expand::path(&self.config.path))
            .args(&self.config.args)
            .arg("--")
            .args(msg.recipients())
    }
}

#[async_trait]
impl Deliver for LocalBinary {
    async fn deliver(&self, msg: &MailMessage, identity: Option<&Identity>) -> Result<()> {
        let cmd = self.command(msg);
        let path = cmd.program().to_owned();
        info!(?path, "deliver message through local binary");

        cmd.resolve()
            .map_err(|err| Error::FindBinaryError(err, path.clone()))?;

        let mime = msg.to_vec(identity)?;

        let output = cmd.run_with(mime).await.map_err(|err| {
            if err.is_not_found() {
                Error::FindBinaryError(err, path.clone())
            } else {
                Error::ExecuteBinaryError(err, path.clone())
            }
        })?;

        debug!(out = %output.to_string_lossy(), "local binary exited");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{LocalBinary, LocalBinaryConfig};
    use crate::MailMessage;

    #[test]
    fn recipients_follow_options_separator() {
        let transport = LocalBinary::new(LocalBinaryConfig {
            path: "/usr/sbin/ssmtp".into(),
            args: vec![String::from("-v")],
        });
        let msg = MailMessage::new("me@localhost", ["a@localhost", "b@localhost"], "", "").unwrap();

        assert_eq!(
            transport.command(&msg).to_string(),
            "/usr/sbin/ssmtp -v -- a@localhost b@localhost"
        );
    }
}
