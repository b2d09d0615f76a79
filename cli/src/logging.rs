//! Logging setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the tracing subscriber.
///
/// Logs go to stderr so they never mix with what scripts read on
/// stdout. The level is taken from `RUST_LOG`, `warn` by default:
///
/// - `RUST_LOG=info` shows each delivery step,
/// - `RUST_LOG=mailer=debug,mail_send=debug` shows the SMTP session.
pub fn init() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init()
        .map_err(|err| anyhow::anyhow!("cannot initialize tracing: {err}"))
}
