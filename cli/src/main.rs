mod cli;
mod logging;

use std::{
    fs,
    io::{self, IsTerminal, Read},
    process::ExitCode,
};

use anyhow::{bail, Context};
use clap::Parser;
use mailer::{
    config::DialoguerPrompt, Attachment, ConfigStore, DeliveryResult, ErrorKind, MailMessage,
    Mailer, MigrationPolicy,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::cli::Cli;

const TEST_SUBJECT: &str = "Test Email";
const TEST_BODY: &str = "This is a test email.";

/// A delivery that did not go through.
#[derive(Debug, Error)]
#[error("{diagnostic}")]
struct DeliveryError {
    kind: Option<ErrorKind>,
    diagnostic: String,
}

impl From<DeliveryResult> for DeliveryError {
    fn from(res: DeliveryResult) -> Self {
        Self {
            kind: res.error,
            diagnostic: res.diagnostic.unwrap_or_default(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logging::init() {
        eprintln!("warning: {err}");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", render(&err));
            ExitCode::FAILURE
        }
    }
}

/// Renders the error on one line, prefixed with its kind when known.
fn render(err: &anyhow::Error) -> String {
    if let Some(err) = err.downcast_ref::<mailer::Error>() {
        return format!("error[{}]: {}", err.kind(), err.diagnostic());
    }

    match err.downcast_ref::<DeliveryError>() {
        Some(DeliveryError {
            kind: Some(kind),
            diagnostic,
        }) => format!("error[{kind}]: {diagnostic}"),
        _ => format!("error: {err:#}"),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let store = match &cli.config {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::from_default_path().map_err(mailer::Error::from)?,
    };

    let store = store.with_migration_policy(if cli.no_auto_migrate {
        MigrationPolicy::Disabled
    } else {
        MigrationPolicy::Auto
    });

    if cli.configure {
        let config = store
            .interactive_configure(&mut DialoguerPrompt::new())
            .map_err(mailer::Error::from)?;
        println!(
            "Configuration saved to {} (transport: {})",
            store.path().display(),
            config.transport.kind()
        );
        return Ok(());
    }

    if cli.migrate {
        let config = store.migrate().map_err(mailer::Error::from)?;
        println!(
            "Configuration migrated to {} (transport: {}), legacy file kept at {}",
            store.path().display(),
            config.transport.kind(),
            store.backup_path().display()
        );
        return Ok(());
    }

    let msg = build_message(&cli, &store)?;

    let res = Mailer::new(&store).send(&msg).await;

    if !res.success {
        return Err(DeliveryError::from(res).into());
    }

    info!(transport = ?res.transport_name(), "email sent");
    Ok(())
}

fn build_message(cli: &Cli, store: &ConfigStore) -> anyhow::Result<MailMessage> {
    let sender = match &cli.from {
        Some(sender) => sender.clone(),
        None => {
            let config = store.load().map_err(mailer::Error::from)?;
            match config.default_sender() {
                Some(sender) => sender.to_owned(),
                None => bail!("cannot find sender address, use --from or run `mailer --configure`"),
            }
        }
    };

    if cli.test {
        debug!(%sender, "build test message");
        let msg = MailMessage::new(&sender, [&sender], TEST_SUBJECT, TEST_BODY)
            .map_err(mailer::Error::from)?;
        return Ok(msg);
    }

    if cli.recipients.is_empty() {
        bail!("cannot send email without recipient, use -r/--recipient");
    }

    let body = match &cli.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("cannot read body from {}", path.display()))?,
        None => read_stdin()?,
    };

    let mut msg = MailMessage::new(&sender, &cli.recipients, &cli.subject, body)
        .map_err(mailer::Error::from)?;

    if let Some(path) = &cli.html {
        let html = fs::read_to_string(path)
            .with_context(|| format!("cannot read HTML body from {}", path.display()))?;
        msg = msg.with_html_body(html);
    }

    for path in &cli.attachments {
        msg = msg.with_attachment(Attachment::new(path));
    }

    Ok(msg)
}

fn read_stdin() -> anyhow::Result<String> {
    let mut stdin = io::stdin();

    if stdin.is_terminal() {
        bail!("cannot read body: use --file or pipe the body to the standard input");
    }

    let mut body = String::new();
    stdin
        .read_to_string(&mut body)
        .context("cannot read body from standard input")?;

    Ok(body)
}
