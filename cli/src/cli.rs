use std::path::PathBuf;

use clap::Parser;

/// Send emails through the configured transport.
///
/// The message body is read from --file, or from standard input.
#[derive(Parser, Debug)]
#[command(name = "mailer", version, about, long_about = None)]
pub struct Cli {
    /// Configure the identity and the transport interactively
    #[arg(short = 'c', long, conflicts_with_all = ["migrate", "test"])]
    pub configure: bool,

    /// Convert the legacy configuration file to the current format
    #[arg(long, conflicts_with = "test")]
    pub migrate: bool,

    /// Send a test email to the sender address
    #[arg(short = 't', long)]
    pub test: bool,

    /// Recipient address, can be repeated
    #[arg(short = 'r', long = "recipient", value_name = "ADDRESS")]
    pub recipients: Vec<String>,

    /// Subject of the email
    #[arg(short, long, default_value = "No Subject Specified")]
    pub subject: String,

    /// File containing the plain text body
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// File containing an HTML alternative body
    #[arg(short = 'l', long, value_name = "PATH")]
    pub html: Option<PathBuf>,

    /// File to attach, can be repeated
    #[arg(short, long = "attach", value_name = "PATH")]
    pub attachments: Vec<PathBuf>,

    /// Sender address, defaults to the configured identity
    #[arg(long, value_name = "ADDRESS")]
    pub from: Option<String>,

    /// Path to the configuration file
    #[arg(long, value_name = "PATH", env = "MAILER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Refuse legacy configuration files instead of migrating them in
    /// memory
    #[arg(long)]
    pub no_auto_migrate: bool,
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::Cli;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_send_args() {
        let cli = Cli::try_parse_from([
            "mailer",
            "-r",
            "a@localhost",
            "--recipient",
            "b@localhost",
            "-s",
            "Report",
            "-a",
            "report.pdf",
            "-l",
            "report.html",
        ])
        .unwrap();

        assert_eq!(cli.recipients, ["a@localhost", "b@localhost"]);
        assert_eq!(cli.subject, "Report");
        assert_eq!(cli.attachments.len(), 1);
        assert!(cli.html.is_some());
        assert!(!cli.configure);
    }

    #[test]
    fn default_subject() {
        let cli = Cli::try_parse_from(["mailer", "-r", "a@localhost"]).unwrap();
        assert_eq!(cli.subject, "No Subject Specified");
    }

    #[test]
    fn configure_conflicts_with_test() {
        assert!(Cli::try_parse_from(["mailer", "-c", "-t"]).is_err());
    }
}
