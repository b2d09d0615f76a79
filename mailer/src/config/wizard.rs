//! Module dedicated to the interactive configuration.
//!
//! The flow asks for the sender identity, then for the transport, then
//! for the fields of that transport only. Every answer is validated
//! right away and asked again when invalid.

use std::{io, path::PathBuf, result};

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password, Select};
use process::Command;
use secret::Secret;
use tracing::debug;

use super::{
    validate_address, validate_host, ConfigFile, Error, Identity, Result, ValidationError,
    SCHEMA_VERSION,
};
use crate::{
    expand,
    transport::{
        LocalBinaryConfig, OAuth2Config, RelayConfig, SmtpConfig, SmtpEncryptionKind,
        TransportConfig, TransportKind, RELAY_DEFAULT_PORT,
    },
};

/// Answer removing the value of an optional field.
const CLEAR_ANSWER: &str = "-";

/// Local binaries proposed by default, in order of preference.
const LOCAL_BINARIES: [&str; 3] = ["ssmtp", "msmtp", "sendmail"];

/// The terminal the configuration is asked on.
pub trait Prompt {
    /// Asks to pick one of the given items, returns its index.
    fn select(&mut self, prompt: &str, items: &[&str], default: usize) -> io::Result<usize>;

    /// Asks for a line of text. An empty answer gives the default,
    /// if any.
    fn input(&mut self, prompt: &str, default: Option<&str>) -> io::Result<String>;

    /// Asks for a line of text without echoing it.
    fn password(&mut self, prompt: &str) -> io::Result<String>;

    fn confirm(&mut self, prompt: &str, default: bool) -> io::Result<bool>;

    /// Tells why the previous answer was refused.
    fn warn(&mut self, msg: &str);
}

/// The [`Prompt`] implementation based on [`dialoguer`].
#[derive(Default)]
pub struct DialoguerPrompt {
    theme: ColorfulTheme,
}

impl DialoguerPrompt {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prompt for DialoguerPrompt {
    fn select(&mut self, prompt: &str, items: &[&str], default: usize) -> io::Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact()
            .map_err(io::Error::other)
    }

    fn input(&mut self, prompt: &str, default: Option<&str>) -> io::Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);

        if let Some(default) = default {
            input = input.default(default.to_owned());
        }

        input.interact_text().map_err(io::Error::other)
    }

    fn password(&mut self, prompt: &str) -> io::Result<String> {
        Password::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(io::Error::other)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> io::Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(io::Error::other)
    }

    fn warn(&mut self, msg: &str) {
        eprintln!("  ✗ {msg}");
    }
}

/// Asks for a whole configuration.
///
/// Values of the given configuration are proposed as defaults. Secrets
/// of the same transport are kept when left empty.
pub fn configure(prompt: &mut impl Prompt, existing: Option<&ConfigFile>) -> Result<ConfigFile> {
    let identity = configure_identity(prompt, existing.and_then(|c| c.identity.as_ref()))?;
    let existing = existing.map(|config| &config.transport);

    let labels: Vec<&str> = TransportKind::ALL.iter().map(TransportKind::label).collect();
    let default = existing
        .and_then(|t| TransportKind::ALL.iter().position(|kind| *kind == t.kind()))
        .unwrap_or_default();

    let kind = prompt
        .select("Transport used to send emails", &labels, default)
        .map_err(Error::PromptError)?;
    let kind = TransportKind::ALL
        .get(kind)
        .copied()
        .ok_or_else(|| Error::PromptError(io::Error::other("invalid transport selection")))?;
    debug!(%kind, "transport selected");

    let transport: TransportConfig = match kind {
        TransportKind::OAuth2 => {
            let existing = match existing {
                Some(TransportConfig::OAuth2(config)) => Some(config),
                _ => None,
            };
            configure_oauth2(prompt, existing, &identity)?.into()
        }
        TransportKind::Relay => {
            let existing = match existing {
                Some(TransportConfig::Relay(config)) => Some(config),
                _ => None,
            };
            configure_relay(prompt, existing)?.into()
        }
        TransportKind::Smtp => {
            let existing = match existing {
                Some(TransportConfig::Smtp(config)) => Some(config),
                _ => None,
            };
            configure_smtp(prompt, existing, &identity)?.into()
        }
        TransportKind::LocalBinary => {
            let existing = match existing {
                Some(TransportConfig::LocalBinary(config)) => Some(config),
                _ => None,
            };
            configure_local_binary(prompt, existing)?.into()
        }
    };

    let config = ConfigFile {
        version: SCHEMA_VERSION,
        identity: Some(identity),
        transport,
    };

    config.validate().map_err(Error::ValidateConfigError)?;

    Ok(config)
}

fn configure_identity(prompt: &mut impl Prompt, existing: Option<&Identity>) -> Result<Identity> {
    let address = ask(
        prompt,
        "Sender email address",
        existing.map(|id| id.address.as_str()),
        email_address("sender address"),
    )?;

    let name = ask_optional(
        prompt,
        "Sender name",
        existing.and_then(|id| id.name.as_deref()),
        |val| Ok(val.to_owned()),
    )?;

    let reply_to = ask_optional(
        prompt,
        "Reply-to email address",
        existing.and_then(|id| id.reply_to.as_deref()),
        email_address("reply-to address"),
    )?;

    let reply_to_name = match reply_to {
        Some(_) => ask_optional(
            prompt,
            "Reply-to name",
            existing.and_then(|id| id.reply_to_name.as_deref()),
            |val| Ok(val.to_owned()),
        )?,
        None => None,
    };

    Ok(Identity {
        address,
        name,
        reply_to,
        reply_to_name,
    })
}

fn configure_oauth2(
    prompt: &mut impl Prompt,
    existing: Option<&OAuth2Config>,
    identity: &Identity,
) -> Result<OAuth2Config> {
    let client_id = ask(
        prompt,
        "OAuth 2.0 client id",
        existing.map(|c| c.client_id.as_str()),
        required("OAuth 2.0 client id"),
    )?;

    let client_secret = ask_secret(
        prompt,
        "OAuth 2.0 client secret",
        existing.map(|c| &c.client_secret),
    )?;

    let refresh_token = ask_secret(
        prompt,
        "OAuth 2.0 refresh token",
        existing.map(|c| &c.refresh_token),
    )?;

    Ok(OAuth2Config {
        client_id,
        client_secret,
        refresh_token,
        sender: identity.address.clone(),
        token_url: existing.and_then(|c| c.token_url.clone()),
        host: existing.and_then(|c| c.host.clone()),
        port: existing.and_then(|c| c.port),
        encryption: existing.and_then(|c| c.encryption.clone()),
    })
}

fn configure_relay(prompt: &mut impl Prompt, existing: Option<&RelayConfig>) -> Result<RelayConfig> {
    let host = ask(
        prompt,
        "Relay host",
        existing.map(|c| c.host.as_str()),
        required("relay host"),
    )?;

    let default_port = existing.map_or(RELAY_DEFAULT_PORT, |c| c.port).to_string();
    let port = ask(prompt, "Relay port", Some(default_port.as_str()), port("relay port"))?;

    let tls = prompt
        .confirm(
            "Does the relay expect TLS from the first byte?",
            existing.is_some_and(|c| c.tls),
        )
        .map_err(Error::PromptError)?;

    let auth = prompt
        .confirm(
            "Does the relay require authentication?",
            existing.is_some_and(|c| c.login.is_some()),
        )
        .map_err(Error::PromptError)?;

    let (login, password) = if auth {
        let login = ask(
            prompt,
            "Relay login",
            existing.and_then(|c| c.login.as_deref()),
            required("relay login"),
        )?;
        let passwd = ask_secret(
            prompt,
            "Relay password",
            existing.and_then(|c| c.password.as_ref()),
        )?;
        (Some(login), Some(passwd))
    } else {
        (None, None)
    };

    Ok(RelayConfig {
        host,
        port,
        login,
        password,
        tls,
    })
}

fn configure_smtp(
    prompt: &mut impl Prompt,
    existing: Option<&SmtpConfig>,
    identity: &Identity,
) -> Result<SmtpConfig> {
    let host = ask(
        prompt,
        "SMTP host",
        existing.map(|c| c.host.as_str()),
        required("SMTP host"),
    )?;

    let labels: Vec<String> = SmtpEncryptionKind::ALL
        .iter()
        .map(ToString::to_string)
        .collect();
    let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
    let default = existing
        .and_then(|c| {
            let encryption = c.encryption();
            SmtpEncryptionKind::ALL.iter().position(|e| *e == encryption)
        })
        .unwrap_or_default();
    let encryption = prompt
        .select("SMTP encryption", &labels, default)
        .map_err(Error::PromptError)?;
    let encryption = SmtpEncryptionKind::ALL
        .get(encryption)
        .cloned()
        .ok_or_else(|| Error::PromptError(io::Error::other("invalid encryption selection")))?;

    let default_port = match (existing, &encryption) {
        (Some(config), _) => config.port,
        (None, SmtpEncryptionKind::StartTls) => 587,
        (None, SmtpEncryptionKind::Tls) => 465,
        (None, SmtpEncryptionKind::None) => 25,
    }
    .to_string();
    let port = ask(prompt, "SMTP port", Some(default_port.as_str()), port("SMTP port"))?;

    let login = ask(
        prompt,
        "SMTP login",
        Some(existing.map_or(identity.address.as_str(), |c| c.login.as_str())),
        required("SMTP login"),
    )?;

    let password = ask_secret(
        prompt,
        "SMTP password (app password)",
        existing.map(|c| &c.password),
    )?;

    Ok(SmtpConfig {
        host,
        port,
        encryption: Some(encryption),
        login,
        password,
    })
}

fn configure_local_binary(
    prompt: &mut impl Prompt,
    existing: Option<&LocalBinaryConfig>,
) -> Result<LocalBinaryConfig> {
    let default_path = match existing {
        Some(config) => Some(config.path.display().to_string()),
        None => LOCAL_BINARIES
            .iter()
            .find_map(|name| Command::new(*name).resolve().ok())
            .map(|path| path.display().to_string()),
    };

    let path = ask(
        prompt,
        "Local binary path",
        default_path.as_deref(),
        |val: &str| {
            if val.is_empty() {
                return Err(ValidationError::EmptyFieldError("local binary path").to_string());
            }

            Command::new(expand::path(val))
                .resolve()
                .map(|_| PathBuf::from(val))
                .map_err(|err| err.to_string())
        },
    )?;

    let default_args = existing.map(|c| c.args.join(" "));
    let args = ask(
        prompt,
        "Local binary arguments (optional)",
        default_args.as_deref(),
        |val: &str| Ok(val.split_whitespace().map(ToOwned::to_owned).collect()),
    )?;

    Ok(LocalBinaryConfig { path, args })
}

/// Asks until the answer is accepted by the given parser.
fn ask<T>(
    prompt: &mut impl Prompt,
    label: &str,
    default: Option<&str>,
    parse: impl Fn(&str) -> result::Result<T, String>,
) -> Result<T> {
    loop {
        let answer = prompt.input(label, default).map_err(Error::PromptError)?;

        match parse(answer.trim()) {
            Ok(val) => return Ok(val),
            Err(err) => prompt.warn(&err),
        }
    }
}

/// Asks for an optional value. An empty answer keeps the existing
/// value, [`CLEAR_ANSWER`] removes it.
fn ask_optional<T>(
    prompt: &mut impl Prompt,
    label: &str,
    existing: Option<&str>,
    parse: impl Fn(&str) -> result::Result<T, String>,
) -> Result<Option<T>> {
    let label = match existing {
        Some(_) => format!("{label} (optional, {CLEAR_ANSWER} to clear)"),
        None => format!("{label} (optional)"),
    };

    ask(prompt, &label, existing, |val| match val {
        "" | CLEAR_ANSWER => Ok(None),
        val => parse(val).map(Some),
    })
}

/// Asks for a secret until a non-empty one is given. An empty answer
/// keeps the existing secret, if any.
fn ask_secret(prompt: &mut impl Prompt, label: &'static str, existing: Option<&Secret>) -> Result<Secret> {
    let existing = existing.filter(|secret| !secret.is_empty());

    let full_label = match existing {
        Some(_) => format!("{label} (leave empty to keep the current one)"),
        None => label.to_owned(),
    };

    loop {
        let answer = prompt.password(&full_label).map_err(Error::PromptError)?;
        let answer = answer.trim();

        match (answer.is_empty(), existing) {
            (false, _) => return Ok(Secret::new_raw(answer)),
            (true, Some(secret)) => return Ok(secret.clone()),
            (true, None) => prompt.warn(&ValidationError::EmptyFieldError(label).to_string()),
        }
    }
}

fn required(field: &'static str) -> impl Fn(&str) -> result::Result<String, String> {
    move |val| {
        validate_host(field, val)
            .map(|()| val.to_owned())
            .map_err(|err| err.to_string())
    }
}

fn email_address(field: &'static str) -> impl Fn(&str) -> result::Result<String, String> {
    move |val| {
        validate_address(field, val)
            .map(|()| val.to_owned())
            .map_err(|err| err.to_string())
    }
}

fn port(field: &'static str) -> impl Fn(&str) -> result::Result<u16, String> {
    move |val| {
        val.parse::<u16>()
            .ok()
            .filter(|port| *port != 0)
            .ok_or_else(|| ValidationError::InvalidPortError(field).to_string())
    }
}
