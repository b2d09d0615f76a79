//! Module dedicated to the legacy configuration format.
//!
//! Legacy configurations (implicit version 1) come in two shapes. A
//! flat list of `key=value` lines:
//!
//! ```text
//! # identity
//! sender=me@example.com
//! sender_name=Me
//!
//! # ISP relay
//! relay=smtp.isp.example
//! relay_port=25
//! ```
//!
//! or a YAML document without `version`, made of sections:
//!
//! ```yaml
//! user:
//!   sender: me@example.com
//!   sender-name: Me
//! OAuth2: {}
//! ISP:
//!   relay: smtp.isp.example
//! smtp: {}
//! ssmtp: {}
//! ```
//!
//! Both are read into the same flat keys. The transport is inferred
//! from the group of keys present. A file defining no group, several
//! groups, or a group missing one of its required keys is rejected:
//! the migration never guesses.

use std::{collections::HashMap, num::ParseIntError, result};

use secret::Secret;
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::{debug, warn};

use super::{ConfigFile, Identity, ValidationError, SCHEMA_VERSION};
use crate::transport::{
    LocalBinaryConfig, OAuth2Config, RelayConfig, SmtpConfig, SmtpEncryptionKind,
    TransportConfig, TransportKind,
};

/// The global `Error` enum of the module.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot parse line {0}: expected key=value")]
    ParseLineError(usize),
    #[error("cannot parse line {0}: invalid key {1:?}")]
    ParseKeyError(usize, String),
    #[error("cannot parse line {0}: key {1} is already defined")]
    DuplicateKeyError(usize, String),
    #[error("cannot infer transport: no transport key defined")]
    MissingTransportError,
    #[error("cannot infer transport: keys of several transports defined ({0})")]
    AmbiguousTransportError(String),
    #[error("cannot migrate {0} transport: missing required key {1}")]
    MissingKeyError(TransportKind, &'static str),
    #[error("cannot parse port {1:?} of key {0}")]
    ParsePortError(&'static str, String, #[source] ParseIntError),
    #[error("cannot parse boolean {1:?} of key {0}")]
    ParseBoolError(&'static str, String),
    #[error("cannot migrate invalid configuration")]
    ValidateConfigError(#[source] ValidationError),

    #[error("cannot parse legacy YAML configuration")]
    ParseYamlError(#[source] serde_yaml::Error),
    #[error("cannot parse legacy YAML configuration: section {0} is not a mapping")]
    ParseSectionError(String),
    #[error("cannot parse legacy YAML configuration: value of {0} is not a scalar")]
    ParseValueError(String),
    #[error("cannot parse legacy YAML configuration: key {0} is defined twice")]
    DuplicateYamlKeyError(String),
    #[error("cannot parse legacy OAuth 2.0 token file")]
    ParseTokenFileError(#[source] serde_yaml::Error),
}

/// The global `Result` alias of the module.
pub type Result<T> = result::Result<T, Error>;

const IDENTITY_KEYS: [&str; 4] = ["sender", "sender_name", "reply_to", "reply_to_name"];
const OAUTH2_KEYS: [&str; 3] = ["client_id", "client_secret", "refresh_token"];
const RELAY_KEYS: [&str; 5] = [
    "relay",
    "relay_port",
    "relay_username",
    "relay_password",
    "relay_tls",
];
const SMTP_KEYS: [&str; 5] = ["server", "port", "username", "password", "starttls"];
const LOCAL_BINARY_KEYS: [&str; 2] = ["ssmtp", "ssmtp_args"];

const GROUPS: [(TransportKind, &[&str]); 4] = [
    (TransportKind::OAuth2, &OAUTH2_KEYS),
    (TransportKind::Relay, &RELAY_KEYS),
    (TransportKind::Smtp, &SMTP_KEYS),
    (TransportKind::LocalBinary, &LOCAL_BINARY_KEYS),
];

/// Sections of the legacy YAML document, with the flat key each of
/// their (normalized) keys maps to.
const SECTIONS: [(&str, &[(&str, &str)]); 5] = [
    (
        "user",
        &[
            ("sender", "sender"),
            ("sender_name", "sender_name"),
            ("reply_to", "reply_to"),
            ("reply_to_name", "reply_to_name"),
        ],
    ),
    (
        "OAuth2",
        &[
            ("client_id", "client_id"),
            ("client_secret", "client_secret"),
            ("refresh_token", "refresh_token"),
        ],
    ),
    (
        "ISP",
        &[
            ("relay", "relay"),
            ("port", "relay_port"),
            ("username", "relay_username"),
            ("password", "relay_password"),
            ("tls", "relay_tls"),
        ],
    ),
    (
        "smtp",
        &[
            ("server", "server"),
            ("port", "port"),
            ("username", "username"),
            ("password", "password"),
            ("starttls", "starttls"),
        ],
    ),
    ("ssmtp", &[("path", "ssmtp"), ("args", "ssmtp_args")]),
];

/// The parsed legacy configuration.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LegacyConfig {
    entries: HashMap<String, String>,
}

impl LegacyConfig {
    /// Parses the given legacy content.
    ///
    /// Blank lines and lines starting with `#` are ignored. Keys are
    /// made of ASCII alphanumerics, `_`, `.` and `-`, with `-` read as
    /// `_`. Values are trimmed and unquoted.
    pub fn parse(content: &str) -> Result<Self> {
        let mut entries = HashMap::new();

        for (i, line) in content.lines().enumerate() {
            let num = i + 1;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, val) = line.split_once('=').ok_or(Error::ParseLineError(num))?;
            let key = key.trim();

            if !is_valid_key(key) {
                return Err(Error::ParseKeyError(num, key.to_owned()));
            }

            let key = key.replace('-', "_");

            if entries.contains_key(&key) {
                return Err(Error::DuplicateKeyError(num, key));
            }

            entries.insert(key, unquote(val.trim()).to_owned());
        }

        Ok(Self { entries })
    }

    /// Returns `true` if the given content looks like a legacy
    /// configuration: at least one `key=value` line, and nothing but
    /// such lines, comments and blank lines.
    pub fn is_legacy(content: &str) -> bool {
        let mut pairs = 0;

        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line.split_once('=') {
                Some((key, _)) if is_valid_key(key.trim()) => pairs += 1,
                _ => return false,
            }
        }

        pairs > 0
    }

    /// Parses the given legacy YAML document.
    ///
    /// Section keys are read with `-` as `_`. Keys outside of the
    /// known sections are kept as `section.key` and reported as
    /// unknown. Null values count as absent.
    pub fn parse_yaml(content: &str) -> Result<Self> {
        let doc: Mapping = serde_yaml::from_str(content).map_err(Error::ParseYamlError)?;
        let mut entries = HashMap::new();

        for (section, fields) in &doc {
            let section = scalar(section).ok_or_else(|| Error::ParseValueError(format!("{section:?}")))?;

            let fields = match fields {
                Value::Null => continue,
                Value::Mapping(fields) => fields,
                _ => return Err(Error::ParseSectionError(section)),
            };

            let known = SECTIONS
                .iter()
                .find(|(name, _)| *name == section)
                .map(|(_, keys)| *keys)
                .unwrap_or_default();

            for (key, val) in fields {
                let key = scalar(key)
                    .ok_or_else(|| Error::ParseValueError(format!("{section}.{key:?}")))?
                    .replace('-', "_");

                let flat_key = known
                    .iter()
                    .find(|(name, _)| *name == key)
                    .map(|(_, flat_key)| (*flat_key).to_owned())
                    .unwrap_or_else(|| format!("{section}.{key}"));

                let val = match val {
                    Value::Null => String::new(),
                    val => scalar(val).ok_or_else(|| Error::ParseValueError(flat_key.clone()))?,
                };

                if entries.contains_key(&flat_key) {
                    return Err(Error::DuplicateYamlKeyError(flat_key));
                }

                entries.insert(flat_key, val.trim().to_owned());
            }
        }

        Ok(Self { entries })
    }

    /// Returns `true` if the given content is a YAML document in the
    /// legacy shape: a mapping without `version`, holding at least
    /// one of the legacy sections.
    pub fn is_legacy_yaml(content: &str) -> bool {
        let Ok(doc) = serde_yaml::from_str::<Mapping>(content) else {
            return false;
        };

        !doc.contains_key("version")
            && SECTIONS
                .iter()
                .any(|(section, _)| doc.contains_key(*section))
    }

    /// Completes the OAuth 2.0 group with the refresh token of the
    /// given legacy token file, a JSON document with a `refresh` key.
    ///
    /// Nothing changes when the configuration already defines a
    /// refresh token, or defines no OAuth 2.0 client.
    pub fn with_token_file(mut self, content: &str) -> Result<Self> {
        let has_client = ["client_id", "client_secret"]
            .iter()
            .any(|key| self.get(key).is_some());

        if !has_client || self.get("refresh_token").is_some() {
            return Ok(self);
        }

        #[derive(serde::Deserialize)]
        struct TokenFile {
            refresh: Option<String>,
        }

        let token: TokenFile = serde_yaml::from_str(content).map_err(Error::ParseTokenFileError)?;

        if let Some(refresh) = token.refresh.filter(|token| !token.trim().is_empty()) {
            debug!("refresh token read from legacy token file");
            self.entries.insert(String::from("refresh_token"), refresh);
        }

        Ok(self)
    }

    /// Returns the non-empty value of the given key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .filter(|val| !val.is_empty())
    }

    /// Returns the keys not part of any known group, sorted.
    pub fn unknown_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .entries
            .keys()
            .map(String::as_str)
            .filter(|key| !is_known_key(key))
            .collect();
        keys.sort_unstable();
        keys
    }

    fn require(&self, kind: TransportKind, key: &'static str) -> Result<&str> {
        self.get(key).ok_or(Error::MissingKeyError(kind, key))
    }

    fn port(&self, key: &'static str) -> Result<Option<u16>> {
        self.get(key)
            .map(|port| {
                port.parse::<u16>()
                    .map_err(|err| Error::ParsePortError(key, port.to_owned(), err))
            })
            .transpose()
    }

    fn bool(&self, key: &'static str) -> Result<Option<bool>> {
        self.get(key)
            .map(|val| match val.to_ascii_lowercase().as_str() {
                "yes" | "y" | "true" | "1" | "on" => Ok(true),
                "no" | "n" | "false" | "0" | "off" => Ok(false),
                _ => Err(Error::ParseBoolError(key, val.to_owned())),
            })
            .transpose()
    }

    /// Infers the transport from the groups of keys holding a value.
    fn transport_kind(&self) -> Result<TransportKind> {
        let kinds: Vec<TransportKind> = GROUPS
            .iter()
            .filter(|(_, keys)| keys.iter().any(|key| self.get(key).is_some()))
            .map(|(kind, _)| *kind)
            .collect();

        match kinds.as_slice() {
            [] => Err(Error::MissingTransportError),
            [kind] => Ok(*kind),
            kinds => {
                let kinds: Vec<&str> = kinds.iter().map(TransportKind::as_str).collect();
                Err(Error::AmbiguousTransportError(kinds.join(", ")))
            }
        }
    }
}

/// Translates the given legacy configuration into the current
/// configuration document.
pub fn migrate(legacy: &LegacyConfig) -> Result<ConfigFile> {
    for key in legacy.unknown_keys() {
        warn!(key, "ignore unknown legacy configuration key");
    }

    let kind = legacy.transport_kind()?;
    debug!(%kind, "legacy transport inferred");

    let transport = match kind {
        TransportKind::OAuth2 => TransportConfig::OAuth2(OAuth2Config {
            client_id: legacy.require(kind, "client_id")?.to_owned(),
            client_secret: Secret::new_raw(legacy.require(kind, "client_secret")?),
            refresh_token: Secret::new_raw(legacy.require(kind, "refresh_token")?),
            sender: legacy.require(kind, "sender")?.to_owned(),
            token_url: None,
            host: None,
            port: None,
            encryption: None,
        }),
        TransportKind::Relay => {
            let mut config = RelayConfig {
                host: legacy.require(kind, "relay")?.to_owned(),
                tls: legacy.bool("relay_tls")?.unwrap_or_default(),
                ..Default::default()
            };

            if let Some(port) = legacy.port("relay_port")? {
                config.port = port;
            }

            match (legacy.get("relay_username"), legacy.get("relay_password")) {
                (None, None) => (),
                (Some(login), Some(passwd)) => {
                    config.login = Some(login.to_owned());
                    config.password = Some(Secret::new_raw(passwd));
                }
                (Some(_), None) => return Err(Error::MissingKeyError(kind, "relay_password")),
                (None, Some(_)) => return Err(Error::MissingKeyError(kind, "relay_username")),
            }

            TransportConfig::Relay(config)
        }
        TransportKind::Smtp => {
            let port = legacy
                .port("port")?
                .ok_or(Error::MissingKeyError(kind, "port"))?;

            let encryption = match legacy.bool("starttls")? {
                Some(false) => Some(SmtpEncryptionKind::None),
                Some(true) | None => None,
            };

            TransportConfig::Smtp(SmtpConfig {
                host: legacy.require(kind, "server")?.to_owned(),
                port,
                encryption,
                login: legacy.require(kind, "username")?.to_owned(),
                password: Secret::new_raw(legacy.require(kind, "password")?),
            })
        }
        TransportKind::LocalBinary => TransportConfig::LocalBinary(LocalBinaryConfig {
            path: legacy.require(kind, "ssmtp")?.into(),
            args: legacy
                .get("ssmtp_args")
                .map(|args| args.split_whitespace().map(ToOwned::to_owned).collect())
                .unwrap_or_default(),
        }),
    };

    let identity = legacy.get("sender").map(|addr| Identity {
        address: addr.to_owned(),
        name: legacy.get("sender_name").map(ToOwned::to_owned),
        reply_to: legacy.get("reply_to").map(ToOwned::to_owned),
        reply_to_name: legacy
            .get("reply_to_name")
            .filter(|_| legacy.get("reply_to").is_some())
            .map(ToOwned::to_owned),
    });

    let config = ConfigFile {
        version: SCHEMA_VERSION,
        identity,
        transport,
    };

    config.validate().map_err(Error::ValidateConfigError)?;

    Ok(config)
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

fn is_known_key(key: &str) -> bool {
    IDENTITY_KEYS.contains(&key) || GROUPS.iter().any(|(_, keys)| keys.contains(&key))
}

/// Reads a YAML scalar as a string.
fn scalar(val: &Value) -> Option<String> {
    match val {
        Value::String(val) => Some(val.clone()),
        Value::Number(val) => Some(val.to_string()),
        Value::Bool(val) => Some(val.to_string()),
        _ => None,
    }
}

fn unquote(val: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(val) = val
            .strip_prefix(quote)
            .and_then(|val| val.strip_suffix(quote))
        {
            return val;
        }
    }

    val
}
