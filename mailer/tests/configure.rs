use std::{collections::VecDeque, io};

use mailer::{
    config::Prompt,
    transport::{RelayConfig, SmtpConfig, SmtpEncryptionKind},
    ConfigFile, ConfigStore, ErrorKind, Identity, TransportConfig, TransportKind,
};
use secret::Secret;
use tempfile::tempdir;

/// Prompt answering from a script and recording every question.
#[derive(Default)]
struct ScriptedPrompt {
    answers: VecDeque<&'static str>,
    prompts: Vec<String>,
    warnings: Vec<String>,
}

impl ScriptedPrompt {
    fn new(answers: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Default::default()
        }
    }

    fn next(&mut self, prompt: &str) -> io::Result<&'static str> {
        self.prompts.push(prompt.to_owned());
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, prompt.to_owned()))
    }
}

impl Prompt for ScriptedPrompt {
    fn select(&mut self, prompt: &str, _items: &[&str], _default: usize) -> io::Result<usize> {
        let answer = self.next(prompt)?;
        answer
            .parse()
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, answer))
    }

    fn input(&mut self, prompt: &str, default: Option<&str>) -> io::Result<String> {
        match self.next(prompt)? {
            "" => Ok(default.unwrap_or_default().to_owned()),
            answer => Ok(answer.to_owned()),
        }
    }

    fn password(&mut self, prompt: &str) -> io::Result<String> {
        self.next(prompt).map(ToOwned::to_owned)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> io::Result<bool> {
        match self.next(prompt)? {
            "" => Ok(default),
            answer => Ok(answer == "y"),
        }
    }

    fn warn(&mut self, msg: &str) {
        self.warnings.push(msg.to_owned());
    }
}

fn index(kind: TransportKind) -> &'static str {
    match kind {
        TransportKind::OAuth2 => "0",
        TransportKind::Relay => "1",
        TransportKind::Smtp => "2",
        TransportKind::LocalBinary => "3",
    }
}

#[test_log::test]
fn configure_oauth2_only_asks_oauth2_fields() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("config.yaml"));

    let mut prompt = ScriptedPrompt::new([
        "me@gmail.com",
        "Me",
        "",
        index(TransportKind::OAuth2),
        "id.apps.googleusercontent.com",
        "client-secret",
        "1//refresh-token",
    ]);

    let config = store.interactive_configure(&mut prompt).unwrap();

    match &config.transport {
        TransportConfig::OAuth2(oauth2) => {
            assert_eq!(oauth2.client_id, "id.apps.googleusercontent.com");
            assert_eq!(oauth2.client_secret, Secret::new_raw("client-secret"));
            assert_eq!(oauth2.refresh_token, Secret::new_raw("1//refresh-token"));
            assert_eq!(oauth2.sender, "me@gmail.com");
        }
        transport => panic!("unexpected transport {transport:?}"),
    }

    assert!(prompt.answers.is_empty());
    for prompt in &prompt.prompts {
        let prompt = prompt.to_lowercase();
        assert!(!prompt.contains("relay"), "{prompt}");
        assert!(!prompt.contains("host"), "{prompt}");
        assert!(!prompt.ends_with(" port"), "{prompt}");
    }

    assert_eq!(store.load().unwrap(), config);
}

#[test_log::test]
fn configure_relay_asks_again_invalid_answers() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("config.yaml"));

    let mut prompt = ScriptedPrompt::new([
        "not an address",
        "me@isp.localhost",
        "",
        "",
        index(TransportKind::Relay),
        " ",
        "smtp.isp.localhost",
        "0",
        "smtp",
        "",
        "n",
        "n",
    ]);

    let config = store.interactive_configure(&mut prompt).unwrap();

    assert_eq!(
        config.transport,
        TransportConfig::Relay(RelayConfig {
            host: String::from("smtp.isp.localhost"),
            port: 25,
            ..Default::default()
        })
    );
    assert_eq!(prompt.warnings.len(), 4, "{:?}", prompt.warnings);
}

#[test_log::test]
fn configure_smtp_keeps_existing_password() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("config.yaml"));

    let existing = ConfigFile::new(SmtpConfig {
        host: String::from("smtp.localhost"),
        port: 587,
        encryption: None,
        login: String::from("me"),
        password: Secret::new_raw("app-password"),
    });
    store.save(&existing).unwrap();

    let mut prompt = ScriptedPrompt::new([
        "me@localhost",
        "",
        "",
        index(TransportKind::Smtp),
        "",
        "0",
        "",
        "",
        "",
    ]);

    let config = store.interactive_configure(&mut prompt).unwrap();

    assert_eq!(
        config.transport,
        TransportConfig::Smtp(SmtpConfig {
            encryption: Some(SmtpEncryptionKind::StartTls),
            ..match existing.transport {
                TransportConfig::Smtp(config) => config,
                _ => unreachable!(),
            }
        })
    );
}

#[cfg(unix)]
#[test_log::test]
fn configure_local_binary_requires_executable() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("config.yaml"));

    let mut prompt = ScriptedPrompt::new([
        "me@localhost",
        "",
        "",
        index(TransportKind::LocalBinary),
        "/nonexistent/ssmtp",
        "/bin/cat",
        "",
    ]);

    let config = store.interactive_configure(&mut prompt).unwrap();

    assert_eq!(config.transport.kind(), TransportKind::LocalBinary);
    assert_eq!(prompt.warnings.len(), 1, "{:?}", prompt.warnings);
}

fn relay_with_identity() -> ConfigFile {
    ConfigFile::new(RelayConfig {
        host: String::from("smtp.isp.localhost"),
        ..Default::default()
    })
    .with_identity(Identity {
        address: String::from("me@isp.localhost"),
        name: Some(String::from("Me")),
        reply_to: Some(String::from("noreply@isp.localhost")),
        reply_to_name: Some(String::from("No Reply")),
    })
}

#[test_log::test]
fn configure_clears_optional_identity_fields() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("config.yaml"));
    store.save(&relay_with_identity()).unwrap();

    let mut prompt = ScriptedPrompt::new([
        "",
        "",
        "-",
        index(TransportKind::Relay),
        "",
        "",
        "",
        "",
    ]);

    let config = store.interactive_configure(&mut prompt).unwrap();

    let identity = config.identity.unwrap();
    assert_eq!(identity.address, "me@isp.localhost");
    assert_eq!(identity.name.as_deref(), Some("Me"));
    assert_eq!(identity.reply_to, None);
    assert_eq!(identity.reply_to_name, None);

    assert!(prompt.answers.is_empty());
    assert!(prompt.prompts[1].contains("- to clear"), "{:?}", prompt.prompts);
    assert!(!prompt.prompts.iter().any(|p| p.starts_with("Reply-to name")));
}

#[test_log::test]
fn configure_reply_to_name() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("config.yaml"));
    store.save(&relay_with_identity()).unwrap();

    let mut prompt = ScriptedPrompt::new([
        "",
        "-",
        "",
        "Support",
        index(TransportKind::Relay),
        "",
        "",
        "",
        "",
    ]);

    let config = store.interactive_configure(&mut prompt).unwrap();

    let identity = config.identity.unwrap();
    assert_eq!(identity.name, None);
    assert_eq!(identity.reply_to.as_deref(), Some("noreply@isp.localhost"));
    assert_eq!(identity.reply_to_name.as_deref(), Some("Support"));
    assert_eq!(store.load().unwrap().identity, Some(identity));
}

#[test_log::test]
fn configure_interrupted() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("config.yaml"));

    let mut prompt = ScriptedPrompt::new(["me@localhost", "", "", index(TransportKind::Relay)]);
    let err = store.interactive_configure(&mut prompt).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert!(!store.path().exists());
}
