#![cfg(unix)]

use secret::{Error, Secret};

#[test_log::test(tokio::test)]
async fn command() {
    let secret = Secret::new_command("printf 'secret\\nsecond line\\n'");
    assert_eq!(secret.get().await.unwrap(), "secret");
}

#[test_log::test(tokio::test)]
async fn command_with_empty_output() {
    let secret = Secret::new_command("true");
    assert!(matches!(
        secret.get().await.unwrap_err(),
        Error::GetSecretFromCommandEmptyOutputError
    ));
}

#[test_log::test(tokio::test)]
async fn failing_command() {
    let secret = Secret::new_command("exit 1");
    assert!(matches!(
        secret.get().await.unwrap_err(),
        Error::GetSecretFromCommandError(_)
    ));
}

#[cfg(feature = "derive")]
#[test]
fn command_as_map() {
    let secret: Secret = serde_yaml::from_str("command: pass show mail").unwrap();
    assert_eq!(secret, Secret::new_command("pass show mail"));
    assert_eq!(
        serde_yaml::to_string(&secret).unwrap(),
        "command: pass show mail\n"
    );

    let secret: Secret = serde_yaml::from_str("cmd: pass show mail").unwrap();
    assert_eq!(secret, Secret::new_command("pass show mail"));

    assert!(serde_yaml::from_str::<Secret>("command: ''").is_err());
}
