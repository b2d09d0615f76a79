use secret::{Error, Secret};

#[test_log::test(tokio::test)]
async fn raw() {
    let secret = Secret::new_raw("secret");
    assert_eq!(secret.get().await.unwrap(), "secret");
    assert!(!secret.is_empty());
    assert_eq!(format!("{secret:?}"), "Raw(<redacted>)");
}

#[test_log::test(tokio::test)]
async fn empty_raw() {
    let secret = Secret::default();
    assert!(secret.is_empty());
    assert!(matches!(
        secret.get().await.unwrap_err(),
        Error::GetUndefinedSecretError
    ));
}

#[cfg(feature = "derive")]
#[test]
fn raw_as_plain_string() {
    let secret: Secret = serde_yaml::from_str("hunter2").unwrap();
    assert_eq!(secret, Secret::new_raw("hunter2"));
    assert_eq!(serde_yaml::to_string(&secret).unwrap(), "hunter2\n");
}
