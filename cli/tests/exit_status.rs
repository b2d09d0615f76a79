use std::{fs, process::Command};

use tempfile::tempdir;

fn mailer() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mailer"));
    cmd.env("RUST_LOG", "off").env_remove("MAILER_CONFIG");
    cmd
}

#[test]
fn missing_config_fails_with_one_line() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.yaml");
    let body = dir.path().join("body.txt");
    fs::write(&body, "Hello, world!").unwrap();

    let out = mailer()
        .arg("--config")
        .arg(&config)
        .args(["-r", "you@localhost", "-f"])
        .arg(&body)
        .output()
        .unwrap();

    assert!(!out.status.success());
    assert!(out.stdout.is_empty());

    let stderr = String::from_utf8(out.stderr).unwrap();
    assert_eq!(stderr.lines().count(), 1, "{stderr}");
    assert!(stderr.starts_with("error[ConfigMissing]: "), "{stderr}");
}

#[test]
fn corrupt_config_fails() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.yaml");
    fs::write(&config, "version: 2\ntransport: relay\n").unwrap();

    let out = mailer()
        .arg("--config")
        .arg(&config)
        .arg("--test")
        .output()
        .unwrap();

    assert!(!out.status.success());

    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.starts_with("error[ConfigCorrupt]: "), "{stderr}");
}
