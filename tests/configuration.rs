//! Integration tests for configuration handling at startup.

mod common;

use common::FakeGateway;
use common::bot::write_config;
use std::process::{Command, Stdio};

#[test]
fn test_invalid_config_refuses_to_start() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(dir.path(), "127.0.0.1:1", "interject_threshold = 0").unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_gnubot"))
        .arg(&config_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn test_missing_config_file_fails() {
    let status = Command::new(env!("CARGO_BIN_EXE_gnubot"))
        .arg("/nonexistent/gnubot.toml")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .unwrap();
    assert!(!status.success());
}

#[tokio::test]
async fn test_json_config_is_accepted() {
    let gateway = FakeGateway::bind().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("gnubot.json");
    let config = serde_json::json!({
        "irc": {
            "address": gateway.address(),
            "nick": "gnubot",
            "password": "oauth:test",
        },
        "bot": {
            "home_room": "jsonroom",
            "dispatch_delay_ms": 0,
            "prompt_on_interrupt": false,
        },
        "storage": {
            "path": dir.path().join("db/gnubot.redb"),
        },
    });
    std::fs::write(&config_path, config.to_string()).unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_gnubot"))
        .arg(&config_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let mut peer = gateway.accept().await.unwrap();
    let joined = peer.expect_login(&["#jsonroom"]).await;

    let _ = child.kill();
    let _ = child.wait();
    joined.unwrap();
}
