//! Headless TUI smoke tests: launch, render one frame, exit cleanly.
//!
//! All tests use `--once` and `TUI_HEADLESS=1` for non-interactive execution.

use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;

#[test]
fn tui_headless_exits_cleanly_without_service() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = tmp.path().join("config.toml");
    fs::write(&config, "api_url = \"http://127.0.0.1:9\"\n").unwrap();

    let mut cmd = cargo_bin_cmd!("hwsearch");
    cmd.arg("--config")
        .arg(&config)
        .args(["tui", "--once"])
        .env("TUI_HEADLESS", "1")
        .env("HOME", tmp.path())
        .env("XDG_DATA_HOME", tmp.path().join("data"))
        .env_remove("HWSEARCH_API_URL")
        .assert()
        .success();
}

#[test]
fn tui_headless_rejects_bad_shortcut() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = tmp.path().join("config.toml");
    fs::write(&config, "shortcut = \"ctrl+shift\"\n").unwrap();

    let mut cmd = cargo_bin_cmd!("hwsearch");
    cmd.arg("--config")
        .arg(&config)
        .args(["tui", "--once"])
        .env("TUI_HEADLESS", "1")
        .env("HOME", tmp.path())
        .env("XDG_DATA_HOME", tmp.path().join("data"))
        .env_remove("HWSEARCH_SHORTCUT")
        .assert()
        .failure()
        .stderr(predicates::str::contains("invalid shortcut"));
}
