#![allow(clippy::unwrap_used)]
//! CLI smoke tests. None of these reach a translation backend: runs either
//! fail before dispatch or skip every paragraph (source equals target).

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[allow(deprecated)]
fn artl(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("artl").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_CACHE_HOME", home.path().join("cache"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_displays_usage() {
    let home = TempDir::new().unwrap();
    artl(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Translate articles"))
        .stdout(predicate::str::contains("--engine"))
        .stdout(predicate::str::contains("--batch-size"))
        .stdout(predicate::str::contains("compare"));
}

#[test]
fn test_version_displays_version() {
    let home = TempDir::new().unwrap();
    artl(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_languages_list() {
    let home = TempDir::new().unwrap();
    artl(&home)
        .arg("languages")
        .assert()
        .success()
        .stdout(predicate::str::contains("ja"))
        .stdout(predicate::str::contains("zh-TW"))
        .stdout(predicate::str::contains("auto"));
}

#[test]
fn test_engines_list_without_config() {
    let home = TempDir::new().unwrap();
    artl(&home)
        .arg("engines")
        .assert()
        .success()
        .stdout(predicate::str::contains("google-batch"))
        .stdout(predicate::str::contains("no api key"));
}

#[test]
fn test_unknown_engine_is_rejected() {
    let home = TempDir::new().unwrap();
    artl(&home)
        .args(["--engine", "bing"])
        .write_stdin("text")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_invalid_target_language() {
    let home = TempDir::new().unwrap();
    artl(&home)
        .args(["--to", "xx"])
        .write_stdin("text")
        .assert()
        .failure()
        .stderr(predicate::str::contains("xx"));
}

#[test]
fn test_empty_input_fails() {
    let home = TempDir::new().unwrap();
    artl(&home)
        .args(["--to", "ja"])
        .write_stdin("\n\n  \n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input is empty"));
}

#[test]
fn test_same_language_passes_text_through() {
    let home = TempDir::new().unwrap();
    artl(&home)
        .args(["--from", "ja", "--to", "ja", "--no-cache", "--show-engine", "-q"])
        .write_stdin("# 見出し\n\n本文です。")
        .assert()
        .success()
        .stdout(predicate::str::contains("[Skipped]\n# 見出し"))
        .stdout(predicate::str::contains("本文です。"));
}

#[test]
fn test_json_output_to_file() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("out.json");
    artl(&home)
        .args(["--from", "en", "--to", "en", "--no-cache", "--format", "json", "-q"])
        .arg("--title")
        .arg("Headline")
        .arg("--output")
        .arg(&out)
        .write_stdin("Body.")
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["complete"], true);
    assert_eq!(json["results"][0]["tag"], "h1");
    assert_eq!(json["results"][0]["text"], "Headline");
    assert_eq!(json["results"][1]["status"]["kind"], "skipped");
}

#[test]
fn test_broken_config_is_reported() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join("config").join("artl");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[artl\n").unwrap();

    artl(&home)
        .args(["--from", "en", "--to", "en"])
        .write_stdin("x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[test]
fn test_compare_text_and_json() {
    let home = TempDir::new().unwrap();
    let a = home.path().join("a.txt");
    let b = home.path().join("b.txt");
    fs::write(&a, "A。B。").unwrap();
    fs::write(&b, "A。C。").unwrap();

    artl(&home)
        .arg("compare")
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(predicate::str::contains("~ B。 | C。"));

    artl(&home)
        .arg("compare")
        .arg(&a)
        .arg(&b)
        .args(["--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"op\": \"replace\""));
}
