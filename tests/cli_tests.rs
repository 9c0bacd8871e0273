use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn newswatch_cmd(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("newswatch").unwrap();
    cmd.env("NEWSWATCH_DATA_DIR", data_dir)
        .env("RUST_LOG", "info")
        .env_remove("NEWSWATCH_AGENTS_FILE")
        .env_remove("NEWSWATCH_INTERVAL_SECS")
        .env_remove("TELEGRAM_BOT_TOKEN")
        .env_remove("TELEGRAM_CHAT_ID");
    cmd
}

/// One link-list agent pointed at a port nothing listens on
fn unreachable_agents_file(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("agents.json");
    fs::write(
        &path,
        r#"[{
            "name": "Local",
            "cache_file": "local_cache.json",
            "sources": [{
                "type": "link_list",
                "name": "Local",
                "url": "http://127.0.0.1:9/",
                "selector": "a"
            }]
        }]"#,
    )
    .unwrap();
    path
}

#[test]
fn test_help_shows_run_flags() {
    let temp_dir = TempDir::new().unwrap();

    newswatch_cmd(temp_dir.path())
        .arg("run")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--once"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_list_shows_default_agents() {
    let temp_dir = TempDir::new().unwrap();

    newswatch_cmd(temp_dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("G1 (store: news_cache.json)"))
        .stdout(predicate::str::contains("SAMPI Campinas (store: news_cache_sampi.json)"))
        .stdout(predicate::str::contains("[rendered] Prefeitura de Campinas"))
        .stdout(predicate::str::contains("https://jornalocal.com.br/campinas/"));
}

#[test]
fn test_list_uses_agents_file() {
    let temp_dir = TempDir::new().unwrap();
    let agents_file = unreachable_agents_file(&temp_dir);

    newswatch_cmd(temp_dir.path())
        .arg("list")
        .env("NEWSWATCH_AGENTS_FILE", &agents_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("[link_list] Local: http://127.0.0.1:9/"))
        .stdout(predicate::str::contains("G1").not());
}

#[test]
fn test_invalid_agents_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("agents.json");
    fs::write(&path, "[]").unwrap();

    newswatch_cmd(temp_dir.path())
        .arg("list")
        .env("NEWSWATCH_AGENTS_FILE", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no agents configured"));
}

#[test]
fn test_bad_interval_fails() {
    let temp_dir = TempDir::new().unwrap();

    newswatch_cmd(temp_dir.path())
        .arg("list")
        .env("NEWSWATCH_INTERVAL_SECS", "five minutes")
        .assert()
        .failure()
        .stderr(predicate::str::contains("NEWSWATCH_INTERVAL_SECS"));
}

#[test]
fn test_run_without_credentials_fails() {
    let temp_dir = TempDir::new().unwrap();
    let agents_file = unreachable_agents_file(&temp_dir);

    newswatch_cmd(temp_dir.path())
        .arg("run")
        .arg("--once")
        .env("NEWSWATCH_AGENTS_FILE", &agents_file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("TELEGRAM_BOT_TOKEN"));
}

#[test]
fn test_dry_run_once_survives_unreachable_source() {
    let temp_dir = TempDir::new().unwrap();
    let agents_file = unreachable_agents_file(&temp_dir);

    newswatch_cmd(temp_dir.path())
        .arg("run")
        .arg("--once")
        .arg("--dry-run")
        .env("NEWSWATCH_AGENTS_FILE", &agents_file)
        .env("NEWSWATCH_HTTP_TIMEOUT_SECS", "2")
        .assert()
        .success()
        .stderr(predicate::str::contains("fetch failed"))
        .stderr(predicate::str::contains("cycle complete"));

    // Nothing new was found, so no state files were written
    assert!(!temp_dir.path().join("local_cache.json").exists());
    assert!(!temp_dir.path().join("logs.json").exists());
}
