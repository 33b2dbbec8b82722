use std::fs;
use std::path::Path;

use assert_cmd::Command;
use chrono::{Duration, Local};

use paceline::history::{self, HistoryEntry, HistoryStore, SqliteHistory};

fn entry(minutes_ago: i64, wpm: u32) -> HistoryEntry {
    HistoryEntry {
        timestamp: Local::now() - Duration::minutes(minutes_ago),
        wpm,
        accuracy: 97,
        word_count: 12,
        elapsed_secs: 20,
        characters: 60,
    }
}

fn paceline(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("paceline").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG")
        .arg("--log-file")
        .arg(home.join("paceline.log"));
    cmd
}

#[test]
fn sqlite_history_survives_reopen_and_caps_retention() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("history.db");

    {
        let mut store = SqliteHistory::open(&path, 20).unwrap();
        for i in 0..25 {
            store.append(&entry(100 - i, i as u32)).unwrap();
        }
    }

    let store = SqliteHistory::open(&path, 20).unwrap();
    let all = store.all().unwrap();
    assert_eq!(all.len(), 20);
    assert_eq!(all[0].wpm, 24);
    assert_eq!(all[19].wpm, 5);
}

#[test]
fn malformed_import_leaves_disk_history_intact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.db");
    let mut store = SqliteHistory::open(&path, 20).unwrap();
    store.append(&entry(1, 50)).unwrap();

    assert!(history::import_json(&mut store, "[{\"wpm\": 10}]").is_err());
    assert!(history::import_json(&mut store, "not json").is_err());
    assert_eq!(store.all().unwrap().len(), 1);
}

#[test]
fn cli_lists_presets() {
    let dir = tempfile::tempdir().unwrap();
    let out = paceline(dir.path())
        .arg("--list-presets")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert!(stdout_of(&out).contains("pangrams"));
}

#[test]
fn cli_import_then_print_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let import = dir.path().join("import.json");
    let mut seed = history::MemoryHistory::new(20);
    seed.append(&entry(10, 61)).unwrap();
    seed.append(&entry(5, 72)).unwrap();
    fs::write(&import, history::export_json(&seed).unwrap()).unwrap();

    let out = paceline(dir.path())
        .arg("--import-history")
        .arg(&import)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert!(stdout_of(&out).contains("imported 2 sessions"));

    let out = paceline(dir.path())
        .args(["--history", "5"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let listing = stdout_of(&out);
    assert_eq!(listing.lines().count(), 2);
    assert!(listing.lines().next().unwrap().contains("72 wpm"));

    let csv = dir.path().join("out.csv");
    paceline(dir.path())
        .arg("--export-history")
        .arg(&csv)
        .args(["--export-format", "csv"])
        .assert()
        .success();
    let written = fs::read_to_string(&csv).unwrap();
    assert!(written.starts_with("timestamp,wpm,accuracy,wordCount,elapsedSeconds,characters"));
    assert_eq!(written.lines().count(), 3);
}

#[test]
fn cli_rejects_malformed_import() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.json");
    fs::write(&bad, "{\"oops\": true}").unwrap();

    paceline(dir.path())
        .arg("--import-history")
        .arg(&bad)
        .assert()
        .failure();
}

#[test]
fn cli_writes_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("conf").join("config.json");

    paceline(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("--write-config")
        .assert()
        .success();

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config).unwrap()).unwrap();
    assert_eq!(written["countdown_secs"], 3);
    assert_eq!(written["cheat_max_wpm"], 300);
}

#[test]
fn cli_refuses_tui_without_tty() {
    let dir = tempfile::tempdir().unwrap();
    let out = paceline(dir.path())
        .args(["--text", "hello"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    assert!(stdout_of(&out).contains("stdin must be a tty"));
}

fn stdout_of(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
