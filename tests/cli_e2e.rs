//! End-to-end tests for the tubedl binary.
//!
//! These exercise argument handling and the history listing path. No test
//! here performs a real download.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tubedl() -> Command {
    Command::cargo_bin("tubedl").expect("binary built")
}

#[test]
fn test_help_shows_usage() {
    tubedl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Video URL to download"))
        .stdout(predicate::str::contains("--history"));
}

#[test]
fn test_no_arguments_explains_what_to_do() {
    tubedl()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Provide a video URL"));
}

#[test]
fn test_invalid_quality_is_rejected_by_the_parser() {
    tubedl()
        .args(["-Q", "1080p", "https://x.test/watch?v=abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid quality preset"));
}

#[test]
fn test_history_with_empty_store_prints_placeholder() {
    let temp = TempDir::new().unwrap();
    tubedl()
        .arg("--history")
        .arg("--history-file")
        .arg(temp.path().join("history.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("No downloads yet"));
}

#[test]
fn test_history_lists_entries_from_the_wire_format() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("history.json");
    std::fs::write(
        &path,
        r#"[
            {
                "id": "1722945600001",
                "title": "abc123",
                "time": "14:32:07",
                "quality": "best",
                "url": "https://x.test/watch?v=abc123",
                "filePath": "/tmp/out/abc123_2026-08-06.mp4"
            },
            {
                "id": "1722945600000",
                "title": "oldsong",
                "time": "14:30:00",
                "quality": "audio",
                "url": "https://x.test/watch?v=oldsong",
                "filePath": "/tmp/out/oldsong_2026-08-06.mp3"
            }
        ]"#,
    )
    .unwrap();

    tubedl()
        .arg("--history")
        .arg("--history-file")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 video, 1 audio"))
        .stdout(predicate::str::contains("abc123"))
        .stdout(predicate::str::contains("ULTRA"))
        .stdout(predicate::str::contains("oldsong"));
}

#[test]
fn test_history_limit_caps_rows() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("history.json");
    let entries: Vec<String> = (0..5)
        .map(|i| {
            format!(
                r#"{{"id":"{}","title":"clip{}","time":"10:00:0{}","quality":"720p","url":"https://x.test/watch?v=clip{}","filePath":"/tmp/out/clip{}_2026-08-06.mp4"}}"#,
                1_722_945_600_000_u64 + i,
                i,
                i,
                i,
                i
            )
        })
        .collect();
    std::fs::write(&path, format!("[{}]", entries.join(","))).unwrap();

    tubedl()
        .arg("--history")
        .arg("--history-limit")
        .arg("2")
        .arg("--history-file")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("clip0"))
        .stdout(predicate::str::contains("clip1"))
        .stdout(predicate::str::contains("clip2").not());
}
