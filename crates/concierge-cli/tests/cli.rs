//! Integration tests for the `concierge` binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn concierge() -> Command {
    let mut cmd = Command::cargo_bin("concierge").expect("concierge binary");
    cmd.env_remove("CONCIERGE_TZ").env_remove("RUST_LOG");
    cmd
}

// ── appointment commands ────────────────────────────────────────────────

#[test]
fn create_from_millis_anchor() {
    // 2026-03-15T14:00:00Z
    concierge()
        .args(["create", "--days", "4", "--now-ms", "1773583200000"])
        .assert()
        .success()
        .stdout("2026-03-19T14:00:00.000Z\n");
}

#[test]
fn create_from_timestamp_anchor_negative_days() {
    concierge()
        .args(["create", "--days", "-1", "--now", "2026-03-15T14:00:00Z"])
        .assert()
        .success()
        .stdout("2026-03-14T14:00:00.000Z\n");
}

#[test]
fn create_rejects_both_anchors() {
    concierge()
        .args(["create", "--days", "1", "--now-ms", "0", "--now", "2026-03-15T14:00:00Z"])
        .assert()
        .failure();
}

#[test]
fn timestamp_from_millis() {
    concierge()
        .args(["timestamp", "0"])
        .assert()
        .success()
        .stdout("1970-01-01T00:00:00.000Z\n");
}

#[test]
fn details_in_named_zone() {
    concierge()
        .args(["--timezone", "America/New_York", "details", "2026-03-15T02:30:00.000Z"])
        .assert()
        .success()
        .stdout("year=2026 month=2 date=14 hour=22 minute=30\n");
}

#[test]
fn details_zone_from_env() {
    concierge()
        .env("CONCIERGE_TZ", "Asia/Kolkata")
        .args(["details", "2026-03-15T14:00:00.000Z"])
        .assert()
        .success()
        .stdout("year=2026 month=2 date=15 hour=19 minute=30\n");
}

#[test]
fn details_json() {
    let output = concierge()
        .args(["--timezone", "UTC", "--json", "details", "2026-03-15T14:05:00.000Z"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        value,
        serde_json::json!({"year": 2026, "month": 2, "date": 15, "hour": 14, "minute": 5})
    );
}

#[test]
fn details_invalid_timestamp_fails() {
    concierge()
        .args(["--timezone", "UTC", "details", "not-a-timestamp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid timestamp"));
}

#[test]
fn invalid_timezone_fails() {
    concierge()
        .args(["--timezone", "Invalid/Zone", "details", "2026-03-15T14:05:00.000Z"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid timezone"));
}

#[test]
fn update_with_flags_and_json_options() {
    concierge()
        .args([
            "--timezone",
            "UTC",
            "update",
            "2026-03-15T14:05:00.000Z",
            "--options",
            r#"{"month": 12, "hour": 9}"#,
            "--minute",
            "-1",
        ])
        .assert()
        .success()
        .stdout("year=2027 month=0 date=15 hour=8 minute=59\n");
}

#[test]
fn update_rejects_unknown_option_keys() {
    concierge()
        .args([
            "--timezone",
            "UTC",
            "update",
            "2026-03-15T14:05:00.000Z",
            "--options",
            r#"{"second": 1}"#,
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid update options"));
}

#[test]
fn between_and_valid() {
    concierge()
        .args(["--timezone", "UTC", "between", "2026-03-16T09:00:00Z", "2026-03-16T17:00:00Z"])
        .assert()
        .success()
        .stdout("28800\n");

    concierge()
        .args(["--timezone", "UTC", "valid", "2026-03-16T09:00:00Z", "2026-03-16T09:00:00Z"])
        .assert()
        .success()
        .stdout("false\n");
}

// ── chatbot commands ────────────────────────────────────────────────────

#[test]
fn command_check() {
    concierge()
        .args(["command", "ChatBot hello"])
        .assert()
        .success()
        .stdout("true\n");
}

#[test]
fn strip_emoji() {
    concierge()
        .args(["strip-emoji", "hi emoji3 there"])
        .assert()
        .success()
        .stdout("hi  there\n");
}

#[test]
fn phone_rejection_echoes_input() {
    concierge()
        .args(["phone", "659-771-594"])
        .assert()
        .success()
        .stdout("Oops, it seems like I can't reach out to 659-771-594\n");
}

#[test]
fn urls_text_and_json() {
    concierge()
        .args(["urls", "visit example.com or test.org now"])
        .assert()
        .success()
        .stdout("example.com\ntest.org\n");

    concierge()
        .args(["--json", "urls", "nothing here"])
        .assert()
        .success()
        .stdout("null\n");
}

#[test]
fn greet() {
    concierge()
        .args(["greet", "Doe, John"])
        .assert()
        .success()
        .stdout("Nice to meet you, John Doe\n");
}
