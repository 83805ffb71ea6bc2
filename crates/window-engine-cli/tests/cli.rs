use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;

fn cli() -> Command {
    Command::cargo_bin("active-window").unwrap()
}

const SIX_WEEKS: [&str; 6] = [
    "--anchor",
    "2019-12-03",
    "--every",
    "6w",
    "--active",
    "last 2w",
];

// ── window ──────────────────────────────────────────────────────────────────

#[test]
fn test_window_text_output() {
    cli()
        .arg("window")
        .args(SIX_WEEKS)
        .args(["--today", "2020-10-14"])
        .assert()
        .success()
        .stdout(contains("period:   2020-09-21..=2020-11-01"))
        .stdout(contains("active:   2020-10-19..=2020-11-01"))
        .stdout(contains("status:   inactive"));
}

#[test]
fn test_window_json_output() {
    let output = cli()
        .arg("window")
        .args(SIX_WEEKS)
        .args(["--today", "2020-10-20", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["period"]["start"], "2020-09-21");
    assert_eq!(json["active"]["start"], "2020-10-19");
    assert_eq!(json["active"]["end"], "2020-11-01");
    assert_eq!(json["is_active"], true);
}

#[test]
fn test_window_week_start_by_name() {
    cli()
        .arg("window")
        .args(["--anchor", "2020-10-01", "--every", "1m", "--active", "last 1w"])
        .args(["--week-start", "sunday", "--today", "2020-10-28"])
        .assert()
        .success()
        .stdout(contains("active:   2020-10-25..=2020-10-31"))
        .stdout(contains("status:   active"));
}

#[test]
fn test_window_overflow_fails() {
    cli()
        .arg("window")
        .args(["--anchor", "2020-01-01", "--every", "5d", "--active", "first 10d"])
        .args(["--today", "2020-01-02"])
        .assert()
        .failure()
        .stderr(contains("overflow"));
}

#[test]
fn test_window_span_past_date_range_fails_cleanly() {
    cli()
        .arg("window")
        .args(["--anchor", "2020-01-01", "--every", "5d", "--active", "first 200000000d"])
        .args(["--today", "2020-01-02"])
        .assert()
        .failure()
        .stderr(contains("overflow"))
        .stderr(contains("panicked").not());
}

#[test]
fn test_window_huge_period_succeeds() {
    cli()
        .arg("window")
        .args(["--anchor", "2020-01-02", "--every", "20000000w", "--active", "first 1w"])
        .args(["--today", "2020-01-02"])
        .assert()
        .success()
        .stdout(contains("active:   2020-01-02..=2020-01-05"));
}

#[test]
fn test_window_missing_flags_fails() {
    cli()
        .arg("window")
        .args(["--anchor", "2020-01-01"])
        .assert()
        .failure()
        .stderr(contains("missing recurring period"));
}

#[test]
fn test_window_rejects_bad_span() {
    cli()
        .arg("window")
        .args(["--anchor", "2020-01-01", "--every", "6 fortnights", "--active", "first 1d"])
        .assert()
        .failure()
        .stderr(contains("unknown unit"));
}

#[test]
fn test_window_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"anchor": "2020-01-01", "week_start": 0, "every": "3m", "active": "first 1m"}}"#
    )
    .unwrap();

    cli()
        .arg("window")
        .arg("--config")
        .arg(file.path())
        .args(["--today", "2020-05-15"])
        .assert()
        .success()
        .stdout(contains("period:   2020-04-01..=2020-06-30"))
        .stdout(contains("active:   2020-04-01..=2020-04-30"));
}

#[test]
fn test_config_conflicts_with_flags() {
    cli()
        .arg("window")
        .args(["--config", "schedule.json", "--anchor", "2020-01-01"])
        .assert()
        .failure()
        .stderr(contains("cannot be used with"));
}

// ── watch ───────────────────────────────────────────────────────────────────

#[test]
fn test_watch_stops_after_max_runs() {
    cli()
        .arg("watch")
        .args(SIX_WEEKS)
        .args(["--today", "2020-10-20", "--poll", "1s", "--max-runs", "2"])
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .success()
        .stdout(contains("run 1: 2020-10-20 in 2020-10-19..=2020-11-01"))
        .stdout(contains("run 2:"))
        .stdout(contains("run 3:").not());
}

#[test]
fn test_watch_overflow_fails_before_running() {
    cli()
        .arg("watch")
        .args(["--anchor", "2020-01-01", "--every", "5d", "--active", "first 10d"])
        .args(["--today", "2020-01-02"])
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .failure()
        .stdout(contains("run").not())
        .stderr(contains("overflow"));
}
