//! Basic CLI E2E tests.
//!
//! Tests run the built binary against a temporary config directory.

mod common;

use common::{events_of, parse_events, run_cli, run_cli_success};

const FEED: &str = "\
# replayed session
studying 2026-04-01T09:00:00Z
distracted 2026-04-01T09:00:05Z
{\"state\":\"studying\",\"at\":\"2026-04-01T09:00:08Z\"}
";

#[test]
fn test_track_replay_totals() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(dir.path(), &["track", "--sink", "log"], FEED);
    let events = parse_events(&stdout);

    assert_eq!(events.first().unwrap()["type"], "SessionStarted");
    let ended = events_of(&events, "SessionEnded");
    assert_eq!(ended.len(), 1);
    let times = &ended[0]["summary"]["times"];
    assert_eq!(times["study_time"], 5);
    assert_eq!(times["distracted_time"], 3);
    assert_eq!(times["recovery_time"], 3);
    assert_eq!(ended[0]["summary"]["alerts_fired"], 1);
}

#[test]
fn test_track_emits_alert_and_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(dir.path(), &["track", "--mute", "--every", "1"], FEED);
    let events = parse_events(&stdout);

    let alerts = events_of(&events, "AlertFired");
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["state"], "distracted");
    assert_eq!(events_of(&events, "StateSnapshot").len(), 3);
}

#[test]
fn test_track_summary_only() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(dir.path(), &["track", "--mute", "--every", "0"], FEED);
    let events = parse_events(&stdout);
    assert!(events_of(&events, "StateSnapshot").is_empty());
}

#[test]
fn test_track_reports_bad_input_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let feed = "\
studying 2026-04-01T09:00:00Z
dozing 2026-04-01T09:00:01Z
studying 2026-04-01T09:00:04Z
absent 2026-04-01T09:00:02Z
studying 2026-04-01T09:00:06Z
";
    let stdout = run_cli_success(dir.path(), &["track", "--mute", "--every", "0"], feed);
    let events = parse_events(&stdout);

    let skipped = events_of(&events, "InputSkipped");
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0]["line"], 2);

    let rejected = events_of(&events, "ObservationRejected");
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0]["state"], "absent");

    let summary = &events_of(&events, "SessionEnded")[0]["summary"];
    assert_eq!(summary["times"]["study_time"], 6);
    assert_eq!(summary["rejected_observations"], 1);
}

#[test]
fn test_track_skips_non_utf8_lines() {
    let dir = tempfile::tempdir().unwrap();
    let feed: &[u8] = b"studying 2026-04-01T09:00:00Z\n\
distr\xffacted 2026-04-01T09:00:03Z\n\
studying 2026-04-01T09:00:06Z\n";
    let stdout = run_cli_success(dir.path(), &["track", "--mute", "--every", "0"], feed);
    let events = parse_events(&stdout);

    let skipped = events_of(&events, "InputSkipped");
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0]["line"], 2);
    assert!(skipped[0]["reason"].as_str().unwrap().contains("UTF-8"));

    let ended = events_of(&events, "SessionEnded");
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0]["summary"]["times"]["study_time"], 6);
}

#[test]
fn test_track_warns_on_corrupt_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[alert\ncooldown_secs = ").unwrap();

    let (stdout, stderr, code) = run_cli(dir.path(), &["track", "--mute"], FEED);
    assert_eq!(code, 0, "{stderr}");
    assert!(stderr.contains("could not load config"), "{stderr}");
    let events = parse_events(&stdout);
    assert_eq!(events_of(&events, "SessionEnded").len(), 1);
}

#[test]
fn test_track_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let feed_path = dir.path().join("feed.txt");
    std::fs::write(&feed_path, FEED).unwrap();

    let stdout = run_cli_success(
        dir.path(),
        &["track", "--mute", "--file", feed_path.to_str().unwrap()],
        "",
    );
    let events = parse_events(&stdout);
    let summary = &events_of(&events, "SessionEnded")[0]["summary"];
    assert_eq!(summary["times"]["study_time"], 5);
}

#[test]
fn test_track_rejects_negative_cooldown() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["track", "--cooldown=-2"], "");
    assert_ne!(code, 0);
    assert!(stderr.contains("cooldown_secs"));
}

#[test]
fn test_config_set_get() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(
        run_cli_success(dir.path(), &["config", "get", "alert.cooldown_secs"], "").trim(),
        "3.0"
    );
    run_cli_success(dir.path(), &["config", "set", "alert.cooldown_secs", "5"], "");
    assert_eq!(
        run_cli_success(dir.path(), &["config", "get", "alert.cooldown_secs"], "").trim(),
        "5.0"
    );
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_config_unknown_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["config", "get", "alert.volume"], "");
    assert_ne!(code, 0);
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "alert.volume", "3"], "");
    assert_ne!(code, 0);
    assert!(stderr.contains("alert.volume"));
}

#[test]
fn test_config_reset_and_path() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["config", "set", "display.snapshot_every", "4"], "");
    run_cli_success(dir.path(), &["config", "reset"], "");
    assert_eq!(
        run_cli_success(dir.path(), &["config", "get", "display.snapshot_every"], "").trim(),
        "1"
    );
    let path = run_cli_success(dir.path(), &["config", "path"], "");
    assert!(path.trim().ends_with("config.toml"));
}
