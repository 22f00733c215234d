//! Common utilities for CLI E2E tests.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Invoke the CLI with an isolated config dir, feeding `stdin`.
pub fn run_cli(config_dir: &Path, args: &[&str], stdin: impl AsRef<[u8]>) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_studytrack-cli"))
        .args(args)
        .env("STUDYTRACK_CONFIG_DIR", config_dir)
        .env("RUST_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_ref())
        .expect("Failed to write CLI stdin");

    let output = child.wait_with_output().expect("Failed to wait for CLI");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Invoke the CLI and expect success.
pub fn run_cli_success(config_dir: &Path, args: &[&str], stdin: impl AsRef<[u8]>) -> String {
    let (stdout, stderr, code) = run_cli(config_dir, args, stdin);
    assert_eq!(code, 0, "CLI command failed with code {code}: {args:?}\n{stderr}");
    stdout
}

/// Parse JSON-lines output into events.
pub fn parse_events(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("Failed to parse JSON output"))
        .collect()
}

/// Events of one `type`.
pub fn events_of<'a>(events: &'a [serde_json::Value], kind: &str) -> Vec<&'a serde_json::Value> {
    events.iter().filter(|e| e["type"] == kind).collect()
}
