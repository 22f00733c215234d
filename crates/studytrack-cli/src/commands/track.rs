//! `track`: feed classifier output through the engine and print events.
//!
//! One observation per line, either JSON
//! (`{"state":"distracted","at":"2026-01-01T00:00:05Z"}`) or plain text
//! (`distracted 2026-01-01T00:00:05Z`). A line without a timestamp is stamped
//! on arrival, so a live classifier can simply print its labels.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;
use studytrack_core::{
    AttentionState, Config, Engine, Event, Observation, SinkKind, ValidationError,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

#[derive(Args)]
pub struct TrackArgs {
    /// Read observations from this file instead of stdin
    #[arg(long)]
    file: Option<PathBuf>,
    /// Print a snapshot every N accepted observations (0 = summary only)
    #[arg(long)]
    every: Option<u64>,
    /// Alert cooldown in seconds
    #[arg(long)]
    cooldown: Option<f64>,
    /// Alert output: bell, log or command
    #[arg(long)]
    sink: Option<SinkKind>,
    /// Decide alerts but do not deliver them
    #[arg(long)]
    mute: bool,
}

impl TrackArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(every) = self.every {
            config.display.snapshot_every = every;
        }
        if let Some(cooldown) = self.cooldown {
            config.alert.cooldown_secs = cooldown;
        }
        if let Some(sink) = self.sink {
            config.alert.sink = sink;
        }
        if self.mute {
            config.alert.enabled = false;
        }
    }
}

/// Parse one feed line. Blank lines and `#` comments yield `Ok(None)`.
fn parse_line(line: &str, now: DateTime<Utc>) -> Result<Option<Observation>, ValidationError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    if line.starts_with('{') {
        return serde_json::from_str(line)
            .map(Some)
            .map_err(|e| ValidationError::InvalidValue {
                field: "observation".into(),
                message: e.to_string(),
            });
    }

    let mut fields = line.split_whitespace();
    let state: AttentionState = fields.next().unwrap_or_default().parse()?;
    let at = match fields.next() {
        Some(ts) => DateTime::parse_from_rfc3339(ts)
            .map_err(|e| ValidationError::InvalidValue {
                field: "at".into(),
                message: format!("'{ts}': {e}"),
            })?
            .with_timezone(&Utc),
        None => now,
    };
    if let Some(extra) = fields.next() {
        return Err(ValidationError::InvalidValue {
            field: "observation".into(),
            message: format!("unexpected trailing field '{extra}'"),
        });
    }
    Ok(Some(Observation::new(state, at)))
}

/// Feed bytes are not trusted to be UTF-8; a bad line is skipped, not fatal.
fn decode_line(bytes: &[u8]) -> Result<&str, ValidationError> {
    std::str::from_utf8(bytes).map_err(|e| ValidationError::InvalidValue {
        field: "observation".into(),
        message: format!("line is not valid UTF-8: {e}"),
    })
}

fn emit(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

async fn open_feed(
    file: Option<&PathBuf>,
) -> Result<Box<dyn AsyncBufRead + Unpin + Send>, Box<dyn std::error::Error>> {
    Ok(match file {
        Some(path) => Box::new(BufReader::new(tokio::fs::File::open(path).await?)),
        None => Box::new(BufReader::new(tokio::io::stdin())),
    })
}

pub async fn run(args: TrackArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "could not load config, using defaults");
        Config::default()
    });
    args.apply(&mut config);
    let mut engine = Engine::from_config(&config)?;
    let every = config.display.snapshot_every;

    emit(&Event::SessionStarted {
        session_id: engine.session_id(),
        cooldown_ms: config.cooldown().num_milliseconds(),
        sink: engine.dispatcher().map(|d| d.sink_name().to_string()),
        at: Utc::now(),
    })?;

    let mut feed = open_feed(args.file.as_ref()).await?;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut buf = Vec::new();
    let mut line_no = 0usize;
    let mut accepted = 0u64;
    loop {
        buf.clear();
        let read = tokio::select! {
            read = feed.read_until(b'\n', &mut buf) => read?,
            _ = &mut ctrl_c => {
                info!("interrupted, ending session");
                0
            }
        };
        if read == 0 {
            break;
        }
        line_no += 1;

        let decoded = match decode_line(&buf) {
            Ok(line) => line,
            Err(e) => {
                warn!(line = line_no, error = %e, "skipping unreadable line");
                emit(&Event::InputSkipped {
                    line: line_no,
                    reason: e.to_string(),
                })?;
                continue;
            }
        };

        let obs = match parse_line(decoded, Utc::now()) {
            Ok(Some(obs)) => obs,
            Ok(None) => continue,
            Err(e) => {
                warn!(line = line_no, error = %e, "skipping unreadable line");
                emit(&Event::InputSkipped {
                    line: line_no,
                    reason: e.to_string(),
                })?;
                continue;
            }
        };

        match engine.observe(obs.state, obs.at) {
            Ok(decision) => {
                debug!(state = %obs.state, ?decision, "observed");
                if decision.is_fire() {
                    emit(&Event::AlertFired {
                        state: obs.state,
                        at: obs.at,
                    })?;
                }
                accepted += 1;
                if every > 0 && accepted % every == 0 {
                    emit(&engine.snapshot_event(obs.at))?;
                }
            }
            Err(e) => {
                warn!(line = line_no, error = %e, "observation rejected");
                emit(&Event::ObservationRejected {
                    state: obs.state,
                    at: obs.at,
                    last_at: engine.last_observed_at(),
                    reason: e.to_string(),
                })?;
            }
        }
    }

    let summary = engine.finish();
    if let Some(ratio) = summary.times.focus_ratio() {
        info!(
            study = summary.times.study_time,
            distracted = summary.times.distracted_time,
            focus_pct = (ratio * 100.0).round() as u64,
            "session summary"
        );
    }
    emit(&Event::SessionEnded { summary })
}
