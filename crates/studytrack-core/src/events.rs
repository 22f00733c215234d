use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attention::AttentionState;
use crate::tracker::SessionSummary;

/// Every notable change in a tracking session produces an Event.
/// The CLI prints them as JSON lines; display layers poll for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        session_id: Uuid,
        cooldown_ms: i64,
        sink: Option<String>,
        at: DateTime<Utc>,
    },
    /// The debouncer decided to alert for this observation.
    AlertFired {
        state: AttentionState,
        at: DateTime<Utc>,
    },
    /// Observation went back in time and was ignored.
    ObservationRejected {
        state: AttentionState,
        at: DateTime<Utc>,
        last_at: Option<DateTime<Utc>>,
        reason: String,
    },
    /// A feed line could not be parsed.
    InputSkipped {
        line: usize,
        reason: String,
    },
    StateSnapshot {
        state: Option<AttentionState>,
        study_time: u64,
        distracted_time: u64,
        recovery_time: u64,
        at: DateTime<Utc>,
    },
    SessionEnded {
        summary: SessionSummary,
    },
}
