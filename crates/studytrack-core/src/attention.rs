//! Attention labels produced by the external frame classifier.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Discrete attention label for one classifier invocation.
///
/// Only `Studying` is productive. `Absent` (no face found) and `Error`
/// (the classifier failed on the frame) are accounted exactly like
/// `Distracted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttentionState {
    Studying,
    Distracted,
    Absent,
    Error,
}

impl AttentionState {
    pub const ALL: [AttentionState; 4] = [
        AttentionState::Studying,
        AttentionState::Distracted,
        AttentionState::Absent,
        AttentionState::Error,
    ];

    pub fn is_productive(self) -> bool {
        matches!(self, AttentionState::Studying)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttentionState::Studying => "studying",
            AttentionState::Distracted => "distracted",
            AttentionState::Absent => "absent",
            AttentionState::Error => "error",
        }
    }
}

impl fmt::Display for AttentionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttentionState {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        AttentionState::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "state".into(),
                message: format!(
                    "unknown attention state '{label}' (expected studying, distracted, absent or error)"
                ),
            })
    }
}

/// A single timestamped reading from the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub state: AttentionState,
    pub at: DateTime<Utc>,
}

impl Observation {
    pub fn new(state: AttentionState, at: DateTime<Utc>) -> Self {
        Self { state, at }
    }
}
