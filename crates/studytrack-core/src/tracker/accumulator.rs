//! Dwell-time accounting.
//!
//! Every closed interval is billed to the state that was active *during* the
//! interval, never to the state observed at its end. The caller closes an
//! interval by calling [`DwellTimeAccumulator::commit`] with the prior state
//! and the interval length.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attention::AttentionState;
use crate::error::TrackerError;

/// Whole-second totals intended for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DwellTimes {
    pub study_time: u64,
    pub distracted_time: u64,
    pub recovery_time: u64,
}

impl DwellTimes {
    /// Tracked seconds across both buckets.
    pub fn total(&self) -> u64 {
        self.study_time + self.distracted_time
    }

    /// Share of tracked time spent studying, or `None` before anything is tracked.
    pub fn focus_ratio(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.study_time as f64 / total as f64),
        }
    }
}

/// Running productive / non-productive totals.
#[derive(Debug, Clone, Default)]
pub struct DwellTimeAccumulator {
    productive_seconds: f64,
    non_productive_seconds: f64,
    /// Mirrors `non_productive_seconds` at every non-productive commit.
    recovery_seconds: f64,
}

impl DwellTimeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bill `elapsed` to the bucket of `prior`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidElapsed`] when `elapsed` is negative.
    /// The totals are left untouched in that case.
    pub fn commit(&mut self, prior: AttentionState, elapsed: Duration) -> Result<(), TrackerError> {
        let secs = elapsed
            .to_std()
            .map_err(|_| TrackerError::InvalidElapsed {
                elapsed_ms: elapsed.num_milliseconds(),
            })?
            .as_secs_f64();

        if prior.is_productive() {
            self.productive_seconds += secs;
        } else {
            self.non_productive_seconds += secs;
            self.recovery_seconds = self.non_productive_seconds;
        }
        debug!(state = %prior, secs, "committed interval");
        Ok(())
    }

    pub fn productive_seconds(&self) -> f64 {
        self.productive_seconds
    }

    pub fn non_productive_seconds(&self) -> f64 {
        self.non_productive_seconds
    }

    pub fn recovery_seconds(&self) -> f64 {
        self.recovery_seconds
    }

    /// Totals truncated toward zero to whole seconds.
    pub fn snapshot(&self) -> DwellTimes {
        DwellTimes {
            study_time: self.productive_seconds as u64,
            distracted_time: self.non_productive_seconds as u64,
            recovery_time: self.recovery_seconds as u64,
        }
    }
}
