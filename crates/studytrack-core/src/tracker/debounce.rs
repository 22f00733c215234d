//! Distraction alert debounce.
//!
//! Two independent guards decide whether a non-productive observation raises
//! an alert:
//!
//! ```text
//! latch:    set on Fire, cleared only by a Studying observation
//! cooldown: at least `cooldown` between two Fire decisions,
//!           measured from the previous Fire (not from the unlatch)
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::attention::AttentionState;

/// Default minimum spacing between two alerts.
pub const DEFAULT_COOLDOWN_SECS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertDecision {
    None,
    Fire,
}

impl AlertDecision {
    pub fn is_fire(self) -> bool {
        self == AlertDecision::Fire
    }
}

#[derive(Debug, Clone)]
pub struct AlertDebouncer {
    cooldown: Duration,
    /// When the most recent alert was dispatched; `None` until the first one.
    last_alert_at: Option<DateTime<Utc>>,
    latched: bool,
}

impl AlertDebouncer {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_alert_at: None,
            latched: false,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    pub fn last_alert_at(&self) -> Option<DateTime<Utc>> {
        self.last_alert_at
    }

    pub fn evaluate(&mut self, current: AttentionState, now: DateTime<Utc>) -> AlertDecision {
        if current.is_productive() {
            self.latched = false;
            return AlertDecision::None;
        }

        if self.latched {
            return AlertDecision::None;
        }

        if let Some(last) = self.last_alert_at {
            if now - last < self.cooldown {
                return AlertDecision::None;
            }
        }

        self.latched = true;
        self.last_alert_at = Some(now);
        AlertDecision::Fire
    }
}

impl Default for AlertDebouncer {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_COOLDOWN_SECS))
    }
}
