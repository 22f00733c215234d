//! Per-observation tracking engine.
//!
//! The engine is driven by a single producer: the caller feeds classifier
//! output in arrival order through [`Engine::observe`]. It has no internal
//! threads apart from the fire-and-forget alert dispatch.
//!
//! ## Flow of one observation
//!
//! ```text
//! observe(state, now)
//!   first call?  -> remember (state, now), done
//!   commit(last_state, now - last_at)   // bill the closed interval
//!   evaluate(state, now)                // Fire -> dispatcher.dispatch()
//!   remember (state, now), publish totals
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = Engine::new(Duration::seconds(3), Arc::new(TerminalBell::default()));
//! let times = engine.times_handle(); // hand to the display thread
//! engine.observe(AttentionState::Studying, Utc::now())?;
//! ```

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::accumulator::{DwellTimeAccumulator, DwellTimes};
use super::debounce::{AlertDebouncer, AlertDecision};
use crate::alert::{AlertDispatcher, AlertSink};
use crate::attention::{AttentionState, Observation};
use crate::error::{ConfigError, TrackerError};
use crate::events::Event;
use crate::storage::Config;

/// Read-only view of the latest published totals.
///
/// Cheap to clone and safe to read from any thread while the producer keeps
/// calling `observe`; a reader sees either the previous or the new totals,
/// never a mix.
#[derive(Debug, Clone, Default)]
pub struct TimesHandle(Arc<RwLock<DwellTimes>>);

impl TimesHandle {
    pub fn get(&self) -> DwellTimes {
        *self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, times: DwellTimes) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = times;
    }
}

/// Final report for a tracking session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub times: DwellTimes,
    pub alerts_fired: u64,
    pub rejected_observations: u64,
}

/// Tracking session state. Construct one per session, drop it at the end.
#[derive(Debug)]
pub struct Engine {
    session_id: Uuid,
    accumulator: DwellTimeAccumulator,
    debouncer: AlertDebouncer,
    /// `None` when alerts are muted; decisions are still made and reported.
    dispatcher: Option<AlertDispatcher>,
    started_at: Option<DateTime<Utc>>,
    last: Option<Observation>,
    alerts_fired: u64,
    rejected: u64,
    published: TimesHandle,
}

impl Engine {
    pub fn new(cooldown: Duration, sink: Arc<dyn AlertSink>) -> Self {
        Self::with_dispatcher(cooldown, Some(AlertDispatcher::new(sink)))
    }

    pub fn with_dispatcher(cooldown: Duration, dispatcher: Option<AlertDispatcher>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            accumulator: DwellTimeAccumulator::new(),
            debouncer: AlertDebouncer::new(cooldown),
            dispatcher,
            started_at: None,
            last: None,
            alerts_fired: 0,
            rejected: 0,
            published: TimesHandle::default(),
        }
    }

    /// Build an engine from the `[alert]` section of the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the alert section is invalid (see [`Config::validate`]).
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let dispatcher = config.build_sink()?.map(AlertDispatcher::new);
        Ok(Self::with_dispatcher(config.cooldown(), dispatcher))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn last_state(&self) -> Option<AttentionState> {
        self.last.map(|o| o.state)
    }

    pub fn last_observed_at(&self) -> Option<DateTime<Utc>> {
        self.last.map(|o| o.at)
    }

    pub fn alerts_fired(&self) -> u64 {
        self.alerts_fired
    }

    pub fn rejected_observations(&self) -> u64 {
        self.rejected
    }

    pub fn accumulator(&self) -> &DwellTimeAccumulator {
        &self.accumulator
    }

    pub fn debouncer(&self) -> &AlertDebouncer {
        &self.debouncer
    }

    pub fn dispatcher(&self) -> Option<&AlertDispatcher> {
        self.dispatcher.as_ref()
    }

    /// Current totals in whole seconds.
    pub fn times(&self) -> DwellTimes {
        self.accumulator.snapshot()
    }

    /// Handle for reading totals from another thread.
    pub fn times_handle(&self) -> TimesHandle {
        self.published.clone()
    }

    pub fn snapshot_event(&self, at: DateTime<Utc>) -> Event {
        let times = self.times();
        Event::StateSnapshot {
            state: self.last_state(),
            study_time: times.study_time,
            distracted_time: times.distracted_time,
            recovery_time: times.recovery_time,
            at,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Account one classifier reading.
    ///
    /// The first observation of a session only sets the baseline: it bills
    /// nothing and is not debounce-evaluated, so a session that opens
    /// distracted raises its alert on the second observation at the earliest.
    ///
    /// A fire while the dispatcher is still busy with an earlier alert is
    /// still reported as [`AlertDecision::Fire`]; the delivery is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidElapsed`] if `now` is earlier than the
    /// previous observation. Nothing is modified in that case and the caller
    /// may keep feeding observations.
    pub fn observe(
        &mut self,
        state: AttentionState,
        now: DateTime<Utc>,
    ) -> Result<AlertDecision, TrackerError> {
        let Some(last) = self.last else {
            debug!(session = %self.session_id, %state, "first observation");
            self.started_at = Some(now);
            self.last = Some(Observation::new(state, now));
            return Ok(AlertDecision::None);
        };

        if let Err(e) = self.accumulator.commit(last.state, now - last.at) {
            self.rejected += 1;
            return Err(e);
        }

        let decision = self.debouncer.evaluate(state, now);
        if decision.is_fire() {
            self.alerts_fired += 1;
            info!(session = %self.session_id, %state, "distraction alert");
            if let Some(dispatcher) = &self.dispatcher {
                // A clone of the dispatcher may still hold the slot; the decision stands.
                if let Err(e) = dispatcher.dispatch() {
                    warn!(error = %e, "alert dispatch skipped");
                }
            }
        }

        self.last = Some(Observation::new(state, now));
        self.published.publish(self.accumulator.snapshot());
        Ok(decision)
    }

    /// Feed a batch of observations in order, skipping rejected ones.
    ///
    /// Returns the number of alerts fired by this batch.
    pub fn observe_all<I>(&mut self, observations: I) -> u64
    where
        I: IntoIterator<Item = Observation>,
    {
        let mut fired = 0;
        for obs in observations {
            match self.observe(obs.state, obs.at) {
                Ok(AlertDecision::Fire) => fired += 1,
                Ok(AlertDecision::None) => {}
                Err(e) => warn!(error = %e, at = %obs.at, "observation rejected"),
            }
        }
        fired
    }

    /// End the session and report the final totals.
    pub fn finish(self) -> SessionSummary {
        info!(session = %self.session_id, alerts = self.alerts_fired, "session finished");
        SessionSummary {
            session_id: self.session_id,
            started_at: self.started_at,
            ended_at: self.last.map(|o| o.at),
            times: self.accumulator.snapshot(),
            alerts_fired: self.alerts_fired,
            rejected_observations: self.rejected,
        }
    }
}
