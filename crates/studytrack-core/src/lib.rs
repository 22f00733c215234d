//! # studytrack Core Library
//!
//! Attention dwell-time accounting and distraction-alert debouncing for a
//! webcam study tracker. A frame classifier (outside this crate) labels each
//! frame as studying, distracted, absent or error; this library turns that
//! stream into study/distracted totals and decides when to alert.
//!
//! ## Architecture
//!
//! - **Tracker**: [`DwellTimeAccumulator`] bills each closed interval to the
//!   state that was active during it; [`AlertDebouncer`] applies a cooldown
//!   and a latch; [`Engine`] drives both once per observation.
//! - **Alerts**: [`AlertSink`] implementations deliver an alert;
//!   [`AlertDispatcher`] runs them off the producer thread, one at a time.
//! - **Storage**: TOML-based configuration.
//!
//! Nothing is persisted between sessions apart from the configuration.

pub mod alert;
pub mod attention;
pub mod error;
pub mod events;
pub mod storage;
pub mod tracker;

pub use alert::{AlertDispatcher, AlertSink, CommandSink, LogSink, SinkKind, TerminalBell};
pub use attention::{AttentionState, Observation};
pub use error::{AlertError, ConfigError, CoreError, DispatchError, TrackerError, ValidationError};
pub use events::Event;
pub use storage::Config;
pub use tracker::{
    AlertDebouncer, AlertDecision, DwellTimeAccumulator, DwellTimes, Engine, SessionSummary,
    TimesHandle,
};
