mod accumulator;
mod debounce;
mod engine;

pub use accumulator::{DwellTimeAccumulator, DwellTimes};
pub use debounce::{AlertDebouncer, AlertDecision, DEFAULT_COOLDOWN_SECS};
pub use engine::{Engine, SessionSummary, TimesHandle};
