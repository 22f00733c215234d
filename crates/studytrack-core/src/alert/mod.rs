//! Out-of-band distraction alerts.
//!
//! The engine only decides *when* to alert. Delivering the alert (a tone, a
//! banner, an external command) is the job of an [`AlertSink`], which the
//! [`AlertDispatcher`] runs off the producer thread with at most one delivery
//! in flight.

mod dispatcher;
mod sinks;

pub use dispatcher::AlertDispatcher;
pub use sinks::{CommandSink, LogSink, SinkKind, TerminalBell};

use crate::error::AlertError;

/// Every alert output implements this trait.
///
/// `fire` may block for as long as the alert lasts; it is never called on
/// the thread that feeds observations.
pub trait AlertSink: Send + Sync + 'static {
    /// Short identifier used in logs (e.g. "bell", "command").
    fn name(&self) -> &str;

    /// Deliver one alert.
    fn fire(&self) -> Result<(), AlertError>;
}

impl<F> AlertSink for F
where
    F: Fn() -> Result<(), AlertError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        "callback"
    }

    fn fire(&self) -> Result<(), AlertError> {
        self()
    }
}
