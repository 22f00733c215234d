use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use tracing::{info, warn};

use super::AlertSink;
use crate::error::DispatchError;

/// Single-slot, fire-and-forget alert runner.
///
/// `dispatch` never waits for the sink. A second dispatch while the first is
/// still running is refused with [`DispatchError::AlreadyRunning`].
#[derive(Clone)]
pub struct AlertDispatcher {
    sink: Arc<dyn AlertSink>,
    in_flight: Arc<AtomicBool>,
    started: Arc<AtomicU64>,
}

/// Clears the in-flight flag when the worker exits, panics included.
struct SlotGuard(Arc<AtomicBool>);

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl AlertDispatcher {
    pub fn new(sink: Arc<dyn AlertSink>) -> Self {
        Self {
            sink,
            in_flight: Arc::new(AtomicBool::new(false)),
            started: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }

    pub fn is_dispatching(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Number of dispatches that were started.
    pub fn dispatch_count(&self) -> u64 {
        self.started.load(Ordering::Relaxed)
    }

    /// Start delivering one alert on a background thread.
    ///
    /// # Errors
    ///
    /// [`DispatchError::AlreadyRunning`] if a delivery is in flight,
    /// [`DispatchError::Spawn`] if the worker thread could not be created.
    pub fn dispatch(&self) -> Result<(), DispatchError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DispatchError::AlreadyRunning);
        }

        let guard = SlotGuard(Arc::clone(&self.in_flight));
        let sink = Arc::clone(&self.sink);

        // On spawn failure the closure is dropped, and the guard with it.
        thread::Builder::new()
            .name("alert-dispatch".to_string())
            .spawn(move || {
                let _guard = guard;
                match sink.fire() {
                    Ok(()) => info!(sink = sink.name(), "alert delivered"),
                    Err(e) => warn!(sink = sink.name(), error = %e, "alert delivery failed"),
                }
            })
            .map_err(DispatchError::Spawn)?;

        self.started.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl std::fmt::Debug for AlertDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertDispatcher")
            .field("sink", &self.sink.name())
            .field("in_flight", &self.is_dispatching())
            .field("started", &self.dispatch_count())
            .finish()
    }
}
