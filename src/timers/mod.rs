//! Clock and delayed-callback facilities
//!
//! Recognizers read time through [`Clock`] and schedule debounce/reset callbacks through
//! [`TimerRegistry`]. Two implementations ship with the crate:
//!
//! - [`ManualScheduler`]: virtual time advanced explicitly (tests, trace replay)
//! - [`TokioScheduler`]: real timers on the tokio runtime

pub mod live;
pub mod manual;

use std::fmt;
use std::sync::Arc;

pub use live::TokioScheduler;
pub use manual::ManualScheduler;

/// Callback run once when a timer fires
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Identifies a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub(crate) u64);

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Monotonic millisecond clock
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Scoped, cancelable delayed callbacks
pub trait TimerRegistry: Send + Sync {
    /// Run `callback` once after `delay_ms`
    fn set_timeout(&self, delay_ms: u64, callback: TimerCallback) -> TimerHandle;

    /// Cancel a pending timer; unknown or already-fired handles are ignored
    fn clear_timeout(&self, handle: TimerHandle);
}

/// Owned timer handle for a single concern
///
/// Scheduling through a slot always clears whatever the slot held before, so at most one
/// timer per concern is ever pending.
#[derive(Debug, Default)]
pub struct TimerSlot {
    handle: Option<TimerHandle>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending timer (if any) with a new one
    pub fn schedule(
        &mut self,
        timers: &Arc<dyn TimerRegistry>,
        delay_ms: u64,
        callback: TimerCallback,
    ) -> TimerHandle {
        self.cancel(timers);
        let handle = timers.set_timeout(delay_ms, callback);
        self.handle = Some(handle);
        handle
    }

    /// Clear the pending timer, if any
    pub fn cancel(&mut self, timers: &Arc<dyn TimerRegistry>) {
        if let Some(handle) = self.handle.take() {
            timers.clear_timeout(handle);
        }
    }

    pub fn is_set(&self) -> bool {
        self.handle.is_some()
    }
}
