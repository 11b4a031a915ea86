//! Tokio-backed scheduler for live input

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::trace;

use super::{Clock, TimerCallback, TimerHandle, TimerRegistry};

struct Inner {
    runtime: Handle,
    start: Instant,
    next_id: AtomicU64,
    tasks: Mutex<HashMap<u64, AbortHandle>>,
}

/// Clock + timer registry running on the tokio runtime
///
/// Each timer is a spawned task sleeping for its delay; clearing aborts the task. The clock
/// is based on `tokio::time::Instant`, so paused-time tests see virtual time.
#[derive(Clone)]
pub struct TokioScheduler {
    inner: Arc<Inner>,
}

impl TokioScheduler {
    /// Create a scheduler bound to the current runtime
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn new() -> Self {
        Self::with_handle(Handle::current())
    }

    /// Create a scheduler bound to an explicit runtime handle
    pub fn with_handle(runtime: Handle) -> Self {
        Self {
            inner: Arc::new(Inner {
                runtime,
                start: Instant::now(),
                next_id: AtomicU64::new(1),
                tasks: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Number of timers that have neither fired nor been cleared
    pub fn pending(&self) -> usize {
        self.inner.tasks.lock().len()
    }
}

impl Clock for TokioScheduler {
    fn now_ms(&self) -> u64 {
        self.inner.start.elapsed().as_millis() as u64
    }
}

impl TimerRegistry for TokioScheduler {
    fn set_timeout(&self, delay_ms: u64, callback: TimerCallback) -> TimerHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::downgrade(&self.inner);

        // Hold the task map while spawning so the task cannot remove its entry before it exists
        let mut tasks = self.inner.tasks.lock();
        let task = self.inner.runtime.spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;

            let Some(inner) = inner.upgrade() else {
                return;
            };
            if inner.tasks.lock().remove(&id).is_none() {
                // Cleared while we were waking up
                return;
            }
            trace!(timer = id, "Firing timer");
            callback();
        });
        tasks.insert(id, task.abort_handle());

        TimerHandle(id)
    }

    fn clear_timeout(&self, handle: TimerHandle) {
        if let Some(task) = self.inner.tasks.lock().remove(&handle.0) {
            task.abort();
        }
    }
}
