//! Virtual-time scheduler
//!
//! Time only moves when [`ManualScheduler::advance`] or [`ManualScheduler::advance_to`] is
//! called. Due timers fire in deadline order (ties in scheduling order) and the clock reads the
//! timer's deadline while its callback runs.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::trace;

use super::{Clock, TimerCallback, TimerHandle, TimerRegistry};

#[derive(Default)]
struct Queue {
    now_ms: u64,
    next_id: u64,
    /// Keyed by (deadline, id) so iteration order is firing order
    pending: BTreeMap<(u64, u64), TimerCallback>,
}

/// Deterministic clock + timer registry
#[derive(Default)]
pub struct ManualScheduler {
    queue: Mutex<Queue>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the clock at `now_ms` instead of zero
    pub fn starting_at(now_ms: u64) -> Self {
        let scheduler = Self::default();
        scheduler.queue.lock().now_ms = now_ms;
        scheduler
    }

    /// Move time forward by `delta_ms`, firing every timer that becomes due
    pub fn advance(&self, delta_ms: u64) {
        let target = self.now_ms().saturating_add(delta_ms);
        self.advance_to(target);
    }

    /// Move time forward to `target_ms`, firing every timer that becomes due
    ///
    /// Targets in the past leave the clock untouched. Callbacks run without the queue lock,
    /// so they may schedule or clear timers; anything they schedule at or before the target
    /// fires in the same call.
    pub fn advance_to(&self, target_ms: u64) {
        loop {
            let due = {
                let mut queue = self.queue.lock();
                let next = queue
                    .pending
                    .keys()
                    .next()
                    .copied()
                    .filter(|(deadline, _)| *deadline <= target_ms);

                match next {
                    Some(key) => {
                        queue.now_ms = queue.now_ms.max(key.0);
                        queue.pending.remove(&key).map(|callback| (key, callback))
                    }
                    None => {
                        queue.now_ms = queue.now_ms.max(target_ms);
                        None
                    }
                }
            };

            match due {
                Some(((deadline, id), callback)) => {
                    trace!(timer = id, deadline, "Firing timer");
                    callback();
                }
                None => break,
            }
        }
    }

    /// Number of timers still waiting to fire
    pub fn pending(&self) -> usize {
        self.queue.lock().pending.len()
    }
}

impl Clock for ManualScheduler {
    fn now_ms(&self) -> u64 {
        self.queue.lock().now_ms
    }
}

impl TimerRegistry for ManualScheduler {
    fn set_timeout(&self, delay_ms: u64, callback: TimerCallback) -> TimerHandle {
        let mut queue = self.queue.lock();
        queue.next_id += 1;
        let id = queue.next_id;
        let deadline = queue.now_ms.saturating_add(delay_ms);
        queue.pending.insert((deadline, id), callback);
        TimerHandle(id)
    }

    fn clear_timeout(&self, handle: TimerHandle) {
        let mut queue = self.queue.lock();
        let key = queue
            .pending
            .keys()
            .find(|(_, id)| *id == handle.0)
            .copied();
        if let Some(key) = key {
            queue.pending.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<(&'static str, u64)>>>, Arc<ManualScheduler>) {
        (Arc::new(Mutex::new(Vec::new())), Arc::new(ManualScheduler::new()))
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let (log, scheduler) = recorder();

        for (name, delay) in [("late", 300), ("early", 100), ("middle", 200)] {
            let log = log.clone();
            let clock = scheduler.clone();
            scheduler.set_timeout(
                delay,
                Box::new(move || log.lock().push((name, clock.now_ms()))),
            );
        }

        scheduler.advance(250);
        assert_eq!(*log.lock(), vec![("early", 100), ("middle", 200)]);
        assert_eq!(scheduler.now_ms(), 250);

        scheduler.advance(50);
        assert_eq!(log.lock().last(), Some(&("late", 300)));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_cleared_timer_never_fires() {
        let (log, scheduler) = recorder();

        let log_clone = log.clone();
        let handle = scheduler.set_timeout(10, Box::new(move || log_clone.lock().push(("x", 0))));
        scheduler.clear_timeout(handle);
        // Clearing twice is harmless
        scheduler.clear_timeout(handle);

        scheduler.advance(100);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_callback_can_reschedule() {
        let (log, scheduler) = recorder();

        let inner_log = log.clone();
        let inner_scheduler = scheduler.clone();
        scheduler.set_timeout(
            10,
            Box::new(move || {
                let log = inner_log.clone();
                let clock = inner_scheduler.clone();
                inner_scheduler.set_timeout(
                    10,
                    Box::new(move || log.lock().push(("second", clock.now_ms()))),
                );
            }),
        );

        scheduler.advance(25);
        assert_eq!(*log.lock(), vec![("second", 20)]);
    }

    #[test]
    fn test_advance_to_past_is_noop() {
        let scheduler = ManualScheduler::starting_at(500);
        scheduler.advance_to(100);
        assert_eq!(scheduler.now_ms(), 500);
    }
}
