//! Recording lifecycle callbacks
//!
//! [`GestureLog`] implements both callback traits, timestamps every call and optionally
//! forwards it to the real consumer. Trace replay uses it to build its report; tests use it
//! to assert on the exact lifecycle sequence.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::{GestureEvent, PullCallbacks, SwipeCallbacks};
use crate::timers::Clock;

/// Which recognizer produced a lifecycle call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    Pointer,
    Wheel,
}

/// A timestamped lifecycle call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureRecord {
    pub at_ms: u64,
    pub source: InputSource,
    #[serde(flatten)]
    pub event: GestureEvent,
}

/// Lifecycle recorder (and optional forwarder)
#[derive(Clone)]
pub struct GestureLog {
    source: InputSource,
    clock: Arc<dyn Clock>,
    records: Arc<Mutex<Vec<GestureRecord>>>,
    swipe: Option<Arc<dyn SwipeCallbacks>>,
    pull: Option<Arc<dyn PullCallbacks>>,
}

impl GestureLog {
    pub fn new(source: InputSource, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            records: Arc::new(Mutex::new(Vec::new())),
            swipe: None,
            pull: None,
        }
    }

    /// Forward every recorded call to `swipe` / `pull`
    pub fn forwarding_to(
        mut self,
        swipe: Arc<dyn SwipeCallbacks>,
        pull: Option<Arc<dyn PullCallbacks>>,
    ) -> Self {
        self.swipe = Some(swipe);
        self.pull = pull;
        self
    }

    /// A log for another source that appends to the same record list
    pub fn sharing(&self, source: InputSource) -> Self {
        Self {
            source,
            ..self.clone()
        }
    }

    pub fn records(&self) -> Vec<GestureRecord> {
        self.records.lock().clone()
    }

    /// Recorded events without timestamps or sources
    pub fn events(&self) -> Vec<GestureEvent> {
        self.records.lock().iter().map(|r| r.event).collect()
    }

    fn record(&self, event: GestureEvent) {
        let record = GestureRecord {
            at_ms: self.clock.now_ms(),
            source: self.source,
            event,
        };
        debug!(source = ?record.source, at_ms = record.at_ms, ?event, "Gesture lifecycle");
        self.records.lock().push(record);

        if let Some(swipe) = &self.swipe {
            event.dispatch(swipe.as_ref(), self.pull.as_deref());
        }
    }
}

impl SwipeCallbacks for GestureLog {
    fn on_swipe_start(&self) {
        self.record(GestureEvent::SwipeStart);
    }

    fn on_swipe_progress(&self, offset: f64) {
        self.record(GestureEvent::SwipeProgress { offset });
    }

    fn on_swipe_finish(&self, offset: f64, duration_ms: u64) {
        self.record(GestureEvent::SwipeFinish {
            offset,
            duration_ms,
        });
    }

    fn on_swipe_cancel(&self, offset: f64) {
        self.record(GestureEvent::SwipeCancel { offset });
    }
}

impl PullCallbacks for GestureLog {
    fn on_pull_start(&self) {
        self.record(GestureEvent::PullStart);
    }

    fn on_pull_progress(&self, offset: f64) {
        self.record(GestureEvent::PullProgress { offset });
    }

    fn on_pull_finish(&self, offset: f64, duration_ms: u64) {
        self.record(GestureEvent::PullFinish {
            offset,
            duration_ms,
        });
    }

    fn on_pull_cancel(&self, offset: f64) {
        self.record(GestureEvent::PullCancel { offset });
    }
}
