//! Reference navigation controller
//!
//! Consumes the lifecycle calls of both recognizers, moves through the carousel and owns the
//! [`SwipeStateSignal`] the wheel recognizer watches. State transitions:
//!
//! ```text
//! None ── swipe start ──> Swipe ── finish/cancel ──> Animation ── duration ──> None
//! None ── pull start ───> Pull ─── cancel ─────────> Animation ── duration ──> None
//!                              └── finish (Close) ──> None
//! ```
//!
//! Only the first drag started from `None` or `Animation` is followed; progress and terminal calls
//! are accepted only while the matching drag state is current.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use tracing::{debug, info};

use crate::gesture::{PullCallbacks, SwipeCallbacks, SwipeValidator};
use crate::swipe_state::{SwipeState, SwipeStateSignal, SwipeStateWatch};
use crate::timers::{TimerRegistry, TimerSlot};

/// Carousel layout and animation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationOptions {
    /// Finite carousels stop at both ends, others wrap around
    pub finite: bool,
    pub slides: usize,
    pub start_index: usize,
    pub swipe_animation_duration_ms: u64,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            finite: false,
            slides: 1,
            start_index: 0,
            swipe_animation_duration_ms: 500,
        }
    }
}

/// Outcome of a finished gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavigationEvent {
    Navigated { index: usize },
    Close,
}

/// Listener invoked for every navigation event
pub type NavigationListener = Arc<dyn Fn(NavigationEvent) + Send + Sync>;

#[derive(Debug, Default)]
struct Navigation {
    index: usize,
    offset: f64,
    animation: TimerSlot,
    events: Vec<NavigationEvent>,
}

/// Carousel navigation driven by swipe and pull lifecycles
pub struct NavigationController {
    options: NavigationOptions,
    timers: Arc<dyn TimerRegistry>,
    signal: SwipeStateSignal,
    listener: Option<NavigationListener>,
    navigation: Mutex<Navigation>,
    this: Weak<NavigationController>,
}

impl NavigationController {
    pub fn new(
        options: NavigationOptions,
        timers: Arc<dyn TimerRegistry>,
        listener: Option<NavigationListener>,
    ) -> Arc<Self> {
        let index = options.start_index.min(options.slides.saturating_sub(1));
        Arc::new_cyclic(|this| Self {
            options,
            timers,
            signal: SwipeStateSignal::new(),
            listener,
            navigation: Mutex::new(Navigation {
                index,
                ..Default::default()
            }),
            this: this.clone(),
        })
    }

    /// Read-only swipe state for the recognizers
    pub fn swipe_state(&self) -> SwipeStateWatch {
        self.signal.watch()
    }

    pub fn state(&self) -> SwipeState {
        self.signal.get()
    }

    /// Index of the current slide
    pub fn index(&self) -> usize {
        self.navigation.lock().index
    }

    /// Visual offset of the slide being dragged
    pub fn offset(&self) -> f64 {
        self.navigation.lock().offset
    }

    /// Every navigation event emitted so far
    pub fn events(&self) -> Vec<NavigationEvent> {
        self.navigation.lock().events.clone()
    }

    /// Whether there is a slide in the direction of `offset`
    ///
    /// A positive offset drags towards the previous slide.
    pub fn is_swipe_valid(&self, offset: f64) -> bool {
        if !self.options.finite {
            return true;
        }
        let index = self.navigation.lock().index;
        let last = self.options.slides.saturating_sub(1);
        !((index == 0 && offset > 0.0) || (index >= last && offset < 0.0))
    }

    /// Validator handed to the recognizers
    pub fn validator(&self) -> SwipeValidator {
        let this = self.this.clone();
        Arc::new(move |offset: f64| this.upgrade().is_some_and(|c| c.is_swipe_valid(offset)))
    }

    fn target_index(&self, index: usize, offset: f64) -> Option<usize> {
        let slides = self.options.slides;
        if slides == 0 || offset == 0.0 {
            return None;
        }

        let target = if offset > 0.0 {
            match index.checked_sub(1) {
                Some(previous) => previous,
                None if self.options.finite => return None,
                None => slides - 1,
            }
        } else if index + 1 < slides {
            index + 1
        } else if self.options.finite {
            return None;
        } else {
            0
        };

        (target != index).then_some(target)
    }

    /// Whether a lifecycle call belongs to the drag in progress
    ///
    /// Pointer and wheel share one state; calls from a gesture that did not win it are dropped.
    fn is_dragging(&self, expected: SwipeState, call: &str) -> bool {
        let state = self.signal.get();
        if state != expected {
            debug!(?state, ?expected, call, "Ignoring gesture call outside its drag");
        }
        state == expected
    }

    /// Enter a drag state; any running snap-back animation is abandoned
    ///
    /// The first drag wins: a start while another drag is in progress is ignored.
    fn begin_drag(&self, state: SwipeState) {
        let current = self.signal.get();
        if matches!(current, SwipeState::Swipe | SwipeState::Pull) {
            debug!(?current, requested = ?state, "Drag already in progress");
            return;
        }
        {
            let mut navigation = self.navigation.lock();
            navigation.animation.cancel(&self.timers);
            navigation.offset = 0.0;
        }
        self.signal.set(state);
    }

    fn drag(&self, offset: f64) {
        self.navigation.lock().offset = offset;
    }

    /// Animate to rest, optionally after moving to another slide
    fn settle(&self, navigate_by: Option<f64>) {
        let navigated = {
            let mut navigation = self.navigation.lock();
            navigation.offset = 0.0;

            let target = navigate_by.and_then(|offset| self.target_index(navigation.index, offset));
            if let Some(index) = target {
                navigation.index = index;
                navigation.events.push(NavigationEvent::Navigated { index });
            }

            let this = self.this.clone();
            navigation.animation.schedule(
                &self.timers,
                self.options.swipe_animation_duration_ms,
                Box::new(move || {
                    if let Some(this) = this.upgrade() {
                        this.finish_animation();
                    }
                }),
            );
            target
        };

        if let Some(index) = navigated {
            info!(index, "Navigated");
            self.notify(NavigationEvent::Navigated { index });
        }
        self.signal.set(SwipeState::Animation);
    }

    fn finish_animation(&self) {
        if self.signal.get() == SwipeState::Animation {
            debug!("Slide animation finished");
            self.signal.set(SwipeState::None);
        }
    }

    fn close(&self) {
        {
            let mut navigation = self.navigation.lock();
            navigation.offset = 0.0;
            navigation.animation.cancel(&self.timers);
            navigation.events.push(NavigationEvent::Close);
        }
        info!("Close requested");
        self.notify(NavigationEvent::Close);
        self.signal.set(SwipeState::None);
    }

    fn notify(&self, event: NavigationEvent) {
        if let Some(listener) = &self.listener {
            listener(event);
        }
    }
}

impl SwipeCallbacks for NavigationController {
    fn on_swipe_start(&self) {
        self.begin_drag(SwipeState::Swipe);
    }

    fn on_swipe_progress(&self, offset: f64) {
        if self.is_dragging(SwipeState::Swipe, "swipe progress") {
            self.drag(offset);
        }
    }

    fn on_swipe_finish(&self, offset: f64, duration_ms: u64) {
        if self.is_dragging(SwipeState::Swipe, "swipe finish") {
            debug!(offset, duration_ms, "Swipe finished");
            self.settle(Some(offset));
        }
    }

    fn on_swipe_cancel(&self, offset: f64) {
        if self.is_dragging(SwipeState::Swipe, "swipe cancel") {
            debug!(offset, "Swipe cancelled");
            self.settle(None);
        }
    }
}

impl PullCallbacks for NavigationController {
    fn on_pull_start(&self) {
        self.begin_drag(SwipeState::Pull);
    }

    fn on_pull_progress(&self, offset: f64) {
        if self.is_dragging(SwipeState::Pull, "pull progress") {
            self.drag(offset);
        }
    }

    fn on_pull_finish(&self, offset: f64, duration_ms: u64) {
        if self.is_dragging(SwipeState::Pull, "pull finish") {
            debug!(offset, duration_ms, "Pull finished");
            self.close();
        }
    }

    fn on_pull_cancel(&self, offset: f64) {
        if self.is_dragging(SwipeState::Pull, "pull cancel") {
            debug!(offset, "Pull cancelled");
            self.settle(None);
        }
    }
}
