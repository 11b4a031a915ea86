//! Wheel gesture recognizer
//!
//! Horizontal wheel and trackpad deltas drive swipes (never pulls). What a delta means
//! depends on the swipe state published by the navigation controller:
//!
//! - `None`: deltas accumulate into an intent; crossing [`WHEEL_INTENT_THRESHOLD`] starts a swipe
//! - `Swipe`: deltas move the swipe offset; crossing [`WHEEL_FINISH_RATIO`] of the container
//!   finishes it, going quiet for twice the animation duration cancels it
//! - anything else: the slide is animating, deltas only feed inertia suppression
//!
//! Trackpads keep emitting decaying deltas after a fling. The last decisive delta is remembered
//! for [`WHEEL_INERTIA_WINDOW_MS`] and anything within [`WHEEL_INERTIA_FACTOR`] of it is treated
//! as momentum, so one physical fling never navigates twice.
//!
//! Every timer callback checks that the value it captured is still current before acting.
//!
//! The swipe state is shared with the pointer recognizer. Only a swipe this recognizer started
//! is advanced; while another source owns the swipe, deltas are treated like momentum.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

use super::{
    GestureEvent, SwipeCallbacks, SwipeValidator, WHEEL_FINISH_RATIO, WHEEL_INERTIA_FACTOR,
    WHEEL_INERTIA_WINDOW_MS, WHEEL_INTENT_THRESHOLD,
};
use crate::sensors::{SensorEvent, SensorKind, SensorSource, WheelEvent};
use crate::subscription::Subscription;
use crate::swipe_state::{SwipeState, SwipeStateWatch};
use crate::timers::{Clock, TimerRegistry, TimerSlot};

/// Per-session settings of the wheel recognizer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelSwipeOptions {
    /// Width of the slide container in px; also bounds the swipe offset
    pub container_width: f64,
    pub swipe_animation_duration_ms: u64,
}

impl Default for WheelSwipeOptions {
    fn default() -> Self {
        Self {
            container_width: 1000.0,
            swipe_animation_duration_ms: 500,
        }
    }
}

#[derive(Debug, Default)]
struct WheelTracking {
    offset: f64,
    intent: f64,
    inertia: f64,
    started_at_ms: u64,
    /// A swipe started here that has not finished or been cancelled yet
    owns_swipe: bool,
    intent_timer: TimerSlot,
    reset_timer: TimerSlot,
    inertia_timer: TimerSlot,
}

/// Wheel swipe recognizer
pub struct WheelSwipe {
    options: WheelSwipeOptions,
    clock: Arc<dyn Clock>,
    timers: Arc<dyn TimerRegistry>,
    swipe_state: SwipeStateWatch,
    is_swipe_valid: SwipeValidator,
    swipe: Arc<dyn SwipeCallbacks>,
    tracking: Mutex<WheelTracking>,
    this: Weak<WheelSwipe>,
}

impl WheelSwipe {
    pub fn new(
        options: WheelSwipeOptions,
        clock: Arc<dyn Clock>,
        timers: Arc<dyn TimerRegistry>,
        swipe_state: SwipeStateWatch,
        is_swipe_valid: SwipeValidator,
        swipe: Arc<dyn SwipeCallbacks>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            options,
            clock,
            timers,
            swipe_state,
            is_swipe_valid,
            swipe,
            tracking: Mutex::new(WheelTracking::default()),
            this: this.clone(),
        })
    }

    /// Subscribe to wheel sensors and to swipe state changes
    ///
    /// Both subscriptions hold weak references; drop the returned guards to detach.
    pub fn attach(self: &Arc<Self>, sensors: &dyn SensorSource) -> Vec<Subscription> {
        let on_wheel = self.this.clone();
        let on_state = self.this.clone();

        vec![
            sensors.subscribe(
                SensorKind::Wheel,
                Arc::new(move |event: &SensorEvent| {
                    if let (Some(this), Some(wheel)) = (on_wheel.upgrade(), event.wheel()) {
                        this.on_wheel(wheel);
                    }
                }),
            ),
            self.swipe_state.subscribe(Arc::new(move |state: SwipeState| {
                if let Some(this) = on_state.upgrade() {
                    this.on_swipe_state_changed(state);
                }
            })),
        ]
    }

    pub fn on_wheel(&self, event: &WheelEvent) {
        if event.ctrl_key {
            trace!("Zoom wheel ignored");
            return;
        }
        if event.delta_y.abs() > event.delta_x.abs() {
            trace!(delta_y = event.delta_y, "Vertical wheel ignored");
            return;
        }

        let state = self.swipe_state.get();
        let now = self.clock.now_ms();

        let emitted: Vec<GestureEvent> = {
            let mut tracking = self.tracking.lock();
            match state {
                SwipeState::None if !tracking.owns_swipe => self
                    .accumulate_intent(&mut tracking, event.delta_x, now)
                    .into_iter()
                    .collect(),
                SwipeState::Swipe if tracking.owns_swipe => {
                    self.advance_swipe(&mut tracking, event.delta_x, now)
                }
                _ => {
                    trace!(?state, delta_x = event.delta_x, "Wheel delta outside own swipe");
                    self.register_inertia(&mut tracking, event.delta_x);
                    Vec::new()
                }
            }
        };

        self.emit(emitted);
    }

    /// React to the controller leaving (or never entering) the swipe
    pub fn on_swipe_state_changed(&self, state: SwipeState) {
        if state == SwipeState::Swipe {
            return;
        }

        let mut tracking = self.tracking.lock();
        tracking.offset = 0.0;
        tracking.started_at_ms = 0;
        tracking.owns_swipe = false;
        tracking.intent_timer.cancel(&self.timers);
        tracking.reset_timer.cancel(&self.timers);
        trace!(?state, "Wheel swipe tracking reset");
    }

    /// Current swipe offset
    pub fn offset(&self) -> f64 {
        self.tracking.lock().offset
    }

    /// Accumulated intent since the last reset
    pub fn intent(&self) -> f64 {
        self.tracking.lock().intent
    }

    /// Magnitude currently treated as momentum, zero when none
    pub fn inertia(&self) -> f64 {
        self.tracking.lock().inertia
    }

    fn accumulate_intent(
        &self,
        tracking: &mut WheelTracking,
        delta_x: f64,
        now_ms: u64,
    ) -> Option<GestureEvent> {
        if delta_x.abs() <= WHEEL_INERTIA_FACTOR * tracking.inertia.abs() {
            trace!(delta_x, inertia = tracking.inertia, "Wheel momentum absorbed");
            self.register_inertia(tracking, delta_x);
            return None;
        }

        if !(self.is_swipe_valid)(-delta_x) {
            trace!(delta_x, "No slide in wheel direction");
            return None;
        }

        tracking.intent += delta_x;
        tracking.intent_timer.cancel(&self.timers);

        if tracking.intent.abs() > WHEEL_INTENT_THRESHOLD {
            debug!(intent = tracking.intent, "Wheel swipe started");
            tracking.intent = 0.0;
            self.register_inertia(tracking, 0.0);
            tracking.started_at_ms = now_ms;
            tracking.owns_swipe = true;
            return Some(GestureEvent::SwipeStart);
        }

        // Too slow an accumulation is abandoned
        let intent = tracking.intent;
        let this = self.this.clone();
        tracking.intent_timer.schedule(
            &self.timers,
            self.options.swipe_animation_duration_ms,
            Box::new(move || {
                if let Some(this) = this.upgrade() {
                    this.expire_intent(intent);
                }
            }),
        );
        None
    }

    fn advance_swipe(
        &self,
        tracking: &mut WheelTracking,
        delta_x: f64,
        now_ms: u64,
    ) -> Vec<GestureEvent> {
        let width = self.options.container_width;
        let raw = tracking.offset - delta_x;
        let offset = raw.abs().min(width).copysign(raw);
        tracking.offset = offset;

        let mut emitted = vec![GestureEvent::SwipeProgress { offset }];

        tracking.reset_timer.cancel(&self.timers);

        if offset.abs() > WHEEL_FINISH_RATIO * width {
            self.register_inertia(tracking, delta_x);
            tracking.owns_swipe = false;
            let duration_ms = now_ms.saturating_sub(tracking.started_at_ms);
            debug!(offset, duration_ms, "Wheel swipe finished");
            emitted.push(GestureEvent::SwipeFinish {
                offset,
                duration_ms,
            });
            return emitted;
        }

        let this = self.this.clone();
        tracking.reset_timer.schedule(
            &self.timers,
            2 * self.options.swipe_animation_duration_ms,
            Box::new(move || {
                if let Some(this) = this.upgrade() {
                    this.cancel_stalled_swipe(offset);
                }
            }),
        );
        emitted
    }

    fn register_inertia(&self, tracking: &mut WheelTracking, inertia: f64) {
        tracking.inertia = inertia;

        if inertia == 0.0 {
            tracking.inertia_timer.cancel(&self.timers);
            return;
        }

        let this = self.this.clone();
        tracking.inertia_timer.schedule(
            &self.timers,
            WHEEL_INERTIA_WINDOW_MS,
            Box::new(move || {
                if let Some(this) = this.upgrade() {
                    this.expire_inertia(inertia);
                }
            }),
        );
    }

    fn expire_intent(&self, intent: f64) {
        let mut tracking = self.tracking.lock();
        if tracking.intent == intent {
            trace!(intent, "Wheel intent expired");
            tracking.intent = 0.0;
        }
    }

    fn expire_inertia(&self, inertia: f64) {
        let mut tracking = self.tracking.lock();
        if tracking.inertia == inertia {
            tracking.inertia = 0.0;
        }
    }

    fn cancel_stalled_swipe(&self, offset: f64) {
        // Ownership is checked and released under one lock; a racing delta sees it gone
        let stalled = {
            let mut tracking = self.tracking.lock();
            let stalled = tracking.owns_swipe && tracking.offset == offset;
            if stalled {
                tracking.owns_swipe = false;
            }
            stalled
        };
        if stalled {
            debug!(offset, "Wheel swipe stalled, cancelling");
            self.emit(vec![GestureEvent::SwipeCancel { offset }]);
        }
    }

    // Callbacks run after the tracking lock is released
    fn emit(&self, emitted: Vec<GestureEvent>) {
        for event in emitted {
            trace!(?event, "Wheel gesture event");
            event.dispatch(self.swipe.as_ref(), None);
        }
    }
}
