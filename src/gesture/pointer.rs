//! Pointer gesture recognizer
//!
//! Tracks every pressed touch/pen/mouse pointer and promotes at most one of them to the
//! owner of a gesture:
//!
//! - horizontal drag past [`SWIPE_THRESHOLD`] in a valid direction → swipe
//! - vertical drag past [`SWIPE_THRESHOLD`] in an enabled direction → pull
//!
//! Only the owner moves the gesture forward. Releasing the owner decides between finish and
//! cancel; every other pointer only updates tracking.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

use super::{
    Gesture, GestureEvent, PullCallbacks, SwipeCallbacks, SwipeValidator, FAST_SWIPE_MIN_OFFSET,
    PULL_FINISH_THRESHOLD, SWIPE_FINISH_RATIO, SWIPE_THRESHOLD,
};
use crate::sensors::{PointerEvent, SensorEvent, SensorHandler, SensorKind, SensorSource};
use crate::subscription::Subscription;
use crate::timers::Clock;

/// Per-session settings of the pointer recognizer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSwipeOptions {
    pub disable_swipe_navigation: bool,
    pub pull_up_enabled: bool,
    pub pull_down_enabled: bool,
    /// Width of the slide container in px
    pub container_width: f64,
    pub swipe_animation_duration_ms: u64,
}

impl Default for PointerSwipeOptions {
    fn default() -> Self {
        Self {
            disable_swipe_navigation: false,
            pull_up_enabled: false,
            pull_down_enabled: false,
            container_width: 1000.0,
            swipe_animation_duration_ms: 500,
        }
    }
}

impl PointerSwipeOptions {
    /// Whether `value` passes `threshold` in a direction pulls are enabled for
    fn exceeds_pull_threshold(&self, value: f64, threshold: f64) -> bool {
        (self.pull_down_enabled && value > threshold) || (self.pull_up_enabled && value < -threshold)
    }
}

#[derive(Debug, Clone, Copy)]
struct TrackedPointer {
    pointer_id: i64,
    x: f64,
    y: f64,
    captured_at_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveKind {
    Swipe,
    Pull,
}

#[derive(Debug, Clone, Copy)]
struct ActiveGesture {
    kind: ActiveKind,
    owner: i64,
    started_at_ms: u64,
    offset: f64,
}

impl ActiveGesture {
    /// Finish or cancel, decided at release time
    fn settle(&self, now_ms: u64, options: &PointerSwipeOptions) -> GestureEvent {
        let duration_ms = now_ms.saturating_sub(self.started_at_ms);
        let offset = self.offset;

        match self.kind {
            ActiveKind::Swipe => {
                let far_enough = offset.abs() > SWIPE_FINISH_RATIO * options.container_width;
                let quick_flick = offset.abs() > FAST_SWIPE_MIN_OFFSET
                    && duration_ms < options.swipe_animation_duration_ms;

                if far_enough || quick_flick {
                    GestureEvent::SwipeFinish {
                        offset,
                        duration_ms,
                    }
                } else {
                    GestureEvent::SwipeCancel { offset }
                }
            }
            ActiveKind::Pull => {
                if options.exceeds_pull_threshold(offset, PULL_FINISH_THRESHOLD) {
                    GestureEvent::PullFinish {
                        offset,
                        duration_ms,
                    }
                } else {
                    GestureEvent::PullCancel { offset }
                }
            }
        }
    }

    fn cancel(&self) -> GestureEvent {
        match self.kind {
            ActiveKind::Swipe => GestureEvent::SwipeCancel {
                offset: self.offset,
            },
            ActiveKind::Pull => GestureEvent::PullCancel {
                offset: self.offset,
            },
        }
    }
}

/// Mutable tracking state; every transition returns the lifecycle call it implies
#[derive(Debug, Default)]
struct Tracking {
    pointers: Vec<TrackedPointer>,
    active: Option<ActiveGesture>,
}

impl Tracking {
    fn find(&self, pointer_id: i64) -> Option<TrackedPointer> {
        self.pointers
            .iter()
            .find(|p| p.pointer_id == pointer_id)
            .copied()
    }

    fn is_owner(&self, pointer_id: i64) -> bool {
        self.active.is_some_and(|a| a.owner == pointer_id)
    }

    /// Tear down the gesture owned by `pointer_id` without evaluating it
    fn drop_owner(&mut self, pointer_id: i64) -> Option<GestureEvent> {
        if !self.is_owner(pointer_id) {
            return None;
        }
        let active = self.active.take()?;
        debug!(pointer_id, offset = active.offset, "Gesture owner lost, cancelling");
        Some(active.cancel())
    }

    fn forget(&mut self, pointer_id: i64) {
        self.pointers.retain(|p| p.pointer_id != pointer_id);
    }

    /// Stop tracking a pointer
    fn clear(&mut self, pointer_id: i64) -> Option<GestureEvent> {
        let cancelled = self.drop_owner(pointer_id);
        self.forget(pointer_id);
        cancelled
    }

    /// Start (or restart) tracking a pointer at its current position
    fn capture(&mut self, event: &PointerEvent, now_ms: u64) -> Option<GestureEvent> {
        let cancelled = self.clear(event.pointer_id);
        self.track(event, now_ms);
        cancelled
    }

    fn track(&mut self, event: &PointerEvent, now_ms: u64) {
        self.pointers.push(TrackedPointer {
            pointer_id: event.pointer_id,
            x: event.x,
            y: event.y,
            captured_at_ms: now_ms,
        });
    }

    fn begin(&mut self, kind: ActiveKind, event: &PointerEvent, now_ms: u64) {
        debug_assert!(self.active.is_none(), "gesture started while another is active");
        // Offsets are measured from where the gesture was recognized
        self.forget(event.pointer_id);
        self.track(event, now_ms);
        self.active = Some(ActiveGesture {
            kind,
            owner: event.pointer_id,
            started_at_ms: now_ms,
            offset: 0.0,
        });
        debug!(pointer_id = event.pointer_id, ?kind, "Gesture started");
    }

    fn pointer_up(
        &mut self,
        pointer_id: i64,
        now_ms: u64,
        options: &PointerSwipeOptions,
    ) -> Option<GestureEvent> {
        let mut settled = None;

        if let Some(pointer) = self.find(pointer_id) {
            trace!(
                pointer_id,
                held_ms = now_ms.saturating_sub(pointer.captured_at_ms),
                "Pointer released"
            );
            if self.is_owner(pointer_id) {
                settled = self.active.take().map(|active| active.settle(now_ms, options));
            }
        }

        self.forget(pointer_id);
        settled
    }

    fn pointer_move(
        &mut self,
        event: &PointerEvent,
        now_ms: u64,
        options: &PointerSwipeOptions,
        is_swipe_valid: &SwipeValidator,
    ) -> Option<GestureEvent> {
        let Some(pointer) = self.find(event.pointer_id) else {
            trace!(pointer_id = event.pointer_id, "Move for untracked pointer ignored");
            return None;
        };

        if event.buttons == 0 {
            // The release was swallowed (pointer let go over an opaque element) or arrived
            // out of order; either way the pointer is no longer pressed.
            let moved = self.active.is_some_and(|a| a.offset != 0.0);
            if self.is_owner(event.pointer_id) && moved {
                return self.pointer_up(event.pointer_id, now_ms, options);
            }
            return self.clear(event.pointer_id);
        }

        let delta_x = event.x - pointer.x;
        let delta_y = event.y - pointer.y;

        if self.active.is_none() {
            if delta_x.abs() > delta_y.abs()
                && delta_x.abs() > SWIPE_THRESHOLD
                && is_swipe_valid(delta_x)
            {
                if options.disable_swipe_navigation {
                    trace!(pointer_id = event.pointer_id, "Swipe navigation disabled");
                    return None;
                }
                self.begin(ActiveKind::Swipe, event, now_ms);
                return Some(GestureEvent::SwipeStart);
            }

            if delta_y.abs() > delta_x.abs()
                && options.exceeds_pull_threshold(delta_y, SWIPE_THRESHOLD)
            {
                self.begin(ActiveKind::Pull, event, now_ms);
                return Some(GestureEvent::PullStart);
            }

            return None;
        }

        let active = self.active.as_mut()?;
        if active.owner != event.pointer_id {
            return None;
        }

        match active.kind {
            ActiveKind::Swipe => {
                active.offset = delta_x;
                Some(GestureEvent::SwipeProgress { offset: delta_x })
            }
            ActiveKind::Pull => {
                active.offset = delta_y;
                Some(GestureEvent::PullProgress { offset: delta_y })
            }
        }
    }
}

/// Pointer swipe/pull recognizer
pub struct PointerSwipe {
    options: PointerSwipeOptions,
    clock: Arc<dyn Clock>,
    is_swipe_valid: SwipeValidator,
    swipe: Arc<dyn SwipeCallbacks>,
    pull: Arc<dyn PullCallbacks>,
    tracking: Mutex<Tracking>,
}

impl PointerSwipe {
    pub fn new(
        options: PointerSwipeOptions,
        clock: Arc<dyn Clock>,
        is_swipe_valid: SwipeValidator,
        swipe: Arc<dyn SwipeCallbacks>,
        pull: Arc<dyn PullCallbacks>,
    ) -> Self {
        Self {
            options,
            clock,
            is_swipe_valid,
            swipe,
            pull,
            tracking: Mutex::new(Tracking::default()),
        }
    }

    /// Subscribe to pointer sensors
    ///
    /// Leave and cancel are handled like a release. Handlers hold a weak reference, so the
    /// subscriptions never keep the recognizer alive; drop them to detach.
    pub fn attach(self: &Arc<Self>, sensors: &dyn SensorSource) -> Vec<Subscription> {
        vec![
            sensors.subscribe(SensorKind::PointerDown, self.handler(Self::on_pointer_down)),
            sensors.subscribe(SensorKind::PointerMove, self.handler(Self::on_pointer_move)),
            sensors.subscribe(SensorKind::PointerUp, self.handler(Self::on_pointer_up)),
            sensors.subscribe(SensorKind::PointerLeave, self.handler(Self::on_pointer_up)),
            sensors.subscribe(SensorKind::PointerCancel, self.handler(Self::on_pointer_up)),
        ]
    }

    fn handler(self: &Arc<Self>, f: fn(&Self, &PointerEvent)) -> SensorHandler {
        let this: Weak<Self> = Arc::downgrade(self);
        Arc::new(move |event: &SensorEvent| {
            if let (Some(this), Some(pointer)) = (this.upgrade(), event.pointer()) {
                f(&this, pointer);
            }
        })
    }

    pub fn on_pointer_down(&self, event: &PointerEvent) {
        let now = self.clock.now_ms();
        let emitted = self.tracking.lock().capture(event, now);
        self.emit(emitted);
    }

    pub fn on_pointer_move(&self, event: &PointerEvent) {
        let now = self.clock.now_ms();
        let emitted =
            self.tracking
                .lock()
                .pointer_move(event, now, &self.options, &self.is_swipe_valid);
        self.emit(emitted);
    }

    pub fn on_pointer_up(&self, event: &PointerEvent) {
        let now = self.clock.now_ms();
        let emitted = self
            .tracking
            .lock()
            .pointer_up(event.pointer_id, now, &self.options);
        self.emit(emitted);
    }

    /// Gesture currently in progress
    pub fn gesture(&self) -> Gesture {
        match self.tracking.lock().active.map(|a| a.kind) {
            None => Gesture::None,
            Some(ActiveKind::Swipe) => Gesture::Swipe,
            Some(ActiveKind::Pull) => Gesture::Pull,
        }
    }

    /// Pointer that owns the current gesture
    pub fn owner(&self) -> Option<i64> {
        self.tracking.lock().active.map(|a| a.owner)
    }

    /// Offset of the current gesture, zero when idle
    pub fn offset(&self) -> f64 {
        self.tracking.lock().active.map_or(0.0, |a| a.offset)
    }

    /// Identifiers of every pointer currently pressed
    pub fn tracked_pointers(&self) -> Vec<i64> {
        self.tracking
            .lock()
            .pointers
            .iter()
            .map(|p| p.pointer_id)
            .collect()
    }

    // Callbacks run after the tracking lock is released
    fn emit(&self, emitted: Option<GestureEvent>) {
        if let Some(event) = emitted {
            trace!(?event, "Pointer gesture event");
            event.dispatch(self.swipe.as_ref(), Some(self.pull.as_ref()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{always_valid, GestureLog, InputSource};
    use crate::sensors::{SensorEvent, Sensors};
    use crate::timers::ManualScheduler;

    struct Harness {
        scheduler: Arc<ManualScheduler>,
        log: GestureLog,
        recognizer: Arc<PointerSwipe>,
    }

    impl Harness {
        fn new(options: PointerSwipeOptions) -> Self {
            Self::with_validator(options, always_valid())
        }

        fn with_validator(options: PointerSwipeOptions, validator: SwipeValidator) -> Self {
            let scheduler = Arc::new(ManualScheduler::new());
            let log = GestureLog::new(InputSource::Pointer, scheduler.clone());
            let recognizer = Arc::new(PointerSwipe::new(
                options,
                scheduler.clone(),
                validator,
                Arc::new(log.clone()),
                Arc::new(log.clone()),
            ));
            Self {
                scheduler,
                log,
                recognizer,
            }
        }

        fn at(&self, ms: u64) -> &Self {
            self.scheduler.advance_to(ms);
            self
        }

        fn down(&self, id: i64, x: f64, y: f64) -> &Self {
            self.recognizer.on_pointer_down(&PointerEvent::new(id, x, y));
            self
        }

        fn drag(&self, id: i64, x: f64, y: f64) -> &Self {
            self.recognizer.on_pointer_move(&PointerEvent::new(id, x, y));
            self
        }

        fn up(&self, id: i64, x: f64, y: f64) -> &Self {
            self.recognizer
                .on_pointer_up(&PointerEvent::new(id, x, y).with_buttons(0));
            self
        }

        fn events(&self) -> Vec<GestureEvent> {
            self.log.events()
        }
    }

    fn options() -> PointerSwipeOptions {
        PointerSwipeOptions {
            container_width: 1000.0,
            swipe_animation_duration_ms: 250,
            ..Default::default()
        }
    }

    #[test]
    fn test_quick_short_swipe_finishes() {
        let h = Harness::new(options());

        h.at(0).down(1, 100.0, 100.0);
        h.at(10).drag(1, 135.0, 100.0); // recognized here, offsets measured from x=135
        h.at(40).drag(1, 175.0, 102.0);
        h.at(60).up(1, 175.0, 102.0);

        assert_eq!(
            h.events(),
            vec![
                GestureEvent::SwipeStart,
                GestureEvent::SwipeProgress { offset: 40.0 },
                GestureEvent::SwipeFinish {
                    offset: 40.0,
                    duration_ms: 50
                },
            ]
        );
        assert_eq!(h.recognizer.gesture(), Gesture::None);
        assert!(h.recognizer.tracked_pointers().is_empty());
    }

    #[test]
    fn test_slow_short_swipe_cancels() {
        let h = Harness::new(options());

        h.at(0).down(1, 100.0, 100.0);
        h.at(10).drag(1, 135.0, 100.0);
        h.at(200).drag(1, 175.0, 100.0);
        h.at(410).up(1, 175.0, 100.0);

        assert_eq!(
            h.events().last(),
            Some(&GestureEvent::SwipeCancel { offset: 40.0 })
        );
    }

    #[test]
    fn test_long_swipe_finishes_regardless_of_duration() {
        let h = Harness::new(options());

        h.at(0).down(1, 500.0, 100.0);
        h.at(10).drag(1, 460.0, 100.0);
        h.at(500).drag(1, 110.0, 100.0);
        h.at(2010).up(1, 110.0, 100.0);

        assert_eq!(
            h.events().last(),
            Some(&GestureEvent::SwipeFinish {
                offset: -350.0,
                duration_ms: 2000
            })
        );
    }

    #[test]
    fn test_tiny_quick_swipe_cancels() {
        let h = Harness::new(options());

        h.at(0).down(1, 0.0, 0.0);
        h.at(5).drag(1, 31.0, 0.0);
        h.at(10).drag(1, 35.0, 0.0);
        h.at(20).up(1, 35.0, 0.0);

        assert_eq!(
            h.events().last(),
            Some(&GestureEvent::SwipeCancel { offset: 4.0 })
        );
    }

    #[test]
    fn test_pull_up_starts_at_threshold_and_finishes_at_double() {
        let h = Harness::new(PointerSwipeOptions {
            pull_up_enabled: true,
            ..options()
        });

        h.at(0).down(1, 200.0, 400.0);
        h.at(10).drag(1, 200.0, 380.0);
        assert!(h.events().is_empty(), "20px is below the threshold");

        h.at(20).drag(1, 201.0, 369.0);
        assert_eq!(h.events(), vec![GestureEvent::PullStart]);

        h.at(50).drag(1, 201.0, 299.0);
        h.at(90).up(1, 201.0, 299.0);

        assert_eq!(
            h.events()[1..],
            [
                GestureEvent::PullProgress { offset: -70.0 },
                GestureEvent::PullFinish {
                    offset: -70.0,
                    duration_ms: 70
                },
            ]
        );
    }

    #[test]
    fn test_pull_below_double_threshold_cancels() {
        let h = Harness::new(PointerSwipeOptions {
            pull_down_enabled: true,
            ..options()
        });

        h.at(0).down(1, 0.0, 0.0);
        h.at(10).drag(1, 0.0, 31.0);
        h.at(20).drag(1, 0.0, 81.0);
        h.at(30).up(1, 0.0, 81.0);

        assert_eq!(
            h.events(),
            vec![
                GestureEvent::PullStart,
                GestureEvent::PullProgress { offset: 50.0 },
                GestureEvent::PullCancel { offset: 50.0 },
            ]
        );
    }

    #[test]
    fn test_pull_in_disabled_direction_is_ignored() {
        let h = Harness::new(PointerSwipeOptions {
            pull_up_enabled: true,
            ..options()
        });

        h.at(0).down(1, 0.0, 0.0);
        h.at(10).drag(1, 0.0, 120.0);
        h.at(20).up(1, 0.0, 120.0);

        assert!(h.events().is_empty());
    }

    #[test]
    fn test_second_pointer_never_moves_active_gesture() {
        let h = Harness::new(options());

        h.at(0).down(1, 100.0, 100.0).down(2, 600.0, 100.0);
        h.at(10).drag(1, 140.0, 100.0);
        assert_eq!(h.recognizer.owner(), Some(1));

        h.at(20).drag(1, 160.0, 100.0);
        h.at(25).drag(2, 900.0, 100.0);
        h.at(30).drag(2, 200.0, 100.0);
        assert_eq!(h.recognizer.offset(), 20.0);

        // Releasing the bystander does not end the gesture
        h.at(35).up(2, 200.0, 100.0);
        assert_eq!(h.recognizer.gesture(), Gesture::Swipe);
        assert_eq!(h.recognizer.tracked_pointers(), vec![1]);

        h.at(40).up(1, 160.0, 100.0);
        assert_eq!(
            h.events(),
            vec![
                GestureEvent::SwipeStart,
                GestureEvent::SwipeProgress { offset: 20.0 },
                GestureEvent::SwipeFinish {
                    offset: 20.0,
                    duration_ms: 30
                },
            ]
        );
    }

    #[test]
    fn test_recognized_gesture_reanchors_owner() {
        let h = Harness::new(options());

        h.at(0).down(1, 100.0, 100.0).down(2, 600.0, 100.0);
        h.at(10).drag(1, 140.0, 100.0);

        assert_eq!(h.events(), vec![GestureEvent::SwipeStart]);
        assert_eq!(h.recognizer.offset(), 0.0);
        // The owner is tracked once, from its new anchor
        assert_eq!(h.recognizer.tracked_pointers(), vec![2, 1]);

        h.at(20).drag(1, 150.0, 100.0);
        assert_eq!(h.recognizer.offset(), 10.0);
    }

    #[test]
    fn test_zero_delta_moves_never_start() {
        let h = Harness::new(PointerSwipeOptions {
            pull_up_enabled: true,
            pull_down_enabled: true,
            ..options()
        });

        h.at(0).down(1, 50.0, 50.0);
        for t in 1..20 {
            h.at(t).drag(1, 50.0, 50.0);
        }

        assert!(h.events().is_empty());
        assert_eq!(h.recognizer.gesture(), Gesture::None);
    }

    #[test]
    fn test_releasing_non_owner_only_clears_tracking() {
        let h = Harness::new(options());

        h.at(0).down(7, 10.0, 10.0).down(8, 20.0, 20.0);
        h.at(5).up(7, 10.0, 10.0);

        assert_eq!(h.recognizer.tracked_pointers(), vec![8]);
        assert!(h.events().is_empty());

        // Up for a pointer never seen is ignored as well
        h.at(6).up(99, 0.0, 0.0);
        assert!(h.events().is_empty());
    }

    #[test]
    fn test_move_without_buttons_acts_as_release() {
        let h = Harness::new(options());

        h.at(0).down(1, 0.0, 0.0);
        h.at(10).drag(1, -40.0, 0.0);
        h.at(20).drag(1, -60.0, 0.0);
        h.at(30)
            .recognizer
            .on_pointer_move(&PointerEvent::new(1, -60.0, 0.0).with_buttons(0));

        assert_eq!(
            h.events().last(),
            Some(&GestureEvent::SwipeFinish {
                offset: -20.0,
                duration_ms: 20
            })
        );
        assert!(h.recognizer.tracked_pointers().is_empty());

        // The late real release finds nothing to do
        h.at(31).up(1, -60.0, 0.0);
        assert_eq!(h.events().len(), 3);
    }

    #[test]
    fn test_move_without_buttons_before_progress_cancels() {
        let h = Harness::new(options());

        h.at(0).down(1, 0.0, 0.0);
        h.at(10).drag(1, 40.0, 0.0);
        h.at(15)
            .recognizer
            .on_pointer_move(&PointerEvent::new(1, 40.0, 0.0).with_buttons(0));

        assert_eq!(
            h.events(),
            vec![
                GestureEvent::SwipeStart,
                GestureEvent::SwipeCancel { offset: 0.0 }
            ]
        );
        assert_eq!(h.recognizer.gesture(), Gesture::None);
        assert!(h.recognizer.tracked_pointers().is_empty());
    }

    #[test]
    fn test_move_without_buttons_for_idle_pointer_drops_it() {
        let h = Harness::new(options());

        h.at(0).down(1, 0.0, 0.0);
        h.recognizer
            .on_pointer_move(&PointerEvent::new(1, 100.0, 0.0).with_buttons(0));

        assert!(h.events().is_empty());
        assert!(h.recognizer.tracked_pointers().is_empty());
    }

    #[test]
    fn test_untracked_pointer_moves_are_ignored() {
        let h = Harness::new(options());

        h.at(0).drag(3, 500.0, 0.0);
        h.at(10).drag(3, 0.0, 0.0);

        assert!(h.events().is_empty());
    }

    #[test]
    fn test_disabled_swipe_navigation() {
        let h = Harness::new(PointerSwipeOptions {
            disable_swipe_navigation: true,
            pull_down_enabled: true,
            ..options()
        });

        h.at(0).down(1, 0.0, 0.0);
        h.at(10).drag(1, 300.0, 0.0);
        h.at(20).up(1, 300.0, 0.0);
        assert!(h.events().is_empty());

        // Pulls are unaffected
        h.at(30).down(1, 0.0, 0.0);
        h.at(40).drag(1, 0.0, 45.0);
        assert_eq!(h.events(), vec![GestureEvent::PullStart]);
    }

    #[test]
    fn test_invalid_direction_does_not_start() {
        let h = Harness::with_validator(options(), Arc::new(|offset: f64| offset < 0.0));

        h.at(0).down(1, 0.0, 0.0);
        h.at(10).drag(1, 80.0, 0.0);
        assert!(h.events().is_empty());

        h.at(20).drag(1, -80.0, 0.0);
        assert_eq!(h.events(), vec![GestureEvent::SwipeStart]);
    }

    #[test]
    fn test_vertical_dominant_drag_is_not_a_swipe() {
        let h = Harness::new(options());

        h.at(0).down(1, 0.0, 0.0);
        h.at(10).drag(1, 50.0, 60.0);

        assert!(h.events().is_empty());
    }

    #[test]
    fn test_owner_recaptured_mid_gesture_cancels() {
        let h = Harness::new(options());

        h.at(0).down(1, 0.0, 0.0);
        h.at(10).drag(1, 40.0, 0.0);
        h.at(20).drag(1, 70.0, 0.0);
        h.at(30).down(1, 70.0, 0.0);

        assert_eq!(
            h.events(),
            vec![
                GestureEvent::SwipeStart,
                GestureEvent::SwipeProgress { offset: 30.0 },
                GestureEvent::SwipeCancel { offset: 30.0 },
            ]
        );
        assert_eq!(h.recognizer.tracked_pointers(), vec![1]);
    }

    #[test]
    fn test_attached_sensors_route_leave_and_cancel() {
        let h = Harness::new(options());
        let sensors = Sensors::new();
        let subscriptions = h.recognizer.attach(&sensors);
        assert_eq!(subscriptions.len(), 5);

        h.at(0);
        sensors.dispatch(&SensorEvent::PointerDown(PointerEvent::new(1, 0.0, 0.0)));
        h.at(10);
        sensors.dispatch(&SensorEvent::PointerMove(PointerEvent::new(1, 400.0, 0.0)));
        h.at(20);
        sensors.dispatch(&SensorEvent::PointerMove(PointerEvent::new(1, 800.0, 0.0)));
        h.at(30);
        sensors.dispatch(&SensorEvent::PointerLeave(PointerEvent::new(1, 800.0, 0.0)));

        assert_eq!(
            h.events().last(),
            Some(&GestureEvent::SwipeFinish {
                offset: 400.0,
                duration_ms: 20
            })
        );

        sensors.dispatch(&SensorEvent::PointerDown(PointerEvent::new(2, 0.0, 0.0)));
        sensors.dispatch(&SensorEvent::PointerCancel(PointerEvent::new(2, 0.0, 0.0)));
        assert!(h.recognizer.tracked_pointers().is_empty());

        drop(subscriptions);
        sensors.dispatch(&SensorEvent::PointerDown(PointerEvent::new(3, 0.0, 0.0)));
        assert!(h.recognizer.tracked_pointers().is_empty());
    }
}
