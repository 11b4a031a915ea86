//! Lifecycle invariants under arbitrary input

use proptest::prelude::*;
use std::sync::Arc;

use super::{
    always_valid, GestureEvent, GestureLog, InputSource, PointerSwipe, PointerSwipeOptions,
    SwipeCallbacks, WheelSwipe, WheelSwipeOptions,
};
use crate::sensors::{PointerEvent, WheelEvent};
use crate::swipe_state::{SwipeState, SwipeStateSignal};
use crate::timers::ManualScheduler;

#[derive(Debug, Clone)]
enum PointerOp {
    Down { id: i64, x: f64, y: f64 },
    Move { id: i64, x: f64, y: f64, pressed: bool },
    Up { id: i64 },
    Wait { ms: u64 },
}

fn pointer_op() -> impl Strategy<Value = PointerOp> {
    let id = 0i64..3;
    let coord = -600.0f64..600.0;
    prop_oneof![
        (id.clone(), coord.clone(), coord.clone()).prop_map(|(id, x, y)| PointerOp::Down { id, x, y }),
        (id.clone(), coord.clone(), coord, prop::bool::weighted(0.9))
            .prop_map(|(id, x, y, pressed)| PointerOp::Move { id, x, y, pressed }),
        id.prop_map(|id| PointerOp::Up { id }),
        (0u64..400).prop_map(|ms| PointerOp::Wait { ms }),
    ]
}

/// Every start is followed by progress of the same gesture and at most one terminal call
fn assert_well_formed(events: &[GestureEvent]) -> Result<(), TestCaseError> {
    let mut open: Option<GestureEvent> = None;

    for event in events {
        if event.is_start() {
            prop_assert!(open.is_none(), "start while {:?} is open", open);
            open = Some(*event);
        } else {
            let Some(start) = open else {
                return Err(TestCaseError::fail(format!("{:?} outside a gesture", event)));
            };
            prop_assert_eq!(start.gesture(), event.gesture());
            if event.is_terminal() {
                open = None;
            }
        }
    }
    Ok(())
}

/// Stands in for a controller: mirrors the lifecycle onto the swipe state
struct StateEcho {
    state: SwipeStateSignal,
}

impl SwipeCallbacks for StateEcho {
    fn on_swipe_start(&self) {
        self.state.set(SwipeState::Swipe);
    }

    fn on_swipe_progress(&self, _offset: f64) {}

    fn on_swipe_finish(&self, _offset: f64, _duration_ms: u64) {
        self.state.set(SwipeState::None);
    }

    fn on_swipe_cancel(&self, _offset: f64) {
        self.state.set(SwipeState::None);
    }
}

proptest! {
    #[test]
    fn pointer_lifecycle_is_well_formed(
        ops in prop::collection::vec(pointer_op(), 1..80),
        pull_up in any::<bool>(),
        pull_down in any::<bool>(),
    ) {
        let scheduler = Arc::new(ManualScheduler::new());
        let log = GestureLog::new(InputSource::Pointer, scheduler.clone());
        let recognizer = PointerSwipe::new(
            PointerSwipeOptions {
                pull_up_enabled: pull_up,
                pull_down_enabled: pull_down,
                ..Default::default()
            },
            scheduler.clone(),
            always_valid(),
            Arc::new(log.clone()),
            Arc::new(log.clone()),
        );

        for op in ops {
            match op {
                PointerOp::Down { id, x, y } => recognizer.on_pointer_down(&PointerEvent::new(id, x, y)),
                PointerOp::Move { id, x, y, pressed } => recognizer.on_pointer_move(
                    &PointerEvent::new(id, x, y).with_buttons(u16::from(pressed)),
                ),
                PointerOp::Up { id } => {
                    recognizer.on_pointer_up(&PointerEvent::new(id, 0.0, 0.0).with_buttons(0))
                }
                PointerOp::Wait { ms } => scheduler.advance(ms),
            }
        }

        let events = log.events();
        assert_well_formed(&events)?;

        // Releasing everything closes whatever is still open
        for id in recognizer.tracked_pointers() {
            recognizer.on_pointer_up(&PointerEvent::new(id, 0.0, 0.0).with_buttons(0));
        }
        let events = log.events();
        assert_well_formed(&events)?;
        prop_assert!(events.last().map_or(true, |e| e.is_terminal()));
    }

    #[test]
    fn wheel_lifecycle_is_well_formed_and_bounded(
        steps in prop::collection::vec((-120.0f64..120.0, 0u64..700), 1..120),
    ) {
        let width = 800.0;
        let scheduler = Arc::new(ManualScheduler::new());
        let state = SwipeStateSignal::new();
        let log = GestureLog::new(InputSource::Wheel, scheduler.clone())
            .forwarding_to(Arc::new(StateEcho { state: state.clone() }), None);
        let recognizer = WheelSwipe::new(
            WheelSwipeOptions {
                container_width: width,
                swipe_animation_duration_ms: 200,
            },
            scheduler.clone(),
            scheduler.clone(),
            state.watch(),
            always_valid(),
            Arc::new(log.clone()),
        );
        let _subscriptions = recognizer.attach(&crate::sensors::Sensors::new());

        for (delta_x, wait_ms) in steps {
            recognizer.on_wheel(&WheelEvent::horizontal(delta_x));
            scheduler.advance(wait_ms);
        }
        scheduler.advance(10_000);

        let events = log.events();
        assert_well_formed(&events)?;
        // Once moved, a swipe always ends; a start with no delta after it stays open
        match events.last() {
            None => {}
            Some(GestureEvent::SwipeStart) => {
                prop_assert_eq!(state.get(), SwipeState::Swipe);
                prop_assert_eq!(recognizer.offset(), 0.0);
            }
            Some(last) => prop_assert!(last.is_terminal(), "{:?} left open", last),
        }
        for event in &events {
            if let GestureEvent::SwipeProgress { offset } = event {
                prop_assert!(offset.abs() <= width);
            }
        }
    }
}
