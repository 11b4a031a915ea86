//! Gesture recognition
//!
//! Two independent recognizers turn raw sensor input into navigation intents:
//!
//! - [`PointerSwipe`]: touch/pen/mouse drags, horizontal swipe or vertical pull
//! - [`WheelSwipe`]: horizontal wheel/trackpad deltas, swipe only
//!
//! Both report through the same [`SwipeCallbacks`] surface, so whatever consumes the intents
//! does not need to know which device produced them.

pub mod log;
pub mod pointer;
pub mod wheel;

#[cfg(test)]
mod properties;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use log::{GestureLog, GestureRecord, InputSource};
pub use pointer::{PointerSwipe, PointerSwipeOptions};
pub use wheel::{WheelSwipe, WheelSwipeOptions};

/// Minimum displacement (px) before a drag is classified as a swipe or pull
pub const SWIPE_THRESHOLD: f64 = 30.0;

/// Displacement a pull must exceed on release to finish
pub const PULL_FINISH_THRESHOLD: f64 = 2.0 * SWIPE_THRESHOLD;

/// Share of the container width that always finishes a pointer swipe
pub const SWIPE_FINISH_RATIO: f64 = 0.3;

/// Smallest offset that still counts as a quick flick
pub const FAST_SWIPE_MIN_OFFSET: f64 = 5.0;

/// Accumulated wheel delta that starts a swipe
pub const WHEEL_INTENT_THRESHOLD: f64 = 30.0;

/// Share of the container width that finishes a wheel swipe
pub const WHEEL_FINISH_RATIO: f64 = 0.2;

/// Deltas within this factor of the last decisive delta are treated as momentum
pub const WHEEL_INERTIA_FACTOR: f64 = 1.2;

/// How long a registered momentum magnitude stays active
pub const WHEEL_INERTIA_WINDOW_MS: u64 = 300;

/// Gesture tracked by a recognizer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gesture {
    #[default]
    None,
    /// Horizontal navigation
    Swipe,
    /// Vertical dismiss
    Pull,
}

/// Tells a recognizer whether there is a slide in the direction of `offset`
///
/// Must be free of side effects; it is queried before committing to a direction.
pub type SwipeValidator = Arc<dyn Fn(f64) -> bool + Send + Sync>;

/// Validator that accepts every direction
pub fn always_valid() -> SwipeValidator {
    Arc::new(|_: f64| true)
}

/// Swipe lifecycle
///
/// For each gesture, `on_swipe_start` is called once, followed by any number of progress
/// calls, followed by exactly one of `on_swipe_finish` / `on_swipe_cancel`.
pub trait SwipeCallbacks: Send + Sync {
    fn on_swipe_start(&self);
    fn on_swipe_progress(&self, offset: f64);
    fn on_swipe_finish(&self, offset: f64, duration_ms: u64);
    fn on_swipe_cancel(&self, offset: f64);
}

/// Pull lifecycle, same contract as [`SwipeCallbacks`]
pub trait PullCallbacks: Send + Sync {
    fn on_pull_start(&self);
    fn on_pull_progress(&self, offset: f64);
    fn on_pull_finish(&self, offset: f64, duration_ms: u64);
    fn on_pull_cancel(&self, offset: f64);
}

/// Value form of a lifecycle call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GestureEvent {
    SwipeStart,
    SwipeProgress { offset: f64 },
    SwipeFinish { offset: f64, duration_ms: u64 },
    SwipeCancel { offset: f64 },
    PullStart,
    PullProgress { offset: f64 },
    PullFinish { offset: f64, duration_ms: u64 },
    PullCancel { offset: f64 },
}

impl GestureEvent {
    /// Invoke the matching callback
    ///
    /// Pull events are dropped when no pull callbacks are given.
    pub fn dispatch(&self, swipe: &dyn SwipeCallbacks, pull: Option<&dyn PullCallbacks>) {
        match *self {
            GestureEvent::SwipeStart => swipe.on_swipe_start(),
            GestureEvent::SwipeProgress { offset } => swipe.on_swipe_progress(offset),
            GestureEvent::SwipeFinish { offset, duration_ms } => {
                swipe.on_swipe_finish(offset, duration_ms)
            }
            GestureEvent::SwipeCancel { offset } => swipe.on_swipe_cancel(offset),
            GestureEvent::PullStart => {
                if let Some(pull) = pull {
                    pull.on_pull_start()
                }
            }
            GestureEvent::PullProgress { offset } => {
                if let Some(pull) = pull {
                    pull.on_pull_progress(offset)
                }
            }
            GestureEvent::PullFinish { offset, duration_ms } => {
                if let Some(pull) = pull {
                    pull.on_pull_finish(offset, duration_ms)
                }
            }
            GestureEvent::PullCancel { offset } => {
                if let Some(pull) = pull {
                    pull.on_pull_cancel(offset)
                }
            }
        }
    }

    /// Start of a gesture
    pub fn is_start(&self) -> bool {
        matches!(self, GestureEvent::SwipeStart | GestureEvent::PullStart)
    }

    /// Finish or cancel
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GestureEvent::SwipeFinish { .. }
                | GestureEvent::SwipeCancel { .. }
                | GestureEvent::PullFinish { .. }
                | GestureEvent::PullCancel { .. }
        )
    }

    pub fn gesture(&self) -> Gesture {
        match self {
            GestureEvent::SwipeStart
            | GestureEvent::SwipeProgress { .. }
            | GestureEvent::SwipeFinish { .. }
            | GestureEvent::SwipeCancel { .. } => Gesture::Swipe,
            _ => Gesture::Pull,
        }
    }
}
