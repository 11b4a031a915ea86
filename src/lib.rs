//! Lightbox gestures
//!
//! Recognizes swipe and pull gestures from pointer and wheel input and turns them into
//! slide navigation for an image viewer:
//!
//! - [`sensors`]: platform-neutral input events and the handler registry
//! - [`gesture`]: the pointer and wheel recognizers and their lifecycle callbacks
//! - [`controller`]: a navigation controller that consumes the lifecycle
//! - [`replay`]: deterministic replay of recorded input on virtual time
//! - [`config`]: YAML configuration with validation and hot reload

pub mod config;
pub mod controller;
pub mod error;
pub mod gesture;
pub mod replay;
pub mod sensors;
pub mod subscription;
pub mod swipe_state;
pub mod timers;

pub use config::GestureConfig;
pub use controller::{NavigationController, NavigationEvent, NavigationOptions};
pub use error::{ConfigError, TraceError};
pub use gesture::{
    GestureEvent, PointerSwipe, PointerSwipeOptions, PullCallbacks, SwipeCallbacks, WheelSwipe,
    WheelSwipeOptions,
};
pub use replay::{replay, Pipeline, ReplayReport, Trace, TraceStep};
pub use sensors::{PointerEvent, SensorEvent, SensorSource, Sensors, WheelEvent};
pub use subscription::Subscription;
pub use swipe_state::{SwipeState, SwipeStateSignal, SwipeStateWatch};
pub use timers::{Clock, ManualScheduler, TimerRegistry, TokioScheduler};
