//! Sensor events and the subscription registry
//!
//! Recognizers never see platform event objects. Whatever drives the viewer (a DOM bridge, a
//! windowing backend, a recorded trace) converts its input into the plain data below and
//! dispatches it through a [`SensorSource`].

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use tracing::trace;

use crate::subscription::Subscription;

/// Kind of device behind a pointer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerType {
    #[default]
    Mouse,
    Pen,
    Touch,
}

/// Pointer data captured at event time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub pointer_id: i64,
    pub x: f64,
    pub y: f64,
    /// Pressed button mask; 0 means nothing is pressed
    #[serde(default)]
    pub buttons: u16,
    #[serde(default)]
    pub pointer_type: PointerType,
}

impl PointerEvent {
    /// Primary-button pointer at the given position
    pub fn new(pointer_id: i64, x: f64, y: f64) -> Self {
        Self {
            pointer_id,
            x,
            y,
            buttons: 1,
            pointer_type: PointerType::default(),
        }
    }

    /// Same pointer with a different button mask
    pub fn with_buttons(mut self, buttons: u16) -> Self {
        self.buttons = buttons;
        self
    }

    /// Same pointer with a different device kind
    pub fn with_type(mut self, pointer_type: PointerType) -> Self {
        self.pointer_type = pointer_type;
        self
    }
}

/// Wheel data captured at event time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    #[serde(default)]
    pub delta_x: f64,
    #[serde(default)]
    pub delta_y: f64,
    /// Set for pinch-zoom on trackpads and ctrl+wheel on mice
    #[serde(default)]
    pub ctrl_key: bool,
}

impl WheelEvent {
    /// Horizontal-only wheel tick
    pub fn horizontal(delta_x: f64) -> Self {
        Self {
            delta_x,
            delta_y: 0.0,
            ctrl_key: false,
        }
    }
}

/// Sensor event names a handler can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerLeave,
    PointerCancel,
    Wheel,
}

/// A single input event delivered to subscribed handlers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SensorEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    PointerLeave(PointerEvent),
    PointerCancel(PointerEvent),
    Wheel(WheelEvent),
}

impl SensorEvent {
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorEvent::PointerDown(_) => SensorKind::PointerDown,
            SensorEvent::PointerMove(_) => SensorKind::PointerMove,
            SensorEvent::PointerUp(_) => SensorKind::PointerUp,
            SensorEvent::PointerLeave(_) => SensorKind::PointerLeave,
            SensorEvent::PointerCancel(_) => SensorKind::PointerCancel,
            SensorEvent::Wheel(_) => SensorKind::Wheel,
        }
    }

    /// Pointer payload, if this is a pointer event
    pub fn pointer(&self) -> Option<&PointerEvent> {
        match self {
            SensorEvent::PointerDown(e)
            | SensorEvent::PointerMove(e)
            | SensorEvent::PointerUp(e)
            | SensorEvent::PointerLeave(e)
            | SensorEvent::PointerCancel(e) => Some(e),
            SensorEvent::Wheel(_) => None,
        }
    }

    /// Wheel payload, if this is a wheel event
    pub fn wheel(&self) -> Option<&WheelEvent> {
        match self {
            SensorEvent::Wheel(e) => Some(e),
            _ => None,
        }
    }
}

/// Handler invoked for every event of the subscribed kind
pub type SensorHandler = Arc<dyn Fn(&SensorEvent) + Send + Sync>;

/// Something recognizers can register sensor handlers on
pub trait SensorSource {
    /// Register `handler` for `kind`; the handler stays registered while the guard lives
    fn subscribe(&self, kind: SensorKind, handler: SensorHandler) -> Subscription;
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(u64, SensorKind, SensorHandler)>,
}

/// In-process sensor registry
#[derive(Clone, Default)]
pub struct Sensors {
    registry: Arc<Mutex<Registry>>,
}

impl Sensors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an event to every handler subscribed to its kind
    ///
    /// Handlers run without the registry lock held, in subscription order.
    pub fn dispatch(&self, event: &SensorEvent) {
        let kind = event.kind();
        let handlers: Vec<SensorHandler> = self
            .registry
            .lock()
            .handlers
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, handler)| handler.clone())
            .collect();

        if handlers.is_empty() {
            trace!(?kind, "No sensor handlers subscribed");
        }

        for handler in handlers {
            handler(event);
        }
    }

    /// Number of live handlers for `kind`
    pub fn handler_count(&self, kind: SensorKind) -> usize {
        self.registry
            .lock()
            .handlers
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .count()
    }
}

impl SensorSource for Sensors {
    fn subscribe(&self, kind: SensorKind, handler: SensorHandler) -> Subscription {
        let id = {
            let mut registry = self.registry.lock();
            registry.next_id += 1;
            let id = registry.next_id;
            registry.handlers.push((id, kind, handler));
            id
        };

        let registry: Weak<Mutex<Registry>> = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.lock().handlers.retain(|(h, _, _)| *h != id);
            }
        })
    }
}
