//! Swipe state signal
//!
//! The navigation controller owns the current [`SwipeState`] and publishes changes through a
//! [`SwipeStateSignal`]. Everything else (the wheel recognizer in particular) only gets a
//! [`SwipeStateWatch`], which can read and observe but never write.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use tracing::debug;

use crate::subscription::Subscription;

/// Whether a slide transition is currently in flight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeState {
    /// Idle, no transition in progress
    #[default]
    None,
    /// A swipe is being dragged
    Swipe,
    /// A pull is being dragged
    Pull,
    /// The slide is animating towards its resting position
    Animation,
}

/// Observer invoked with the new state after every change
pub type SwipeStateObserver = Arc<dyn Fn(SwipeState) + Send + Sync>;

#[derive(Default)]
struct Shared {
    state: SwipeState,
    next_id: u64,
    observers: Vec<(u64, SwipeStateObserver)>,
}

/// Writable side of the swipe state, owned by the navigation controller
#[derive(Clone, Default)]
pub struct SwipeStateSignal {
    shared: Arc<Mutex<Shared>>,
}

impl SwipeStateSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> SwipeState {
        self.shared.lock().state
    }

    /// Publish a new state
    ///
    /// Observers are notified only when the value actually changes, and never with the
    /// signal's lock held, so an observer may read the signal again.
    pub fn set(&self, state: SwipeState) {
        let observers: Vec<SwipeStateObserver> = {
            let mut shared = self.shared.lock();
            if shared.state == state {
                return;
            }
            debug!(from = ?shared.state, to = ?state, "Swipe state changed");
            shared.state = state;
            shared.observers.iter().map(|(_, o)| o.clone()).collect()
        };

        for observer in observers {
            observer(state);
        }
    }

    /// Read-only handle for consumers of the state
    pub fn watch(&self) -> SwipeStateWatch {
        SwipeStateWatch {
            shared: self.shared.clone(),
        }
    }
}

/// Read-only view of a [`SwipeStateSignal`]
#[derive(Clone)]
pub struct SwipeStateWatch {
    shared: Arc<Mutex<Shared>>,
}

impl SwipeStateWatch {
    pub fn get(&self) -> SwipeState {
        self.shared.lock().state
    }

    /// Observe every subsequent change
    pub fn subscribe(&self, observer: SwipeStateObserver) -> Subscription {
        let id = {
            let mut shared = self.shared.lock();
            shared.next_id += 1;
            let id = shared.next_id;
            shared.observers.push((id, observer));
            id
        };

        let shared: Weak<Mutex<Shared>> = Arc::downgrade(&self.shared);
        Subscription::new(move || {
            if let Some(shared) = shared.upgrade() {
                shared.lock().observers.retain(|(o, _)| *o != id);
            }
        })
    }
}
