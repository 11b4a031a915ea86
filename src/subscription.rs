//! RAII subscription guards
//!
//! Both the sensor registry and the swipe state signal hand out a [`Subscription`] when a
//! handler is registered. Dropping the guard removes the handler, which is how recognizers
//! tear down their listeners.

use std::fmt;

type Unsubscribe = Box<dyn FnOnce() + Send + Sync>;

/// Keeps a handler registered for as long as it is alive
#[must_use = "dropping a Subscription unsubscribes the handler immediately"]
pub struct Subscription {
    unsubscribe: Option<Unsubscribe>,
}

impl Subscription {
    /// Create a guard that runs `unsubscribe` once, on drop or on [`Subscription::cancel`]
    pub fn new(unsubscribe: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Unsubscribe now instead of waiting for drop
    pub fn cancel(mut self) {
        self.run();
    }

    /// Keep the handler registered for the rest of the source's lifetime
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }

    fn run(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
