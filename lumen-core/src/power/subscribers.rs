//! Subscriber registry and pending transition queue
//!
//! Subscribers are plain function pointers so the registry is `Clone` and
//! can be copied out from under a lock before anyone is notified.

use heapless::{Deque, Vec};

use super::state::{PowerState, PowerTransition};
use crate::error::Error;

/// Maximum number of registered state callbacks
pub const MAX_STATE_CALLBACKS: usize = 5;

/// Maximum number of undelivered transitions
pub const TRANSITION_QUEUE_DEPTH: usize = 8;

/// State change callback, invoked with `(old, new)`
pub type StateCallback = fn(PowerState, PowerState);

/// Bounded list of state callbacks, in registration order
#[derive(Clone, Default)]
pub struct Subscribers {
    callbacks: Vec<StateCallback, MAX_STATE_CALLBACKS>,
}

impl Subscribers {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// Add a callback
    ///
    /// Returns `ResourceExhausted` once [`MAX_STATE_CALLBACKS`] are registered.
    pub fn register(&mut self, callback: StateCallback) -> Result<(), Error> {
        self.callbacks
            .push(callback)
            .map_err(|_| Error::ResourceExhausted)
    }

    /// Number of registered callbacks
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Check if no callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Invoke every callback with one transition, in registration order
    pub fn notify(&self, transition: PowerTransition) {
        for callback in &self.callbacks {
            callback(transition.from, transition.to);
        }
    }
}

/// Bounded FIFO of transitions waiting to be delivered
///
/// When full, the oldest entry is dropped to make room.
#[derive(Default)]
pub struct TransitionQueue {
    pending: Deque<PowerTransition, TRANSITION_QUEUE_DEPTH>,
}

impl TransitionQueue {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            pending: Deque::new(),
        }
    }

    /// Append a transition
    ///
    /// Returns the dropped transition if the queue was full.
    pub fn push(&mut self, transition: PowerTransition) -> Option<PowerTransition> {
        let dropped = if self.pending.is_full() {
            self.pending.pop_front()
        } else {
            None
        };

        if let Some(_old) = dropped {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "Transition queue full, dropping {} -> {}",
                _old.from.as_str(),
                _old.to.as_str()
            );
        }

        // Cannot fail: a slot was freed above if needed
        let _ = self.pending.push_back(transition);
        dropped
    }

    /// Take the oldest pending transition
    pub fn pop(&mut self) -> Option<PowerTransition> {
        self.pending.pop_front()
    }

    /// Number of pending transitions
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if nothing is pending
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Discard everything pending
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
