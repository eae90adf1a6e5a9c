#![forbid(unsafe_code)]

//! Observer lists with RAII unsubscription.
//!
//! # Design
//!
//! An [`ObserverList<T>`] stores its callbacks as `Weak` references. The
//! strong `Rc` lives inside the [`Subscription`] guard handed back to the
//! caller, so dropping (or [`Subscription::cancel`]-ing) the guard is all it
//! takes to unsubscribe. Several consumers can observe the same source
//! without overwriting each other's callbacks.
//!
//! # Invariants
//!
//! 1. Observers are notified in registration order.
//! 2. A callback is never invoked after its guard has been dropped.
//! 3. Dead entries are pruned lazily during [`ObserverList::notify`].
//!
//! # Failure Modes
//!
//! - **Subscriber leak**: guards stored forever keep their callbacks alive.
//!   Nothing is invoked that the owner did not ask for, but memory grows.

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

/// An ordered list of weakly-held observer callbacks.
pub struct ObserverList<T> {
    observers: Vec<CallbackWeak<T>>,
}

impl<T> Default for ObserverList<T> {
    fn default() -> Self {
        Self {
            observers: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for ObserverList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("observer_count", &self.observers.len())
            .field("live_count", &self.live_count())
            .finish()
    }
}

impl<T> ObserverList<T> {
    /// Number of callbacks whose guards are still alive.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.observers
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// True when no live callback remains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count() == 0
    }
}

impl<T: 'static> ObserverList<T> {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. It stays registered until the returned guard is
    /// dropped or cancelled.
    pub fn subscribe(&mut self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        self.observers.push(Rc::downgrade(&strong));
        // `Rc<dyn Fn(&T)>` cannot coerce to `dyn Any` directly; box the Rc.
        Subscription {
            guard: Some(Box::new(strong)),
        }
    }

    /// Invoke every live callback with `value`, in registration order.
    ///
    /// Returns the number of callbacks invoked.
    pub fn notify(&mut self, value: &T) -> usize {
        self.observers.retain(|weak| weak.strong_count() > 0);
        let live: Vec<CallbackRc<T>> = self.observers.iter().filter_map(Weak::upgrade).collect();
        for callback in &live {
            callback(value);
        }
        live.len()
    }
}

/// RAII guard for an observer callback.
///
/// Dropping the guard drops the only strong reference to the callback, so
/// the observer list can no longer upgrade it.
#[must_use = "dropping a Subscription immediately unsubscribes it"]
pub struct Subscription {
    guard: Option<Box<dyn Any>>,
}

impl Subscription {
    /// Unsubscribe now. Equivalent to dropping the guard.
    pub fn cancel(mut self) {
        self.guard = None;
    }

    /// True until the guard is cancelled.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.guard.is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
