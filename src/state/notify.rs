//! Change notification.
//!
//! Registries own an [`Observers`] list per event type. Listeners run
//! synchronously, in subscription order, after the mutation they describe
//! has completed. A panicking listener is logged and skipped; it never
//! reaches the caller and never touches registry state.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Boxed listener callback.
pub type Listener<E> = Box<dyn FnMut(&E) + Send>;

/// Ordered set of listeners for one event type.
pub struct Observers<E> {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener<E>)>,
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self {
            next_id: 1,
            listeners: Vec::new(),
        }
    }
}

impl<E> fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<E> Observers<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&E) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Deliver an event to every listener. Returns how many returned normally.
    pub fn emit(&mut self, event: &E) -> usize {
        let mut delivered = 0;
        for (id, listener) in self.listeners.iter_mut() {
            match panic::catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(()) => delivered += 1,
                Err(_) => warn!(subscription = id.value(), "Listener panicked, skipping"),
            }
        }
        delivered
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_emit_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut observers: Observers<u32> = Observers::new();

        let a = Arc::clone(&seen);
        observers.subscribe(move |e| a.lock().unwrap().push(("a", *e)));
        let b = Arc::clone(&seen);
        observers.subscribe(move |e| b.lock().unwrap().push(("b", *e)));

        assert_eq!(observers.emit(&7), 2);
        assert_eq!(*seen.lock().unwrap(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_unsubscribe() {
        let count = Arc::new(Mutex::new(0));
        let mut observers: Observers<()> = Observers::new();

        let c = Arc::clone(&count);
        let id = observers.subscribe(move |_| *c.lock().unwrap() += 1);
        observers.emit(&());

        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        assert!(observers.is_empty());

        observers.emit(&());
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let count = Arc::new(Mutex::new(0));
        let mut observers: Observers<()> = Observers::new();

        observers.subscribe(|_| panic!("boom"));
        let c = Arc::clone(&count);
        observers.subscribe(move |_| *c.lock().unwrap() += 1);

        assert_eq!(observers.emit(&()), 1);
        assert_eq!(*count.lock().unwrap(), 1);
        assert_eq!(observers.len(), 2);
    }
}
