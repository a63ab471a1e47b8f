//! Event streams with an explicit unsubscribe handle.
//!
//! Backends fan events out through [`Listeners`]; each consumer holds a
//! [`Subscription`] and stops receiving as soon as it calls
//! [`Subscription::unsubscribe`] or drops the handle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::mpsc;

type Unsubscribe = Box<dyn FnOnce() + Send>;

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Receiving end of an event stream.
pub struct Subscription<T> {
    rx: mpsc::UnboundedReceiver<T>,
    unsubscribe: Option<Unsubscribe>,
}

impl<T> Subscription<T> {
    /// Wrap a receiver with the callback that detaches it from its source.
    pub fn new(rx: mpsc::UnboundedReceiver<T>, unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            rx,
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Next event, or `None` once the source has gone away.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Detach from the source. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

struct ListenerSet<T> {
    next_id: u64,
    senders: HashMap<u64, mpsc::UnboundedSender<T>>,
}

/// Fan-out registry of active subscriptions.
///
/// Cheap to clone; clones share the same registry.
pub struct Listeners<T> {
    inner: Arc<Mutex<ListenerSet<T>>>,
}

impl<T> Clone for Listeners<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ListenerSet {
                next_id: 0,
                senders: HashMap::new(),
            })),
        }
    }
}

impl<T: Clone + Send + 'static> Listeners<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. `initial` is queued before any later event so
    /// observers see the current state first.
    pub fn add(&self, initial: Option<T>) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Some(event) = initial {
            let _ = tx.send(event);
        }

        let id = {
            let mut set = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let id = set.next_id;
            set.next_id += 1;
            set.senders.insert(id, tx);
            id
        };

        let registry: Weak<Mutex<ListenerSet<T>>> = Arc::downgrade(&self.inner);
        Subscription::new(rx, move || {
            if let Some(inner) = registry.upgrade() {
                inner
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .senders
                    .remove(&id);
            }
        })
    }

    /// Deliver `event` to every listener, pruning closed ones.
    pub fn emit(&self, event: T) {
        let mut set = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        set.senders.retain(|_, tx| tx.send(event.clone()).is_ok());
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .senders
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
