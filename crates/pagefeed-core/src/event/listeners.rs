use crate::event::DataChangeEvent;
use parking_lot::Mutex;
use std::{
    fmt,
    sync::{
        Arc, Weak,
        atomic::{AtomicU64, Ordering},
    },
};

/// Identifier handed out for each registered listener.
pub type ListenerId = u64;

/// Callback invoked for every change event.
pub type ListenerFn<T> = dyn Fn(&DataChangeEvent<'_, T>) + Send + Sync;

///
/// ListenerSet
///
/// Ordered broadcast list of change listeners.
///
/// Emission is synchronous and follows registration order. The list is
/// snapshotted before dispatch and the lock is released, so listeners may
/// register or deregister from inside a callback; such changes take effect on
/// the next emission.
///

pub struct ListenerSet<T> {
    state: Arc<ListenerState<T>>,
}

struct ListenerState<T> {
    listeners: Mutex<Vec<(ListenerId, Arc<ListenerFn<T>>)>>,
    next_id: AtomicU64,
}

impl<T: 'static> ListenerSet<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(ListenerState {
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register `listener`; it stays registered until the returned handle's
    /// `remove` is called.
    pub fn add(&self, listener: Arc<ListenerFn<T>>) -> Registration {
        let id = self.state.next_id.fetch_add(1, Ordering::Relaxed);
        self.state.listeners.lock().push((id, listener));

        let state: Weak<dyn Deregister> = Arc::downgrade(&self.state) as Weak<dyn Deregister>;

        Registration { id, state }
    }

    /// Deliver `event` to every listener and return how many were called.
    pub fn emit(&self, event: &DataChangeEvent<'_, T>) -> usize {
        let snapshot: Vec<Arc<ListenerFn<T>>> = {
            let guard = self.state.listeners.lock();
            guard.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };

        tracing::trace!(listeners = snapshot.len(), "dispatching data change event");
        for cb in &snapshot {
            cb(event);
        }

        snapshot.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.listeners.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for ListenerSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Clones share one listener list.
impl<T> Clone for ListenerSet<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> fmt::Debug for ListenerSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("listeners", &self.state.listeners.lock().len())
            .finish()
    }
}

trait Deregister: Send + Sync {
    fn deregister(&self, id: ListenerId) -> bool;
}

impl<T> Deregister for ListenerState<T> {
    fn deregister(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);

        listeners.len() != before
    }
}

///
/// Registration
///
/// Handle for one registered listener.
/// Dropping the handle does NOT deregister; call `remove`.
///

pub struct Registration {
    id: ListenerId,
    state: Weak<dyn Deregister>,
}

impl Registration {
    #[must_use]
    pub const fn id(&self) -> ListenerId {
        self.id
    }

    /// Deregister the listener. Returns `false` if it was already removed or
    /// the provider is gone; calling this repeatedly is harmless.
    pub fn remove(&self) -> bool {
        self.state
            .upgrade()
            .is_some_and(|state| state.deregister(self.id))
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration").field("id", &self.id).finish()
    }
}
