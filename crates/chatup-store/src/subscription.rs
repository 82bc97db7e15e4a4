//! Cancelable handles for live collaborator subscriptions.
//!
//! Every live query hands back a [`Subscription`]; dropping it removes the
//! listener from the owning backend. Components hold at most one handle per
//! logical subscription and replace-with-teardown when their target changes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

/// Identifier of a registered listener.
pub type ListenerId = Uuid;

/// RAII handle for one live subscription. Dropping it cancels delivery.
pub struct Subscription {
    id: ListenerId,
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(id: ListenerId, cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            id,
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Subscription").field(&self.id).finish()
    }
}

/// Registry of listeners keyed by id, shared between a backend and the
/// cancel closures of the handles it issued.
pub(crate) struct ListenerSet<F: ?Sized> {
    inner: Mutex<HashMap<ListenerId, Arc<F>>>,
}

impl<F: ?Sized> ListenerSet<F> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, listener: Arc<F>) -> ListenerId {
        let id = Uuid::new_v4();
        if let Ok(mut map) = self.inner.lock() {
            map.insert(id, listener);
        }
        id
    }

    pub fn remove(&self, id: &ListenerId) {
        if let Ok(mut map) = self.inner.lock() {
            map.remove(id);
        }
    }

    /// Snapshot of the registered listeners, taken so callbacks run outside
    /// the registry lock.
    pub fn snapshot(&self) -> Vec<Arc<F>> {
        match self.inner.lock() {
            Ok(map) => map.values().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|map| map.len()).unwrap_or(0)
    }
}

impl<F: ?Sized> Default for ListenerSet<F> {
    fn default() -> Self {
        Self::new()
    }
}
