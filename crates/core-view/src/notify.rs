//! `Updated` notifications between views.
//!
//! A notifier is a shared listener list. Parents subscribe to their
//! children with a listener holding only a weak handle to the parent's own
//! notifier, so the child never keeps its parent alive. Subscriptions are
//! removed explicitly by the parent on removal or drop.
//!
//! Listeners are invoked outside the lock; a listener may subscribe,
//! unsubscribe or notify re-entrantly.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

pub type Listener = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Inner {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
}

#[derive(Clone, Default)]
pub struct UpdateNotifier {
    inner: Arc<Inner>,
}

impl fmt::Debug for UpdateNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateNotifier")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl UpdateNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.listeners.lock().push((id, Arc::new(listener)));
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.inner.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    pub fn notify(&self) {
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    pub fn downgrade(&self) -> WeakNotifier {
        WeakNotifier(Arc::downgrade(&self.inner))
    }
}

/// Non-owning handle; notifying a dropped notifier is a no-op.
#[derive(Clone)]
pub struct WeakNotifier(Weak<Inner>);

impl WeakNotifier {
    pub fn notify(&self) {
        if let Some(inner) = self.0.upgrade() {
            UpdateNotifier { inner }.notify();
        }
    }
}

/// Subscribe `parent` to `child` so every child update re-raises on the
/// parent.
pub fn forward(child: &UpdateNotifier, parent: &UpdateNotifier) -> SubscriptionId {
    let weak = parent.downgrade();
    child.subscribe(move || weak.notify())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn unsubscribe_stops_delivery() {
        let n = UpdateNotifier::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let id = n.subscribe(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });
        n.notify();
        assert!(n.unsubscribe(id));
        assert!(!n.unsubscribe(id));
        n.notify();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn forwarding_does_not_keep_parent_alive() {
        let child = UpdateNotifier::new();
        let parent = UpdateNotifier::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        parent.subscribe(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });
        forward(&child, &parent);
        child.notify();
        drop(parent);
        child.notify();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listener_may_unsubscribe_itself() {
        let n = UpdateNotifier::new();
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));
        let (n2, s2) = (n.clone(), slot.clone());
        let id = n.subscribe(move || {
            if let Some(id) = *s2.lock() {
                n2.unsubscribe(id);
            }
        });
        *slot.lock() = Some(id);
        n.notify();
        assert_eq!(n.listener_count(), 0);
    }
}
