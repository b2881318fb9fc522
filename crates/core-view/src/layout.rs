//! Owned, indexed child collection with update forwarding.
//!
//! Invariants:
//! - Every child in the list has exactly one live subscription forwarding
//!   its `updated` into the layout's own notifier.
//! - `remove` and `Drop` cancel those subscriptions; a removed child never
//!   reaches the former parent again.
//! - Children are `Arc<V>`; a missing child cannot be represented.

use crate::notify::{SubscriptionId, UpdateNotifier, forward};
use crate::view::View;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::trace;

struct Child<V: ?Sized> {
    view: Arc<V>,
    subscription: SubscriptionId,
}

pub struct LayoutView<V: ?Sized + View = dyn View> {
    children: RwLock<Vec<Child<V>>>,
    updated: UpdateNotifier,
}

impl<V: ?Sized + View> Default for LayoutView<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: ?Sized + View> LayoutView<V> {
    pub fn new() -> Self {
        Self {
            children: RwLock::new(Vec::new()),
            updated: UpdateNotifier::new(),
        }
    }

    pub fn add(&self, view: Arc<V>) {
        let subscription = forward(view.updated(), &self.updated);
        {
            let mut children = self.children.write();
            children.push(Child { view, subscription });
            trace!(target: "view.layout", len = children.len(), "child_added");
        }
        self.updated.notify();
    }

    /// Remove `view` (by identity). Returns whether it was a child.
    pub fn remove(&self, view: &Arc<V>) -> bool {
        let removed = {
            let mut children = self.children.write();
            children
                .iter()
                .position(|c| std::ptr::addr_eq(Arc::as_ptr(&c.view), Arc::as_ptr(view)))
                .map(|idx| children.remove(idx))
        };
        match removed {
            Some(child) => {
                child.view.updated().unsubscribe(child.subscription);
                self.updated.notify();
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        let drained: Vec<Child<V>> = std::mem::take(&mut *self.children.write());
        for child in &drained {
            child.view.updated().unsubscribe(child.subscription);
        }
        if !drained.is_empty() {
            self.updated.notify();
        }
    }

    /// Snapshot of the children in order.
    pub fn children(&self) -> Vec<Arc<V>> {
        self.children.read().iter().map(|c| Arc::clone(&c.view)).collect()
    }

    pub fn len(&self) -> usize {
        self.children.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.read().is_empty()
    }

    pub fn updated(&self) -> &UpdateNotifier {
        &self.updated
    }
}

impl<V: ?Sized + View> Drop for LayoutView<V> {
    fn drop(&mut self) {
        for child in self.children.get_mut().drain(..) {
            child.view.updated().unsubscribe(child.subscription);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentView;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter(n: &UpdateNotifier) -> Arc<AtomicUsize> {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        n.subscribe(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });
        hits
    }

    #[test]
    fn child_updates_are_forwarded_until_removed() {
        let layout: LayoutView<ContentView> = LayoutView::new();
        let child = Arc::new(ContentView::from_text("a"));
        layout.add(child.clone());
        let hits = counter(layout.updated());

        child.set_span(core_span::Span::content("b"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert!(layout.remove(&child));
        assert_eq!(child.updated().listener_count(), 0);
        let after_remove = hits.load(Ordering::SeqCst);
        child.set_span(core_span::Span::content("c"));
        assert_eq!(hits.load(Ordering::SeqCst), after_remove);
        assert!(!layout.remove(&child));
    }

    #[test]
    fn drop_unsubscribes_from_all_children() {
        let a = Arc::new(ContentView::from_text("a"));
        let b = Arc::new(ContentView::from_text("b"));
        {
            let layout: LayoutView = LayoutView::new();
            layout.add(a.clone());
            layout.add(b.clone());
            assert_eq!(layout.len(), 2);
            assert_eq!(a.updated().listener_count(), 1);
        }
        assert_eq!(a.updated().listener_count(), 0);
        assert_eq!(b.updated().listener_count(), 0);
    }
}
