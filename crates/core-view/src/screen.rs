//! Root view that owns the renderer and repaints the terminal.
//!
//! Child updates are coalesced: any number of `updated` signals raised
//! while a repaint is pending or running collapse into at most one further
//! repaint. Repaints run on a [`RenderContext`], which decides the thread
//! they execute on.
//!
//! Invariants:
//! - At most one repaint runs at a time.
//! - An update raised during a repaint is never lost; it triggers exactly
//!   one follow-up repaint however many updates arrive meanwhile.
//! - After `dispose` no repaint starts and the child is detached.

use crate::notify::SubscriptionId;
use crate::view::View;
use anyhow::Result;
use core_render::Renderer;
use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, trace, warn};

pub type RenderTask = Box<dyn FnOnce() + Send>;

/// Where repaint tasks run.
pub trait RenderContext: Send + Sync {
    fn post(&self, task: RenderTask);
}

/// Runs each task immediately on the posting thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineContext;

impl RenderContext for InlineContext {
    fn post(&self, task: RenderTask) {
        task();
    }
}

/// Queues tasks for a dedicated loop to run, usually the thread that owns
/// the terminal.
#[derive(Clone)]
pub struct QueueContext {
    tx: Sender<RenderTask>,
    rx: Receiver<RenderTask>,
}

impl fmt::Debug for QueueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueContext")
            .field("pending", &self.pending())
            .finish()
    }
}

impl Default for QueueContext {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueContext {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Run every task queued so far. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Wait up to `timeout` for one task and run it.
    pub fn run_next(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(task) => {
                task();
                true
            }
            Err(_) => false,
        }
    }
}

impl RenderContext for QueueContext {
    fn post(&self, task: RenderTask) {
        // Both ends live in `self`; the send cannot fail while we exist.
        let _ = self.tx.send(task);
    }
}

struct ScreenInner {
    renderer: Mutex<Renderer>,
    child: Mutex<Option<(Arc<dyn View>, SubscriptionId)>>,
    render_requested: AtomicBool,
    render_in_progress: AtomicBool,
    disposed: AtomicBool,
    render_count: AtomicUsize,
    context: Arc<dyn RenderContext>,
}

impl ScreenInner {
    /// Entry point for child updates.
    fn on_updated(self: &Arc<Self>) {
        if self.disposed.load(Ordering::SeqCst) {
            return;
        }
        if self
            .render_requested
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            trace!(target: "view.screen", "update_coalesced");
            return;
        }
        let weak: Weak<Self> = Arc::downgrade(self);
        self.context.post(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.drain();
            }
        }));
    }

    /// Repaint until no request is outstanding.
    fn drain(&self) {
        loop {
            if self.disposed.load(Ordering::SeqCst) {
                return;
            }
            if !self.render_requested.swap(false, Ordering::SeqCst) {
                return;
            }
            if self
                .render_in_progress
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                // Hand the request back to the running repaint's loop.
                self.render_requested.store(true, Ordering::SeqCst);
                if self.render_in_progress.load(Ordering::SeqCst) {
                    return;
                }
                continue;
            }
            self.render_once();
            self.render_in_progress.store(false, Ordering::SeqCst);
        }
    }

    fn render_once(&self) {
        let child = self.child.lock().as_ref().map(|(view, _)| Arc::clone(view));
        let mut renderer = self.renderer.lock();
        if let Err(err) = paint(&mut renderer, child.as_deref()) {
            warn!(target: "view.screen", error = %err, "render_failed");
        }
        let count = self.render_count.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(target: "view.screen", count, "rendered");
    }
}

fn paint(renderer: &mut Renderer, child: Option<&dyn View>) -> Result<()> {
    renderer.clear_screen()?;
    if let Some(child) = child {
        let region = renderer.terminal_region();
        child.render(renderer, region)?;
    }
    renderer.flush()
}

pub struct ScreenView {
    inner: Arc<ScreenInner>,
}

impl fmt::Debug for ScreenView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenView")
            .field("render_count", &self.render_count())
            .field("disposed", &self.inner.disposed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl ScreenView {
    /// Take ownership of `renderer` and hide the cursor.
    pub fn new(renderer: Renderer, context: Arc<dyn RenderContext>) -> Self {
        Self::with_cursor_hidden(renderer, context, true)
    }

    pub fn with_cursor_hidden(mut renderer: Renderer, context: Arc<dyn RenderContext>, hide_cursor: bool) -> Self {
        if hide_cursor && let Err(err) = renderer.terminal_mut().hide_cursor() {
            warn!(target: "view.screen", error = %err, "hide_cursor_failed");
        }
        debug!(target: "view.screen", mode = %renderer.mode(), hide_cursor, "screen_created");
        Self {
            inner: Arc::new(ScreenInner {
                renderer: Mutex::new(renderer),
                child: Mutex::new(None),
                render_requested: AtomicBool::new(false),
                render_in_progress: AtomicBool::new(false),
                disposed: AtomicBool::new(false),
                render_count: AtomicUsize::new(0),
                context,
            }),
        }
    }

    /// Replace the child. Updates of the new child schedule repaints; the
    /// swap itself does not.
    pub fn set_child(&self, child: Option<Arc<dyn View>>) {
        if self.inner.disposed.load(Ordering::SeqCst) {
            return;
        }
        let attached = child.map(|view| {
            let weak = Arc::downgrade(&self.inner);
            let id = view.updated().subscribe(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.on_updated();
                }
            });
            (view, id)
        });
        let previous = std::mem::replace(&mut *self.inner.child.lock(), attached);
        if let Some((view, id)) = previous {
            view.updated().unsubscribe(id);
        }
    }

    pub fn child(&self) -> Option<Arc<dyn View>> {
        self.inner.child.lock().as_ref().map(|(view, _)| Arc::clone(view))
    }

    /// Repaint now on the calling thread, unless a repaint is already
    /// running, in which case it is queued behind it.
    pub fn render(&self) {
        self.inner.render_requested.store(true, Ordering::SeqCst);
        self.inner.drain();
    }

    pub fn render_count(&self) -> usize {
        self.inner.render_count.load(Ordering::SeqCst)
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Run `f` with exclusive access to the renderer.
    pub fn with_renderer<R>(&self, f: impl FnOnce(&mut Renderer) -> R) -> R {
        f(&mut self.inner.renderer.lock())
    }

    /// Detach the child and restore the cursor. Later calls do nothing.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some((view, id)) = self.inner.child.lock().take() {
            view.updated().unsubscribe(id);
        }
        if let Err(err) = self.inner.renderer.lock().terminal_mut().show_cursor() {
            warn!(target: "view.screen", error = %err, "show_cursor_failed");
        }
        debug!(target: "view.screen", renders = self.render_count(), "screen_disposed");
    }
}

impl Drop for ScreenView {
    fn drop(&mut self) {
        self.dispose();
    }
}
