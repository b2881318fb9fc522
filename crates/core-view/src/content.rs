//! Leaf view holding a single span.
//!
//! `ContentView::create` accepts any [`ContentValue`]; the value category is
//! decided once when the value is built, not on every render. A `Stream`
//! value binds a channel: a feed thread replaces the span on every receive
//! and raises `updated`. The feed thread holds only a weak reference and
//! exits as soon as the view is dropped, the stream is rebound, or the sender
//! disconnects.

use crate::notify::UpdateNotifier;
use crate::view::View;
use anyhow::Result;
use core_render::{Region, Renderer, Size};
use core_span::{Span, SpanFormatter};
use crossbeam_channel::{Receiver, Sender, bounded, select};
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{trace, warn};

pub enum ContentValue {
    Empty,
    Text(String),
    Span(Span),
    Stream(Receiver<Span>),
    /// Arbitrary value already converted through a `SpanFormatter`.
    Opaque(Span),
}

impl ContentValue {
    pub fn opaque<T: Any + fmt::Display>(formatter: &SpanFormatter, value: &T) -> Self {
        ContentValue::Opaque(formatter.format(Some(value)))
    }
}

impl fmt::Debug for ContentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentValue::Empty => f.write_str("Empty"),
            ContentValue::Text(t) => f.debug_tuple("Text").field(t).finish(),
            ContentValue::Span(s) => f.debug_tuple("Span").field(s).finish(),
            ContentValue::Stream(_) => f.write_str("Stream(..)"),
            ContentValue::Opaque(s) => f.debug_tuple("Opaque").field(s).finish(),
        }
    }
}

impl From<&str> for ContentValue {
    fn from(text: &str) -> Self {
        ContentValue::Text(text.to_string())
    }
}

impl From<String> for ContentValue {
    fn from(text: String) -> Self {
        ContentValue::Text(text)
    }
}

impl From<Span> for ContentValue {
    fn from(span: Span) -> Self {
        ContentValue::Span(span)
    }
}

impl From<Receiver<Span>> for ContentValue {
    fn from(rx: Receiver<Span>) -> Self {
        ContentValue::Stream(rx)
    }
}

impl<T: Into<ContentValue>> From<Option<T>> for ContentValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ContentValue::Empty, Into::into)
    }
}

#[derive(Debug, Default)]
pub struct ContentView {
    span: RwLock<Span>,
    updated: UpdateNotifier,
    /// Dropping this sender stops the bound feed thread.
    feed_stop: Mutex<Option<Sender<()>>>,
}

impl ContentView {
    pub fn new(span: Span) -> Self {
        Self {
            span: RwLock::new(span),
            updated: UpdateNotifier::new(),
            feed_stop: Mutex::new(None),
        }
    }

    pub fn from_text(text: impl AsRef<str>) -> Self {
        Self::new(Span::text(text))
    }

    pub fn create(value: impl Into<ContentValue>) -> Arc<Self> {
        match value.into() {
            ContentValue::Empty => Arc::new(Self::new(Span::Empty)),
            ContentValue::Text(text) => Arc::new(Self::from_text(text)),
            ContentValue::Span(span) | ContentValue::Opaque(span) => Arc::new(Self::new(span)),
            ContentValue::Stream(rx) => {
                let view = Arc::new(Self::new(Span::Empty));
                let _ = Self::bind(&view, rx);
                view
            }
        }
    }

    /// Feed every span received on `rx` into `view`, replacing any stream
    /// bound earlier.
    pub fn bind(view: &Arc<Self>, rx: Receiver<Span>) -> Option<JoinHandle<()>> {
        let weak = Arc::downgrade(view);
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let spawned = thread::Builder::new()
            .name("content-feed".into())
            .spawn(move || {
                loop {
                    select! {
                        recv(rx) -> msg => {
                            let (Ok(span), Some(view)) = (msg, weak.upgrade()) else {
                                break;
                            };
                            view.set_span(span);
                        }
                        recv(stop_rx) -> _ => break,
                    }
                }
                trace!(target: "view.content", "feed_closed");
            });
        match spawned {
            Ok(handle) => {
                *view.feed_stop.lock() = Some(stop_tx);
                Some(handle)
            }
            Err(err) => {
                warn!(target: "view.content", error = %err, "feed_spawn_failed");
                None
            }
        }
    }

    pub fn span(&self) -> Span {
        self.span.read().clone()
    }

    pub fn set_span(&self, span: Span) {
        *self.span.write() = span;
        self.updated.notify();
    }
}

impl View for ContentView {
    fn measure(&self, renderer: &Renderer, max: Size) -> Size {
        renderer.measure_span(&self.span.read(), max)
    }

    fn render(&self, renderer: &mut Renderer, region: Region) -> Result<()> {
        let span = self.span();
        renderer.render_to_region(&span, region)
    }

    fn updated(&self) -> &UpdateNotifier {
        &self.updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    #[test]
    fn create_picks_behavior_from_value_category() {
        assert_eq!(ContentView::create(ContentValue::Empty).span(), Span::Empty);
        assert_eq!(ContentView::create("").span(), Span::Empty);
        assert_eq!(ContentView::create("hi").span(), Span::content("hi"));
        let red = Span::container([Span::foreground("red"), Span::content("x")]);
        assert_eq!(ContentView::create(red.clone()).span(), red);
        assert_eq!(ContentView::create(None::<String>).span(), Span::Empty);
        let opaque = ContentValue::opaque(&SpanFormatter::new(), &3.5f64);
        assert_eq!(ContentView::create(opaque).span(), Span::content("3.5"));
    }

    #[test]
    fn set_span_notifies() {
        let view = ContentView::from_text("a");
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        view.updated().subscribe(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });
        view.set_span(Span::content("b"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(view.span(), Span::content("b"));
    }

    #[test]
    fn stream_replaces_content_on_each_item() {
        let (tx, rx) = unbounded();
        let view = ContentView::create(rx);
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        view.updated().subscribe(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });
        tx.send(Span::content("one")).unwrap();
        tx.send(Span::content("two")).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while hits.load(Ordering::SeqCst) < 2 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(view.span(), Span::content("two"));
    }

    fn wait_until(done: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        done()
    }

    #[test]
    fn feed_thread_exits_when_view_is_dropped() {
        let (tx, rx) = unbounded::<Span>();
        let view = Arc::new(ContentView::default());
        let handle = ContentView::bind(&view, rx).unwrap();
        drop(view);
        assert!(wait_until(|| handle.is_finished()));
        assert!(tx.send(Span::content("late")).is_err());
    }

    #[test]
    fn rebinding_stops_the_previous_feed() {
        let (_old_tx, old_rx) = unbounded::<Span>();
        let (new_tx, new_rx) = unbounded::<Span>();
        let view = Arc::new(ContentView::default());
        let old = ContentView::bind(&view, old_rx).unwrap();
        let _new = ContentView::bind(&view, new_rx).unwrap();
        assert!(wait_until(|| old.is_finished()));
        new_tx.send(Span::content("fresh")).unwrap();
        assert!(wait_until(|| view.span() == Span::content("fresh")));
    }
}
