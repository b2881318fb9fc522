//! Typed traversal over span trees.
//!
//! `visit` is the only place that matches on span kinds. Measuring and
//! rendering both go through it, so a new span kind forces every pass to
//! decide how to handle it at compile time.
//!
//! Traversal order: `record` fires for every node before dispatch; container
//! children are visited depth-first in order. The first error returned by a
//! hook aborts the walk.

use crate::span::{ContainerSpan, ContentSpan, ControlSpan, CustomSpan, Span};
use anyhow::Result;

pub trait SpanVisitor {
    /// Called once with the root before traversal.
    fn start(&mut self, _root: &Span) -> Result<()> {
        Ok(())
    }

    /// Called once with the root after traversal completed without error.
    fn stop(&mut self, _root: &Span) -> Result<()> {
        Ok(())
    }

    /// Audit hook invoked for every node, including containers and empties.
    fn record(&mut self, _span: &Span) {}

    fn visit_content(&mut self, _span: &ContentSpan) -> Result<()> {
        Ok(())
    }

    fn visit_control(&mut self, _span: &ControlSpan) -> Result<()> {
        Ok(())
    }

    fn visit_container(&mut self, span: &ContainerSpan) -> Result<()> {
        for child in span.children() {
            self.visit_span(child)?;
        }
        Ok(())
    }

    /// Catch-all for host-defined span kinds.
    fn visit_other(&mut self, _span: &dyn CustomSpan) -> Result<()> {
        Ok(())
    }

    fn visit_span(&mut self, span: &Span) -> Result<()> {
        self.record(span);
        match span {
            Span::Empty => Ok(()),
            Span::Content(c) => self.visit_content(c),
            Span::Container(c) => self.visit_container(c),
            Span::Control(c) => self.visit_control(c),
            Span::Other(o) => self.visit_other(o.as_ref()),
        }
    }
}

/// Run a full visit: `start`, depth-first traversal, `stop`.
pub fn visit<V: SpanVisitor + ?Sized>(visitor: &mut V, root: &Span) -> Result<()> {
    visitor.start(root)?;
    visitor.visit_span(root)?;
    visitor.stop(root)
}

/// Visitor that keeps every node it sees, in visit order.
#[derive(Debug, Default)]
pub struct RecordingVisitor {
    pub visited: Vec<Span>,
}

impl SpanVisitor for RecordingVisitor {
    fn record(&mut self, span: &Span) {
        self.visited.push(span.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::StyleSpan;
    use std::borrow::Cow;

    #[derive(Debug)]
    struct Marker;

    impl CustomSpan for Marker {
        fn kind(&self) -> &str {
            "marker"
        }
        fn text(&self) -> Cow<'_, str> {
            Cow::Borrowed("*")
        }
    }

    #[derive(Default)]
    struct Tally {
        content: Vec<String>,
        controls: usize,
        others: Vec<String>,
        started: bool,
        stopped: bool,
    }

    impl SpanVisitor for Tally {
        fn start(&mut self, _root: &Span) -> Result<()> {
            self.started = true;
            Ok(())
        }
        fn stop(&mut self, _root: &Span) -> Result<()> {
            self.stopped = true;
            Ok(())
        }
        fn visit_content(&mut self, span: &ContentSpan) -> Result<()> {
            self.content.push(span.text().to_string());
            Ok(())
        }
        fn visit_control(&mut self, _span: &ControlSpan) -> Result<()> {
            self.controls += 1;
            Ok(())
        }
        fn visit_other(&mut self, span: &dyn CustomSpan) -> Result<()> {
            self.others.push(span.kind().to_string());
            Ok(())
        }
    }

    #[test]
    fn dispatches_depth_first_in_order() {
        let tree = Span::container([
            Span::content("a"),
            Span::container([Span::content("b"), Span::style(StyleSpan::bold_on()), Span::content("c")]),
            Span::custom(Marker),
            Span::content("d"),
        ]);
        let mut tally = Tally::default();
        visit(&mut tally, &tree).unwrap();
        assert_eq!(tally.content, vec!["a", "b", "c", "d"]);
        assert_eq!(tally.controls, 1);
        assert_eq!(tally.others, vec!["marker"]);
        assert!(tally.started && tally.stopped);
    }

    #[test]
    fn recording_visitor_sees_every_node() {
        let tree = Span::container([Span::content("a"), Span::Empty, Span::foreground("red")]);
        let mut rec = RecordingVisitor::default();
        visit(&mut rec, &tree).unwrap();
        assert_eq!(rec.visited.len(), 4);
        assert_eq!(rec.visited[0], tree);
        assert_eq!(rec.visited[2], Span::Empty);
    }

    #[test]
    fn error_aborts_traversal_and_skips_stop() {
        struct FailOnB {
            seen: Vec<String>,
            stopped: bool,
        }
        impl SpanVisitor for FailOnB {
            fn visit_content(&mut self, span: &ContentSpan) -> Result<()> {
                self.seen.push(span.text().to_string());
                anyhow::ensure!(span.text() != "b", "boom");
                Ok(())
            }
            fn stop(&mut self, _root: &Span) -> Result<()> {
                self.stopped = true;
                Ok(())
            }
        }
        let tree = Span::container([Span::content("a"), Span::content("b"), Span::content("c")]);
        let mut v = FailOnB {
            seen: Vec::new(),
            stopped: false,
        };
        assert!(visit(&mut v, &tree).is_err());
        assert_eq!(v.seen, vec!["a", "b"]);
        assert!(!v.stopped);
    }
}
