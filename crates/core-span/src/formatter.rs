//! Value → span conversion.
//!
//! Resolution order for `format`:
//! 1. `None` → `Span::Empty`.
//! 2. The value already is a `Span` → returned unchanged.
//! 3. A formatter registered for the value's concrete type.
//! 4. `Display` output as a single content span.
//!
//! Empty text always collapses to `Span::Empty` so layout code only has one
//! notion of "no content".

use crate::span::Span;
use crate::template::{Piece, Template, TemplateArg, TemplateError};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

type FormatFn = Arc<dyn Fn(&dyn Any) -> Span + Send + Sync>;

#[derive(Clone, Default)]
pub struct SpanFormatter {
    formatters: HashMap<TypeId, FormatFn>,
}

impl fmt::Debug for SpanFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpanFormatter")
            .field("registered", &self.formatters.len())
            .finish()
    }
}

fn collapse(span: Span) -> Span {
    match span {
        Span::Content(c) if c.text().is_empty() => Span::Empty,
        other => other,
    }
}

impl SpanFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a formatter for `T`, replacing any previous one.
    pub fn add_formatter<T, F>(&mut self, format: F)
    where
        T: Any,
        F: Fn(&T) -> Span + Send + Sync + 'static,
    {
        let erased: FormatFn = Arc::new(move |value: &dyn Any| {
            value.downcast_ref::<T>().map(&format).unwrap_or_default()
        });
        self.formatters.insert(TypeId::of::<T>(), erased);
    }

    pub fn has_formatter<T: Any>(&self) -> bool {
        self.formatters.contains_key(&TypeId::of::<T>())
    }

    pub fn format<T: Any + fmt::Display>(&self, value: Option<&T>) -> Span {
        let Some(value) = value else {
            return Span::Empty;
        };
        let any: &dyn Any = value;
        if let Some(span) = any.downcast_ref::<Span>() {
            return span.clone();
        }
        if let Some(format) = self.formatters.get(&TypeId::of::<T>()) {
            return collapse(format(any));
        }
        Span::text(value.to_string())
    }

    /// Destructure a template into a container whose children alternate
    /// literal content spans and per-argument spans, in template order.
    pub fn parse_template(&self, template: &Template) -> Result<Span, TemplateError> {
        let pieces = template.pieces()?;
        if !pieces.iter().any(|p| matches!(p, Piece::Arg { .. })) {
            let text: String = pieces
                .into_iter()
                .map(|p| match p {
                    Piece::Literal(s) => s,
                    Piece::Arg { .. } => String::new(),
                })
                .collect();
            return Ok(Span::text(text));
        }
        let mut children = Vec::with_capacity(pieces.len());
        for piece in pieces {
            match piece {
                Piece::Literal(text) => children.push(Span::content(text)),
                Piece::Arg { index, spec } => {
                    let arg = &template.args()[index];
                    match (arg, spec) {
                        (TemplateArg::Span(span), Some(spec)) => {
                            let (left, right) = spec.span_padding(span.content_length());
                            if !left.is_empty() {
                                children.push(Span::content(left));
                            }
                            children.push(span.clone());
                            if !right.is_empty() {
                                children.push(Span::content(right));
                            }
                        }
                        (TemplateArg::Span(span), None) => children.push(span.clone()),
                        (arg, Some(spec)) => children.push(Span::text(spec.apply(index, arg)?)),
                        (arg, None) => children.push(self.format_arg(arg)),
                    }
                }
            }
        }
        trace!(target: "span.formatter", args = template.args().len(), children = children.len(), "template_parsed");
        Ok(Span::container(children))
    }

    fn format_arg(&self, arg: &TemplateArg) -> Span {
        match arg {
            TemplateArg::Span(span) => span.clone(),
            TemplateArg::Str(s) => Span::text(s),
            TemplateArg::Int(n) => Span::text(n.to_string()),
            TemplateArg::Float(n) => Span::text(n.to_string()),
            TemplateArg::Bool(b) => Span::text(b.to_string()),
            TemplateArg::Char(c) => Span::text(c.to_string()),
            TemplateArg::Custom {
                value,
                type_id,
                display,
            } => match self.formatters.get(type_id) {
                Some(format) => collapse(format(value.as_ref())),
                None => Span::text(display),
            },
        }
    }
}
