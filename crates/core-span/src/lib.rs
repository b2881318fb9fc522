//! Span model: immutable formatted content consumed by the renderer.
//!
//! Exposed Components:
//! - `span`: the closed `Span` enum plus content / container / control kinds.
//! - `visitor`: `SpanVisitor` dispatch shared by the measuring and rendering
//!   passes.
//! - `formatter` / `template`: conversion of arbitrary values and interpolated
//!   templates into span trees.
//! - `ansi`: exact VT100 escape sequences carried by control spans.
//! - `width`: the single display-width authority used for lengths, wrapping
//!   and truncation.

pub mod ansi;
pub mod formatter;
pub mod span;
pub mod template;
pub mod visitor;
pub mod width;

pub use ansi::AnsiControlCode;
pub use formatter::SpanFormatter;
pub use span::{
    COLOR_NAMES, ColorChannel, ColorSpan, ContainerSpan, ContentSpan, ControlSpan, CursorControl,
    CustomSpan, Span, StyleSpan,
};
pub use template::{Template, TemplateArg, TemplateError};
pub use visitor::{SpanVisitor, visit};
