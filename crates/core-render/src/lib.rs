//! Wrapping, measuring and rendering of span trees into terminal regions.
//!
//! A single wrap engine drives both passes: measuring feeds wrapped lines to
//! a null sink, rendering feeds them to a mode-specific sink. Measuring and
//! rendering therefore agree on every wrap decision by construction.
//!
//! Invariants:
//! - Lines emitted by a render pass equal, in count and visible width, the
//!   size returned by `Renderer::measure_span` for the same span and bounds
//!   (padding aside, which only applies when the region is overwritten).
//! - Zero-area regions measure to `Size::ZERO` and render nothing.
//! - An empty span tree occupies one empty line.
//!
//! Exposed Components:
//! - `geometry`: `Region` / `Size` in terminal cells.
//! - `wrap`: wrap units, `LineWrapper`, `LineSink`.
//! - `visitors`: the wrap visitor plus ANSI / non-ANSI / file sinks and
//!   `measure`.
//! - `renderer`: `Renderer` facade (mode resolution, formatting, dispatch).
//! - `writer`: ANSI command buffer used by the ANSI sink and region clears.

pub mod geometry;
pub mod renderer;
pub mod visitors;
pub mod wrap;
pub mod writer;

pub use core_terminal::OutputMode;
pub use geometry::{Region, Size};
pub use renderer::{Renderer, RendererOptions};
pub use visitors::measure;
