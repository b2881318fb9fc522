//! Renderer facade.
//!
//! Owns the terminal, the resolved output mode and the span formatter.
//! Producers only need two operations: `render_to_region` (span, value or
//! template) and `measure_span`. Measuring never touches the terminal and is
//! mode independent.
//!
//! Invariants:
//! * `mode()` is never `OutputMode::Auto`; detection happens once in `new`.
//! * Zero-area regions are accepted and produce no output.

use crate::geometry::{Region, Size};
use crate::visitors::{AnsiSink, FileSink, NonAnsiSink, measure, wrap_span};
use crate::writer::Writer;
use anyhow::Result;
use core_span::{Span, SpanFormatter, Template, ansi};
use core_terminal::{OutputMode, Terminal};
use std::any::Any;
use std::fmt;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererOptions {
    pub mode: OutputMode,
    /// Emit `ESC[0m` (or a console color reset) after a pass that changed
    /// colors or styles.
    pub reset_after_render: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            mode: OutputMode::Auto,
            reset_after_render: true,
        }
    }
}

pub struct Renderer {
    terminal: Box<dyn Terminal>,
    mode: OutputMode,
    options: RendererOptions,
    formatter: SpanFormatter,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("mode", &self.mode)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    pub fn new(terminal: impl Terminal + 'static, options: RendererOptions) -> Self {
        let terminal: Box<dyn Terminal> = Box::new(terminal);
        let mode = options.mode.resolve(terminal.as_ref());
        debug!(target: "render.renderer", requested = %options.mode, %mode, "renderer_created");
        Self {
            terminal,
            mode,
            options,
            formatter: SpanFormatter::new(),
        }
    }

    pub fn with_formatter(mut self, formatter: SpanFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn options(&self) -> RendererOptions {
        self.options
    }

    pub fn formatter(&self) -> &SpanFormatter {
        &self.formatter
    }

    pub fn formatter_mut(&mut self) -> &mut SpanFormatter {
        &mut self.formatter
    }

    pub fn terminal(&self) -> &dyn Terminal {
        self.terminal.as_ref()
    }

    pub fn terminal_mut(&mut self) -> &mut dyn Terminal {
        self.terminal.as_mut()
    }

    /// The whole terminal surface as a region.
    pub fn terminal_region(&self) -> Region {
        let (width, height) = self.terminal.size();
        Region::new(0, 0, width, height)
    }

    pub fn measure_span(&self, span: &Span, max: Size) -> Size {
        measure(span, max)
    }

    pub fn render_to_region(&mut self, span: &Span, region: Region) -> Result<()> {
        if region.is_empty() {
            return Ok(());
        }
        let terminal = self.terminal.as_mut();
        let size = match self.mode {
            OutputMode::File => wrap_span(span, region.size(), &mut FileSink::new(terminal))?,
            OutputMode::NonAnsi => {
                let mut sink = NonAnsiSink::new(terminal, region);
                let size = wrap_span(span, region.size(), &mut sink)?;
                if sink.changed_color() && self.options.reset_after_render {
                    self.terminal.reset_color()?;
                }
                size
            }
            // `Auto` is resolved in `new`.
            OutputMode::Ansi | OutputMode::Auto => {
                let mut sink = AnsiSink::new(terminal, region);
                let size = wrap_span(span, region.size(), &mut sink)?;
                if sink.emitted_control() && self.options.reset_after_render {
                    self.terminal.write(ansi::text::ATTRIBUTES_OFF.as_str())?;
                }
                size
            }
        };
        trace!(
            target: "render.renderer",
            left = region.left,
            top = region.top,
            width = size.width,
            height = size.height,
            "rendered"
        );
        Ok(())
    }

    pub fn render_value<T: Any + fmt::Display>(&mut self, value: Option<&T>, region: Region) -> Result<()> {
        let span = self.formatter.format(value);
        self.render_to_region(&span, region)
    }

    pub fn render_template(&mut self, template: &Template, region: Region) -> Result<()> {
        let span = self.formatter.parse_template(template)?;
        self.render_to_region(&span, region)
    }

    /// Blank every cell of `region`. File output has nothing to overwrite.
    pub fn clear_region(&mut self, region: Region) -> Result<()> {
        if region.is_empty() {
            return Ok(());
        }
        match self.mode {
            OutputMode::File => Ok(()),
            OutputMode::NonAnsi => {
                let blank = " ".repeat(region.width as usize);
                for row in 0..region.height {
                    self.terminal
                        .set_cursor_position(region.left, region.top.saturating_add(row))?;
                    self.terminal.write(&blank)?;
                }
                Ok(())
            }
            OutputMode::Ansi | OutputMode::Auto => {
                let mut w = Writer::new();
                for row in 0..region.height {
                    w.move_to(region.left, region.top.saturating_add(row));
                    w.pad(region.width as usize);
                }
                w.flush_to(self.terminal.as_mut())
            }
        }
    }

    pub fn clear_screen(&mut self) -> Result<()> {
        match self.mode {
            OutputMode::File => Ok(()),
            OutputMode::NonAnsi => self.terminal.clear(),
            OutputMode::Ansi | OutputMode::Auto => {
                let mut w = Writer::new();
                w.code(&ansi::clear::ENTIRE_SCREEN);
                w.flush_to(self.terminal.as_mut())
            }
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.terminal.flush()
    }
}
