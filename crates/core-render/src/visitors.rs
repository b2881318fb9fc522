//! Span visitors driving the shared wrap engine.
//!
//! There is a single visitor type, [`WrapVisitor`], parameterized by the
//! [`LineSink`] that receives wrapped lines. Measuring uses [`NullSink`];
//! the three output modes use [`AnsiSink`], [`NonAnsiSink`] and [`FileSink`].
//! Because the traversal and the wrapping are literally the same code, a
//! measured size always matches what a render pass writes.
//!
//! Mode side effects per line:
//! * ANSI: one `write` holding `ESC[{row};{col}H`, text and control codes.
//! * Non-ANSI: `set_cursor_position`, then text writes interleaved with
//!   console color calls; style and raw codes have no console equivalent and
//!   are skipped.
//! * File: text followed by `\n`; no cursor movement, control spans dropped.
//!
//! Terminal modes right-pad each line with spaces to the region width when
//! the region is overwritten on render.

use crate::geometry::{Region, Size};
use crate::wrap::{Fragment, Line, LineSink, LineWrapper, NullSink};
use crate::writer::Writer;
use anyhow::Result;
use core_span::{ColorChannel, ColorSpan, ContentSpan, ControlSpan, CustomSpan, Span, SpanVisitor, visit};
use core_terminal::{ConsoleColor, Terminal};
use tracing::debug;

pub struct WrapVisitor<'s, S: LineSink + ?Sized> {
    wrapper: LineWrapper,
    sink: &'s mut S,
}

impl<'s, S: LineSink + ?Sized> WrapVisitor<'s, S> {
    pub fn new(bounds: Size, sink: &'s mut S) -> Self {
        Self {
            wrapper: LineWrapper::new(bounds),
            sink,
        }
    }

    pub fn size(&self) -> Size {
        self.wrapper.size()
    }
}

impl<S: LineSink + ?Sized> SpanVisitor for WrapVisitor<'_, S> {
    fn stop(&mut self, _root: &Span) -> Result<()> {
        self.wrapper.finish(&mut *self.sink)?;
        Ok(())
    }

    fn visit_content(&mut self, span: &ContentSpan) -> Result<()> {
        self.wrapper.push_text(span.text(), &mut *self.sink)
    }

    fn visit_control(&mut self, span: &ControlSpan) -> Result<()> {
        self.wrapper.push_control(span);
        Ok(())
    }

    fn visit_other(&mut self, span: &dyn CustomSpan) -> Result<()> {
        self.wrapper.push_text(&span.text(), &mut *self.sink)
    }
}

/// Wrap `span` into `bounds`, feeding every line to `sink`.
pub fn wrap_span<S: LineSink + ?Sized>(span: &Span, bounds: Size, sink: &mut S) -> Result<Size> {
    let mut visitor = WrapVisitor::new(bounds, sink);
    visit(&mut visitor, span)?;
    Ok(visitor.size())
}

/// Size `span` occupies when wrapped into `bounds`.
pub fn measure(span: &Span, bounds: Size) -> Size {
    let mut sink = NullSink;
    let mut visitor = WrapVisitor::new(bounds, &mut sink);
    if let Err(err) = visit(&mut visitor, span) {
        debug!(target: "render.wrap", error = %err, "measure aborted");
    }
    visitor.size()
}

fn padding(region: &Region, line: &Line) -> usize {
    if region.is_overwritten_on_render {
        (region.width as usize).saturating_sub(line.width())
    } else {
        0
    }
}

pub struct AnsiSink<'t> {
    terminal: &'t mut dyn Terminal,
    region: Region,
    emitted_control: bool,
}

impl<'t> AnsiSink<'t> {
    pub fn new(terminal: &'t mut dyn Terminal, region: Region) -> Self {
        Self {
            terminal,
            region,
            emitted_control: false,
        }
    }

    /// Whether any control code reached the terminal.
    pub fn emitted_control(&self) -> bool {
        self.emitted_control
    }
}

impl LineSink for AnsiSink<'_> {
    fn emit(&mut self, index: usize, line: &Line) -> Result<()> {
        let mut w = Writer::new();
        w.move_to(
            self.region.left,
            self.region.top.saturating_add(index as u16),
        );
        for fragment in line.fragments() {
            match fragment {
                Fragment::Text(text) => w.print(text.as_str()),
                Fragment::Control(control) => {
                    w.code(control.code());
                    self.emitted_control = true;
                }
            }
        }
        w.pad(padding(&self.region, line));
        w.flush_to(self.terminal)
    }
}

pub struct NonAnsiSink<'t> {
    terminal: &'t mut dyn Terminal,
    region: Region,
    changed_color: bool,
}

impl<'t> NonAnsiSink<'t> {
    pub fn new(terminal: &'t mut dyn Terminal, region: Region) -> Self {
        Self {
            terminal,
            region,
            changed_color: false,
        }
    }

    pub fn changed_color(&self) -> bool {
        self.changed_color
    }

    fn apply_color(&mut self, color: &ColorSpan) -> Result<()> {
        self.changed_color = true;
        match (ConsoleColor::from_name(color.name()), color.channel()) {
            (Some(c), ColorChannel::Foreground) => self.terminal.set_foreground_color(c),
            (Some(c), ColorChannel::Background) => self.terminal.set_background_color(c),
            // Unknown names (and `reset`) reset one channel; the console API
            // only resets both, so the other channel is restored.
            (None, ColorChannel::Foreground) => {
                let keep = self.terminal.background_color();
                self.terminal.reset_color()?;
                match keep {
                    Some(bg) => self.terminal.set_background_color(bg),
                    None => Ok(()),
                }
            }
            (None, ColorChannel::Background) => {
                let keep = self.terminal.foreground_color();
                self.terminal.reset_color()?;
                match keep {
                    Some(fg) => self.terminal.set_foreground_color(fg),
                    None => Ok(()),
                }
            }
        }
    }
}

impl LineSink for NonAnsiSink<'_> {
    fn emit(&mut self, index: usize, line: &Line) -> Result<()> {
        self.terminal.set_cursor_position(
            self.region.left,
            self.region.top.saturating_add(index as u16),
        )?;
        for fragment in line.fragments() {
            match fragment {
                Fragment::Text(text) => self.terminal.write(text)?,
                Fragment::Control(ControlSpan::Color(color)) => self.apply_color(color)?,
                Fragment::Control(_) => {}
            }
        }
        let pad = padding(&self.region, line);
        if pad > 0 {
            self.terminal.write(&" ".repeat(pad))?;
        }
        Ok(())
    }
}

pub struct FileSink<'t> {
    terminal: &'t mut dyn Terminal,
}

impl<'t> FileSink<'t> {
    pub fn new(terminal: &'t mut dyn Terminal) -> Self {
        Self { terminal }
    }
}

impl LineSink for FileSink<'_> {
    fn emit(&mut self, _index: usize, line: &Line) -> Result<()> {
        let mut text = line.text();
        text.push('\n');
        self.terminal.write(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_span::StyleSpan;
    use core_terminal::{TerminalEvent, TestTerminal};
    use pretty_assertions::assert_eq;

    fn red_word() -> Span {
        Span::container([
            Span::content("a "),
            Span::foreground("red"),
            Span::content("b"),
            Span::foreground("reset"),
        ])
    }

    #[test]
    fn measure_matches_wrapped_lines() {
        assert_eq!(measure(&Span::content("Four"), Size::new(10, 1)), Size::new(4, 1));
        assert_eq!(measure(&Span::Empty, Size::new(10, 1)), Size::new(0, 1));
        assert_eq!(measure(&Span::content("Four"), Size::new(0, 1)), Size::ZERO);
    }

    #[test]
    fn ansi_sink_positions_each_line_and_inlines_codes() {
        let term = TestTerminal::new(10, 3);
        let mut handle = term.clone();
        let region = Region::new(2, 1, 4, 2).with_overwrite(false);
        let mut sink = AnsiSink::new(&mut handle, region);
        wrap_span(&red_word(), region.size(), &mut sink).unwrap();
        assert!(sink.emitted_control());
        assert_eq!(term.written(), "\x1b[2;3Ha \x1b[31mb\x1b[39m");
    }

    #[test]
    fn ansi_sink_pads_to_region_width() {
        let term = TestTerminal::new(10, 3);
        let mut handle = term.clone();
        let region = Region::new(0, 0, 6, 2);
        wrap_span(&Span::content("ab cd"), Size::new(3, 2), &mut AnsiSink::new(&mut handle, region))
            .unwrap();
        assert_eq!(term.written(), "\x1b[1;1Hab    \x1b[2;1Hcd    ");
    }

    #[test]
    fn non_ansi_sink_uses_console_calls() {
        let term = TestTerminal::new(10, 3);
        let mut handle = term.clone();
        let region = Region::new(0, 0, 4, 1).with_overwrite(false);
        let mut sink = NonAnsiSink::new(&mut handle, region);
        wrap_span(&red_word(), region.size(), &mut sink).unwrap();
        assert!(sink.changed_color());
        assert_eq!(
            term.events(),
            vec![
                TerminalEvent::CursorPositionChanged { left: 0, top: 0 },
                TerminalEvent::ContentWritten("a ".into()),
                TerminalEvent::ForegroundColorChanged(ConsoleColor::Red),
                TerminalEvent::ContentWritten("b".into()),
                TerminalEvent::ColorReset,
            ]
        );
    }

    #[test]
    fn non_ansi_reset_keeps_other_channel() {
        let term = TestTerminal::new(10, 1);
        let mut handle = term.clone();
        let span = Span::container([
            Span::background("blue"),
            Span::foreground("green"),
            Span::content("x"),
            Span::foreground("no-such-color"),
            Span::style(StyleSpan::bold_on()),
        ]);
        let region = Region::new(0, 0, 1, 1);
        wrap_span(&span, region.size(), &mut NonAnsiSink::new(&mut handle, region)).unwrap();
        let events = term.events();
        assert_eq!(
            &events[events.len() - 2..],
            &[
                TerminalEvent::ColorReset,
                TerminalEvent::BackgroundColorChanged(ConsoleColor::Blue),
            ]
        );
        assert_eq!(term.foreground_color(), None);
    }

    #[test]
    fn file_sink_writes_plain_newline_terminated_lines() {
        let term = TestTerminal::new(10, 3).redirected();
        let mut handle = term.clone();
        wrap_span(&red_word(), Size::new(1, 5), &mut FileSink::new(&mut handle)).unwrap();
        assert_eq!(term.written(), "a\nb\n");
        assert!(
            term.events()
                .iter()
                .all(|e| matches!(e, TerminalEvent::ContentWritten(_)))
        );
    }
}
