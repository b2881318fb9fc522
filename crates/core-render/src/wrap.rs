//! Word-wrap engine shared by measuring and every rendering mode.
//!
//! Text is split into wrap units: maximal whitespace runs, maximal
//! non-whitespace runs and newline units (`\n`, `\r\n`, lone `\r`).
//! Concatenating the units of a string reproduces it exactly.
//!
//! Placement of a unit on the current line:
//! 1. newline → flush the line.
//! 2. whitespace at column 0 → dropped.
//! 3. fits the remaining width → appended.
//! 4. fits an empty line → flush, then append (whitespace is dropped instead).
//! 5. wider than the region → truncated to the remaining width (after a flush
//!    if the line is already full); the rest of the unit is discarded.
//!
//! A content span that starts with a word while the previous content span
//! ended in one continues that word. The continuation is placed like any
//! other unit, except that it is skipped entirely when the word it continues
//! was already cut at the line boundary.
//!
//! Control spans are buffered in-line at zero width. Once `height` lines have
//! been flushed the wrapper stops accepting input.
//!
//! Invariants:
//! * every flushed line has `width() <= bounds.width`.
//! * the number of flushed lines never exceeds `bounds.height`.
//! * a measuring pass and a rendering pass over the same tree and bounds see
//!   the exact same sequence of lines (they only differ in their `LineSink`).

use crate::geometry::Size;
use anyhow::Result;
use core_span::ControlSpan;
use core_span::width::{display_width, truncate_to_width};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Control(ControlSpan),
}

/// One wrapped output line: text runs and control spans in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    fragments: Vec<Fragment>,
    width: usize,
}

impl Line {
    fn push_text(&mut self, text: &str, width: usize) {
        if text.is_empty() {
            return;
        }
        self.width += width;
        if let Some(Fragment::Text(last)) = self.fragments.last_mut() {
            last.push_str(text);
        } else {
            self.fragments.push(Fragment::Text(text.to_string()));
        }
    }

    fn push_control(&mut self, control: ControlSpan) {
        self.fragments.push(Fragment::Control(control));
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Display width of the visible text.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Visible text without control spans.
    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .filter_map(|f| match f {
                Fragment::Text(t) => Some(t.as_str()),
                Fragment::Control(_) => None,
            })
            .collect()
    }
}

/// Receiver of completed lines.
pub trait LineSink {
    fn emit(&mut self, index: usize, line: &Line) -> Result<()>;
}

/// Sink that discards lines; the wrapper itself tracks the resulting size.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LineSink for NullSink {
    fn emit(&mut self, _index: usize, _line: &Line) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Word,
    Space,
    Newline,
}

fn classify(c: char) -> UnitKind {
    match c {
        '\n' | '\r' => UnitKind::Newline,
        c if c.is_whitespace() => UnitKind::Space,
        _ => UnitKind::Word,
    }
}

/// Iterator over the wrap units of a string.
pub struct WrapUnits<'a> {
    text: &'a str,
    pos: usize,
}

pub fn wrap_units(text: &str) -> WrapUnits<'_> {
    WrapUnits { text, pos: 0 }
}

impl<'a> Iterator for WrapUnits<'a> {
    type Item = (UnitKind, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.text[self.pos..];
        let mut chars = rest.char_indices();
        let (_, first) = chars.next()?;
        let kind = classify(first);
        let end = match kind {
            UnitKind::Newline if rest.starts_with("\r\n") => 2,
            UnitKind::Newline => 1,
            _ => chars
                .find(|&(_, c)| classify(c) != kind)
                .map_or(rest.len(), |(idx, _)| idx),
        };
        self.pos += end;
        Some((kind, &rest[..end]))
    }
}

#[derive(Debug)]
pub struct LineWrapper {
    width: usize,
    height: usize,
    line: Line,
    lines: usize,
    max_width: usize,
    ended_in_word: bool,
    truncated: bool,
    touched: bool,
    done: bool,
}

impl LineWrapper {
    pub fn new(bounds: Size) -> Self {
        Self {
            width: bounds.width as usize,
            height: bounds.height as usize,
            line: Line::default(),
            lines: 0,
            max_width: 0,
            ended_in_word: false,
            truncated: false,
            touched: false,
            done: bounds.is_empty(),
        }
    }

    fn remaining(&self) -> usize {
        self.width.saturating_sub(self.line.width)
    }

    /// Lines flushed so far and the widest of them.
    pub fn size(&self) -> Size {
        Size::new(self.max_width as u16, self.lines as u16)
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn push_text<S: LineSink + ?Sized>(&mut self, text: &str, sink: &mut S) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.touched = true;
        let mut first = true;
        for (kind, unit) in wrap_units(text) {
            if self.done {
                break;
            }
            let continuation = first && self.ended_in_word && kind == UnitKind::Word;
            first = false;
            match kind {
                UnitKind::Newline => {
                    self.flush(sink)?;
                    self.truncated = false;
                }
                UnitKind::Word if continuation && self.truncated => {}
                _ => self.push_unit(kind, unit, sink)?,
            }
            self.ended_in_word = kind == UnitKind::Word;
        }
        Ok(())
    }

    pub fn push_control(&mut self, control: &ControlSpan) {
        self.touched = true;
        if !self.done {
            self.line.push_control(control.clone());
        }
    }

    fn push_unit<S: LineSink + ?Sized>(&mut self, kind: UnitKind, unit: &str, sink: &mut S) -> Result<()> {
        let is_space = kind == UnitKind::Space;
        if is_space && self.line.width == 0 {
            return Ok(());
        }
        let w = display_width(unit);
        if w <= self.remaining() {
            self.line.push_text(unit, w);
            self.truncated = false;
            return Ok(());
        }
        if w <= self.width || self.remaining() == 0 {
            self.flush(sink)?;
            if self.done || is_space {
                return Ok(());
            }
            if w <= self.width {
                self.line.push_text(unit, w);
                self.truncated = false;
                return Ok(());
            }
        }
        let (prefix, pw) = truncate_to_width(unit, self.remaining());
        self.line.push_text(prefix, pw);
        self.truncated = true;
        Ok(())
    }

    fn flush<S: LineSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        if self.done {
            return Ok(());
        }
        let line = std::mem::take(&mut self.line);
        sink.emit(self.lines, &line)?;
        self.max_width = self.max_width.max(line.width);
        self.lines += 1;
        if self.lines >= self.height {
            self.done = true;
        }
        Ok(())
    }

    /// Flush the trailing line (or the single empty line of an empty tree)
    /// and return the final size.
    pub fn finish<S: LineSink + ?Sized>(&mut self, sink: &mut S) -> Result<Size> {
        if !self.line.is_empty() || !self.touched {
            self.flush(sink)?;
        }
        let size = self.size();
        trace!(target: "render.wrap", width = size.width, height = size.height, "wrapped");
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Collect(Vec<String>);

    impl LineSink for Collect {
        fn emit(&mut self, index: usize, line: &Line) -> Result<()> {
            assert_eq!(index, self.0.len());
            self.0.push(line.text());
            Ok(())
        }
    }

    fn wrap(parts: &[&str], width: u16, height: u16) -> (Vec<String>, Size) {
        let mut w = LineWrapper::new(Size::new(width, height));
        let mut sink = Collect::default();
        for p in parts {
            w.push_text(p, &mut sink).unwrap();
        }
        let size = w.finish(&mut sink).unwrap();
        (sink.0, size)
    }

    #[test]
    fn units_alternate_and_rejoin() {
        let units: Vec<_> = wrap_units("ab  cd\r\n\nx").collect();
        assert_eq!(
            units,
            vec![
                (UnitKind::Word, "ab"),
                (UnitKind::Space, "  "),
                (UnitKind::Word, "cd"),
                (UnitKind::Newline, "\r\n"),
                (UnitKind::Newline, "\n"),
                (UnitKind::Word, "x"),
            ]
        );
    }

    #[test]
    fn wraps_on_whitespace_and_drops_leading_space() {
        let (lines, size) = wrap(&["The quick brown"], 9, 10);
        assert_eq!(lines, vec!["The quick", "brown"]);
        assert_eq!(size, Size::new(9, 2));
    }

    #[test]
    fn word_wider_than_region_is_truncated() {
        let (lines, size) = wrap(&["jumped over"], 5, 10);
        assert_eq!(lines, vec!["jumpe", "over"]);
        assert_eq!(size, Size::new(5, 2));
    }

    #[test]
    fn oversized_word_is_cut_at_the_remaining_width() {
        let (lines, size) = wrap(&["ab abcdefgh cd"], 5, 10);
        assert_eq!(lines, vec!["ab ab", "cd"]);
        assert_eq!(size, Size::new(5, 2));
    }

    #[test]
    fn explicit_newlines_break_lines() {
        let (lines, size) = wrap(&["one\ntwo\r\nthree"], 20, 10);
        assert_eq!(lines, vec!["one", "two", "three"]);
        assert_eq!(size, Size::new(5, 3));
    }

    #[test]
    fn height_caps_line_count() {
        let (lines, size) = wrap(&["a b c d e"], 1, 2);
        assert_eq!(lines, vec!["a", "b"]);
        assert_eq!(size, Size::new(1, 2));
    }

    #[test]
    fn empty_input_is_one_empty_line() {
        let (lines, size) = wrap(&[], 10, 10);
        assert_eq!(lines, vec![""]);
        assert_eq!(size, Size::new(0, 1));
    }

    #[test]
    fn zero_area_measures_to_zero() {
        let (lines, size) = wrap(&["text"], 0, 3);
        assert!(lines.is_empty());
        assert_eq!(size, Size::ZERO);
    }

    #[test]
    fn word_split_across_spans_stays_on_one_line_when_it_fits() {
        let (lines, _) = wrap(&["ab ", "cd", "ef gh"], 10, 10);
        assert_eq!(lines, vec!["ab cdef gh"]);
    }

    #[test]
    fn continuation_that_fits_a_fresh_line_moves_there() {
        let (lines, _) = wrap(&["hello", "world"], 8, 10);
        assert_eq!(lines, vec!["hello", "world"]);
        let (lines, size) = wrap(&["aaaa b", "cc dd"], 7, 5);
        assert_eq!(lines, vec!["aaaa b", "cc dd"]);
        assert_eq!(size, Size::new(6, 2));
        let (lines, _) = wrap(&["aaaa b", "cc"], 6, 5);
        assert_eq!(lines, vec!["aaaa b", "cc"]);
    }

    #[test]
    fn oversized_continuation_is_cut_to_the_remaining_width() {
        let (lines, _) = wrap(&["ab c", "defghij"], 5, 5);
        assert_eq!(lines, vec!["ab cd"]);
    }

    #[test]
    fn continuation_of_cut_word_is_skipped() {
        let (lines, _) = wrap(&["abcdefgh", "ij kl"], 4, 10);
        assert_eq!(lines, vec!["abcd", "kl"]);
    }

    #[test]
    fn controls_ride_along_without_width() {
        let mut w = LineWrapper::new(Size::new(4, 2));
        let mut sink = Collect::default();
        w.push_text("ab", &mut sink).unwrap();
        w.push_control(&ControlSpan::Color(core_span::ColorSpan::foreground("red")));
        w.push_text("cd", &mut sink).unwrap();
        let size = w.finish(&mut sink).unwrap();
        assert_eq!(sink.0, vec!["abcd"]);
        assert_eq!(size, Size::new(4, 1));
    }

    #[test]
    fn wide_graphemes_count_two_columns() {
        let (lines, size) = wrap(&["日本 語"], 4, 5);
        assert_eq!(lines, vec!["日本", "語"]);
        assert_eq!(size, Size::new(4, 2));
    }
}
