//! In-memory terminal that records every side effect.
//!
//! Clones share state, so a test can hand one clone to a renderer and keep
//! another to inspect what was written. `screen_lines` replays the recorded
//! stream onto a character grid, understanding the subset of escape
//! sequences the renderer emits (`ESC[r;cH`, `ESC[2J`, SGR codes are
//! skipped) and the console-API cursor calls.

use crate::{ConsoleColor, Terminal};
use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    ContentWritten(String),
    CursorPositionChanged { left: u16, top: u16 },
    ForegroundColorChanged(ConsoleColor),
    BackgroundColorChanged(ConsoleColor),
    ColorReset,
    CursorHidden,
    CursorShown,
    Cleared,
    Flushed,
}

#[derive(Debug)]
struct State {
    width: u16,
    height: u16,
    redirected: bool,
    terminal_type: Option<String>,
    foreground: Option<ConsoleColor>,
    background: Option<ConsoleColor>,
    events: Vec<TerminalEvent>,
}

#[derive(Debug, Clone)]
pub struct TestTerminal {
    state: Arc<Mutex<State>>,
}

impl TestTerminal {
    /// A `width` x `height` interactive terminal reporting `xterm`.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                width,
                height,
                redirected: false,
                terminal_type: Some("xterm".to_string()),
                foreground: None,
                background: None,
                events: Vec::new(),
            })),
        }
    }

    pub fn redirected(self) -> Self {
        self.state.lock().redirected = true;
        self
    }

    pub fn with_terminal_type(self, term: &str) -> Self {
        self.state.lock().terminal_type = if term.is_empty() {
            None
        } else {
            Some(term.to_string())
        };
        self
    }

    pub fn resize(&self, width: u16, height: u16) {
        let mut s = self.state.lock();
        s.width = width;
        s.height = height;
    }

    pub fn events(&self) -> Vec<TerminalEvent> {
        self.state.lock().events.clone()
    }

    pub fn clear_events(&self) {
        self.state.lock().events.clear();
    }

    /// Concatenation of every `write` call.
    pub fn written(&self) -> String {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|e| match e {
                TerminalEvent::ContentWritten(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, event: &TerminalEvent) -> usize {
        self.state.lock().events.iter().filter(|e| *e == event).count()
    }

    /// Replay the recorded events onto a `width` x `height` grid and return
    /// its rows with trailing spaces trimmed.
    pub fn screen_lines(&self) -> Vec<String> {
        let s = self.state.lock();
        let mut screen = Screen::new(s.width as usize, s.height as usize);
        for event in &s.events {
            match event {
                TerminalEvent::ContentWritten(text) => screen.feed(text),
                TerminalEvent::CursorPositionChanged { left, top } => {
                    screen.move_to(*left as usize, *top as usize)
                }
                TerminalEvent::Cleared => screen.clear(),
                _ => {}
            }
        }
        screen.lines()
    }
}

const WIDE_TAIL: char = '\0';

struct Screen {
    cells: Vec<Vec<char>>,
    col: usize,
    row: usize,
}

impl Screen {
    fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![vec![' '; width]; height],
            col: 0,
            row: 0,
        }
    }

    fn move_to(&mut self, col: usize, row: usize) {
        self.col = col;
        self.row = row;
    }

    fn clear(&mut self) {
        for row in &mut self.cells {
            row.fill(' ');
        }
    }

    fn put(&mut self, ch: char) {
        let w = ch.width().unwrap_or(0);
        if w == 0 {
            return;
        }
        if let Some(line) = self.cells.get_mut(self.row) {
            if let Some(cell) = line.get_mut(self.col) {
                *cell = ch;
            }
            // Trailing half of a wide glyph.
            for extra in 1..w {
                if let Some(cell) = line.get_mut(self.col + extra) {
                    *cell = WIDE_TAIL;
                }
            }
        }
        self.col += w;
    }

    fn feed(&mut self, text: &str) {
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '\x1b' => {
                    if chars.peek() != Some(&'[') {
                        continue;
                    }
                    chars.next();
                    let mut params = String::new();
                    let mut fin = None;
                    for c in chars.by_ref() {
                        if c.is_ascii_alphabetic() {
                            fin = Some(c);
                            break;
                        }
                        params.push(c);
                    }
                    match fin {
                        Some('H') => {
                            let mut parts = params.split(';');
                            let line = parts.next().and_then(|p| p.parse::<usize>().ok()).unwrap_or(1);
                            let col = parts.next().and_then(|p| p.parse::<usize>().ok()).unwrap_or(1);
                            self.move_to(col.saturating_sub(1), line.saturating_sub(1));
                        }
                        Some('J') if params == "2" => self.clear(),
                        _ => {}
                    }
                }
                '\n' => {
                    self.row += 1;
                    self.col = 0;
                }
                '\r' => self.col = 0,
                c => self.put(c),
            }
        }
    }

    fn lines(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .filter(|&&c| c != WIDE_TAIL)
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }
}

impl Terminal for TestTerminal {
    fn write(&mut self, text: &str) -> Result<()> {
        self.state
            .lock()
            .events
            .push(TerminalEvent::ContentWritten(text.to_string()));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.state.lock().events.push(TerminalEvent::Flushed);
        Ok(())
    }

    fn set_cursor_position(&mut self, left: u16, top: u16) -> Result<()> {
        self.state
            .lock()
            .events
            .push(TerminalEvent::CursorPositionChanged { left, top });
        Ok(())
    }

    fn foreground_color(&self) -> Option<ConsoleColor> {
        self.state.lock().foreground
    }

    fn background_color(&self) -> Option<ConsoleColor> {
        self.state.lock().background
    }

    fn set_foreground_color(&mut self, color: ConsoleColor) -> Result<()> {
        let mut s = self.state.lock();
        s.foreground = Some(color);
        s.events.push(TerminalEvent::ForegroundColorChanged(color));
        Ok(())
    }

    fn set_background_color(&mut self, color: ConsoleColor) -> Result<()> {
        let mut s = self.state.lock();
        s.background = Some(color);
        s.events.push(TerminalEvent::BackgroundColorChanged(color));
        Ok(())
    }

    fn reset_color(&mut self) -> Result<()> {
        let mut s = self.state.lock();
        s.foreground = None;
        s.background = None;
        s.events.push(TerminalEvent::ColorReset);
        Ok(())
    }

    fn hide_cursor(&mut self) -> Result<()> {
        self.state.lock().events.push(TerminalEvent::CursorHidden);
        Ok(())
    }

    fn show_cursor(&mut self) -> Result<()> {
        self.state.lock().events.push(TerminalEvent::CursorShown);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.state.lock().events.push(TerminalEvent::Cleared);
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        let s = self.state.lock();
        (s.width, s.height)
    }

    fn is_output_redirected(&self) -> bool {
        self.state.lock().redirected
    }

    fn terminal_type(&self) -> Option<String> {
        self.state.lock().terminal_type.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clones_share_recorded_events() {
        let probe = TestTerminal::new(4, 1);
        let mut handle = probe.clone();
        handle.write("ab").unwrap();
        handle.flush().unwrap();
        assert_eq!(
            probe.events(),
            vec![TerminalEvent::ContentWritten("ab".into()), TerminalEvent::Flushed]
        );
        assert_eq!(probe.written(), "ab");
    }

    #[test]
    fn screen_replays_escape_positioning_and_console_cursor() {
        let mut term = TestTerminal::new(6, 3);
        term.write("\x1b[2;3Hhi\x1b[31m!\x1b[0m").unwrap();
        term.set_cursor_position(0, 2).unwrap();
        term.write("xyz").unwrap();
        assert_eq!(term.screen_lines(), vec!["", "  hi!", "xyz"]);
    }

    #[test]
    fn screen_clear_blanks_previous_output() {
        let mut term = TestTerminal::new(3, 1);
        term.write("abc\x1b[2J\x1b[1;1Hd").unwrap();
        assert_eq!(term.screen_lines(), vec!["d"]);
    }

    #[test]
    fn colors_are_tracked() {
        let mut term = TestTerminal::new(1, 1);
        term.set_foreground_color(ConsoleColor::Red).unwrap();
        assert_eq!(term.foreground_color(), Some(ConsoleColor::Red));
        term.reset_color().unwrap();
        assert_eq!(term.foreground_color(), None);
    }
}
