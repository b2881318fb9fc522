//! ANSI command buffer.
//!
//! Commands are collected per line and handed to the terminal as a single
//! `write`, so a line's cursor move, text and inline control codes reach the
//! device in order and without interleaving.
//!
//! Design invariants:
//! * Commands preserve ordering; nothing is emitted before `flush_to`.
//! * All positions are absolute, zero-based; crossterm renders them as the
//!   one-based `ESC[{line};{col}H`.

use anyhow::Result;
use core_span::AnsiControlCode;
use core_terminal::Terminal;
use crossterm::{Command as _, cursor::MoveTo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    MoveTo(u16, u16),
    Print(String),
    Code(AnsiControlCode),
    Pad(usize),
}

#[derive(Debug, Default)]
pub struct Writer {
    cmds: Vec<Command>,
}

impl Writer {
    pub fn new() -> Self {
        Self { cmds: Vec::new() }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cmds.push(Command::MoveTo(x, y));
    }

    pub fn print<S: Into<String>>(&mut self, s: S) {
        let s: String = s.into();
        if !s.is_empty() {
            self.cmds.push(Command::Print(s));
        }
    }

    pub fn code(&mut self, code: &AnsiControlCode) {
        if !code.is_empty() {
            self.cmds.push(Command::Code(code.clone()));
        }
    }

    /// Blank cells written from the current cursor position.
    pub fn pad(&mut self, count: usize) {
        if count > 0 {
            self.cmds.push(Command::Pad(count));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Render the queued commands to their escape-sequence form.
    pub fn encode(&self) -> Result<String> {
        let mut out = String::new();
        for c in &self.cmds {
            match c {
                Command::MoveTo(x, y) => MoveTo(*x, *y).write_ansi(&mut out)?,
                Command::Print(s) => out.push_str(s),
                Command::Code(code) => out.push_str(code.as_str()),
                Command::Pad(n) => out.extend(std::iter::repeat_n(' ', *n)),
            }
        }
        Ok(out)
    }

    pub fn flush_to(self, terminal: &mut dyn Terminal) -> Result<()> {
        if self.cmds.is_empty() {
            return Ok(());
        }
        terminal.write(&self.encode()?)
    }
}
