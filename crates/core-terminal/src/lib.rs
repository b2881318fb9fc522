//! Terminal writer contract and its crossterm implementation.
//!
//! The renderer never touches stdout directly; every byte and every cursor /
//! color side effect goes through [`Terminal`]. ANSI mode only uses `write`
//! (escape sequences travel inline), non-ANSI mode uses the cursor and color
//! calls, file mode only writes text and newlines.

use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
    tty::IsTty,
};
use std::io::{Stdout, Write, stdout};

pub mod capabilities;
pub mod color;
pub mod test_terminal;

pub use capabilities::{OutputMode, TerminalCapabilities, UnknownOutputMode};
pub use color::ConsoleColor;
pub use test_terminal::{TerminalEvent, TestTerminal};

/// Size assumed when the platform cannot report one.
pub const FALLBACK_SIZE: (u16, u16) = (80, 24);

pub trait Terminal: Send {
    /// Write raw text (which may contain escape sequences in ANSI mode).
    fn write(&mut self, text: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    /// Zero-based cursor placement through the platform console API.
    fn set_cursor_position(&mut self, left: u16, top: u16) -> Result<()>;
    fn foreground_color(&self) -> Option<ConsoleColor>;
    fn background_color(&self) -> Option<ConsoleColor>;
    fn set_foreground_color(&mut self, color: ConsoleColor) -> Result<()>;
    fn set_background_color(&mut self, color: ConsoleColor) -> Result<()>;
    /// Reset both channels to the terminal defaults.
    fn reset_color(&mut self) -> Result<()>;
    fn hide_cursor(&mut self) -> Result<()>;
    fn show_cursor(&mut self) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
    /// `(columns, rows)`.
    fn size(&self) -> (u16, u16);
    fn is_output_redirected(&self) -> bool;
    /// Terminal-type indicator (`TERM`), if any.
    fn terminal_type(&self) -> Option<String>;
}

impl<T: Terminal + ?Sized> Terminal for Box<T> {
    fn write(&mut self, text: &str) -> Result<()> {
        (**self).write(text)
    }
    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
    fn set_cursor_position(&mut self, left: u16, top: u16) -> Result<()> {
        (**self).set_cursor_position(left, top)
    }
    fn foreground_color(&self) -> Option<ConsoleColor> {
        (**self).foreground_color()
    }
    fn background_color(&self) -> Option<ConsoleColor> {
        (**self).background_color()
    }
    fn set_foreground_color(&mut self, color: ConsoleColor) -> Result<()> {
        (**self).set_foreground_color(color)
    }
    fn set_background_color(&mut self, color: ConsoleColor) -> Result<()> {
        (**self).set_background_color(color)
    }
    fn reset_color(&mut self) -> Result<()> {
        (**self).reset_color()
    }
    fn hide_cursor(&mut self) -> Result<()> {
        (**self).hide_cursor()
    }
    fn show_cursor(&mut self) -> Result<()> {
        (**self).show_cursor()
    }
    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }
    fn size(&self) -> (u16, u16) {
        (**self).size()
    }
    fn is_output_redirected(&self) -> bool {
        (**self).is_output_redirected()
    }
    fn terminal_type(&self) -> Option<String> {
        (**self).terminal_type()
    }
}

/// Stdout-backed terminal. Commands are queued and reach the device on
/// `flush`.
pub struct CrosstermTerminal {
    out: Stdout,
    foreground: Option<ConsoleColor>,
    background: Option<ConsoleColor>,
    alternate: bool,
}

impl Default for CrosstermTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermTerminal {
    pub fn new() -> Self {
        Self {
            out: stdout(),
            foreground: None,
            background: None,
            alternate: false,
        }
    }

    /// Switch to the alternate screen; dropping the terminal switches back.
    pub fn enter_alternate_screen(&mut self) -> Result<()> {
        if !self.alternate {
            execute!(self.out, EnterAlternateScreen, Hide)?;
            self.alternate = true;
        }
        Ok(())
    }

    pub fn leave_alternate_screen(&mut self) -> Result<()> {
        if self.alternate {
            execute!(self.out, LeaveAlternateScreen, Show)?;
            self.alternate = false;
        }
        Ok(())
    }

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        execute!(self.out, SetTitle(title))?;
        Ok(())
    }
}

impl Terminal for CrosstermTerminal {
    fn write(&mut self, text: &str) -> Result<()> {
        queue!(self.out, Print(text))?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    fn set_cursor_position(&mut self, left: u16, top: u16) -> Result<()> {
        queue!(self.out, MoveTo(left, top))?;
        Ok(())
    }

    fn foreground_color(&self) -> Option<ConsoleColor> {
        self.foreground
    }

    fn background_color(&self) -> Option<ConsoleColor> {
        self.background
    }

    fn set_foreground_color(&mut self, color: ConsoleColor) -> Result<()> {
        queue!(self.out, SetForegroundColor(color.into()))?;
        self.foreground = Some(color);
        Ok(())
    }

    fn set_background_color(&mut self, color: ConsoleColor) -> Result<()> {
        queue!(self.out, SetBackgroundColor(color.into()))?;
        self.background = Some(color);
        Ok(())
    }

    fn reset_color(&mut self) -> Result<()> {
        queue!(self.out, ResetColor)?;
        self.foreground = None;
        self.background = None;
        Ok(())
    }

    fn hide_cursor(&mut self) -> Result<()> {
        execute!(self.out, Hide)?;
        Ok(())
    }

    fn show_cursor(&mut self) -> Result<()> {
        execute!(self.out, Show)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        queue!(self.out, Clear(ClearType::All))?;
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        crossterm::terminal::size().unwrap_or(FALLBACK_SIZE)
    }

    fn is_output_redirected(&self) -> bool {
        !self.out.is_tty()
    }

    fn terminal_type(&self) -> Option<String> {
        std::env::var("TERM").ok()
    }
}

impl Drop for CrosstermTerminal {
    fn drop(&mut self) {
        let _ = self.leave_alternate_screen();
    }
}
