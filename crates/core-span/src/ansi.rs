//! VT100 / ANSI escape sequences emitted by the ANSI output mode.
//!
//! Every constant here is the exact byte sequence written to the terminal;
//! nothing is computed from terminal state. Cursor addressing is 1-based on
//! the wire (`ESC[{line};{column}H`).

use std::borrow::Cow;
use std::fmt;

pub const ESC: &str = "\x1b";

/// Raw escape sequence carried by control spans.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AnsiControlCode(Cow<'static, str>);

impl AnsiControlCode {
    pub const fn from_static(code: &'static str) -> Self {
        Self(Cow::Borrowed(code))
    }

    pub fn new(code: impl Into<String>) -> Self {
        Self(Cow::Owned(code.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AnsiControlCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for AnsiControlCode {
    fn from(code: &'static str) -> Self {
        Self::from_static(code)
    }
}

pub mod color {
    pub mod foreground {
        use super::super::AnsiControlCode;

        pub const BLACK: AnsiControlCode = AnsiControlCode::from_static("\x1b[30m");
        pub const RED: AnsiControlCode = AnsiControlCode::from_static("\x1b[31m");
        pub const GREEN: AnsiControlCode = AnsiControlCode::from_static("\x1b[32m");
        pub const YELLOW: AnsiControlCode = AnsiControlCode::from_static("\x1b[33m");
        pub const BLUE: AnsiControlCode = AnsiControlCode::from_static("\x1b[34m");
        pub const MAGENTA: AnsiControlCode = AnsiControlCode::from_static("\x1b[35m");
        pub const CYAN: AnsiControlCode = AnsiControlCode::from_static("\x1b[36m");
        pub const WHITE: AnsiControlCode = AnsiControlCode::from_static("\x1b[37m");
        pub const DARK_GRAY: AnsiControlCode = AnsiControlCode::from_static("\x1b[90m");
        pub const LIGHT_RED: AnsiControlCode = AnsiControlCode::from_static("\x1b[91m");
        pub const LIGHT_GREEN: AnsiControlCode = AnsiControlCode::from_static("\x1b[92m");
        pub const LIGHT_YELLOW: AnsiControlCode = AnsiControlCode::from_static("\x1b[93m");
        pub const LIGHT_BLUE: AnsiControlCode = AnsiControlCode::from_static("\x1b[94m");
        pub const LIGHT_MAGENTA: AnsiControlCode = AnsiControlCode::from_static("\x1b[95m");
        pub const LIGHT_CYAN: AnsiControlCode = AnsiControlCode::from_static("\x1b[96m");
        pub const LIGHT_GRAY: AnsiControlCode = AnsiControlCode::from_static("\x1b[97m");
        pub const DEFAULT: AnsiControlCode = AnsiControlCode::from_static("\x1b[39m");
    }

    pub mod background {
        use super::super::AnsiControlCode;

        pub const BLACK: AnsiControlCode = AnsiControlCode::from_static("\x1b[40m");
        pub const RED: AnsiControlCode = AnsiControlCode::from_static("\x1b[41m");
        pub const GREEN: AnsiControlCode = AnsiControlCode::from_static("\x1b[42m");
        pub const YELLOW: AnsiControlCode = AnsiControlCode::from_static("\x1b[43m");
        pub const BLUE: AnsiControlCode = AnsiControlCode::from_static("\x1b[44m");
        pub const MAGENTA: AnsiControlCode = AnsiControlCode::from_static("\x1b[45m");
        pub const CYAN: AnsiControlCode = AnsiControlCode::from_static("\x1b[46m");
        pub const WHITE: AnsiControlCode = AnsiControlCode::from_static("\x1b[47m");
        pub const DARK_GRAY: AnsiControlCode = AnsiControlCode::from_static("\x1b[100m");
        pub const LIGHT_RED: AnsiControlCode = AnsiControlCode::from_static("\x1b[101m");
        pub const LIGHT_GREEN: AnsiControlCode = AnsiControlCode::from_static("\x1b[102m");
        pub const LIGHT_YELLOW: AnsiControlCode = AnsiControlCode::from_static("\x1b[103m");
        pub const LIGHT_BLUE: AnsiControlCode = AnsiControlCode::from_static("\x1b[104m");
        pub const LIGHT_MAGENTA: AnsiControlCode = AnsiControlCode::from_static("\x1b[105m");
        pub const LIGHT_CYAN: AnsiControlCode = AnsiControlCode::from_static("\x1b[106m");
        pub const LIGHT_GRAY: AnsiControlCode = AnsiControlCode::from_static("\x1b[107m");
        pub const DEFAULT: AnsiControlCode = AnsiControlCode::from_static("\x1b[49m");
    }
}

pub mod text {
    use super::AnsiControlCode;

    pub const ATTRIBUTES_OFF: AnsiControlCode = AnsiControlCode::from_static("\x1b[0m");
    pub const BOLD_ON: AnsiControlCode = AnsiControlCode::from_static("\x1b[1m");
    pub const BOLD_OFF: AnsiControlCode = AnsiControlCode::from_static("\x1b[22m");
    pub const DIM_ON: AnsiControlCode = AnsiControlCode::from_static("\x1b[2m");
    pub const ITALIC_ON: AnsiControlCode = AnsiControlCode::from_static("\x1b[3m");
    pub const ITALIC_OFF: AnsiControlCode = AnsiControlCode::from_static("\x1b[23m");
    pub const UNDERLINE_ON: AnsiControlCode = AnsiControlCode::from_static("\x1b[4m");
    pub const UNDERLINE_OFF: AnsiControlCode = AnsiControlCode::from_static("\x1b[24m");
    pub const BLINK_ON: AnsiControlCode = AnsiControlCode::from_static("\x1b[5m");
    pub const BLINK_OFF: AnsiControlCode = AnsiControlCode::from_static("\x1b[25m");
    pub const REVERSE_ON: AnsiControlCode = AnsiControlCode::from_static("\x1b[7m");
    pub const REVERSE_OFF: AnsiControlCode = AnsiControlCode::from_static("\x1b[27m");
    pub const HIDDEN_ON: AnsiControlCode = AnsiControlCode::from_static("\x1b[8m");
    pub const HIDDEN_OFF: AnsiControlCode = AnsiControlCode::from_static("\x1b[28m");
}

pub mod clear {
    use super::AnsiControlCode;

    pub const ENTIRE_LINE: AnsiControlCode = AnsiControlCode::from_static("\x1b[2K");
    pub const TO_END_OF_LINE: AnsiControlCode = AnsiControlCode::from_static("\x1b[K");
    pub const ENTIRE_SCREEN: AnsiControlCode = AnsiControlCode::from_static("\x1b[2J");
}

pub mod cursor {
    use super::AnsiControlCode;

    pub const HIDE: AnsiControlCode = AnsiControlCode::from_static("\x1b[?25l");
    pub const SHOW: AnsiControlCode = AnsiControlCode::from_static("\x1b[?25h");
    pub const SAVE_POSITION: AnsiControlCode = AnsiControlCode::from_static("\x1b7");
    pub const RESTORE_POSITION: AnsiControlCode = AnsiControlCode::from_static("\x1b8");

    /// Absolute move; `line` and `column` are 1-based.
    pub fn to_location(line: u32, column: u32) -> AnsiControlCode {
        AnsiControlCode::new(format!("\x1b[{line};{column}H"))
    }
}
