//! Output mode detection.
//!
//! Detection runs once when a renderer is constructed:
//! * output redirected to a file or pipe → `File`
//! * a terminal-type indicator that is set, non-empty and not `dumb` → `Ansi`
//! * otherwise → `NonAnsi` (cursor and colors through the console API)
//!
//! `Auto` is only a request value; it never survives `resolve`.

use crate::Terminal;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Auto,
    Ansi,
    NonAnsi,
    File,
}

impl OutputMode {
    pub fn detect(redirected: bool, term: Option<&str>) -> Self {
        if redirected {
            return OutputMode::File;
        }
        match term {
            Some(t) if !t.is_empty() && t != "dumb" => OutputMode::Ansi,
            _ => OutputMode::NonAnsi,
        }
    }

    /// Replace `Auto` by the mode detected from `terminal`; explicit modes
    /// pass through.
    pub fn resolve(self, terminal: &dyn Terminal) -> Self {
        match self {
            OutputMode::Auto => TerminalCapabilities::detect(terminal).mode,
            explicit => explicit,
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputMode::Auto => "auto",
            OutputMode::Ansi => "ansi",
            OutputMode::NonAnsi => "non_ansi",
            OutputMode::File => "file",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown output mode '{0}' (expected auto, ansi, non_ansi or file)")]
pub struct UnknownOutputMode(pub String);

impl FromStr for OutputMode {
    type Err = UnknownOutputMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(OutputMode::Auto),
            "ansi" => Ok(OutputMode::Ansi),
            "non_ansi" | "nonansi" | "non-ansi" => Ok(OutputMode::NonAnsi),
            "file" => Ok(OutputMode::File),
            _ => Err(UnknownOutputMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct TerminalCapabilities {
    pub mode: OutputMode,
    pub redirected: bool,
    pub terminal_type: Option<String>,
}

impl TerminalCapabilities {
    pub fn detect(terminal: &dyn Terminal) -> Self {
        let redirected = terminal.is_output_redirected();
        let terminal_type = terminal.terminal_type();
        let mode = OutputMode::detect(redirected, terminal_type.as_deref());
        debug!(target: "terminal.capabilities", %mode, redirected, term = ?terminal_type, "detected");
        Self {
            mode,
            redirected,
            terminal_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestTerminal;

    #[test]
    fn redirection_wins_over_terminal_type() {
        assert_eq!(OutputMode::detect(true, Some("xterm-256color")), OutputMode::File);
    }

    #[test]
    fn dumb_or_missing_terminal_type_is_non_ansi() {
        assert_eq!(OutputMode::detect(false, None), OutputMode::NonAnsi);
        assert_eq!(OutputMode::detect(false, Some("")), OutputMode::NonAnsi);
        assert_eq!(OutputMode::detect(false, Some("dumb")), OutputMode::NonAnsi);
        assert_eq!(OutputMode::detect(false, Some("xterm")), OutputMode::Ansi);
    }

    #[test]
    fn detect_reads_the_terminal() {
        let term = TestTerminal::new(10, 2).with_terminal_type("screen");
        let caps = TerminalCapabilities::detect(&term);
        assert_eq!(caps.mode, OutputMode::Ansi);
        assert!(!caps.redirected);

        let piped = TestTerminal::new(10, 2).redirected();
        assert_eq!(OutputMode::Auto.resolve(&piped), OutputMode::File);
        assert_eq!(OutputMode::NonAnsi.resolve(&piped), OutputMode::NonAnsi);
    }

    #[test]
    fn parse_accepts_config_spellings() {
        assert_eq!("non_ansi".parse::<OutputMode>(), Ok(OutputMode::NonAnsi));
        assert_eq!("ANSI".parse::<OutputMode>(), Ok(OutputMode::Ansi));
        assert!("vt52".parse::<OutputMode>().is_err());
        assert_eq!(OutputMode::File.to_string(), "file");
    }
}
