//! Console color palette used by the non-ANSI output mode.
//!
//! Names follow the color span names (`red` = SGR 31, `lightred` = SGR 91);
//! `reset` is deliberately not a color so callers fall through to their
//! reset path.

use crossterm::style::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConsoleColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    DarkGray,
    LightRed,
    LightGreen,
    LightYellow,
    LightBlue,
    LightMagenta,
    LightCyan,
    LightGray,
}

impl ConsoleColor {
    pub fn from_name(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "black" => ConsoleColor::Black,
            "red" => ConsoleColor::Red,
            "green" => ConsoleColor::Green,
            "yellow" => ConsoleColor::Yellow,
            "blue" => ConsoleColor::Blue,
            "magenta" => ConsoleColor::Magenta,
            "cyan" => ConsoleColor::Cyan,
            "white" => ConsoleColor::White,
            "darkgray" => ConsoleColor::DarkGray,
            "lightred" => ConsoleColor::LightRed,
            "lightgreen" => ConsoleColor::LightGreen,
            "lightyellow" => ConsoleColor::LightYellow,
            "lightblue" => ConsoleColor::LightBlue,
            "lightmagenta" => ConsoleColor::LightMagenta,
            "lightcyan" => ConsoleColor::LightCyan,
            "lightgray" => ConsoleColor::LightGray,
            _ => return None,
        };
        Some(color)
    }
}

impl From<ConsoleColor> for Color {
    fn from(color: ConsoleColor) -> Self {
        match color {
            ConsoleColor::Black => Color::Black,
            ConsoleColor::Red => Color::DarkRed,
            ConsoleColor::Green => Color::DarkGreen,
            ConsoleColor::Yellow => Color::DarkYellow,
            ConsoleColor::Blue => Color::DarkBlue,
            ConsoleColor::Magenta => Color::DarkMagenta,
            ConsoleColor::Cyan => Color::DarkCyan,
            ConsoleColor::White => Color::Grey,
            ConsoleColor::DarkGray => Color::DarkGrey,
            ConsoleColor::LightRed => Color::Red,
            ConsoleColor::LightGreen => Color::Green,
            ConsoleColor::LightYellow => Color::Yellow,
            ConsoleColor::LightBlue => Color::Blue,
            ConsoleColor::LightMagenta => Color::Magenta,
            ConsoleColor::LightCyan => Color::Cyan,
            ConsoleColor::LightGray => Color::White,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_case_insensitive_and_reset_is_not_a_color() {
        assert_eq!(ConsoleColor::from_name("LightBlue"), Some(ConsoleColor::LightBlue));
        assert_eq!(ConsoleColor::from_name("reset"), None);
        assert_eq!(ConsoleColor::from_name("chartreuse"), None);
    }

    #[test]
    fn dark_variants_map_to_normal_intensity() {
        assert_eq!(Color::from(ConsoleColor::Red), Color::DarkRed);
        assert_eq!(Color::from(ConsoleColor::LightRed), Color::Red);
    }
}
