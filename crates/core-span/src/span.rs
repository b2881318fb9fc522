//! Immutable span tree.
//!
//! A `Span` is either visible content (text, or a container of child spans)
//! or a zero-width formatting instruction. Span trees are built once by a
//! producer and then only read; the renderer never mutates them.
//!
//! Invariants:
//! - `content_length()` of control and empty spans is 0.
//! - A container's length is the sum of its children, computed once at
//!   construction.
//! - `ContentSpan` text is stored NFC-normalized so equal text always has
//!   equal width.
//! - Equality is structural: content by text, controls by name / code,
//!   host-defined spans by kind and text.

use crate::ansi::color::{background as bg, foreground as fg};
use crate::ansi::{self, AnsiControlCode};
use crate::width::display_width;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;

/// Host-defined span kinds reach visitors through `SpanVisitor::visit_other`.
pub trait CustomSpan: fmt::Debug + Send + Sync {
    fn kind(&self) -> &str;
    fn content_length(&self) -> usize {
        0
    }
    fn text(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }
}

#[derive(Clone, Debug, Default)]
pub enum Span {
    #[default]
    Empty,
    Content(ContentSpan),
    Container(ContainerSpan),
    Control(ControlSpan),
    Other(Arc<dyn CustomSpan>),
}

impl Span {
    pub fn content(text: impl AsRef<str>) -> Self {
        Span::Content(ContentSpan::new(text))
    }

    /// Like [`Span::content`] but collapses empty text to [`Span::Empty`].
    pub fn text(text: impl AsRef<str>) -> Self {
        let text = text.as_ref();
        if text.is_empty() {
            Span::Empty
        } else {
            Span::content(text)
        }
    }

    pub fn container<I: IntoIterator<Item = Span>>(children: I) -> Self {
        Span::Container(ContainerSpan::new(children))
    }

    pub fn foreground(name: &str) -> Self {
        Span::Control(ControlSpan::Color(ColorSpan::foreground(name)))
    }

    pub fn background(name: &str) -> Self {
        Span::Control(ControlSpan::Color(ColorSpan::background(name)))
    }

    pub fn style(style: StyleSpan) -> Self {
        Span::Control(ControlSpan::Style(style))
    }

    pub fn code(code: AnsiControlCode) -> Self {
        Span::Control(ControlSpan::Code(code))
    }

    pub fn custom(span: impl CustomSpan + 'static) -> Self {
        Span::Other(Arc::new(span))
    }

    pub fn content_length(&self) -> usize {
        match self {
            Span::Empty | Span::Control(_) => 0,
            Span::Content(c) => c.content_length(),
            Span::Container(c) => c.content_length(),
            Span::Other(o) => o.content_length(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Span::Empty)
    }

    /// Text with control spans written inline as their escape sequences.
    pub fn to_ansi_string(&self) -> String {
        let mut out = String::new();
        self.write_ansi(&mut out);
        out
    }

    fn write_ansi(&self, out: &mut String) {
        match self {
            Span::Empty => {}
            Span::Content(c) => out.push_str(c.text()),
            Span::Container(c) => c.children().iter().for_each(|child| child.write_ansi(out)),
            Span::Control(c) => out.push_str(c.code().as_str()),
            Span::Other(o) => out.push_str(&o.text()),
        }
    }
}

impl PartialEq for Span {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Span::Empty, Span::Empty) => true,
            (Span::Content(a), Span::Content(b)) => a == b,
            (Span::Container(a), Span::Container(b)) => a == b,
            (Span::Control(a), Span::Control(b)) => a == b,
            (Span::Other(a), Span::Other(b)) => a.kind() == b.kind() && a.text() == b.text(),
            _ => false,
        }
    }
}

impl Eq for Span {}

/// Plain text rendering; control spans contribute nothing.
impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Span::Empty | Span::Control(_) => Ok(()),
            Span::Content(c) => f.write_str(c.text()),
            Span::Container(c) => c.children().iter().try_for_each(|s| s.fmt(f)),
            Span::Other(o) => f.write_str(&o.text()),
        }
    }
}

impl From<ContentSpan> for Span {
    fn from(span: ContentSpan) -> Self {
        Span::Content(span)
    }
}

impl From<ContainerSpan> for Span {
    fn from(span: ContainerSpan) -> Self {
        Span::Container(span)
    }
}

impl From<ControlSpan> for Span {
    fn from(span: ControlSpan) -> Self {
        Span::Control(span)
    }
}

impl From<ColorSpan> for Span {
    fn from(span: ColorSpan) -> Self {
        Span::Control(ControlSpan::Color(span))
    }
}

impl From<StyleSpan> for Span {
    fn from(span: StyleSpan) -> Self {
        Span::Control(ControlSpan::Style(span))
    }
}

impl From<&str> for Span {
    fn from(text: &str) -> Self {
        Span::text(text)
    }
}

impl From<String> for Span {
    fn from(text: String) -> Self {
        Span::text(text)
    }
}

impl FromIterator<Span> for Span {
    fn from_iter<I: IntoIterator<Item = Span>>(iter: I) -> Self {
        Span::container(iter)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentSpan {
    text: String,
    length: usize,
}

impl ContentSpan {
    pub fn new(text: impl AsRef<str>) -> Self {
        let text: String = text.as_ref().nfc().collect();
        let length = display_width(&text);
        Self { text, length }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn content_length(&self) -> usize {
        self.length
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ContainerSpan {
    children: Vec<Span>,
    length: usize,
}

impl ContainerSpan {
    pub fn new<I: IntoIterator<Item = Span>>(children: I) -> Self {
        let children: Vec<Span> = children.into_iter().collect();
        let length = children.iter().map(Span::content_length).sum();
        Self { children, length }
    }

    pub fn children(&self) -> &[Span] {
        &self.children
    }

    pub fn content_length(&self) -> usize {
        self.length
    }

    /// Returns a new container with `span` appended; the receiver is unchanged.
    pub fn with(&self, span: Span) -> Self {
        let mut children = self.children.clone();
        children.push(span);
        Self::new(children)
    }
}

impl Extend<Span> for ContainerSpan {
    fn extend<I: IntoIterator<Item = Span>>(&mut self, iter: I) {
        for span in iter {
            self.length += span.content_length();
            self.children.push(span);
        }
    }
}

impl FromIterator<Span> for ContainerSpan {
    fn from_iter<I: IntoIterator<Item = Span>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Zero-width formatting instructions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlSpan {
    Color(ColorSpan),
    Style(StyleSpan),
    Code(AnsiControlCode),
    Cursor(CursorControl),
}

impl ControlSpan {
    pub fn code(&self) -> &AnsiControlCode {
        static HIDE: AnsiControlCode = ansi::cursor::HIDE;
        static SHOW: AnsiControlCode = ansi::cursor::SHOW;
        match self {
            ControlSpan::Color(c) => c.code(),
            ControlSpan::Style(s) => s.code(),
            ControlSpan::Code(code) => code,
            ControlSpan::Cursor(CursorControl::Hide) => &HIDE,
            ControlSpan::Cursor(CursorControl::Show) => &SHOW,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CursorControl {
    Hide,
    Show,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorChannel {
    Foreground,
    Background,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorSpan {
    name: Cow<'static, str>,
    channel: ColorChannel,
    code: AnsiControlCode,
}

/// Console color names understood by every output mode, paired with their
/// foreground / background sequences.
pub const COLOR_NAMES: &[(&str, AnsiControlCode, AnsiControlCode)] = &[
    ("black", fg::BLACK, bg::BLACK),
    ("red", fg::RED, bg::RED),
    ("green", fg::GREEN, bg::GREEN),
    ("yellow", fg::YELLOW, bg::YELLOW),
    ("blue", fg::BLUE, bg::BLUE),
    ("magenta", fg::MAGENTA, bg::MAGENTA),
    ("cyan", fg::CYAN, bg::CYAN),
    ("white", fg::WHITE, bg::WHITE),
    ("darkgray", fg::DARK_GRAY, bg::DARK_GRAY),
    ("lightred", fg::LIGHT_RED, bg::LIGHT_RED),
    ("lightgreen", fg::LIGHT_GREEN, bg::LIGHT_GREEN),
    ("lightyellow", fg::LIGHT_YELLOW, bg::LIGHT_YELLOW),
    ("lightblue", fg::LIGHT_BLUE, bg::LIGHT_BLUE),
    ("lightmagenta", fg::LIGHT_MAGENTA, bg::LIGHT_MAGENTA),
    ("lightcyan", fg::LIGHT_CYAN, bg::LIGHT_CYAN),
    ("lightgray", fg::LIGHT_GRAY, bg::LIGHT_GRAY),
    ("reset", fg::DEFAULT, bg::DEFAULT),
];

impl ColorSpan {
    pub fn new(name: impl Into<Cow<'static, str>>, channel: ColorChannel, code: AnsiControlCode) -> Self {
        Self {
            name: name.into(),
            channel,
            code,
        }
    }

    /// Named console color. Unknown names keep their name but carry the
    /// channel's default sequence.
    pub fn foreground(name: &str) -> Self {
        Self::named(name, ColorChannel::Foreground)
    }

    pub fn background(name: &str) -> Self {
        Self::named(name, ColorChannel::Background)
    }

    pub fn reset(channel: ColorChannel) -> Self {
        Self::named("reset", channel)
    }

    pub fn rgb(r: u8, g: u8, b: u8, channel: ColorChannel) -> Self {
        let selector = match channel {
            ColorChannel::Foreground => 38,
            ColorChannel::Background => 48,
        };
        Self {
            name: Cow::Owned(format!("rgb({r},{g},{b})")),
            channel,
            code: AnsiControlCode::new(format!("\x1b[{selector};2;{r};{g};{b}m")),
        }
    }

    fn named(name: &str, channel: ColorChannel) -> Self {
        let key = name.to_ascii_lowercase();
        let code = COLOR_NAMES
            .iter()
            .find(|(n, _, _)| *n == key)
            .map(|(_, fg, bg)| match channel {
                ColorChannel::Foreground => fg.clone(),
                ColorChannel::Background => bg.clone(),
            })
            .unwrap_or(match channel {
                ColorChannel::Foreground => fg::DEFAULT,
                ColorChannel::Background => bg::DEFAULT,
            });
        Self {
            name: Cow::Owned(key),
            channel,
            code,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channel(&self) -> ColorChannel {
        self.channel
    }

    pub fn code(&self) -> &AnsiControlCode {
        &self.code
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleSpan {
    name: Cow<'static, str>,
    code: AnsiControlCode,
}

macro_rules! style_constructors {
    ($($fn_name:ident => $name:literal, $code:path;)*) => {
        impl StyleSpan {
            $(
                pub fn $fn_name() -> Self {
                    Self { name: Cow::Borrowed($name), code: $code }
                }
            )*
        }
    };
}

style_constructors! {
    attributes_off => "attributes_off", ansi::text::ATTRIBUTES_OFF;
    bold_on => "bold_on", ansi::text::BOLD_ON;
    bold_off => "bold_off", ansi::text::BOLD_OFF;
    dim_on => "dim_on", ansi::text::DIM_ON;
    italic_on => "italic_on", ansi::text::ITALIC_ON;
    italic_off => "italic_off", ansi::text::ITALIC_OFF;
    underline_on => "underline_on", ansi::text::UNDERLINE_ON;
    underline_off => "underline_off", ansi::text::UNDERLINE_OFF;
    blink_on => "blink_on", ansi::text::BLINK_ON;
    blink_off => "blink_off", ansi::text::BLINK_OFF;
    reverse_on => "reverse_on", ansi::text::REVERSE_ON;
    reverse_off => "reverse_off", ansi::text::REVERSE_OFF;
    hidden_on => "hidden_on", ansi::text::HIDDEN_ON;
    hidden_off => "hidden_off", ansi::text::HIDDEN_OFF;
}

impl StyleSpan {
    pub fn new(name: impl Into<Cow<'static, str>>, code: AnsiControlCode) -> Self {
        Self {
            name: name.into(),
            code,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &AnsiControlCode {
        &self.code
    }
}
