//! Interpolated templates: a format string plus ordered arguments.
//!
//! Placeholder grammar (a subset of `std::fmt`):
//!
//! ```text
//! {}            next positional argument
//! {N}           explicit argument index
//! {N:spec}      with a format spec
//! {{ / }}       literal braces
//! spec := [[fill]align][+][#][0][width][.precision][type]
//! align := '<' | '>' | '^'      type := 'x' | 'X' | 'o' | 'b' | 'e'
//! ```
//!
//! Templates keep literal text and arguments apart so the formatter can turn
//! each argument into its own span instead of flattening everything into one
//! string.

use crate::span::Span;
use crate::width::display_width;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unclosed placeholder starting at byte {offset}")]
    UnclosedPlaceholder { offset: usize },
    #[error("unmatched '}}' at byte {offset}")]
    UnmatchedBrace { offset: usize },
    #[error("invalid argument index {text:?}")]
    InvalidIndex { text: String },
    #[error("argument {index} out of range ({count} arguments supplied)")]
    ArgumentOutOfRange { index: usize, count: usize },
    #[error("invalid format spec {spec:?}")]
    InvalidSpec { spec: String },
    #[error("format spec {spec:?} not supported for argument {index}")]
    UnsupportedSpec { index: usize, spec: String },
}

/// One template argument.
#[derive(Clone)]
pub enum TemplateArg {
    Span(Span),
    Str(String),
    Int(i128),
    Float(f64),
    Bool(bool),
    Char(char),
    /// Arbitrary value; a formatter registered for its type wins over `display`.
    Custom {
        value: Arc<dyn Any + Send + Sync>,
        type_id: TypeId,
        display: String,
    },
}

impl TemplateArg {
    pub fn custom<T: Any + fmt::Display + Send + Sync>(value: T) -> Self {
        let display = value.to_string();
        TemplateArg::Custom {
            value: Arc::new(value),
            type_id: TypeId::of::<T>(),
            display,
        }
    }
}

impl fmt::Debug for TemplateArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateArg::Span(s) => f.debug_tuple("Span").field(s).finish(),
            TemplateArg::Str(s) => f.debug_tuple("Str").field(s).finish(),
            TemplateArg::Int(n) => f.debug_tuple("Int").field(n).finish(),
            TemplateArg::Float(n) => f.debug_tuple("Float").field(n).finish(),
            TemplateArg::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            TemplateArg::Char(c) => f.debug_tuple("Char").field(c).finish(),
            TemplateArg::Custom { display, .. } => f.debug_tuple("Custom").field(display).finish(),
        }
    }
}

impl From<Span> for TemplateArg {
    fn from(span: Span) -> Self {
        TemplateArg::Span(span)
    }
}

impl From<&str> for TemplateArg {
    fn from(s: &str) -> Self {
        TemplateArg::Str(s.to_string())
    }
}

impl From<String> for TemplateArg {
    fn from(s: String) -> Self {
        TemplateArg::Str(s)
    }
}

impl From<&String> for TemplateArg {
    fn from(s: &String) -> Self {
        TemplateArg::Str(s.clone())
    }
}

impl From<bool> for TemplateArg {
    fn from(b: bool) -> Self {
        TemplateArg::Bool(b)
    }
}

impl From<char> for TemplateArg {
    fn from(c: char) -> Self {
        TemplateArg::Char(c)
    }
}

impl From<f32> for TemplateArg {
    fn from(n: f32) -> Self {
        TemplateArg::Float(n as f64)
    }
}

impl From<f64> for TemplateArg {
    fn from(n: f64) -> Self {
        TemplateArg::Float(n)
    }
}

macro_rules! int_args {
    ($($t:ty),*) => {
        $(impl From<$t> for TemplateArg {
            fn from(n: $t) -> Self {
                TemplateArg::Int(n as i128)
            }
        })*
    };
}

int_args!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

#[derive(Clone, Debug)]
pub struct Template {
    format: String,
    args: Vec<TemplateArg>,
}

impl Template {
    pub fn new(format: impl Into<String>, args: Vec<TemplateArg>) -> Self {
        Self {
            format: format.into(),
            args,
        }
    }

    pub fn format_str(&self) -> &str {
        &self.format
    }

    pub fn args(&self) -> &[TemplateArg] {
        &self.args
    }

    /// Split into literal and argument pieces, validating indices.
    pub fn pieces(&self) -> Result<Vec<Piece>, TemplateError> {
        let pieces = parse_pieces(&self.format)?;
        for piece in &pieces {
            if let Piece::Arg { index, .. } = piece
                && *index >= self.args.len()
            {
                return Err(TemplateError::ArgumentOutOfRange {
                    index: *index,
                    count: self.args.len(),
                });
            }
        }
        Ok(pieces)
    }
}

/// Build a [`Template`] from a format literal and arguments convertible into
/// [`TemplateArg`].
#[macro_export]
macro_rules! span_template {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::template::Template::new(
            $fmt,
            vec![$($crate::template::TemplateArg::from($arg)),*],
        )
    };
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Piece {
    Literal(String),
    Arg { index: usize, spec: Option<FormatSpec> },
}

fn parse_pieces(format: &str) -> Result<Vec<Piece>, TemplateError> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut next_auto = 0usize;
    let mut chars = format.char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    literal.push('{');
                    continue;
                }
                let mut inner = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    inner.push(c);
                }
                if !closed {
                    return Err(TemplateError::UnclosedPlaceholder { offset });
                }
                let (index_part, spec_part) = match inner.split_once(':') {
                    Some((i, s)) => (i, Some(s)),
                    None => (inner.as_str(), None),
                };
                let index = if index_part.is_empty() {
                    let i = next_auto;
                    next_auto += 1;
                    i
                } else {
                    index_part
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| TemplateError::InvalidIndex {
                            text: index_part.to_string(),
                        })?
                };
                let spec = spec_part.map(FormatSpec::parse).transpose()?;
                if !literal.is_empty() {
                    pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                }
                pieces.push(Piece::Arg { index, spec });
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    literal.push('}');
                } else {
                    return Err(TemplateError::UnmatchedBrace { offset });
                }
            }
            c => literal.push(c),
        }
    }
    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    Ok(pieces)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatKind {
    Display,
    LowerHex,
    UpperHex,
    Octal,
    Binary,
    LowerExp,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatSpec {
    pub raw: String,
    pub fill: char,
    pub align: Option<Align>,
    pub sign_plus: bool,
    pub alternate: bool,
    pub zero_pad: bool,
    pub width: Option<usize>,
    pub precision: Option<usize>,
    pub kind: FormatKind,
}

fn align_of(c: char) -> Option<Align> {
    match c {
        '<' => Some(Align::Left),
        '>' => Some(Align::Right),
        '^' => Some(Align::Center),
        _ => None,
    }
}

impl FormatSpec {
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        let invalid = || TemplateError::InvalidSpec {
            spec: raw.to_string(),
        };
        let chars: Vec<char> = raw.chars().collect();
        let mut spec = FormatSpec {
            raw: raw.to_string(),
            fill: ' ',
            align: None,
            sign_plus: false,
            alternate: false,
            zero_pad: false,
            width: None,
            precision: None,
            kind: FormatKind::Display,
        };
        let mut i = 0usize;
        if chars.len() >= 2
            && let Some(a) = align_of(chars[1])
        {
            spec.fill = chars[0];
            spec.align = Some(a);
            i = 2;
        } else if let Some(a) = chars.first().copied().and_then(align_of) {
            spec.align = Some(a);
            i = 1;
        }
        if chars.get(i) == Some(&'+') {
            spec.sign_plus = true;
            i += 1;
        }
        if chars.get(i) == Some(&'#') {
            spec.alternate = true;
            i += 1;
        }
        if chars.get(i) == Some(&'0') {
            spec.zero_pad = true;
            i += 1;
        }
        let digits = |i: &mut usize| -> Option<usize> {
            let start = *i;
            while chars.get(*i).is_some_and(char::is_ascii_digit) {
                *i += 1;
            }
            if start == *i {
                return None;
            }
            chars[start..*i].iter().collect::<String>().parse().ok()
        };
        spec.width = digits(&mut i);
        if chars.get(i) == Some(&'.') {
            i += 1;
            spec.precision = Some(digits(&mut i).ok_or_else(invalid)?);
        }
        let rest: String = chars[i..].iter().collect();
        spec.kind = match rest.as_str() {
            "" => FormatKind::Display,
            "x" => FormatKind::LowerHex,
            "X" => FormatKind::UpperHex,
            "o" => FormatKind::Octal,
            "b" => FormatKind::Binary,
            "e" => FormatKind::LowerExp,
            _ => return Err(invalid()),
        };
        Ok(spec)
    }

    /// Render a textual argument body with padding applied.
    pub(crate) fn apply(&self, index: usize, arg: &TemplateArg) -> Result<String, TemplateError> {
        let unsupported = || TemplateError::UnsupportedSpec {
            index,
            spec: self.raw.clone(),
        };
        let text = match arg {
            TemplateArg::Int(n) => return Ok(self.pad(self.format_int(*n), true)),
            TemplateArg::Float(n) => {
                let body = self.format_float(*n).ok_or_else(unsupported)?;
                return Ok(self.pad(body, true));
            }
            TemplateArg::Str(s) => s.clone(),
            TemplateArg::Bool(b) => b.to_string(),
            TemplateArg::Char(c) => c.to_string(),
            TemplateArg::Custom { display, .. } => display.clone(),
            TemplateArg::Span(s) => s.to_string(),
        };
        if self.kind != FormatKind::Display {
            return Err(unsupported());
        }
        let text = match self.precision {
            Some(p) => text.chars().take(p).collect(),
            None => text,
        };
        Ok(self.pad(text, false))
    }

    fn format_int(&self, n: i128) -> String {
        let magnitude = n.unsigned_abs();
        let (digits, prefix) = match self.kind {
            FormatKind::Display => (magnitude.to_string(), ""),
            FormatKind::LowerHex => (format!("{magnitude:x}"), "0x"),
            FormatKind::UpperHex => (format!("{magnitude:X}"), "0x"),
            FormatKind::Octal => (format!("{magnitude:o}"), "0o"),
            FormatKind::Binary => (format!("{magnitude:b}"), "0b"),
            FormatKind::LowerExp => (format!("{:e}", n as f64), ""),
        };
        let sign = if n < 0 {
            "-"
        } else if self.sign_plus {
            "+"
        } else {
            ""
        };
        let prefix = if self.alternate { prefix } else { "" };
        self.zero_fill(sign, prefix, digits)
    }

    fn format_float(&self, n: f64) -> Option<String> {
        let magnitude = n.abs();
        let digits = match (self.kind, self.precision) {
            (FormatKind::Display, Some(p)) => format!("{magnitude:.p$}"),
            (FormatKind::Display, None) => magnitude.to_string(),
            (FormatKind::LowerExp, Some(p)) => format!("{magnitude:.p$e}"),
            (FormatKind::LowerExp, None) => format!("{magnitude:e}"),
            _ => return None,
        };
        let sign = if n.is_sign_negative() && n != 0.0 {
            "-"
        } else if self.sign_plus {
            "+"
        } else {
            ""
        };
        Some(self.zero_fill(sign, "", digits))
    }

    fn zero_fill(&self, sign: &str, prefix: &str, digits: String) -> String {
        let head = sign.len() + prefix.len();
        match self.width {
            Some(w) if self.zero_pad && head + digits.len() < w => {
                let zeros = "0".repeat(w - head - digits.len());
                format!("{sign}{prefix}{zeros}{digits}")
            }
            _ => format!("{sign}{prefix}{digits}"),
        }
    }

    fn pad(&self, body: String, numeric: bool) -> String {
        let Some(width) = self.width else {
            return body;
        };
        let len = display_width(&body);
        if len >= width {
            return body;
        }
        let gap = width - len;
        let align = self
            .align
            .unwrap_or(if numeric { Align::Right } else { Align::Left });
        let fill = |n: usize| self.fill.to_string().repeat(n);
        match align {
            Align::Left => format!("{body}{}", fill(gap)),
            Align::Right => format!("{}{body}", fill(gap)),
            Align::Center => format!("{}{body}{}", fill(gap / 2), fill(gap - gap / 2)),
        }
    }

    /// Padding around a span argument: (left, right) fill strings.
    pub(crate) fn span_padding(&self, content_length: usize) -> (String, String) {
        let Some(width) = self.width.filter(|w| *w > content_length) else {
            return (String::new(), String::new());
        };
        let gap = width - content_length;
        let fill = |n: usize| self.fill.to_string().repeat(n);
        match self.align.unwrap_or(Align::Left) {
            Align::Left => (String::new(), fill(gap)),
            Align::Right => (fill(gap), String::new()),
            Align::Center => (fill(gap / 2), fill(gap - gap / 2)),
        }
    }
}
