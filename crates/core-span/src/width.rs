//! Display width helpers shared by span length, wrapping and truncation.
//!
//! All width decisions flow through [`grapheme_width`] so that the measuring
//! and rendering passes can never disagree on how wide a piece of text is.
//! Control characters (including `\n` and `\r`) are zero width.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Terminal column width of a single grapheme cluster.
pub fn grapheme_width(g: &str) -> usize {
    if g.chars().all(char::is_control) {
        return 0;
    }
    UnicodeWidthStr::width(g)
}

/// Terminal column width of an arbitrary string.
pub fn display_width(s: &str) -> usize {
    if s.is_ascii() {
        return s.bytes().filter(|b| !b.is_ascii_control()).count();
    }
    s.graphemes(true).map(grapheme_width).sum()
}

/// Longest prefix of `s` whose width does not exceed `max`, never splitting a
/// grapheme cluster. Returns the prefix and its width.
pub fn truncate_to_width(s: &str, max: usize) -> (&str, usize) {
    let mut width = 0usize;
    let mut end = 0usize;
    for (idx, g) in s.grapheme_indices(true) {
        let w = grapheme_width(g);
        if width + w > max {
            break;
        }
        width += w;
        end = idx + g.len();
    }
    (&s[..end], width)
}
