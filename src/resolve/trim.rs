//! Legacy whitespace trim.
//!
//! Strips the script whitespace and line-terminator set (tab, LF, VT, FF,
//! CR, the `Zs` space separators, U+2028, U+2029) plus U+00A0 and U+FEFF
//! from both ends, the pattern old browsers needed in place of a native
//! trim. U+0085 is kept, unlike with `str::trim` or the regex `\s` class.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static EDGE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[\t\n\x0B\x0C\r\p{Zs}\x{2028}\x{2029}\x{FEFF}\x{A0}]+",
        r"|[\t\n\x0B\x0C\r\p{Zs}\x{2028}\x{2029}\x{FEFF}\x{A0}]+$",
    ))
    .expect("trim pattern is valid")
});

/// Remove leading and trailing whitespace-class characters.
pub fn trim_edges(value: &str) -> Cow<'_, str> {
    EDGE_WHITESPACE.replace_all(value, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_ascii_whitespace() {
        assert_eq!(trim_edges("  a b \t\n"), "a b");
        assert_eq!(trim_edges("\r\nline\x0c"), "line");
    }

    #[test]
    fn strips_nbsp_and_bom() {
        assert_eq!(trim_edges("\u{FEFF}\u{A0}value\u{A0}"), "value");
        assert_eq!(trim_edges("\u{3000}wide\u{2003}"), "wide");
    }

    #[test]
    fn strips_line_separators() {
        assert_eq!(trim_edges("\u{2028}x\u{2029}\x0b"), "x");
    }

    #[test]
    fn keeps_next_line_character() {
        assert_eq!(trim_edges("\u{85}x\u{85}"), "\u{85}x\u{85}");
        assert_eq!(trim_edges(" \u{85} "), "\u{85}");
    }

    #[test]
    fn keeps_inner_whitespace() {
        assert_eq!(trim_edges("a \u{A0} b"), "a \u{A0} b");
    }

    #[test]
    fn all_whitespace_becomes_empty() {
        assert_eq!(trim_edges(" \u{A0}\u{FEFF}\t"), "");
        assert_eq!(trim_edges(""), "");
    }

    #[test]
    fn untouched_input_is_borrowed() {
        assert!(matches!(trim_edges("clean"), Cow::Borrowed("clean")));
    }
}
