//! Backslash escaping inside response bodies.
//!
//! Escape pairs are left verbatim while a body is being split so that
//! separators can be found at every level (`;` between entries, `:` between
//! key and value, `,` inside list values). Values are unescaped last.

use crate::error::{Error, Result};

pub const ESCAPE: char = '\\';

/// Characters that carry meaning somewhere in a body.
const SPECIAL: &[char] = &[ESCAPE, ';', ':', ',', '{', '}'];

/// Split `input` at unescaped occurrences of `sep`, returning at most `n`
/// parts. The last part holds the unsplit remainder.
pub fn splitn_unescaped(input: &str, sep: char, n: usize) -> Vec<&str> {
    let mut parts = Vec::new();
    if n == 0 {
        return parts;
    }
    let mut start = 0;
    let mut escaped = false;
    for (idx, ch) in input.char_indices() {
        if parts.len() + 1 == n {
            break;
        }
        if escaped {
            escaped = false;
        } else if ch == ESCAPE {
            escaped = true;
        } else if ch == sep {
            parts.push(&input[start..idx]);
            start = idx + ch.len_utf8();
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Split `input` at every unescaped occurrence of `sep`.
pub fn split_unescaped(input: &str, sep: char) -> Vec<&str> {
    splitn_unescaped(input, sep, usize::MAX)
}

/// Resolve escape pairs.
pub fn unescape(input: &str) -> Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch == ESCAPE {
            match chars.next() {
                Some(next) => out.push(next),
                None => return Err(Error::DanglingEscape),
            }
        } else {
            out.push(ch);
        }
    }
    Ok(out)
}

/// Escape every character that would otherwise be read as structure, plus
/// leading and trailing whitespace so it survives trimming.
pub fn escape(input: &str) -> String {
    let is_space = |c: char| c.is_ascii_whitespace();
    let lead = input.len() - input.trim_start_matches(is_space).len();
    let tail = lead + input.trim_matches(is_space).len();

    let mut out = String::with_capacity(input.len());
    for (idx, ch) in input.char_indices() {
        if SPECIAL.contains(&ch) || idx < lead || idx >= tail {
            out.push(ESCAPE);
        }
        out.push(ch);
    }
    out
}

/// Trim ASCII whitespace without splitting a trailing escape pair.
pub(crate) fn trim_escaped(input: &str) -> &str {
    let start = input.len() - input.trim_start_matches(|c: char| c.is_ascii_whitespace()).len();
    let rest = &input[start..];
    let trimmed = rest.trim_end_matches(|c: char| c.is_ascii_whitespace());
    let trailing_escapes = trimmed.chars().rev().take_while(|&c| c == ESCAPE).count();
    if trailing_escapes % 2 == 1 && trimmed.len() < rest.len() {
        // Keep the whitespace byte the escape applies to.
        &rest[..trimmed.len() + 1]
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_ignores_escaped_separators() {
        assert_eq!(split_unescaped(r"a;b\;c;d", ';'), vec!["a", r"b\;c", "d"]);
        assert_eq!(split_unescaped("", ';'), vec![""]);
        assert_eq!(split_unescaped(r"a\\;b", ';'), vec![r"a\\", "b"]);
    }

    #[test]
    fn test_splitn_keeps_remainder() {
        assert_eq!(splitn_unescaped("a,b,c,d", ',', 3), vec!["a", "b", "c,d"]);
        assert_eq!(splitn_unescaped("a,b", ',', 1), vec!["a,b"]);
        assert!(splitn_unescaped("a,b", ',', 0).is_empty());
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"x\;y\\z").unwrap(), r"x;y\z");
        assert_eq!(unescape(r"abc\").unwrap_err(), Error::DanglingEscape);
    }

    #[test]
    fn test_escape_then_unescape() {
        let raw = r"Font {1}: a;b,c\d";
        assert_eq!(unescape(&escape(raw)).unwrap(), raw);
    }

    #[test]
    fn test_trim_escaped() {
        assert_eq!(trim_escaped("  abc \t"), "abc");
        assert_eq!(trim_escaped(r"abc\  "), r"abc\ ");
        assert_eq!(trim_escaped(r"abc\\  "), r"abc\\");
        assert_eq!(trim_escaped("   "), "");
    }

    #[test]
    fn test_escape_edge_whitespace() {
        assert_eq!(escape(" a b\t"), "\\ a b\\\t");
        assert_eq!(escape("  "), "\\ \\ ");
        assert_eq!(escape("a b"), "a b");
    }
}
