//! Character-level predicates shared by the lexical layer and the emitters.

use std::fmt::Write;

/// Characters that may follow a backslash inside `PN_LOCAL`.
pub const PN_LOCAL_ESCAPABLE: &str = "_~.-!$&'()*+,;=/?#@%";

/// Checks if `c` may be escaped with a backslash inside a local name.
#[inline]
pub fn is_local_escapable(c: char) -> bool {
    PN_LOCAL_ESCAPABLE.contains(c)
}

/// Checks if `c` must not occur inside an IRI reference, neither raw nor
/// produced by a numeric escape.
#[inline]
pub fn is_forbidden_in_iriref(c: char) -> bool {
    c <= '\u{20}' || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\')
}

/// Checks if `v` is a UTF-16 high surrogate.
#[inline]
pub fn is_high_surrogate(v: u32) -> bool {
    (0xD800..=0xDBFF).contains(&v)
}

/// Checks if `v` is a UTF-16 low surrogate.
#[inline]
pub fn is_low_surrogate(v: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&v)
}

/// Combines a surrogate pair into the code point it denotes.
///
/// Both halves must be in their respective range.
#[inline]
pub fn combine_surrogates(high: u32, low: u32) -> u32 {
    0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
}

/// Where a decoded code point is re-emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeContext {
    /// Between the quotes of a string literal.
    StringLiteral,
    /// Between the angle brackets of an IRI reference.
    IriRef,
}

/// Appends `c` to `buf` in the canonical form of the given context.
///
/// String context uses the `ECHAR` escapes, so a double quote becomes `\"`.
/// IRI context falls back to numeric escapes, so the same code point becomes
/// `"` there.
pub fn push_code_point(buf: &mut String, c: char, ctx: EscapeContext) {
    match ctx {
        EscapeContext::StringLiteral => match c {
            '\u{08}' => buf.push_str("\\b"),
            '\t' => buf.push_str("\\t"),
            '\n' => buf.push_str("\\n"),
            '\u{0C}' => buf.push_str("\\f"),
            '\r' => buf.push_str("\\r"),
            '"' => buf.push_str("\\\""),
            '\\' => buf.push_str("\\\\"),
            _ => buf.push(c),
        },
        EscapeContext::IriRef => {
            if is_forbidden_in_iriref(c) {
                // cannot fail when writing into a String
                let _ = write!(buf, "\\u{:04X}", u32::from(c));
            } else {
                buf.push(c);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test_case('\u{00}' => true ; "null")]
    #[test_case(' ' => true ; "space")]
    #[test_case('"' => true ; "quote")]
    #[test_case('\\' => true ; "backslash")]
    #[test_case('`' => true ; "back tick")]
    #[test_case('a' => false ; "alpha")]
    #[test_case('%' => false ; "percent")]
    #[test_case('é' => false ; "latin small e acute")]
    fn check_forbidden_in_iriref(c: char) -> bool {
        is_forbidden_in_iriref(c)
    }

    #[test_case('~' => true ; "tilde")]
    #[test_case('%' => true ; "percent")]
    #[test_case('.' => true ; "dot")]
    #[test_case('a' => false ; "alpha")]
    #[test_case('"' => false ; "quote")]
    fn check_local_escapable(c: char) -> bool {
        is_local_escapable(c)
    }

    #[test_case(0xD800 => true ; "high start")]
    #[test_case(0xDBFF => true ; "high end")]
    #[test_case(0xDC00 => false ; "low start")]
    #[test_case(0x0041 => false ; "latin a")]
    fn check_high_surrogate(v: u32) -> bool {
        is_high_surrogate(v)
    }

    #[test]
    fn check_combine_surrogates() {
        // U+1F600
        assert_eq!(0x1F600, combine_surrogates(0xD83D, 0xDE00));
        // first supplementary code point
        assert_eq!(0x10000, combine_surrogates(0xD800, 0xDC00));
    }

    #[test_case('"', EscapeContext::StringLiteral => "\\\"" ; "quote in string")]
    #[test_case('"', EscapeContext::IriRef => "\\u0022" ; "quote in iri")]
    #[test_case('\n', EscapeContext::StringLiteral => "\\n" ; "newline in string")]
    #[test_case('\t', EscapeContext::StringLiteral => "\\t" ; "tab in string")]
    #[test_case('\'', EscapeContext::StringLiteral => "'" ; "single quote raw")]
    #[test_case('é', EscapeContext::StringLiteral => "é" ; "non ascii raw in string")]
    #[test_case('é', EscapeContext::IriRef => "é" ; "non ascii raw in iri")]
    fn check_push_code_point(c: char, ctx: EscapeContext) -> String {
        let mut buf = String::new();
        push_code_point(&mut buf, c, ctx);
        buf
    }
}
