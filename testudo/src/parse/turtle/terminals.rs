//! Parsers for the terminals of Turtle.
//!
//! # Escapes
//!
//! Other than recognition, the terminals for string literals and IRI
//! references normalize their body at once: `ECHAR`s are kept verbatim,
//! `UCHAR`s are decoded (surrogate-pair escapes are combined, `U+0000` is
//! dropped) and re-masked for the emission context, and raw characters that
//! the canonical form escapes are masked as well. The stored body is exactly
//! what the evaluator writes between the delimiters.
//!
//! # Provided
//!
//! Most terminals are regular expressions, composed from the shared
//! character classes below. The escape-resolving ones are `nom` parser
//! functions on top of them.

use crate::ast::TurtleString;
use crate::chars::{self, EscapeContext};
use crate::parse::error::{PResult, PosError};
use crate::parse::util::{parse_regex, unwrap_str};
use lazy_static::lazy_static;
use nom::Err as NErr;
use regex::Regex;
use std::iter::Peekable;
use std::str::CharIndices;

/// `PN_CHARS_BASE` as a character-class body.
const PN_CHARS_BASE_CLASS: &str = r"A-Za-z\u{00C0}-\u{00D6}\u{00D8}-\u{00F6}\u{00F8}-\u{02FF}\u{0370}-\u{037D}\u{037F}-\u{1FFF}\u{200C}-\u{200D}\u{2070}-\u{218F}\u{2C00}-\u{2FEF}\u{3001}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFFD}\u{10000}-\u{EFFFF}";
/// The additions `PN_CHARS` makes on top of `PN_CHARS_U`.
const PN_CHARS_EXTRA: &str = r"\-0-9\u{00B7}\u{0300}-\u{036F}\u{203F}-\u{2040}";
/// `UCHAR` without anchor.
const UCHAR_PAT: &str = r"(\\u[0-9A-Fa-f]{4})|(\\U[0-9A-Fa-f]{8})";
/// `ECHAR` without anchor.
const ECHAR_PAT: &str = r#"\\[tbnrf"'\\]"#;
/// `PERCENT` without anchor.
const PERCENT_PAT: &str = r"%[0-9A-Fa-f]{2}";
/// `PN_LOCAL_ESC` without anchor.
const PN_LOCAL_ESC_PAT: &str = r#"\\[\-_~\.!\$&'\(\)\*\+,;=/\?#@%]"#;

lazy_static! {
    /// `PN_CHARS_U` as a character-class body.
    static ref PN_CHARS_U_CLASS: String = format!("_{}", PN_CHARS_BASE_CLASS);
    /// `PN_CHARS` as a character-class body.
    static ref PN_CHARS_CLASS: String = format!("{}{}", PN_CHARS_EXTRA, *PN_CHARS_U_CLASS);
    /// `PN_PREFIX` without anchor. The optional tail must end with a
    /// non-dot name character, encoding the dot-not-last rule.
    static ref PN_PREFIX_PAT: String = format!(
        "[{0}]([{1}.]*[{1}])?",
        PN_CHARS_BASE_CLASS, *PN_CHARS_CLASS
    );
    /// `PLX` without anchor.
    static ref PLX_PAT: String = format!("({})|({})", PERCENT_PAT, PN_LOCAL_ESC_PAT);

    /// Production of PN_CHARS_BASE according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref PN_CHARS_BASE: Regex =
        Regex::new(&format!("^[{}]", PN_CHARS_BASE_CLASS)).unwrap();
    /// Production of PN_CHARS_U according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref PN_CHARS_U: Regex =
        Regex::new(&format!("^[{}]", *PN_CHARS_U_CLASS)).unwrap();
    /// Production of PN_CHARS according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref PN_CHARS: Regex = Regex::new(&format!("^[{}]", *PN_CHARS_CLASS)).unwrap();
    /// Production of PN_PREFIX according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref PN_PREFIX: Regex = Regex::new(&format!("^{}", *PN_PREFIX_PAT)).unwrap();
    /// Production of PNAME_NS according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref PNAME_NS: Regex = Regex::new(&format!("^({})?:", *PN_PREFIX_PAT)).unwrap();
    /// Production of PN_LOCAL according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref PN_LOCAL: Regex = Regex::new(&format!(
        "^([{0}:0-9]|{2})(([{1}.:]|{2})*([{1}:]|{2}))?",
        *PN_CHARS_U_CLASS, *PN_CHARS_CLASS, *PLX_PAT
    ))
    .unwrap();
    /// Production of BLANK_NODE_LABEL according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref BLANK_NODE_LABEL: Regex = Regex::new(&format!(
        "^_:[{0}0-9]([{1}.]*[{1}])?",
        *PN_CHARS_U_CLASS, *PN_CHARS_CLASS
    ))
    .unwrap();

    /// Production of IRIREF according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref IRIREF: Regex = Regex::new(
        r#"^<([^\u{00}-\u{20}<>"\{\}\|\^`\\]|(\\u[0-9A-Fa-f]{4})|(\\U[0-9A-Fa-f]{8}))*>"#
    )
    .unwrap();

    /// Production of LANGTAG according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref LANGTAG: Regex = Regex::new(r"^@[A-Za-z]+(-[A-Za-z0-9]+)*").unwrap();
    /// Production of INTEGER according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref INTEGER: Regex = Regex::new(r"^[+-]?[0-9]+").unwrap();
    /// Production of DECIMAL according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref DECIMAL: Regex = Regex::new(r"^[+-]?[0-9]*\.[0-9]+").unwrap();
    /// Production of DOUBLE according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref DOUBLE: Regex = Regex::new(
        r"^[+-]?(([0-9]+\.[0-9]*[eE][+-]?[0-9]+)|(\.[0-9]+[eE][+-]?[0-9]+)|([0-9]+[eE][+-]?[0-9]+))"
    )
    .unwrap();
    /// Production of EXPONENT according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref EXPONENT: Regex = Regex::new(r"^[eE][+-]?[0-9]+").unwrap();

    /// Production of STRING_LITERAL_QUOTE according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref STRING_LITERAL_QUOTE: Regex = Regex::new(&format!(
        r#"^"([^\u{{22}}\u{{5C}}\u{{0A}}\u{{0D}}]|({})|({}))*""#,
        ECHAR_PAT, UCHAR_PAT
    ))
    .unwrap();
    /// Production of STRING_LITERAL_SINGLE_QUOTE according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref STRING_LITERAL_SINGLE_QUOTE: Regex = Regex::new(&format!(
        r#"^'([^\u{{27}}\u{{5C}}\u{{0A}}\u{{0D}}]|({})|({}))*'"#,
        ECHAR_PAT, UCHAR_PAT
    ))
    .unwrap();
    /// Production of STRING_LITERAL_LONG_QUOTE according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref STRING_LITERAL_LONG_QUOTE: Regex = Regex::new(&format!(
        r#"^"""(("|"")?([^"\\]|({})|({})))*""""#,
        ECHAR_PAT, UCHAR_PAT
    ))
    .unwrap();
    /// Production of STRING_LITERAL_LONG_SINGLE_QUOTE according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref STRING_LITERAL_LONG_SINGLE_QUOTE: Regex = Regex::new(&format!(
        r#"^'''(('|'')?([^'\\]|({})|({})))*'''"#,
        ECHAR_PAT, UCHAR_PAT
    ))
    .unwrap();

    /// Production of UCHAR according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref UCHAR: Regex = Regex::new(&format!("^({})", UCHAR_PAT)).unwrap();
    /// Production of ECHAR according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref ECHAR: Regex = Regex::new(&format!("^({})", ECHAR_PAT)).unwrap();
    /// Production of PERCENT according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref PERCENT: Regex = Regex::new(&format!("^({})", PERCENT_PAT)).unwrap();
    /// Production of PN_LOCAL_ESC according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref PN_LOCAL_ESC: Regex = Regex::new(&format!("^({})", PN_LOCAL_ESC_PAT)).unwrap();
    /// Production of HEX according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref HEX: Regex = Regex::new(r"^[0-9A-Fa-f]").unwrap();
    /// Production of PLX according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref PLX: Regex = Regex::new(&format!("^({})", *PLX_PAT)).unwrap();

    /// Production of ANON according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref ANON: Regex = Regex::new(r"^\[[ \t\r\n]*\]").unwrap();
    /// A comment from `#` to the end of the line.
    pub static ref COMMENT: Regex = Regex::new(r"^#[^\r\n]*").unwrap();
    /// One or more whitespaces or comments.
    pub static ref WS_MANY1: Regex = Regex::new(r"^([ \t\r\n]|#[^\r\n]*)+").unwrap();
    /// Zero or more whitespaces or comments.
    pub static ref WS_MANY0: Regex = Regex::new(r"^([ \t\r\n]|#[^\r\n]*)*").unwrap();
    /// Zero or more whitespaces, comments excluded. Used between statements
    /// where a comment is a syntax node of its own.
    pub static ref BLANK0: Regex = Regex::new(r"^[ \t\r\n]*").unwrap();
}

/// Parses at least one whitespace (including comments).
pub fn multispace1(i: &str) -> PResult<&str> {
    parse_regex(&WS_MANY1, "whitespace")(i)
}

/// Parses zero or more whitespaces (including comments).
pub fn multispace0(i: &str) -> PResult<&str> {
    parse_regex(&WS_MANY0, "whitespace")(i)
}

/// Parses zero or more whitespaces, leaving comments alone.
pub fn blank0(i: &str) -> PResult<&str> {
    parse_regex(&BLANK0, "whitespace")(i)
}

/// Parses a comment up to the end of the line, keeping the `#`.
pub fn comment(i: &str) -> PResult<&str> {
    parse_regex(&COMMENT, "comment")(i)
}

/// Parses Turtle's rule
/// [139s] PNAME_NS ::= PN_PREFIX? ':'
///
/// Returns the prefix label without the trailing colon.
pub fn pname_ns(i: &str) -> PResult<&str> {
    let (rest, token) = parse_regex(&PNAME_NS, "PNAME_NS")(i)?;
    Ok((rest, &token[..token.len() - 1]))
}

/// Parses Turtle's rule
/// [168s] PN_LOCAL ::= (PN_CHARS_U | ':' | [0-9] | PLX) ((PN_CHARS | '.' | ':' | PLX)* (PN_CHARS | ':' | PLX))?
pub fn pn_local(i: &str) -> PResult<&str> {
    parse_regex(&PN_LOCAL, "PN_LOCAL")(i)
}

/// Parses Turtle's rule
/// [141s] BLANK_NODE_LABEL ::= '_:' (PN_CHARS_U | [0-9]) ((PN_CHARS | '.')* PN_CHARS)?
///
/// Returns the label without the leading `_:`.
pub fn blank_node_label(i: &str) -> PResult<&str> {
    let (rest, token) = parse_regex(&BLANK_NODE_LABEL, "BLANK_NODE_LABEL")(i)?;
    Ok((rest, &token[2..]))
}

/// Parses Turtle's rule
/// [144s] LANGTAG ::= '@' [a-zA-Z]+ ('-' [a-zA-Z0-9]+)*
///
/// Returns the tag without the leading `@`.
pub fn langtag(i: &str) -> PResult<&str> {
    let (rest, token) = parse_regex(&LANGTAG, "LANGTAG")(i)?;
    Ok((rest, &token[1..]))
}

/// Parses Turtle's rule
/// [162s] ANON ::= '[' WS* ']'
pub fn anon(i: &str) -> PResult<&str> {
    parse_regex(&ANON, "ANON")(i)
}

/// Parses Turtle's rule
/// [18] IRIREF ::= '<' ([^#x00-#x20<>"{}|^`\] | UCHAR)* '>'
///
/// Returns the unescaped body. A UCHAR decoding into the forbidden set is
/// an unrecoverable failure at the escape's position.
pub fn iriref(i: &str) -> PResult<String> {
    let (rest, token) = parse_regex(&IRIREF, "IRIREF")(i)?;
    let body = unescape_iri_body(i, unwrap_str(token, 1))?;
    Ok((rest, body))
}

/// Parses Turtle's rule
/// [17] String ::= STRING_LITERAL_LONG_QUOTE | STRING_LITERAL_LONG_SINGLE_QUOTE
///                 | STRING_LITERAL_QUOTE | STRING_LITERAL_SINGLE_QUOTE
///
/// The long forms are tried first; a short-form match would otherwise eat
/// the empty string in front of a long delimiter.
pub fn string(i: &str) -> PResult<TurtleString> {
    if let Ok((rest, token)) = parse_regex(&STRING_LITERAL_LONG_QUOTE, "String")(i) {
        let body = unescape_string_body(i, unwrap_str(token, 3), 3)?;
        return Ok((rest, TurtleString::LongQuote(body)));
    }
    if let Ok((rest, token)) = parse_regex(&STRING_LITERAL_LONG_SINGLE_QUOTE, "String")(i) {
        let body = unescape_string_body(i, unwrap_str(token, 3), 3)?;
        return Ok((rest, TurtleString::LongSingleQuote(body)));
    }
    if let Ok((rest, token)) = parse_regex(&STRING_LITERAL_QUOTE, "String")(i) {
        let body = unescape_string_body(i, unwrap_str(token, 1), 1)?;
        return Ok((rest, TurtleString::Quote(body)));
    }
    if let Ok((rest, token)) = parse_regex(&STRING_LITERAL_SINGLE_QUOTE, "String")(i) {
        let body = unescape_string_body(i, unwrap_str(token, 1), 1)?;
        return Ok((rest, TurtleString::SingleQuote(body)));
    }
    Err(NErr::Error(PosError::expected(i, "String")))
}

/// Parses N-Triples' restricted literal string, double quotes only.
pub fn string_literal_quote(i: &str) -> PResult<TurtleString> {
    let (rest, token) = parse_regex(&STRING_LITERAL_QUOTE, "STRING_LITERAL_QUOTE")(i)?;
    let body = unescape_string_body(i, unwrap_str(token, 1), 1)?;
    Ok((rest, TurtleString::Quote(body)))
}

/// Consumes `n` hex digits from the walker.
fn take_hex(iter: &mut Peekable<CharIndices>, n: u32) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..n {
        let (_, c) = iter.next()?;
        value = (value << 4) | c.to_digit(16)?;
    }
    Some(value)
}

/// Consumes a `\uXXXX` escape holding a low surrogate.
fn take_low_surrogate(iter: &mut Peekable<CharIndices>) -> Option<u32> {
    match iter.peek() {
        Some((_, '\\')) => {
            iter.next();
        }
        _ => return None,
    }
    match iter.next() {
        Some((_, 'u')) => {}
        _ => return None,
    }
    let v = take_hex(iter, 4)?;
    chars::is_low_surrogate(v).then(|| v)
}

/// Unescapes the body of a string literal into its canonical form.
///
/// `token_at` is the input slice the token was recognized at and `margin`
/// the width of the opening delimiter; both are only needed to position
/// escape errors.
fn unescape_string_body<'a>(
    token_at: &'a str,
    raw: &str,
    margin: usize,
) -> Result<String, NErr<PosError<'a>>> {
    let mut out = String::with_capacity(raw.len());
    let mut iter = raw.char_indices().peekable();
    while let Some((idx, c)) = iter.next() {
        if c != '\\' {
            chars::push_code_point(&mut out, c, EscapeContext::StringLiteral);
            continue;
        }
        let at = &token_at[margin + idx..];
        match iter.next() {
            Some((_, e @ ('t' | 'b' | 'n' | 'r' | 'f' | '"' | '\'' | '\\'))) => {
                out.push('\\');
                out.push(e);
            }
            Some((_, 'u')) => {
                let v = take_hex(&mut iter, 4)
                    .ok_or_else(|| PosError::failure(at, "four hex digits after \\u"))?;
                let cp = resolve_surrogates(v, &mut iter)
                    .ok_or_else(|| PosError::failure(at, "a UCHAR surrogate pair"))?;
                push_decoded(&mut out, cp, EscapeContext::StringLiteral, at)?;
            }
            Some((_, 'U')) => {
                let v = take_hex(&mut iter, 8)
                    .ok_or_else(|| PosError::failure(at, "eight hex digits after \\U"))?;
                push_decoded(&mut out, v, EscapeContext::StringLiteral, at)?;
            }
            _ => return Err(PosError::failure(at, "ECHAR or UCHAR")),
        }
    }
    Ok(out)
}

/// Unescapes the body of an IRI reference.
///
/// Raw characters were already vetted by the recognizer; decoded UCHARs are
/// checked against the forbidden set here.
fn unescape_iri_body<'a>(token_at: &'a str, raw: &str) -> Result<String, NErr<PosError<'a>>> {
    let mut out = String::with_capacity(raw.len());
    let mut iter = raw.char_indices().peekable();
    while let Some((idx, c)) = iter.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let at = &token_at[1 + idx..];
        let v = match iter.next() {
            Some((_, 'u')) => take_hex(&mut iter, 4)
                .ok_or_else(|| PosError::failure(at, "four hex digits after \\u"))?,
            Some((_, 'U')) => take_hex(&mut iter, 8)
                .ok_or_else(|| PosError::failure(at, "eight hex digits after \\U"))?,
            _ => return Err(PosError::failure(at, "UCHAR")),
        };
        let cp = if v <= 0xFFFF {
            resolve_surrogates(v, &mut iter)
                .ok_or_else(|| PosError::failure(at, "a UCHAR surrogate pair"))?
        } else {
            v
        };
        match char::from_u32(cp) {
            Some(decoded) if !chars::is_forbidden_in_iriref(decoded) => {
                chars::push_code_point(&mut out, decoded, EscapeContext::IriRef);
            }
            _ => {
                return Err(PosError::failure(
                    at,
                    "a UCHAR outside the forbidden IRIREF characters",
                ))
            }
        }
    }
    Ok(out)
}

/// Combines a high-surrogate escape with its low half, passes everything
/// else through. `None` marks a lone surrogate.
fn resolve_surrogates(v: u32, iter: &mut Peekable<CharIndices>) -> Option<u32> {
    if chars::is_high_surrogate(v) {
        let low = take_low_surrogate(iter)?;
        Some(chars::combine_surrogates(v, low))
    } else if chars::is_low_surrogate(v) {
        None
    } else {
        Some(v)
    }
}

/// Appends a decoded code point in its canonical form. `U+0000` is dropped.
fn push_decoded<'a>(
    out: &mut String,
    cp: u32,
    ctx: EscapeContext,
    at: &'a str,
) -> Result<(), NErr<PosError<'a>>> {
    if cp == 0 {
        return Ok(());
    }
    match char::from_u32(cp) {
        Some(c) => {
            chars::push_code_point(out, c, ctx);
            Ok(())
        }
        None => Err(PosError::failure(at, "a Unicode scalar value")),
    }
}
