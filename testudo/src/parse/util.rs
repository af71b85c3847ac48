//! Utility to make parsing easier.

use super::error::{PResult, PosError};
use regex::Regex;

/// Tries to capture the given regex at the start of the input.
///
/// On success the input is consumed to the end of the match. On failure the
/// terminal's name is recorded as the expected alternative.
///
/// # Anchoring
///
/// All terminal regexes start with `^`; the parser never skips content.
pub fn parse_regex<'a>(
    re: &'static Regex,
    expected: &'static str,
) -> impl Fn(&'a str) -> PResult<'a, &'a str> {
    move |i: &'a str| match re.find(i) {
        Some(found) if found.start() == 0 => Ok((&i[found.end()..], found.as_str())),
        _ => Err(PosError::err(i, expected)),
    }
}

/// Cuts `margin` characters from both ends of the input.
#[inline]
pub fn unwrap_str(i: &str, margin: usize) -> &str {
    &i[margin..i.len() - margin]
}
