//! The prolog of prefixes and base typical for Turtle-derived serialization
//! formats.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    /// An absolute URI scheme: `ALPHA *(ALPHA | DIGIT | "+" | "-" | ".") ":"`.
    static ref SCHEME: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").unwrap();
}

/// Checks if `value` begins with an absolute URI scheme.
#[inline]
pub fn has_scheme(value: &str) -> bool {
    SCHEME.is_match(value)
}

/// Checks if `value` needs no base to be meaningful.
#[inline]
fn is_absolute(value: &str) -> bool {
    value.starts_with("//") || has_scheme(value)
}

/// Key under which the base path is stored.
const BASE: &str = "";

/// Prefix table and base path of a document.
///
/// The base path is kept under the empty-string key and follows the same
/// definition rule as any prefix. Redefinition is permitted; lookups always
/// return the latest definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prolog {
    entries: HashMap<String, String>,
}

impl Prolog {
    /// An empty prolog without prefixes or base.
    pub fn new() -> Self {
        Self::default()
    }

    /// A prolog with a pre-set base path.
    pub fn with_base(base: &str) -> Self {
        let mut prolog = Self::default();
        if !base.is_empty() {
            prolog.set_base(base);
        }
        prolog
    }

    /// Defines `label` to expand to `value`.
    ///
    /// Absolute values (scheme or `//` start) are stored as-is. A value
    /// ending in `/` is appended to the previous expansion of the same label
    /// if there is one. Everything else is stored as-is.
    pub fn define(&mut self, label: &str, value: &str) {
        let expansion = if is_absolute(value) {
            value.to_owned()
        } else if value.ends_with('/') {
            match self.entries.get(label) {
                Some(existing) => format!("{}{}", existing, value),
                None => value.to_owned(),
            }
        } else {
            value.to_owned()
        };
        self.entries.insert(label.to_owned(), expansion);
    }

    /// Sets the base path, applying the same rule as [`define`](Self::define).
    pub fn set_base(&mut self, value: &str) {
        self.define(BASE, value);
    }

    /// The current base path. Empty if none was set.
    pub fn base(&self) -> &str {
        self.lookup(BASE).unwrap_or("")
    }

    /// Looks up the expansion of a prefix label.
    pub fn lookup(&self, label: &str) -> Option<&str> {
        self.entries.get(label).map(String::as_str)
    }

    /// Checks if `label` is bound.
    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    /// Resolves an IRI reference against the current base path.
    ///
    /// Absolute references pass through untouched, relative ones are
    /// concatenated to the base.
    pub fn resolve(&self, reference: &str) -> String {
        if is_absolute(reference) {
            reference.to_owned()
        } else {
            format!("{}{}", self.base(), reference)
        }
    }
}
