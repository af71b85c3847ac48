//! Structs and types to parse RDF documents.

pub mod error;
mod util;
pub use self::util::*;

pub mod line;
pub mod trig;
pub mod turtle;

use crate::ast::{GraphLabel, Statement};
use crate::parse::error::{locate, Warning};
use crate::prolog::Prolog;
use std::cell::RefCell;
use std::sync::Arc;

/// Statements one top-level parse step expands to, each with the graph it
/// belongs to. Turtle steps yield one entry, a TriG graph block one per
/// contained triples clause.
pub type StatementBatch = Vec<(Option<GraphLabel>, Statement)>;

/// The current context of the parser.
///
/// Owned by the producer. The prefix table and base path live behind an
/// `Arc` so each enqueued statement can carry a snapshot of the resolution
/// state it was parsed under.
#[derive(Debug)]
pub struct Context<'a> {
    /// The whole document; kept to position warnings.
    doc: &'a str,
    /// Name of the input used in diagnostics.
    label: String,
    /// Prefixes and base.
    prolog: Arc<Prolog>,
    /// Warnings gathered since the last drain.
    warnings: Vec<Warning>,
}

impl<'a> Context<'a> {
    /// A new context for one document.
    pub fn new(doc: &'a str, label: &str, base: &str) -> Self {
        Self {
            doc,
            label: label.to_owned(),
            prolog: Arc::new(Prolog::with_base(base)),
            warnings: Vec::new(),
        }
    }

    /// The diagnostic label of the input.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Cheap clone of the current resolution state.
    pub fn snapshot(&self) -> Arc<Prolog> {
        Arc::clone(&self.prolog)
    }

    /// Binds a prefix label, copying the table only if a snapshot still
    /// refers to the old state.
    pub fn define_prefix(&mut self, label: &str, value: &str) {
        Arc::make_mut(&mut self.prolog).define(label, value);
    }

    /// Sets the base path.
    pub fn set_base(&mut self, value: &str) {
        Arc::make_mut(&mut self.prolog).set_base(value);
    }

    /// Checks if a prefix label is bound.
    pub fn has_prefix(&self, label: &str) -> bool {
        self.prolog.contains(label)
    }

    /// Records a PNAME_LN whose namespace has no binding.
    pub fn warn_undefined_prefix(&mut self, at: &'a str, prefix: &str) {
        self.warnings.push(Warning {
            label: self.label.clone(),
            position: locate(self.doc, at),
            message: format!("undefined prefix '{}:' expanded with the empty IRI", prefix),
        });
    }

    /// Hands the gathered warnings to the caller.
    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }
}

/// A context wrapped in a `RefCell`.
///
/// This is necessary due to the constraints of `nom`'s parser generators
/// (they only take `Fn`).
pub type RefContext<'a> = RefCell<Context<'a>>;
