#![deny(missing_docs)]

//! # Testudo
//!
//! Parser for the RDF 1.1 Turtle family of serializations — Turtle, TriG,
//! N-Triples and N-Quads — emitting the statements in canonical N-Triples
//! (respectively N-Quads) form, one per line, or validating only.
//!
//! The four dialects share one lexical core. Parsing and evaluation are
//! decoupled by a small statement [`pipeline`]: the parser enqueues each
//! recognized statement together with a snapshot of the prefix table, a
//! single worker thread expands the shorthands and writes the canonical
//! lines in source order.

pub mod ast;
pub mod chars;
pub mod error;
pub mod eval;
pub mod ns;
pub mod parse;
pub mod pipeline;
pub mod prolog;

pub use self::error::{Error, Result};
pub use self::parse::error::{Diagnostic, Warning};

use crate::eval::Evaluator;
use crate::parse::error::PResult;
use crate::parse::turtle::terminals::blank0;
use crate::parse::{Context, RefContext, StatementBatch};
use crate::pipeline::{Entry, StatementQueue};
use std::cell::RefCell;
use std::io::Write;
use std::thread;

/// How recognized statements are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Canonical N-Triples/N-Quads lines.
    Canonical,
    /// Echo each recognized statement as it appears in the source.
    Raw,
}

/// Options of one parser run.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Only check the input; nothing is evaluated or written.
    pub validate: bool,
    /// Base path relative IRI references resolve against.
    pub base: String,
    /// Name of the input used in diagnostics, usually the file name.
    pub label: String,
    /// Canonical or raw output.
    pub mode: OutputMode,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            validate: false,
            base: String::new(),
            label: "-".to_owned(),
            mode: OutputMode::Canonical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Turtle,
    Trig,
    NTriples,
    NQuads,
}

/// Parses a Turtle document and emits canonical N-Triples.
///
/// Returns the number of emitted triples, or the number of recognized
/// statements when validating.
pub fn parse_turtle<W, F>(doc: &str, out: W, warn: F, config: &ParserConfig) -> Result<u64>
where
    W: Write + Send,
    F: FnMut(Warning),
{
    run(Dialect::Turtle, doc, out, warn, config)
}

/// Parses a TriG document and emits canonical N-Quads.
pub fn parse_trig<W, F>(doc: &str, out: W, warn: F, config: &ParserConfig) -> Result<u64>
where
    W: Write + Send,
    F: FnMut(Warning),
{
    run(Dialect::Trig, doc, out, warn, config)
}

/// Parses an N-Triples document and re-emits it canonically.
pub fn parse_ntriples<W, F>(doc: &str, out: W, warn: F, config: &ParserConfig) -> Result<u64>
where
    W: Write + Send,
    F: FnMut(Warning),
{
    run(Dialect::NTriples, doc, out, warn, config)
}

/// Parses an N-Quads document and re-emits it canonically.
pub fn parse_nquads<W, F>(doc: &str, out: W, warn: F, config: &ParserConfig) -> Result<u64>
where
    W: Write + Send,
    F: FnMut(Warning),
{
    run(Dialect::NQuads, doc, out, warn, config)
}

fn run<W, F>(dialect: Dialect, doc: &str, out: W, mut warn: F, config: &ParserConfig) -> Result<u64>
where
    W: Write + Send,
    F: FnMut(Warning),
{
    let ctx = RefCell::new(Context::new(doc, &config.label, &config.base));
    let outcome = if config.validate {
        // a TriG block expands to one statement per triples clause, so the
        // batch length is the recognized-statement count, not 1
        produce(dialect, doc, &ctx, &mut warn, |batch, _| {
            Ok(batch.len() as u64)
        })
    } else {
        match config.mode {
            OutputMode::Raw => raw(dialect, doc, &ctx, &mut warn, out),
            OutputMode::Canonical => emit(dialect, doc, &ctx, &mut warn, out),
        }
    };
    if let Ok(count) = &outcome {
        tracing::debug!(count = *count, label = %config.label, "input parsed");
    }
    outcome
}

/// Dispatches to the statement parser of the chosen dialect.
fn next_batch<'a>(
    dialect: Dialect,
    i: &'a str,
    ctx: &RefContext<'a>,
) -> PResult<'a, StatementBatch> {
    match dialect {
        Dialect::Turtle => {
            parse::turtle::statement(i, ctx).map(|(rest, s)| (rest, vec![(None, s)]))
        }
        Dialect::Trig => parse::trig::statement(i, ctx),
        Dialect::NTriples => parse::line::statement(i, ctx, false),
        Dialect::NQuads => parse::line::statement(i, ctx, true),
    }
}

fn skip_blank(i: &str) -> &str {
    match blank0(i) {
        Ok((rest, _)) => rest,
        Err(_) => i,
    }
}

/// The producer loop: recognize statements until end of input or the first
/// unrecoverable error, handing each batch (with its source span) to the
/// sink and forwarding warnings.
fn produce<'a, F, S>(
    dialect: Dialect,
    doc: &'a str,
    ctx: &RefContext<'a>,
    warn: &mut F,
    mut sink: S,
) -> Result<u64>
where
    F: FnMut(Warning),
    S: FnMut(StatementBatch, &str) -> Result<u64>,
{
    let mut rest = doc;
    let mut count = 0u64;
    loop {
        rest = skip_blank(rest);
        if rest.is_empty() {
            return Ok(count);
        }
        match next_batch(dialect, rest, ctx) {
            Ok((after, batch)) => {
                let span = &rest[..rest.len() - after.len()];
                for warning in ctx.borrow_mut().take_warnings() {
                    tracing::warn!(%warning, "parser warning");
                    warn(warning);
                }
                count += sink(batch, span)?;
                rest = after;
            }
            Err(err) => {
                for warning in ctx.borrow_mut().take_warnings() {
                    tracing::warn!(%warning, "parser warning");
                    warn(warning);
                }
                let label = ctx.borrow().label().to_owned();
                return Err(Error::Parse(Diagnostic::new(doc, &label, err)));
            }
        }
    }
}

/// Raw mode: echo each recognized statement, bypassing the pipeline.
fn raw<'a, W, F>(
    dialect: Dialect,
    doc: &'a str,
    ctx: &RefContext<'a>,
    warn: &mut F,
    mut out: W,
) -> Result<u64>
where
    W: Write,
    F: FnMut(Warning),
{
    let count = produce(dialect, doc, ctx, warn, |_batch, span| {
        writeln!(out, "{}", span.trim_end())?;
        Ok(1)
    })?;
    out.flush()?;
    Ok(count)
}

/// Emission mode: statements flow through the pipeline to the evaluator
/// worker; at end of input (or on error) the queue is shut down, the worker
/// joined and the tail drained synchronously, preserving source order.
fn emit<'a, W, F>(
    dialect: Dialect,
    doc: &'a str,
    ctx: &RefContext<'a>,
    warn: &mut F,
    out: W,
) -> Result<u64>
where
    W: Write + Send,
    F: FnMut(Warning),
{
    let queue = StatementQueue::new();
    thread::scope(|scope| {
        let handle = scope.spawn(|| pipeline::worker(&queue, Evaluator::new(out)));
        let produced = produce(dialect, doc, ctx, warn, |batch, _span| {
            for (graph, statement) in batch {
                let prolog = ctx.borrow().snapshot();
                queue.push(Entry {
                    prolog,
                    graph,
                    statement,
                });
            }
            Ok(0)
        });
        queue.shutdown();
        let (mut evaluator, outcome) = match handle.join() {
            Ok(done) => done,
            Err(panic) => std::panic::resume_unwind(panic),
        };
        let mut count = outcome?;
        while let Some(entry) = queue.drain_next() {
            count += evaluator.eval(&entry)?;
        }
        evaluator.flush()?;
        produced?;
        Ok(count)
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn turtle(doc: &str) -> (String, u64) {
        let mut warnings = Vec::new();
        let mut out = Vec::new();
        let count = parse_turtle(
            doc,
            &mut out,
            |w| warnings.push(w),
            &ParserConfig::default(),
        )
        .unwrap();
        (String::from_utf8(out).unwrap(), count)
    }

    #[test]
    fn prefixed_document() {
        // S1
        let (out, count) = turtle("@prefix : <http://ex/> .\n:a :b :c .");
        assert_eq!(1, count);
        assert_eq!("<http://ex/a> <http://ex/b> <http://ex/c> .\n", out);
    }

    #[test]
    fn language_tagged_literal_round_trips() {
        // S2
        let (out, count) = turtle("<s> <p> \"x\"@en .");
        assert_eq!(1, count);
        assert_eq!("<s> <p> \"x\"@en .\n", out);
    }

    #[test]
    fn validation_counts_statements_without_output() {
        let mut out = Vec::new();
        let config = ParserConfig {
            validate: true,
            ..ParserConfig::default()
        };
        let count = parse_turtle(
            "@prefix : <http://ex/> .\n:a :b :c .\n:d :e :f .",
            &mut out,
            |_| {},
            &config,
        )
        .unwrap();
        assert_eq!(3, count);
        assert!(out.is_empty());
    }

    #[test]
    fn raw_mode_echoes_statements() {
        let mut out = Vec::new();
        let config = ParserConfig {
            mode: OutputMode::Raw,
            ..ParserConfig::default()
        };
        let count = parse_turtle(":a\n  :b :c .", &mut out, |_| {}, &config).unwrap();
        assert_eq!(1, count);
        assert_eq!(":a\n  :b :c .\n", String::from_utf8(out).unwrap());
    }

    #[test]
    fn parse_error_reports_position() {
        let mut out = Vec::new();
        let err = parse_turtle("<s> <p> ?? .", &mut out, |_| {}, &ParserConfig::default())
            .expect_err("must fail");
        match err {
            Error::Parse(diag) => {
                assert_eq!(0, diag.position.line);
                assert_eq!(8, diag.position.column);
            }
            Error::FromIo(_) => panic!("wrong error variant"),
        }
    }

    #[test]
    fn undefined_prefix_is_a_warning_not_an_error() {
        let mut warnings = Vec::new();
        let mut out = Vec::new();
        let count = parse_turtle(
            "<s> <p> missing:o .",
            &mut out,
            |w| warnings.push(w),
            &ParserConfig::default(),
        )
        .unwrap();
        assert_eq!(1, count);
        assert_eq!(1, warnings.len());
        assert_eq!("<s> <p> <o> .\n", String::from_utf8(out).unwrap());
    }
}
