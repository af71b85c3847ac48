//! TriG blocks on top of the Turtle productions.
//!
//! TriG wraps Turtle triples into optionally labeled graphs. A block
//! expands into one statement per contained triples clause, each tagged
//! with the graph it belongs to; directives and comments work exactly as in
//! Turtle.

use crate::ast::{GraphLabel, Statement};
use crate::parse::error::{PResult, PosError};
use crate::parse::turtle::production::{blank_node, directive, iri, triples};
use crate::parse::turtle::terminals::{comment, multispace0, multispace1};
use crate::parse::RefContext;
use nom::bytes::complete::{tag, tag_no_case};
use nom::error::ParseError;
use nom::Err as NErr;

/// Statements a TriG block expands to, each with its graph label.
pub type Batch = crate::parse::StatementBatch;

/// Parses one TriG block, directive or comment.
///
/// [1g] trigDoc ::= (directive | block)*
/// [2g] block ::= triplesOrGraph | wrappedGraph | "GRAPH" labelOrSubject wrappedGraph
pub fn statement<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, Batch> {
    if let Ok((rest, text)) = comment(i) {
        return Ok((rest, vec![(None, Statement::Comment(text.to_owned()))]));
    }
    match directive(i, ctx) {
        Ok((rest, parsed)) => return Ok((rest, vec![(None, Statement::Directive(parsed))])),
        Err(NErr::Failure(e)) => return Err(NErr::Failure(e)),
        Err(_) => {}
    }
    let acc = match graph_block(i, ctx) {
        Ok(done) => return Ok(done),
        Err(NErr::Failure(e)) => return Err(NErr::Failure(e)),
        Err(NErr::Error(e)) => e,
        Err(other) => return Err(other),
    };
    let acc = match labeled_block(i, ctx) {
        Ok(done) => return Ok(done),
        Err(NErr::Failure(e)) => return Err(NErr::Failure(e)),
        Err(NErr::Error(e)) => acc.or(e),
        Err(other) => return Err(other),
    };
    let acc = match wrapped_graph(i, ctx, None) {
        Ok(done) => return Ok(done),
        Err(NErr::Failure(e)) => return Err(NErr::Failure(e)),
        Err(NErr::Error(e)) => acc.or(e),
        Err(other) => return Err(other),
    };
    match plain_triples(i, ctx) {
        Ok(done) => Ok(done),
        Err(NErr::Error(e)) => Err(NErr::Error(acc.or(e))),
        Err(other) => Err(other),
    }
}

/// `"GRAPH" labelOrSubject wrappedGraph`
///
/// The keyword needs trailing whitespace; `GRAPH:g` is a prefixed name, not
/// a keyword followed by `:g`.
fn graph_block<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, Batch> {
    let (rest, _) = tag_no_case("GRAPH")(i)?;
    let (rest, _) = multispace1(rest)?;
    let (rest, label) = label_or_subject(rest, ctx)?;
    let (rest, _) = multispace0(rest)?;
    wrapped_graph(rest, ctx, Some(label))
}

/// `labelOrSubject wrappedGraph`
fn labeled_block<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, Batch> {
    let (rest, label) = label_or_subject(i, ctx)?;
    let (rest, _) = multispace0(rest)?;
    wrapped_graph(rest, ctx, Some(label))
}

/// `triples '.'` in the default graph.
fn plain_triples<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, Batch> {
    let (rest, parsed) = triples(i, ctx)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = tag(".")(rest)?;
    Ok((rest, vec![(None, Statement::Triples(parsed))]))
}

/// [7g] labelOrSubject ::= iri | BlankNode
fn label_or_subject<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, GraphLabel> {
    match iri(i, ctx) {
        Ok((rest, parsed)) => Ok((rest, GraphLabel::Iri(parsed))),
        Err(NErr::Failure(e)) => Err(NErr::Failure(e)),
        Err(_) => {
            let (rest, parsed) = blank_node(i, ctx)?;
            Ok((rest, GraphLabel::BlankNode(parsed)))
        }
    }
}

/// [5g] wrappedGraph ::= '{' triplesBlock? '}'
/// [6g] triplesBlock ::= triples ('.' triplesBlock?)?
fn wrapped_graph<'a>(
    i: &'a str,
    ctx: &RefContext<'a>,
    label: Option<GraphLabel>,
) -> PResult<'a, Batch> {
    let (rest, _) = tag("{")(i)?;
    let (mut rest, _) = multispace0(rest)?;
    let mut batch: Batch = Vec::new();
    loop {
        if let Some(after) = rest.strip_prefix('}') {
            return Ok((after, batch));
        }
        let (r, parsed) = triples(rest, ctx)?;
        batch.push((label.clone(), Statement::Triples(parsed)));
        let (r, _) = multispace0(r)?;
        match r.strip_prefix('.') {
            Some(after) => {
                let (r, _) = multispace0(after)?;
                rest = r;
            }
            // the dot after the last triples clause is optional
            None if r.starts_with('}') => rest = r,
            None => return Err(NErr::Error(PosError::expected_any(r, &["'.'", "'}'"]))),
        }
    }
}
