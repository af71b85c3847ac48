//! Parsers for the line-oriented N-Triples and N-Quads formats.
//!
//! Both reuse the Turtle lexical core but allow no directives, prefixes or
//! shorthands: terms are IRI references, blank-node labels and plain string
//! literals. N-Quads adds an optional graph label before the closing dot.
//! One parser serves both formats, switched by the `quads` flag.

use crate::ast::{
    BlankNode, GraphLabel, Iri, Literal, LiteralSuffix, Object, ObjectList, Po,
    PredicateObjectList, RdfLiteral, Statement, Subject, Triples, Verb,
};
use crate::parse::error::{PResult, PosError};
use crate::parse::turtle::terminals::{
    blank_node_label, comment, iriref, langtag, multispace0, string_literal_quote,
};
use crate::parse::RefContext;
use nom::bytes::complete::tag;
use nom::sequence::preceded;
use nom::Err as NErr;

/// The single statement a line expands to. Shared with the TriG batch shape
/// so all dialects drive the same pipeline.
pub type Batch = crate::parse::StatementBatch;

/// Parses one triple or quad statement.
pub fn statement<'a>(i: &'a str, _ctx: &RefContext<'a>, quads: bool) -> PResult<'a, Batch> {
    if let Ok((rest, text)) = comment(i) {
        return Ok((rest, vec![(None, Statement::Comment(text.to_owned()))]));
    }
    let (rest, subject) = subject(i)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, predicate) = predicate(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, object) = object(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, graph) = if quads {
        match graph_label(rest) {
            Ok((r, label)) => {
                let (r, _) = multispace0(r)?;
                (r, Some(label))
            }
            Err(NErr::Failure(e)) => return Err(NErr::Failure(e)),
            Err(_) => (rest, None),
        }
    } else {
        (rest, None)
    };
    let (rest, _) = tag(".")(rest)?;

    let triples = Triples::Subject {
        subject,
        po_list: PredicateObjectList(vec![Po {
            verb: Verb::Iri(predicate),
            objects: ObjectList(vec![object]),
        }]),
    };
    Ok((rest, vec![(graph, Statement::Triples(triples))]))
}

/// `subject ::= IRIREF | BLANK_NODE_LABEL`
fn subject(i: &str) -> PResult<Subject> {
    match iriref(i) {
        Ok((rest, body)) => Ok((rest, Subject::Iri(Iri::Ref(body)))),
        Err(NErr::Failure(e)) => Err(NErr::Failure(e)),
        Err(_) => match blank_node_label(i) {
            Ok((rest, label)) => Ok((rest, Subject::BlankNode(BlankNode::Label(label.to_owned())))),
            Err(_) => Err(NErr::Error(PosError::expected_any(
                i,
                &["IRIREF", "BLANK_NODE_LABEL"],
            ))),
        },
    }
}

/// `predicate ::= IRIREF`
fn predicate(i: &str) -> PResult<Iri> {
    let (rest, body) = iriref(i)?;
    Ok((rest, Iri::Ref(body)))
}

/// `object ::= IRIREF | BLANK_NODE_LABEL | literal`
fn object(i: &str) -> PResult<Object> {
    match iriref(i) {
        Ok((rest, body)) => return Ok((rest, Object::Iri(Iri::Ref(body)))),
        Err(NErr::Failure(e)) => return Err(NErr::Failure(e)),
        Err(_) => {}
    }
    if let Ok((rest, label)) = blank_node_label(i) {
        return Ok((rest, Object::BlankNode(BlankNode::Label(label.to_owned()))));
    }
    match literal(i) {
        Ok(done) => Ok(done),
        Err(NErr::Failure(e)) => Err(NErr::Failure(e)),
        Err(_) => Err(NErr::Error(PosError::expected_any(
            i,
            &["IRIREF", "BLANK_NODE_LABEL", "STRING_LITERAL_QUOTE"],
        ))),
    }
}

/// `literal ::= STRING_LITERAL_QUOTE ('^^' IRIREF | LANGTAG)?`
fn literal(i: &str) -> PResult<Object> {
    let (rest, value) = string_literal_quote(i)?;
    if let Ok((rest, body)) = preceded(tag("^^"), iriref)(rest) {
        return Ok((
            rest,
            Object::Literal(Literal::Rdf(RdfLiteral {
                value,
                suffix: Some(LiteralSuffix::Datatype(Iri::Ref(body))),
            })),
        ));
    }
    if let Ok((rest, lang)) = langtag(rest) {
        return Ok((
            rest,
            Object::Literal(Literal::Rdf(RdfLiteral {
                value,
                suffix: Some(LiteralSuffix::LanguageTag(lang.to_owned())),
            })),
        ));
    }
    Ok((rest, Object::Literal(Literal::Rdf(RdfLiteral { value, suffix: None }))))
}

/// `graphLabel ::= IRIREF | BLANK_NODE_LABEL`
fn graph_label(i: &str) -> PResult<GraphLabel> {
    match iriref(i) {
        Ok((rest, body)) => Ok((rest, GraphLabel::Iri(Iri::Ref(body)))),
        Err(NErr::Failure(e)) => Err(NErr::Failure(e)),
        Err(_) => {
            let (rest, label) = blank_node_label(i)?;
            Ok((rest, GraphLabel::BlankNode(BlankNode::Label(label.to_owned()))))
        }
    }
}
