//! The AST evaluator.
//!
//! Walks one statement at a time, expands the Turtle shorthands into
//! canonical triples and writes one N-Triples/N-Quads line per triple.
//! Auxiliary triples of nested structures (collection chains, blank-node
//! property lists) are written before the parent triple referencing them.

use crate::ast::{
    BlankNode, Collection, GraphLabel, Iri, Literal, LiteralSuffix, NumericLiteral, Object,
    PredicateObjectList, RdfLiteral, Statement, Subject, Triples, Verb,
};
use crate::chars;
use crate::ns::{rdf, xsd};
use crate::pipeline::Entry;
use crate::prolog::Prolog;
use std::collections::HashMap;
use std::io::{self, Write};

/// Canonical labels for the blank nodes of one document.
///
/// Explicit labels are memoized, anonymous nodes burn a fresh number; both
/// draw from the same counter, so no two distinct syntactic nodes share a
/// canonical label.
#[derive(Debug, Default)]
pub struct BnodeTable {
    labels: HashMap<String, u64>,
    next: u64,
}

impl BnodeTable {
    fn canonical(&mut self, label: &str) -> u64 {
        if let Some(&known) = self.labels.get(label) {
            known
        } else {
            let fresh = self.fresh();
            self.labels.insert(label.to_owned(), fresh);
            fresh
        }
    }

    fn fresh(&mut self) -> u64 {
        let fresh = self.next;
        self.next += 1;
        fresh
    }
}

/// Walks statement ASTs and writes canonical lines to the output sink.
pub struct Evaluator<W> {
    out: W,
    bnodes: BnodeTable,
}

impl<W: Write> Evaluator<W> {
    /// A fresh evaluator writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            bnodes: BnodeTable::default(),
        }
    }

    /// Evaluates one pipeline entry, returning the number of emitted lines.
    ///
    /// Directives were already applied by the parser and comments render to
    /// nothing, so both count zero.
    pub fn eval(&mut self, entry: &Entry) -> io::Result<u64> {
        match &entry.statement {
            Statement::Directive(_) | Statement::Comment(_) => Ok(0),
            Statement::Triples(triples) => {
                let graph = entry
                    .graph
                    .as_ref()
                    .map(|label| self.graph_term(&entry.prolog, label));
                let count = self.eval_triples(&entry.prolog, graph.as_deref(), triples)?;
                tracing::trace!(triples = count, "statement evaluated");
                Ok(count)
            }
        }
    }

    /// Flushes the output sink.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Consumes the evaluator, returning the output sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn eval_triples(
        &mut self,
        prolog: &Prolog,
        graph: Option<&str>,
        triples: &Triples,
    ) -> io::Result<u64> {
        match triples {
            Triples::Subject { subject, po_list } => {
                let (term, mut count) = self.subject_term(prolog, graph, subject)?;
                count += self.write_po_list(prolog, graph, &term, po_list)?;
                Ok(count)
            }
            Triples::BlankNodeProperties {
                properties,
                po_list,
            } => {
                let term = self.bnode(&BlankNode::Anon);
                let mut count = self.write_po_list(prolog, graph, &term, properties)?;
                if let Some(po_list) = po_list {
                    count += self.write_po_list(prolog, graph, &term, po_list)?;
                }
                Ok(count)
            }
        }
    }

    /// Emits one triple per verb/object pair, in source order.
    fn write_po_list(
        &mut self,
        prolog: &Prolog,
        graph: Option<&str>,
        subject: &str,
        po_list: &PredicateObjectList,
    ) -> io::Result<u64> {
        let mut count = 0;
        for po in &po_list.0 {
            let verb = self.verb_term(prolog, &po.verb);
            for object in &po.objects.0 {
                let (term, aux) = self.object_term(prolog, graph, object)?;
                count += aux;
                self.write_line(graph, subject, &verb, &term)?;
                count += 1;
            }
        }
        Ok(count)
    }

    fn subject_term(
        &mut self,
        prolog: &Prolog,
        graph: Option<&str>,
        subject: &Subject,
    ) -> io::Result<(String, u64)> {
        match subject {
            Subject::Iri(iri) => Ok((format_iri(prolog, iri), 0)),
            Subject::BlankNode(node) => Ok((self.bnode(node), 0)),
            Subject::Collection(collection) => self.collection_term(prolog, graph, collection),
        }
    }

    fn object_term(
        &mut self,
        prolog: &Prolog,
        graph: Option<&str>,
        object: &Object,
    ) -> io::Result<(String, u64)> {
        match object {
            Object::Iri(iri) => Ok((format_iri(prolog, iri), 0)),
            Object::BlankNode(node) => Ok((self.bnode(node), 0)),
            Object::Literal(literal) => Ok((format_literal(prolog, literal), 0)),
            Object::Collection(collection) => self.collection_term(prolog, graph, collection),
            Object::BlankNodePropertyList(po_list) => {
                let term = self.bnode(&BlankNode::Anon);
                let count = self.write_po_list(prolog, graph, &term, po_list)?;
                Ok((term, count))
            }
        }
    }

    /// Expands `( o… )` into its rdf:first/rdf:rest chain.
    ///
    /// The chain is written before the caller's parent triple; the head
    /// node, or `rdf:nil` for an empty collection, is returned as the term.
    fn collection_term(
        &mut self,
        prolog: &Prolog,
        graph: Option<&str>,
        collection: &Collection,
    ) -> io::Result<(String, u64)> {
        if collection.0.is_empty() {
            return Ok((format!("<{}>", rdf::NIL), 0));
        }
        let nodes: Vec<u64> = collection.0.iter().map(|_| self.bnodes.fresh()).collect();
        let mut count = 0;
        for (idx, object) in collection.0.iter().enumerate() {
            let node = format!("_:b{}", nodes[idx]);
            let (term, aux) = self.object_term(prolog, graph, object)?;
            count += aux;
            self.write_line(graph, &node, &format!("<{}>", rdf::FIRST), &term)?;
            let rest = nodes
                .get(idx + 1)
                .map_or_else(|| format!("<{}>", rdf::NIL), |next| format!("_:b{}", next));
            self.write_line(graph, &node, &format!("<{}>", rdf::REST), &rest)?;
            count += 2;
        }
        Ok((format!("_:b{}", nodes[0]), count))
    }

    fn verb_term(&self, prolog: &Prolog, verb: &Verb) -> String {
        match verb {
            Verb::IsA => format!("<{}>", rdf::TYPE),
            Verb::Iri(iri) => format_iri(prolog, iri),
        }
    }

    fn graph_term(&mut self, prolog: &Prolog, label: &GraphLabel) -> String {
        match label {
            GraphLabel::Iri(iri) => format_iri(prolog, iri),
            GraphLabel::BlankNode(node) => self.bnode(node),
        }
    }

    fn bnode(&mut self, node: &BlankNode) -> String {
        let number = match node {
            BlankNode::Label(label) => self.bnodes.canonical(label),
            BlankNode::Anon => self.bnodes.fresh(),
        };
        format!("_:b{}", number)
    }

    fn write_line(
        &mut self,
        graph: Option<&str>,
        subject: &str,
        predicate: &str,
        object: &str,
    ) -> io::Result<()> {
        match graph {
            Some(graph) => writeln!(self.out, "{} {} {} {} .", subject, predicate, object, graph),
            None => writeln!(self.out, "{} {} {} .", subject, predicate, object),
        }
    }
}

/// Formats an IRI term. Relative references resolve against the snapshot's
/// base; prefixed names expand from its table, an unbound namespace with
/// the empty IRI.
fn format_iri(prolog: &Prolog, iri: &Iri) -> String {
    match iri {
        Iri::Ref(body) => format!("<{}>", prolog.resolve(body)),
        Iri::Prefixed(name) => {
            let namespace = prolog.lookup(&name.prefix).unwrap_or("");
            match &name.local {
                Some(local) => format!("<{}{}>", namespace, unescape_local(local)),
                None => format!("<{}>", namespace),
            }
        }
    }
}

/// Removes the backslashes of PN_LOCAL escapes. Percent escapes stay.
fn unescape_local(local: &str) -> String {
    let mut out = String::with_capacity(local.len());
    let mut iter = local.chars();
    while let Some(c) = iter.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match iter.next() {
            Some(escaped) if chars::is_local_escapable(escaped) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn format_literal(prolog: &Prolog, literal: &Literal) -> String {
    match literal {
        Literal::Rdf(RdfLiteral { value, suffix }) => match suffix {
            None => format!("\"{}\"", value.body()),
            Some(LiteralSuffix::LanguageTag(tag)) => format!("\"{}\"@{}", value.body(), tag),
            Some(LiteralSuffix::Datatype(datatype)) => {
                format!("\"{}\"^^{}", value.body(), format_iri(prolog, datatype))
            }
        },
        Literal::Numeric(numeric) => {
            let datatype = match numeric {
                NumericLiteral::Integer(_) => xsd::INTEGER,
                NumericLiteral::Decimal(_) => xsd::DECIMAL,
                NumericLiteral::Double(_) => xsd::DOUBLE,
            };
            format!("\"{}\"^^<{}>", numeric.lexical(), datatype)
        }
        Literal::Boolean(value) => format!("\"{}\"^^<{}>", value, xsd::BOOLEAN),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ast::{ObjectList, Po, PrefixedName};
    use std::sync::Arc;

    fn eval_one(statement: Statement, prolog: Prolog) -> (Vec<String>, u64) {
        let mut evaluator = Evaluator::new(Vec::new());
        let entry = Entry {
            prolog: Arc::new(prolog),
            graph: None,
            statement,
        };
        let count = evaluator.eval(&entry).unwrap();
        let lines = String::from_utf8(evaluator.out).unwrap();
        (lines.lines().map(str::to_owned).collect(), count)
    }

    fn po(verb: Verb, objects: Vec<Object>) -> PredicateObjectList {
        PredicateObjectList(vec![Po {
            verb,
            objects: ObjectList(objects),
        }])
    }

    #[test]
    fn plain_triple() {
        let statement = Statement::Triples(Triples::Subject {
            subject: Subject::Iri(Iri::Ref("http://ex/s".to_owned())),
            po_list: po(
                Verb::Iri(Iri::Ref("http://ex/p".to_owned())),
                vec![Object::Iri(Iri::Ref("http://ex/o".to_owned()))],
            ),
        });
        let (lines, count) = eval_one(statement, Prolog::new());
        assert_eq!(1, count);
        assert_eq!(vec!["<http://ex/s> <http://ex/p> <http://ex/o> ."], lines);
    }

    #[test]
    fn prefixed_names_expand_from_the_snapshot() {
        let mut prolog = Prolog::new();
        prolog.define("ex", "http://ex/");
        let statement = Statement::Triples(Triples::Subject {
            subject: Subject::Iri(Iri::Prefixed(PrefixedName {
                prefix: "ex".to_owned(),
                local: Some("a".to_owned()),
            })),
            po_list: po(
                Verb::IsA,
                vec![Object::Iri(Iri::Prefixed(PrefixedName {
                    prefix: "missing".to_owned(),
                    local: Some("T".to_owned()),
                }))],
            ),
        });
        let (lines, _) = eval_one(statement, prolog);
        assert_eq!(
            vec!["<http://ex/a> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <T> ."],
            lines
        );
    }

    #[test]
    fn local_escapes_are_unescaped_in_the_expansion() {
        let mut prolog = Prolog::new();
        prolog.define("ex", "http://ex/");
        let statement = Statement::Triples(Triples::Subject {
            subject: Subject::Iri(Iri::Prefixed(PrefixedName {
                prefix: "ex".to_owned(),
                local: Some("a\\,b%41".to_owned()),
            })),
            po_list: po(
                Verb::Iri(Iri::Ref("http://ex/p".to_owned())),
                vec![Object::Literal(Literal::Boolean(true))],
            ),
        });
        let (lines, _) = eval_one(statement, prolog);
        assert_eq!(
            vec!["<http://ex/a,b%41> <http://ex/p> \"true\"^^<http://www.w3.org/2001/XMLSchema#boolean> ."],
            lines
        );
    }

    #[test]
    fn collection_expands_to_first_rest_chain() {
        let items = ["1", "2", "3"]
            .iter()
            .map(|lex| {
                Object::Literal(Literal::Numeric(NumericLiteral::Integer((*lex).to_owned())))
            })
            .collect();
        let statement = Statement::Triples(Triples::Subject {
            subject: Subject::Iri(Iri::Ref("http://ex/s".to_owned())),
            po_list: po(
                Verb::Iri(Iri::Ref("http://ex/p".to_owned())),
                vec![Object::Collection(Collection(items))],
            ),
        });
        let (lines, count) = eval_one(statement, Prolog::new());
        assert_eq!(7, count);
        let first = "<http://www.w3.org/1999/02/22-rdf-syntax-ns#first>";
        let rest = "<http://www.w3.org/1999/02/22-rdf-syntax-ns#rest>";
        let nil = "<http://www.w3.org/1999/02/22-rdf-syntax-ns#nil>";
        let int = "<http://www.w3.org/2001/XMLSchema#integer>";
        assert_eq!(
            vec![
                format!("_:b0 {} \"1\"^^{} .", first, int),
                format!("_:b0 {} _:b1 .", rest),
                format!("_:b1 {} \"2\"^^{} .", first, int),
                format!("_:b1 {} _:b2 .", rest),
                format!("_:b2 {} \"3\"^^{} .", first, int),
                format!("_:b2 {} {} .", rest, nil),
                "<http://ex/s> <http://ex/p> _:b0 .".to_owned(),
            ],
            lines
        );
    }

    #[test]
    fn empty_collection_is_nil() {
        let statement = Statement::Triples(Triples::Subject {
            subject: Subject::Iri(Iri::Ref("http://ex/s".to_owned())),
            po_list: po(
                Verb::Iri(Iri::Ref("http://ex/p".to_owned())),
                vec![Object::Collection(Collection(Vec::new()))],
            ),
        });
        let (lines, count) = eval_one(statement, Prolog::new());
        assert_eq!(1, count);
        assert_eq!(
            vec!["<http://ex/s> <http://ex/p> <http://www.w3.org/1999/02/22-rdf-syntax-ns#nil> ."],
            lines
        );
    }

    #[test]
    fn property_list_subject_emits_inner_triples_first() {
        let statement = Statement::Triples(Triples::BlankNodeProperties {
            properties: po(
                Verb::Iri(Iri::Ref("http://ex/p".to_owned())),
                vec![Object::Iri(Iri::Ref("http://ex/o".to_owned()))],
            ),
            po_list: Some(po(
                Verb::Iri(Iri::Ref("http://ex/q".to_owned())),
                vec![Object::Iri(Iri::Ref("http://ex/r".to_owned()))],
            )),
        });
        let (lines, count) = eval_one(statement, Prolog::new());
        assert_eq!(2, count);
        assert_eq!(
            vec![
                "_:b0 <http://ex/p> <http://ex/o> .",
                "_:b0 <http://ex/q> <http://ex/r> .",
            ],
            lines
        );
    }

    #[test]
    fn explicit_labels_are_memoized_and_share_the_counter() {
        let mut evaluator = Evaluator::new(Vec::new());
        assert_eq!("_:b0", evaluator.bnode(&BlankNode::Label("x".to_owned())));
        assert_eq!("_:b1", evaluator.bnode(&BlankNode::Anon));
        assert_eq!("_:b0", evaluator.bnode(&BlankNode::Label("x".to_owned())));
        assert_eq!("_:b2", evaluator.bnode(&BlankNode::Label("y".to_owned())));
    }

    #[test]
    fn relative_references_resolve_against_the_base() {
        let statement = Statement::Triples(Triples::Subject {
            subject: Subject::Iri(Iri::Ref("s".to_owned())),
            po_list: po(
                Verb::Iri(Iri::Ref("p".to_owned())),
                vec![Object::Iri(Iri::Ref("o".to_owned()))],
            ),
        });
        let (lines, _) = eval_one(statement, Prolog::with_base("http://ex/"));
        assert_eq!(vec!["<http://ex/s> <http://ex/p> <http://ex/o> ."], lines);
    }

    #[test]
    fn graph_label_is_appended_in_quad_mode() {
        let mut evaluator = Evaluator::new(Vec::new());
        let entry = Entry {
            prolog: Arc::new(Prolog::new()),
            graph: Some(GraphLabel::Iri(Iri::Ref("http://ex/g".to_owned()))),
            statement: Statement::Triples(Triples::Subject {
                subject: Subject::Iri(Iri::Ref("http://ex/s".to_owned())),
                po_list: po(
                    Verb::Iri(Iri::Ref("http://ex/p".to_owned())),
                    vec![Object::Iri(Iri::Ref("http://ex/o".to_owned()))],
                ),
            }),
        };
        let count = evaluator.eval(&entry).unwrap();
        assert_eq!(1, count);
        assert_eq!(
            "<http://ex/s> <http://ex/p> <http://ex/o> <http://ex/g> .\n",
            String::from_utf8(evaluator.out).unwrap()
        );
    }
}
