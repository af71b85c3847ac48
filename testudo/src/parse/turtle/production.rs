//! Production rules of Turtle.
//!
//! The productions build [`crate::ast`] nodes and leave prefix resolution,
//! blank-node labeling and shorthand expansion to the evaluator. The one
//! exception are directives: they update the context's prefix table at
//! recognition time because following statements may already depend on the
//! new binding.

use super::terminals::*;
use crate::ast::{
    BlankNode, Collection, Directive, Iri, Literal, LiteralSuffix, NumericLiteral, Object,
    ObjectList, Po, PredicateObjectList, PrefixedName, RdfLiteral, Statement, Subject, Triples,
    Verb,
};
use crate::parse::error::{PResult, PosError};
use crate::parse::util::parse_regex;
use crate::parse::RefContext;
use nom::branch::alt;
use nom::bytes::complete::{tag, tag_no_case};
use nom::combinator::{map, opt};
use nom::error::ParseError;
use nom::multi::separated_nonempty_list;
use nom::sequence::{preceded, tuple};
use nom::Err as NErr;

/// Parses Turtle's production
/// [2] statement ::= directive | triples '.'
///
/// A comment at statement position becomes a syntax node of its own;
/// comments inside a statement are absorbed as whitespace.
pub fn statement<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, Statement> {
    if let Ok((rest, text)) = comment(i) {
        return Ok((rest, Statement::Comment(text.to_owned())));
    }
    match directive(i, ctx) {
        Ok((rest, parsed)) => return Ok((rest, Statement::Directive(parsed))),
        Err(NErr::Failure(e)) => return Err(NErr::Failure(e)),
        Err(_) => {}
    }
    match tuple((|i| triples(i, ctx), multispace0, tag(".")))(i) {
        Ok((rest, (parsed, _, _))) => Ok((rest, Statement::Triples(parsed))),
        Err(NErr::Error(e)) => Err(NErr::Error(e.or(PosError::expected(i, "statement")))),
        Err(other) => Err(other),
    }
}

/// Parses Turtle's production
/// [3] directive ::= prefixID | base | sparqlPrefix | sparqlBase
pub fn directive<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, Directive> {
    alt((
        |i| prefix_id(i, ctx),
        |i| base(i, ctx),
        |i| sparql_prefix(i, ctx),
        |i| sparql_base(i, ctx),
    ))(i)
}

/// Parses Turtle's production
/// [4] prefixID ::= '@prefix' PNAME_NS IRIREF '.'
///
/// Adds the parsed prefix and namespace to the context.
pub fn prefix_id<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, Directive> {
    let (rest, (_, _, prefix, _, iri, _, _)) = tuple((
        tag("@prefix"),
        multispace1,
        pname_ns,
        multispace0,
        iriref,
        multispace0,
        tag("."),
    ))(i)?;
    ctx.borrow_mut().define_prefix(prefix, &iri);
    Ok((
        rest,
        Directive::PrefixId {
            prefix: prefix.to_owned(),
            iri,
        },
    ))
}

/// Parses Turtle's production
/// [5] base ::= '@base' IRIREF '.'
///
/// Overrides the base path of the context which is from now on used to
/// resolve relative IRI references.
pub fn base<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, Directive> {
    let (rest, (_, _, iri, _, _)) = tuple((
        tag("@base"),
        multispace1,
        iriref,
        multispace0,
        tag("."),
    ))(i)?;
    ctx.borrow_mut().set_base(&iri);
    Ok((rest, Directive::Base { iri }))
}

/// Parses Turtle's production
/// [6s] sparqlPrefix ::= "PREFIX" PNAME_NS IRIREF
pub fn sparql_prefix<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, Directive> {
    let (rest, (_, _, prefix, _, iri)) = tuple((
        tag_no_case("PREFIX"),
        multispace1,
        pname_ns,
        multispace0,
        iriref,
    ))(i)?;
    ctx.borrow_mut().define_prefix(prefix, &iri);
    Ok((
        rest,
        Directive::SparqlPrefix {
            prefix: prefix.to_owned(),
            iri,
        },
    ))
}

/// Parses Turtle's production
/// [5s] sparqlBase ::= "BASE" IRIREF
pub fn sparql_base<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, Directive> {
    let (rest, (_, _, iri)) = tuple((tag_no_case("BASE"), multispace1, iriref))(i)?;
    ctx.borrow_mut().set_base(&iri);
    Ok((rest, Directive::SparqlBase { iri }))
}

/// Parses Turtle's production
/// [6] triples ::= subject predicateObjectList | blankNodePropertyList predicateObjectList?
pub fn triples<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, Triples> {
    let subject_err = match tuple((
        |i| subject(i, ctx),
        multispace0,
        |i| predicate_object_list(i, ctx),
    ))(i)
    {
        Ok((rest, (subject, _, po_list))) => {
            return Ok((rest, Triples::Subject { subject, po_list }))
        }
        Err(NErr::Error(e)) => e,
        Err(other) => return Err(other),
    };
    match blank_node_property_list(i, ctx) {
        Ok((rest, properties)) => {
            let (rest, _) = multispace0(rest)?;
            let (rest, po_list) = opt(|i| predicate_object_list(i, ctx))(rest)?;
            Ok((
                rest,
                Triples::BlankNodeProperties {
                    properties,
                    po_list,
                },
            ))
        }
        // report whichever shape got further
        Err(NErr::Error(e)) => Err(NErr::Error(subject_err.or(e))),
        Err(other) => Err(other),
    }
}

/// Parses Turtle's production
/// [7] predicateObjectList ::= verb objectList (';' (verb objectList)?)*
pub fn predicate_object_list<'a>(
    i: &'a str,
    ctx: &RefContext<'a>,
) -> PResult<'a, PredicateObjectList> {
    let (mut rest, first) = po(i, ctx)?;
    let mut items = vec![first];
    loop {
        let after_sep = match tuple((multispace0, tag(";"), multispace0))(rest) {
            Ok((r, _)) => r,
            Err(_) => break,
        };
        // the pair after a ';' is optional, a dangling separator is fine
        match po(after_sep, ctx) {
            Ok((r, item)) => {
                items.push(item);
                rest = r;
            }
            Err(NErr::Failure(e)) => return Err(NErr::Failure(e)),
            Err(_) => rest = after_sep,
        }
    }
    Ok((rest, PredicateObjectList(items)))
}

/// One verb with its object list.
fn po<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, Po> {
    let (rest, (verb, _, objects)) = tuple((
        |i| verb(i, ctx),
        multispace0,
        |i| object_list(i, ctx),
    ))(i)?;
    Ok((rest, Po { verb, objects }))
}

/// Parses Turtle's production
/// [8] objectList ::= object (',' object)*
pub fn object_list<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, ObjectList> {
    map(
        separated_nonempty_list(tuple((multispace0, tag(","), multispace0)), |i| {
            object(i, ctx)
        }),
        ObjectList,
    )(i)
}

/// Parses Turtle's production
/// [9] verb ::= predicate | 'a'
pub fn verb<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, Verb> {
    match iri(i, ctx) {
        Ok((rest, parsed)) => Ok((rest, Verb::Iri(parsed))),
        Err(NErr::Error(e)) => match map(tag("a"), |_| Verb::IsA)(i) {
            Ok(done) => Ok(done),
            Err(NErr::Error(_)) => Err(NErr::Error(e.or(PosError::expected(i, "'a'")))),
            Err(other) => Err(other),
        },
        Err(other) => Err(other),
    }
}

/// Parses Turtle's production
/// [10] subject ::= iri | BlankNode | collection
pub fn subject<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, Subject> {
    alt((
        map(|i| iri(i, ctx), Subject::Iri),
        map(|i| blank_node(i, ctx), Subject::BlankNode),
        map(|i| collection(i, ctx), Subject::Collection),
    ))(i)
}

/// Parses Turtle's production
/// [12] object ::= iri | BlankNode | collection | blankNodePropertyList | literal
pub fn object<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, Object> {
    alt((
        map(|i| iri(i, ctx), Object::Iri),
        map(|i| blank_node(i, ctx), Object::BlankNode),
        map(|i| collection(i, ctx), Object::Collection),
        map(
            |i| blank_node_property_list(i, ctx),
            Object::BlankNodePropertyList,
        ),
        map(|i| literal(i, ctx), Object::Literal),
    ))(i)
}

/// Parses Turtle's production
/// [13] literal ::= RDFLiteral | NumericLiteral | BooleanLiteral
pub fn literal<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, Literal> {
    alt((
        |i| rdf_literal(i, ctx),
        numeric_literal,
        boolean_literal,
    ))(i)
}

/// Parses Turtle's production
/// [14] blankNodePropertyList ::= '[' predicateObjectList ']'
pub fn blank_node_property_list<'a>(
    i: &'a str,
    ctx: &RefContext<'a>,
) -> PResult<'a, PredicateObjectList> {
    let (rest, _) = tag("[")(i)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, contents) = predicate_object_list(rest, ctx)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = tag("]")(rest)?;

    Ok((rest, contents))
}

/// Parses Turtle's production
/// [15] collection ::= '(' object* ')'
///
/// The nodes of the rdf:first/rdf:rest chain are allocated by the
/// evaluator, not here.
pub fn collection<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, Collection> {
    let (rest, _) = tag("(")(i)?;
    let (mut rest, _) = multispace0(rest)?;
    let mut items = Vec::new();
    loop {
        if let Some(after) = rest.strip_prefix(')') {
            return Ok((after, Collection(items)));
        }
        let (r, item) = object(rest, ctx)?;
        let (r, _) = multispace0(r)?;
        items.push(item);
        rest = r;
    }
}

/// Parses Turtle's production
/// [16] NumericLiteral ::= INTEGER | DECIMAL | DOUBLE
///
/// DOUBLE is tried first and DECIMAL before INTEGER; swapping the order
/// truncates `1.0e0` to its leading integer. Each keeps its lexical form.
pub fn numeric_literal(i: &str) -> PResult<Literal> {
    alt((
        map(parse_regex(&DOUBLE, "DOUBLE"), |lex: &str| {
            Literal::Numeric(NumericLiteral::Double(lex.to_owned()))
        }),
        map(parse_regex(&DECIMAL, "DECIMAL"), |lex: &str| {
            Literal::Numeric(NumericLiteral::Decimal(lex.to_owned()))
        }),
        map(parse_regex(&INTEGER, "INTEGER"), |lex: &str| {
            Literal::Numeric(NumericLiteral::Integer(lex.to_owned()))
        }),
    ))(i)
}

/// Parses Turtle's production
/// [128s] RDFLiteral ::= String (LANGTAG | '^^' iri)?
pub fn rdf_literal<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, Literal> {
    let (rest, value) = string(i)?;

    if let Ok((rest, datatype)) = preceded(tag("^^"), |i| iri(i, ctx))(rest) {
        return Ok((
            rest,
            Literal::Rdf(RdfLiteral {
                value,
                suffix: Some(LiteralSuffix::Datatype(datatype)),
            }),
        ));
    }
    if let Ok((rest, lang)) = langtag(rest) {
        return Ok((
            rest,
            Literal::Rdf(RdfLiteral {
                value,
                suffix: Some(LiteralSuffix::LanguageTag(lang.to_owned())),
            }),
        ));
    }
    Ok((rest, Literal::Rdf(RdfLiteral { value, suffix: None })))
}

/// Parses Turtle's production
/// [133s] BooleanLiteral ::= 'true' | 'false'
pub fn boolean_literal(i: &str) -> PResult<Literal> {
    map(alt((tag("true"), tag("false"))), |lex: &str| {
        Literal::Boolean(lex == "true")
    })(i)
}

/// Parses Turtle's production
/// [135s] iri ::= IRIREF | PrefixedName
pub fn iri<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, Iri> {
    match iriref(i) {
        Ok((rest, body)) => Ok((rest, Iri::Ref(body))),
        Err(NErr::Error(e)) => match prefixed_name(i, ctx) {
            Ok(done) => Ok(done),
            Err(NErr::Error(e2)) => Err(NErr::Error(e.or(e2))),
            Err(other) => Err(other),
        },
        Err(other) => Err(other),
    }
}

/// Parses Turtle's production
/// [136s] PrefixedName ::= PNAME_LN | PNAME_NS
///
/// A PNAME_LN with an unbound namespace is a warning, not an error; the
/// evaluator expands it with the empty IRI.
pub fn prefixed_name<'a>(i: &'a str, ctx: &RefContext<'a>) -> PResult<'a, Iri> {
    let (rest, prefix) = pname_ns(i)?;
    if let Ok((rest, local)) = pn_local(rest) {
        if !ctx.borrow().has_prefix(prefix) {
            ctx.borrow_mut().warn_undefined_prefix(i, prefix);
        }
        return Ok((
            rest,
            Iri::Prefixed(PrefixedName {
                prefix: prefix.to_owned(),
                local: Some(local.to_owned()),
            }),
        ));
    }
    Ok((
        rest,
        Iri::Prefixed(PrefixedName {
            prefix: prefix.to_owned(),
            local: None,
        }),
    ))
}

/// Parses Turtle's production
/// [137s] BlankNode ::= BLANK_NODE_LABEL | ANON
pub fn blank_node<'a>(i: &'a str, _: &RefContext<'a>) -> PResult<'a, BlankNode> {
    alt((
        map(blank_node_label, |label: &str| {
            BlankNode::Label(label.to_owned())
        }),
        map(anon, |_| BlankNode::Anon),
    ))(i)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parse::Context;
    use std::cell::RefCell;
    use test_case::test_case;

    fn ctx<'a>(doc: &'a str) -> RefContext<'a> {
        let mut ctx = Context::new(doc, "test", "");
        ctx.define_prefix("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
        ctx.define_prefix("xsd", "http://www.w3.org/2001/XMLSchema#");
        RefCell::new(ctx)
    }

    fn iri_ref(body: &str) -> Iri {
        Iri::Ref(body.to_owned())
    }

    fn prefixed(prefix: &str, local: &str) -> Iri {
        Iri::Prefixed(PrefixedName {
            prefix: prefix.to_owned(),
            local: Some(local.to_owned()),
        })
    }

    fn integer(lex: &str) -> Object {
        Object::Literal(Literal::Numeric(NumericLiteral::Integer(lex.to_owned())))
    }

    #[test]
    fn check_object_list() {
        let check = "\"45\"^^xsd:integer, rdf:type  ,  false  rest";
        let binding = ctx(check);
        let (rest, list) = object_list(check, &binding).unwrap();
        assert_eq!("  rest", rest);
        assert_eq!(3, list.0.len());
        assert_eq!(
            Object::Literal(Literal::Rdf(RdfLiteral {
                value: crate::ast::TurtleString::Quote("45".to_owned()),
                suffix: Some(LiteralSuffix::Datatype(prefixed("xsd", "integer"))),
            })),
            list.0[0]
        );
        assert_eq!(Object::Iri(prefixed("rdf", "type")), list.0[1]);
        assert_eq!(Object::Literal(Literal::Boolean(false)), list.0[2]);
    }

    #[test]
    fn check_predicate_object_list() {
        let check = "rdf:value 45, rdf:type  ;  a  false  rest";
        let binding = ctx(check);
        let (rest, list) = predicate_object_list(check, &binding).unwrap();
        assert_eq!("  rest", rest);
        assert_eq!(2, list.0.len());
        assert_eq!(Verb::Iri(prefixed("rdf", "value")), list.0[0].verb);
        assert_eq!(
            vec![integer("45"), Object::Iri(prefixed("rdf", "type"))],
            list.0[0].objects.0
        );
        assert_eq!(Verb::IsA, list.0[1].verb);
    }

    #[test]
    fn check_predicate_object_list_trailing_semicolon() {
        let check = "rdf:value 45 ; . rest";
        let binding = ctx(check);
        let (rest, list) = predicate_object_list(check, &binding).unwrap();
        assert_eq!(1, list.0.len());
        assert_eq!(". rest", rest);
    }

    #[test]
    fn check_triples_with_property_list_subject() {
        let check = "[ rdf:value 45 ] rdf:type rdf:Bag  rest";
        let binding = ctx(check);
        let (rest, parsed) = triples(check, &binding).unwrap();
        assert_eq!("  rest", rest);
        match parsed {
            Triples::BlankNodeProperties {
                properties,
                po_list,
            } => {
                assert_eq!(1, properties.0.len());
                assert_eq!(1, po_list.map(|po| po.0.len()).unwrap_or(0));
            }
            Triples::Subject { .. } => panic!("wrong triples shape"),
        }
    }

    #[test]
    fn check_anon_subject_is_plain_subject() {
        let check = "[] rdf:value 45 . rest";
        let binding = ctx(check);
        let (_, parsed) = triples(check, &binding).unwrap();
        match parsed {
            Triples::Subject { subject, .. } => {
                assert_eq!(Subject::BlankNode(BlankNode::Anon), subject);
            }
            Triples::BlankNodeProperties { .. } => panic!("wrong triples shape"),
        }
    }

    #[test]
    fn check_collection() {
        let check = "( 1 2.0 3e0 )  rest";
        let binding = ctx(check);
        let (rest, Collection(items)) = collection(check, &binding).unwrap();
        assert_eq!("  rest", rest);
        assert_eq!(
            vec![
                integer("1"),
                Object::Literal(Literal::Numeric(NumericLiteral::Decimal("2.0".to_owned()))),
                Object::Literal(Literal::Numeric(NumericLiteral::Double("3e0".to_owned()))),
            ],
            items
        );
    }

    #[test]
    fn check_empty_collection() {
        let check = "()  rest";
        let binding = ctx(check);
        let (rest, Collection(items)) = collection(check, &binding).unwrap();
        assert_eq!("  rest", rest);
        assert!(items.is_empty());
    }

    #[test_case("1" => NumericLiteral::Integer("1".to_owned()) ; "integer")]
    #[test_case("1.0" => NumericLiteral::Decimal("1.0".to_owned()) ; "decimal")]
    #[test_case("1e0" => NumericLiteral::Double("1e0".to_owned()) ; "double plain")]
    #[test_case("1.0e0" => NumericLiteral::Double("1.0e0".to_owned()) ; "double with fraction")]
    #[test_case("-0042" => NumericLiteral::Integer("-0042".to_owned()) ; "leading zeros kept")]
    #[test_case("+1.2E-3" => NumericLiteral::Double("+1.2E-3".to_owned()) ; "exponent case kept")]
    fn check_numeric_discrimination(i: &str) -> NumericLiteral {
        match numeric_literal(i) {
            Ok((_, Literal::Numeric(num))) => num,
            _ => panic!("not numeric"),
        }
    }

    #[test]
    fn check_rdf_literal() {
        let check = "\"hello\"@en  rest";
        let binding = ctx(check);
        let (rest, term) = rdf_literal(check, &binding).unwrap();
        assert_eq!("  rest", rest);
        assert_eq!(
            Literal::Rdf(RdfLiteral {
                value: crate::ast::TurtleString::Quote("hello".to_owned()),
                suffix: Some(LiteralSuffix::LanguageTag("en".to_owned())),
            }),
            term
        );
    }

    #[test]
    fn check_iri() {
        let check = "<http://www.w3.org/1999/02/22-rdf-syntax-ns#>  rest";
        let binding = ctx(check);
        let (rest, parsed) = iri(check, &binding).unwrap();
        assert_eq!("  rest", rest);
        assert_eq!(iri_ref("http://www.w3.org/1999/02/22-rdf-syntax-ns#"), parsed);
    }

    #[test]
    fn undefined_prefix_warns_but_parses() {
        let check = "unknown:a  rest";
        let binding = ctx(check);
        let (rest, parsed) = iri(check, &binding).unwrap();
        assert_eq!("  rest", rest);
        assert_eq!(prefixed("unknown", "a"), parsed);
        let warnings = binding.borrow_mut().take_warnings();
        assert_eq!(1, warnings.len());
        assert!(warnings[0].message.contains("unknown"));
    }

    #[test]
    fn check_blank_node() {
        let check = "_:example  rest";
        let binding = ctx(check);
        let (rest, parsed) = blank_node(check, &binding).unwrap();
        assert_eq!("  rest", rest);
        assert_eq!(BlankNode::Label("example".to_owned()), parsed);
    }

    #[test]
    fn directive_updates_context_eagerly() {
        let check = "@prefix ex: <http://example.org/> . rest";
        let binding = ctx(check);
        let (rest, parsed) = statement(check, &binding).unwrap();
        assert_eq!(" rest", rest);
        assert_eq!(
            Statement::Directive(Directive::PrefixId {
                prefix: "ex".to_owned(),
                iri: "http://example.org/".to_owned(),
            }),
            parsed
        );
        assert!(binding.borrow().has_prefix("ex"));
    }

    #[test]
    fn sparql_directives_have_no_dot() {
        let check = "PREFIX ex: <http://example.org/>\nrest";
        let binding = ctx(check);
        let (rest, _) = statement(check, &binding).unwrap();
        assert_eq!("\nrest", rest);
        assert!(binding.borrow().has_prefix("ex"));

        let check = "Base <http://example.org/>\nrest";
        let binding = ctx(check);
        let (_, parsed) = statement(check, &binding).unwrap();
        assert_eq!(
            Statement::Directive(Directive::SparqlBase {
                iri: "http://example.org/".to_owned(),
            }),
            parsed
        );
    }

    #[test]
    fn comment_at_statement_position_is_a_node() {
        let check = "# a note\nrest";
        let binding = ctx(check);
        let (rest, parsed) = statement(check, &binding).unwrap();
        assert_eq!("\nrest", rest);
        assert_eq!(Statement::Comment("# a note".to_owned()), parsed);
    }

    #[test]
    fn string_order_prefers_long_forms() {
        let check = "\"\"\"a\"\"b\"\"\" rest";
        let binding = ctx(check);
        let (rest, term) = rdf_literal(check, &binding).unwrap();
        assert_eq!(" rest", rest);
        assert_eq!(
            Literal::Rdf(RdfLiteral {
                value: crate::ast::TurtleString::LongQuote("a\\\"\\\"b".to_owned()),
                suffix: None,
            }),
            term
        );
    }
}
