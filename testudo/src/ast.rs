//! Syntax nodes produced by the grammar layer.
//!
//! Every production is a case of a flat sum type. The tree is built by the
//! parser and walked once by the evaluator; no node resolves prefixes or
//! allocates blank-node labels itself.

/// A top-level statement of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// A `@prefix`/`@base` directive or its SPARQL form.
    Directive(Directive),
    /// A triples clause terminated by `.`.
    Triples(Triples),
    /// A standalone comment, captured with its leading `#`.
    Comment(String),
}

/// A directive updating the prefix table or the base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `@prefix p: <iri> .`
    PrefixId {
        /// Prefix label without the trailing colon.
        prefix: String,
        /// Unescaped IRI reference body.
        iri: String,
    },
    /// `@base <iri> .`
    Base {
        /// Unescaped IRI reference body.
        iri: String,
    },
    /// `PREFIX p: <iri>`
    SparqlPrefix {
        /// Prefix label without the trailing colon.
        prefix: String,
        /// Unescaped IRI reference body.
        iri: String,
    },
    /// `BASE <iri>`
    SparqlBase {
        /// Unescaped IRI reference body.
        iri: String,
    },
}

/// A triples clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Triples {
    /// `subject predicateObjectList`
    Subject {
        /// The shared subject.
        subject: Subject,
        /// Its predicate-object list.
        po_list: PredicateObjectList,
    },
    /// `blankNodePropertyList predicateObjectList?`
    BlankNodeProperties {
        /// The list between `[` and `]`.
        properties: PredicateObjectList,
        /// Further predicates of the fresh blank node.
        po_list: Option<PredicateObjectList>,
    },
}

/// Ordered sequence of verb/object-list pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateObjectList(pub Vec<Po>);

/// A verb with its list of objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Po {
    /// The predicate position.
    pub verb: Verb,
    /// The objects sharing it.
    pub objects: ObjectList,
}

/// Ordered sequence of objects separated by `,`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectList(pub Vec<Object>);

/// The subject position of a triples clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// An IRI.
    Iri(Iri),
    /// A labeled or anonymous blank node.
    BlankNode(BlankNode),
    /// A parenthesized collection.
    Collection(Collection),
}

/// The predicate position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    /// A full predicate IRI.
    Iri(Iri),
    /// The keyword `a`, expanding to `rdf:type`.
    IsA,
}

/// The object position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    /// An IRI.
    Iri(Iri),
    /// A labeled or anonymous blank node.
    BlankNode(BlankNode),
    /// A parenthesized collection.
    Collection(Collection),
    /// `[ predicateObjectList ]`
    BlankNodePropertyList(PredicateObjectList),
    /// A literal.
    Literal(Literal),
}

/// An IRI term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Iri {
    /// `<…>` with the body unescaped.
    Ref(String),
    /// A prefixed name.
    Prefixed(PrefixedName),
}

/// `PNAME_LN` or `PNAME_NS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixedName {
    /// The namespace label without the colon. Empty for the default prefix.
    pub prefix: String,
    /// The local part. `None` for a namespace-only name.
    pub local: Option<String>,
}

/// A literal term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// A string with optional language tag or datatype.
    Rdf(RdfLiteral),
    /// A numeric literal with its lexical form preserved.
    Numeric(NumericLiteral),
    /// `true` or `false`.
    Boolean(bool),
}

/// `String (LANGTAG | '^^' iri)?`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdfLiteral {
    /// The string part.
    pub value: TurtleString,
    /// Language tag or datatype, if any.
    pub suffix: Option<LiteralSuffix>,
}

/// The optional tail of an RDF literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralSuffix {
    /// `@lang` without the `@`.
    LanguageTag(String),
    /// `^^` followed by the datatype IRI.
    Datatype(Iri),
}

/// The four quote styles of Turtle strings.
///
/// Each carries the escape-normalized body: `ECHAR`s verbatim, `UCHAR`s
/// decoded and re-masked, raw characters that need masking already masked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurtleString {
    /// `"…"`
    Quote(String),
    /// `'…'`
    SingleQuote(String),
    /// `"""…"""`
    LongQuote(String),
    /// `'''…'''`
    LongSingleQuote(String),
}

impl TurtleString {
    /// The normalized body regardless of the quote style.
    pub fn body(&self) -> &str {
        match self {
            Self::Quote(body)
            | Self::SingleQuote(body)
            | Self::LongQuote(body)
            | Self::LongSingleQuote(body) => body,
        }
    }
}

/// `INTEGER`, `DECIMAL` or `DOUBLE`, lexical form kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumericLiteral {
    /// `[+-]? [0-9]+`
    Integer(String),
    /// `[+-]? [0-9]* '.' [0-9]+`
    Decimal(String),
    /// A form with an exponent.
    Double(String),
}

impl NumericLiteral {
    /// The lexical form as written in the source.
    pub fn lexical(&self) -> &str {
        match self {
            Self::Integer(lex) | Self::Decimal(lex) | Self::Double(lex) => lex,
        }
    }
}

/// `BLANK_NODE_LABEL` or `ANON`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlankNode {
    /// `_:label` without the `_:`.
    Label(String),
    /// `[ ]`
    Anon,
}

/// A parenthesized collection of objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection(pub Vec<Object>);

/// The graph position of a quad statement (TriG, N-Quads).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphLabel {
    /// A named graph.
    Iri(Iri),
    /// A blank-node graph.
    BlankNode(BlankNode),
}
