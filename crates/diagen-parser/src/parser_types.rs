//! Concrete syntax tree produced by the parser.
//!
//! Leaf values are wrapped in [`Spanned`]; composite nodes derive their span
//! from their parts when needed. The tree is consumed once by the IR builder.

use std::fmt;

use diagen_core::{ir::DocumentKind, style::LineType};

use crate::span::{Span, Spanned};

/// A whole source file or the body of a `place` block.
#[derive(Debug)]
pub struct Document<'src> {
    pub header: Header<'src>,
    pub meta: Vec<MetaProperty<'src>>,
    pub body: Vec<Statement<'src>>,
}

/// `@diagram subtype`, `@infographic subtype` or `@page`
#[derive(Debug)]
pub struct Header<'src> {
    pub kind: Spanned<DocumentKind>,
    pub subtype: Option<Spanned<&'src str>>,
}

/// `key: value` line inside the `---` block.
#[derive(Debug)]
pub struct MetaProperty<'src> {
    pub key: Spanned<&'src str>,
    pub value: Value<'src>,
}

/// Literal value as written in the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'src> {
    String(Spanned<String>),
    Number(Spanned<f64>),
    Bool(Spanned<bool>),
    Color(Spanned<&'src str>),
    Percent(Spanned<i64>),
    /// `name(#from, #to)`
    Gradient {
        name: Spanned<&'src str>,
        from: Spanned<&'src str>,
        to: Spanned<&'src str>,
    },
    Array(Spanned<Vec<ArrayItem<'src>>>),
    Identifier(Spanned<&'src str>),
}

impl Value<'_> {
    pub fn span(&self) -> Span {
        match self {
            Value::String(s) => s.span(),
            Value::Number(n) => n.span(),
            Value::Bool(b) => b.span(),
            Value::Color(c) | Value::Identifier(c) => c.span(),
            Value::Percent(p) => p.span(),
            Value::Gradient { name, to, .. } => name.span().union(to.span()),
            Value::Array(items) => items.span(),
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "\"{}\"", s.inner()),
            Value::Number(n) => write!(f, "{}", n.inner()),
            Value::Bool(b) => write!(f, "{}", b.inner()),
            Value::Color(c) | Value::Identifier(c) => write!(f, "{}", c.inner()),
            Value::Percent(p) => write!(f, "{}%", p.inner()),
            Value::Gradient { name, from, to } => write!(f, "{name}({from}, {to})"),
            Value::Array(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item.value)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Entry of an array value.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayItem<'src> {
    pub value: Value<'src>,
    pub attributes: Vec<Attribute<'src>>,
}

/// `name` or `name: value` inside `[...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute<'src> {
    pub name: Spanned<&'src str>,
    pub value: Option<Value<'src>>,
}

impl Attribute<'_> {
    pub fn span(&self) -> Span {
        match &self.value {
            Some(value) => self.name.span().union(value.span()),
            None => self.name.span(),
        }
    }
}

#[derive(Debug)]
pub enum Statement<'src> {
    NodeOrEdge(NodeOrEdgeStatement<'src>),
    Group(GroupDef<'src>),
    Place(PlaceDef<'src>),
    Element(ElementDef<'src>),
}

/// A node set optionally followed by an edge chain.
#[derive(Debug)]
pub struct NodeOrEdgeStatement<'src> {
    pub head: NodeSet<'src>,
    pub chain: Vec<EdgeHop<'src>>,
}

/// One `arrow target (: "label")?` step of an edge chain.
#[derive(Debug)]
pub struct EdgeHop<'src> {
    pub arrow: Spanned<ArrowOp>,
    pub target: NodeSet<'src>,
    pub label: Option<Spanned<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowOp {
    Arrow,
    BiArrow,
    DashedArrow,
    DashedBiArrow,
    BoldArrow,
    BoldBiArrow,
}

impl ArrowOp {
    pub fn line_type(&self) -> LineType {
        match self {
            ArrowOp::Arrow | ArrowOp::BiArrow => LineType::Solid,
            ArrowOp::DashedArrow | ArrowOp::DashedBiArrow => LineType::Dashed,
            ArrowOp::BoldArrow | ArrowOp::BoldBiArrow => LineType::Bold,
        }
    }

    pub fn is_bidirectional(&self) -> bool {
        matches!(
            self,
            ArrowOp::BiArrow | ArrowOp::DashedBiArrow | ArrowOp::BoldBiArrow
        )
    }
}

impl fmt::Display for ArrowOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ArrowOp::Arrow => "->",
            ArrowOp::BiArrow => "<->",
            ArrowOp::DashedArrow => "-->",
            ArrowOp::DashedBiArrow => "<-->",
            ArrowOp::BoldArrow => "==>",
            ArrowOp::BoldBiArrow => "<=>",
        };
        f.write_str(text)
    }
}

/// Either a single node definition or a parenthesized list of references.
#[derive(Debug)]
pub enum NodeSet<'src> {
    Single(NodeDef<'src>),
    List(Vec<NodeRef<'src>>),
}

/// Dotted path such as `backend.api`.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePath<'src> {
    pub segments: Vec<Spanned<&'src str>>,
}

impl NodePath<'_> {
    /// The segments joined with `.`.
    pub fn joined(&self) -> String {
        self.segments
            .iter()
            .map(|segment| *segment.inner())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// The first segment.
    pub fn first(&self) -> &str {
        self.segments.first().map(|s| *s.inner()).unwrap_or_default()
    }
}

/// Reference inside `( ... )`: `path (: port)?`
#[derive(Debug)]
pub struct NodeRef<'src> {
    pub path: NodePath<'src>,
    pub port: Option<Spanned<&'src str>>,
}

/// What follows the `:` of a node definition.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeSuffix<'src> {
    Label(Spanned<String>),
    Port(Spanned<&'src str>),
}

/// `path (: "label" | : port)? [attributes]?`
#[derive(Debug)]
pub struct NodeDef<'src> {
    pub path: NodePath<'src>,
    pub suffix: Option<NodeSuffix<'src>>,
    pub attributes: Vec<Attribute<'src>>,
}

/// `group id [attributes] { body }`
#[derive(Debug)]
pub struct GroupDef<'src> {
    pub id: Spanned<&'src str>,
    pub attributes: Vec<Attribute<'src>>,
    pub body: Vec<Statement<'src>>,
}

/// `[x, y, width, height]` of a `place` block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// `place [x, y, w, h] { document }`
#[derive(Debug)]
pub struct PlaceDef<'src> {
    pub placement: Spanned<Placement>,
    pub document: Box<Document<'src>>,
}

/// `keyword "id" [attributes] { entries }` of the infographic sub-language.
///
/// Infographic elements produce no IR, so only the header is kept. The
/// attributes and the entries are checked for syntax, then dropped; the
/// block records what kind of line each entry was.
#[derive(Debug)]
pub struct ElementDef<'src> {
    pub keyword: Spanned<&'src str>,
    pub id: Spanned<String>,
    pub block: Option<Vec<BlockEntry>>,
}

/// Kind of a line inside an element block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockEntry {
    /// A nested `keyword "id" ...` element.
    Element,
    /// `key: value [attributes]`
    Property,
    /// A node or edge statement.
    Statement,
}
