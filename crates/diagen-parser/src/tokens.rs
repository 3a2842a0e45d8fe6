use std::fmt;

use winnow::stream::Location;

use crate::span::Span;

/// Keywords reserved for infographic elements.
pub const ELEMENT_KEYWORDS: [&str; 25] = [
    "item",
    "data",
    "series",
    "point",
    "step",
    "stage",
    "level",
    "cell",
    "ring",
    "layer",
    "phase",
    "member",
    "actor",
    "system",
    "container",
    "component",
    "source",
    "transform",
    "sink",
    "region",
    "vpc",
    "subnet",
    "resource",
    "external",
    "nlayer",
];

/// Token types for the Diagen language
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // Document headers
    AtDiagram,
    AtInfographic,
    AtPage,

    // Keywords
    Group,
    Place,
    True,
    False,
    /// One of [`ELEMENT_KEYWORDS`].
    Element(&'src str),

    // Literals
    Color(&'src str),
    Percent(i64),
    Number(f64),
    StringLiteral(String),
    Identifier(&'src str),

    // Arrows
    Arrow,         // ->
    BiArrow,       // <->
    DashedArrow,   // -->
    DashedBiArrow, // <-->
    BoldArrow,     // ==>
    BoldBiArrow,   // <=>

    // Punctuation
    MetaDelimiter, // ---
    LeftBracket,   // [
    RightBracket,  // ]
    LeftBrace,     // {
    RightBrace,    // }
    LeftParen,     // (
    RightParen,    // )
    Comma,         // ,
    Colon,         // :
    Dot,           // .

    Newline,
}

impl Token<'_> {
    /// Returns the keyword text for tokens that may double as identifiers.
    pub fn keyword_text(&self) -> Option<&str> {
        match self {
            Token::Element(keyword) => Some(keyword),
            Token::Group => Some("group"),
            Token::Place => Some("place"),
            _ => None,
        }
    }
}

/// A token with position information for winnow integration
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl<'src> fmt::Display for PositionedToken<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}

impl<'src> Location for PositionedToken<'src> {
    fn previous_token_end(&self) -> usize {
        self.span.start()
    }

    fn current_token_start(&self) -> usize {
        self.span.start()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::AtDiagram => write!(f, "@diagram"),
            Token::AtInfographic => write!(f, "@infographic"),
            Token::AtPage => write!(f, "@page"),

            Token::Group => write!(f, "group"),
            Token::Place => write!(f, "place"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Element(keyword) => write!(f, "{keyword}"),

            Token::Color(color) => write!(f, "{color}"),
            Token::Percent(p) => write!(f, "{p}%"),
            Token::Number(n) => write!(f, "{n}"),
            Token::StringLiteral(s) => write!(f, "\"{s}\""),
            Token::Identifier(name) => write!(f, "{name}"),

            Token::Arrow => write!(f, "->"),
            Token::BiArrow => write!(f, "<->"),
            Token::DashedArrow => write!(f, "-->"),
            Token::DashedBiArrow => write!(f, "<-->"),
            Token::BoldArrow => write!(f, "==>"),
            Token::BoldBiArrow => write!(f, "<=>"),

            Token::MetaDelimiter => write!(f, "---"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Colon => write!(f, ":"),
            Token::Dot => write!(f, "."),

            Token::Newline => write!(f, "\\n"),
        }
    }
}
