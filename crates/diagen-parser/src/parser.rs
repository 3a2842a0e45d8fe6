//! Parser for Diagen source tokens.
//!
//! This module transforms a token stream from the [`lexer`](super::lexer) into
//! the concrete syntax tree defined in [`parser_types`](super::parser_types).
//! The public entry point is [`build_document`].
//!
//! The grammar is line-structured. Productions are plain winnow parsers over
//! a [`TokenSlice`]; the statement loops on top of them record a diagnostic
//! for a failing line, skip to the next newline and keep going, so a single
//! call reports every independent syntax error.

use winnow::{
    Parser as _,
    combinator::{alt, opt, preceded, repeat, separated},
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use diagen_core::ir::DocumentKind;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    parser_types as types,
    span::{Span, Spanned},
    tokens::{PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what is currently being parsed
    Label(&'static str),
    /// Remaining token count (`eof_offset()`) at error start position
    ///
    /// Used to calculate start_offset as: `tokens.len() - start_offset_value`
    StartOffset(usize),
    /// An opening delimiter that was never closed
    Unclosed(&'static str, Span),
}

type Input<'src> = DiagenTokenSlice<'src>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;
/// Type alias for winnow TokenSlice with our positioned tokens
type DiagenTokenSlice<'src> = TokenSlice<'src, PositionedToken<'src>>;

fn cut_err<'src, O, F>(input: &mut Input<'src>, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    let start_remaining = input.eof_offset();

    match f(input) {
        Ok(o) => Ok(o),
        Err(ErrMode::Backtrack(mut e)) | Err(ErrMode::Cut(mut e)) => {
            e.push(Context::StartOffset(start_remaining));
            Err(ErrMode::Cut(e))
        }
        Err(e) => Err(e),
    }
}

/// Helper to create a Backtrack error at the current token
fn backtrack_error_here<'src>(input: &Input<'src>, label: &'static str) -> ErrMode<ContextError<Context>> {
    let mut e = ContextError::new();
    e.push(Context::Label(label));
    e.push(Context::StartOffset(input.eof_offset()));
    ErrMode::Backtrack(e)
}

/// Peek at the token `n` positions ahead without consuming anything
fn lookahead<'src>(input: &Input<'src>, n: usize) -> Option<&'src Token<'src>> {
    let mut probe = input.clone();
    for _ in 0..n {
        probe.next_token()?;
    }
    probe.next_token().map(|token| &token.token)
}

/// Parse a token equal to `expected`, returning its span
fn punct<'src>(
    expected: Token<'static>,
    label: &'static str,
) -> impl FnMut(&mut Input<'src>) -> IResult<Span> {
    move |input: &mut Input<'src>| {
        any.verify_map(|token: &'src PositionedToken<'src>| {
            (token.token == expected).then_some(token.span)
        })
        .context(Context::Label(label))
        .parse_next(input)
    }
}

fn skip_newlines<'src>(input: &mut Input<'src>) {
    while matches!(lookahead(input, 0), Some(Token::Newline)) {
        input.next_token();
    }
}

/// Accept the end of a line-based construct.
///
/// A newline is consumed; a closing brace or the end of input is left for the
/// enclosing production.
fn line_end<'src>(input: &mut Input<'src>) -> IResult<()> {
    match lookahead(input, 0) {
        None | Some(Token::RightBrace) => Ok(()),
        Some(Token::Newline) => {
            input.next_token();
            Ok(())
        }
        Some(_) => Err(backtrack_error_here(input, "end of line")),
    }
}

/// Skip the rest of a broken line.
///
/// Braces opened on the skipped tokens are balanced, so a group whose header
/// failed is skipped as a whole. In a nested body an unmatched `}` stops the
/// skip and is left for the enclosing production.
fn skip_line<'src>(input: &mut Input<'src>, nested: bool) {
    let mut depth = 0usize;
    while let Some(token) = lookahead(input, 0) {
        match token {
            Token::Newline if depth == 0 => {
                input.next_token();
                return;
            }
            Token::LeftBrace => depth += 1,
            Token::RightBrace if depth == 0 && nested => return,
            Token::RightBrace => depth = depth.saturating_sub(1),
            _ => {}
        }
        input.next_token();
    }
}

/// Diagnostics accumulated while parsing, with the full token list for spans.
struct Recovery<'src> {
    tokens: &'src [PositionedToken<'src>],
    diagnostics: DiagnosticCollector,
}

impl<'src> Recovery<'src> {
    fn new(tokens: &'src [PositionedToken<'src>]) -> Self {
        Self {
            tokens,
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn report(
        &mut self,
        error: ErrMode<ContextError<Context>>,
        start_remaining: usize,
        input: &Input<'src>,
    ) {
        let diagnostic = convert_error(error, self.tokens, start_remaining, input.eof_offset());
        self.diagnostics.emit(diagnostic);
    }
}

/// Parse items line by line until the end of input, or until a closing brace
/// when `nested` is set.
///
/// Every item must be followed by the end of its line. A failing item is
/// reported and its line skipped.
fn recovering_loop<'src, T>(
    input: &mut Input<'src>,
    rec: &mut Recovery<'src>,
    nested: bool,
    mut item: impl FnMut(&mut Input<'src>, &mut Recovery<'src>) -> IResult<T>,
) -> Vec<T> {
    let mut items = Vec::new();

    loop {
        skip_newlines(input);

        let Some(token) = input.clone().next_token() else {
            break;
        };
        if token.token == Token::RightBrace {
            if nested {
                break;
            }
            rec.diagnostics.emit(
                Diagnostic::error("unexpected closing brace")
                    .with_code(ErrorCode::E102)
                    .with_label(token.span, "no open group or block")
                    .with_help("remove the `}` or open a block with `group name {`"),
            );
            input.next_token();
            continue;
        }

        let start_remaining = input.eof_offset();
        let result = item(input, rec).and_then(|value| {
            line_end(input)?;
            Ok(value)
        });

        match result {
            Ok(value) => items.push(value),
            Err(e) => {
                rec.report(e, start_remaining, input);
                skip_line(input, nested);
            }
        }
    }

    items
}

/// Parse a raw identifier string with span preservation
///
/// Keywords are accepted as identifiers here; statement dispatch decides
/// beforehand whether a keyword starts its own construct.
fn raw_identifier<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    any.verify_map(|token: &'src PositionedToken<'src>| match &token.token {
        Token::Identifier(name) => Some(Spanned::new(*name, token.span)),
        other => other
            .keyword_text()
            .map(|text| Spanned::new(text, token.span)),
    })
    .context(Context::Label("identifier"))
    .parse_next(input)
}

fn string_literal<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    any.verify_map(|token: &'src PositionedToken<'src>| match &token.token {
        Token::StringLiteral(s) => Some(Spanned::new(s.clone(), token.span)),
        _ => None,
    })
    .context(Context::Label("string literal"))
    .parse_next(input)
}

fn number_literal<'src>(input: &mut Input<'src>) -> IResult<Spanned<f64>> {
    any.verify_map(|token: &'src PositionedToken<'src>| match &token.token {
        Token::Number(n) => Some(Spanned::new(*n, token.span)),
        _ => None,
    })
    .context(Context::Label("number"))
    .parse_next(input)
}

fn color_literal<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    any.verify_map(|token: &'src PositionedToken<'src>| match &token.token {
        Token::Color(c) => Some(Spanned::new(*c, token.span)),
        _ => None,
    })
    .context(Context::Label("color"))
    .parse_next(input)
}

/// Parse a gradient call: `linear(#ff0000, #0000ff)`
///
/// Commits once the name is followed by `(`.
fn gradient<'src>(input: &mut Input<'src>) -> IResult<types::Value<'src>> {
    let name = raw_identifier.parse_next(input)?;
    punct(Token::LeftParen, "`(`").parse_next(input)?;

    cut_err(input, |input| {
        let from = color_literal.parse_next(input)?;
        punct(Token::Comma, "`,`").parse_next(input)?;
        let to = color_literal.parse_next(input)?;
        punct(Token::RightParen, "`)`").parse_next(input)?;
        Ok(types::Value::Gradient { name, from, to })
    })
    .map_err(|e| e.map(|mut ctx| {
        ctx.push(Context::Label("gradient"));
        ctx
    }))
}

/// Parse an array: `("a", 2 [color: #ff0000], #00ff00)`
fn array<'src>(input: &mut Input<'src>) -> IResult<Spanned<Vec<types::ArrayItem<'src>>>> {
    let open = punct(Token::LeftParen, "`(`").parse_next(input)?;

    cut_err(input, |input| {
        let items: Vec<types::ArrayItem<'src>> =
            separated(0.., array_item, punct(Token::Comma, "`,`")).parse_next(input)?;
        let close = punct(Token::RightParen, "`)`").parse_next(input)?;
        Ok(Spanned::new(items, open.union(close)))
    })
}

fn array_item<'src>(input: &mut Input<'src>) -> IResult<types::ArrayItem<'src>> {
    let value = value.parse_next(input)?;
    let attributes = opt(attributes).parse_next(input)?.unwrap_or_default();
    Ok(types::ArrayItem { value, attributes })
}

/// Parse a value: string, number, boolean, color, percentage, gradient,
/// array or bare identifier.
fn value<'src>(input: &mut Input<'src>) -> IResult<types::Value<'src>> {
    alt((
        gradient,
        array.map(types::Value::Array),
        any.verify_map(|token: &'src PositionedToken<'src>| {
            let span = token.span;
            match &token.token {
                Token::StringLiteral(s) => Some(types::Value::String(Spanned::new(s.clone(), span))),
                Token::Number(n) => Some(types::Value::Number(Spanned::new(*n, span))),
                Token::True => Some(types::Value::Bool(Spanned::new(true, span))),
                Token::False => Some(types::Value::Bool(Spanned::new(false, span))),
                Token::Color(c) => Some(types::Value::Color(Spanned::new(*c, span))),
                Token::Percent(p) => Some(types::Value::Percent(Spanned::new(*p, span))),
                _ => None,
            }
        }),
        raw_identifier.map(types::Value::Identifier),
    ))
    .context(Context::Label("value"))
    .parse_next(input)
}

/// Parse a single attribute: `name` or `name: value`
fn attribute<'src>(input: &mut Input<'src>) -> IResult<types::Attribute<'src>> {
    let name = raw_identifier.parse_next(input)?;

    let value = opt(preceded(punct(Token::Colon, "`:`"), |input: &mut Input<'src>| {
        cut_err(input, value)
    }))
    .parse_next(input)?;

    Ok(types::Attribute { name, value })
}

/// Parse an attribute list: `[cylinder, fill: #ffffff, label: "Db",]`
fn attributes<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Attribute<'src>>> {
    punct(Token::LeftBracket, "`[`").parse_next(input)?;

    cut_err(input, |input| {
        let attrs: Vec<types::Attribute<'src>> =
            separated(0.., attribute, punct(Token::Comma, "`,`")).parse_next(input)?;
        opt(punct(Token::Comma, "`,`")).parse_next(input)?;
        punct(Token::RightBracket, "`]`").parse_next(input)?;
        Ok(attrs)
    })
    .map_err(|e| e.map(|mut ctx| {
        ctx.push(Context::Label("attributes"));
        ctx
    }))
}

/// Parse a dotted path: `backend.api`
fn node_path<'src>(input: &mut Input<'src>) -> IResult<types::NodePath<'src>> {
    let first = raw_identifier.parse_next(input)?;
    let rest: Vec<Spanned<&'src str>> =
        repeat(0.., preceded(punct(Token::Dot, "`.`"), raw_identifier)).parse_next(input)?;

    let mut segments = Vec::with_capacity(rest.len() + 1);
    segments.push(first);
    segments.extend(rest);
    Ok(types::NodePath { segments })
}

/// Parse a reference inside a node list: `path (: port)?`
fn node_ref<'src>(input: &mut Input<'src>) -> IResult<types::NodeRef<'src>> {
    let path = node_path.parse_next(input)?;
    let port = opt(preceded(punct(Token::Colon, "`:`"), raw_identifier)).parse_next(input)?;
    Ok(types::NodeRef { path, port })
}

/// Parse a node definition: `path (: "label" | : port)? [attributes]?`
fn node_def<'src>(input: &mut Input<'src>) -> IResult<types::NodeDef<'src>> {
    let path = node_path.parse_next(input)?;

    let suffix = opt(preceded(
        punct(Token::Colon, "`:`"),
        alt((
            string_literal.map(types::NodeSuffix::Label),
            raw_identifier.map(types::NodeSuffix::Port),
        )),
    ))
    .parse_next(input)?;

    let attributes = opt(attributes).parse_next(input)?.unwrap_or_default();

    Ok(types::NodeDef {
        path,
        suffix,
        attributes,
    })
}

/// Parse a node set: `(A, B:port, group.C)` or a single node definition
fn node_set<'src>(input: &mut Input<'src>) -> IResult<types::NodeSet<'src>> {
    if matches!(lookahead(input, 0), Some(Token::LeftParen)) {
        punct(Token::LeftParen, "`(`").parse_next(input)?;
        return cut_err(input, |input| {
            let refs: Vec<types::NodeRef<'src>> =
                separated(1.., node_ref, punct(Token::Comma, "`,`")).parse_next(input)?;
            punct(Token::RightParen, "`)`").parse_next(input)?;
            Ok(types::NodeSet::List(refs))
        });
    }

    node_def
        .map(types::NodeSet::Single)
        .context(Context::Label("node"))
        .parse_next(input)
}

fn arrow_op<'src>(input: &mut Input<'src>) -> IResult<Spanned<types::ArrowOp>> {
    any.verify_map(|token: &'src PositionedToken<'src>| {
        let op = match token.token {
            Token::Arrow => types::ArrowOp::Arrow,
            Token::BiArrow => types::ArrowOp::BiArrow,
            Token::DashedArrow => types::ArrowOp::DashedArrow,
            Token::DashedBiArrow => types::ArrowOp::DashedBiArrow,
            Token::BoldArrow => types::ArrowOp::BoldArrow,
            Token::BoldBiArrow => types::ArrowOp::BoldBiArrow,
            _ => return None,
        };
        Some(Spanned::new(op, token.span))
    })
    .context(Context::Label("arrow"))
    .parse_next(input)
}

/// Parse one hop of an edge chain: `-> target (: "label")?`
///
/// A node set is required once the arrow has been read.
fn edge_hop<'src>(input: &mut Input<'src>) -> IResult<types::EdgeHop<'src>> {
    let arrow = arrow_op.parse_next(input)?;

    cut_err(input, |input| {
        let target = node_set.parse_next(input)?;
        let label = opt(preceded(punct(Token::Colon, "`:`"), string_literal)).parse_next(input)?;
        Ok(types::EdgeHop {
            arrow,
            target,
            label,
        })
    })
}

fn node_or_edge_statement<'src>(input: &mut Input<'src>) -> IResult<types::NodeOrEdgeStatement<'src>> {
    let head = node_set.parse_next(input)?;
    let chain: Vec<types::EdgeHop<'src>> = repeat(0.., edge_hop).parse_next(input)?;
    Ok(types::NodeOrEdgeStatement { head, chain })
}

/// Parse a group: `group id [attributes]? { body }`
fn group_def<'src>(
    input: &mut Input<'src>,
    rec: &mut Recovery<'src>,
) -> IResult<types::GroupDef<'src>> {
    punct(Token::Group, "`group`").parse_next(input)?;

    cut_err(input, |input| {
        let id = raw_identifier.parse_next(input)?;
        let attributes = opt(attributes).parse_next(input)?.unwrap_or_default();
        let open = punct(Token::LeftBrace, "`{`").parse_next(input)?;

        let body = body(input, rec, true);

        punct(Token::RightBrace, "`}`")
            .context(Context::Unclosed("group opened here", open))
            .parse_next(input)?;

        Ok(types::GroupDef {
            id,
            attributes,
            body,
        })
    })
}

/// Parse a placement: `[x, y, width, height]`
fn placement<'src>(input: &mut Input<'src>) -> IResult<Spanned<types::Placement>> {
    let open = punct(Token::LeftBracket, "`[`").parse_next(input)?;

    cut_err(input, |input| {
        let x = number_literal.parse_next(input)?;
        punct(Token::Comma, "`,`").parse_next(input)?;
        let y = number_literal.parse_next(input)?;
        punct(Token::Comma, "`,`").parse_next(input)?;
        let width = number_literal.parse_next(input)?;
        punct(Token::Comma, "`,`").parse_next(input)?;
        let height = number_literal.parse_next(input)?;
        let close = punct(Token::RightBracket, "`]`").parse_next(input)?;

        let placement = types::Placement {
            x: *x,
            y: *y,
            width: *width,
            height: *height,
        };
        Ok(Spanned::new(placement, open.union(close)))
    })
}

/// Parse a page placement: `place [x, y, w, h] { document }`
fn place_def<'src>(
    input: &mut Input<'src>,
    rec: &mut Recovery<'src>,
) -> IResult<types::PlaceDef<'src>> {
    punct(Token::Place, "`place`").parse_next(input)?;

    cut_err(input, |input| {
        let placement = placement.parse_next(input)?;
        let open = punct(Token::LeftBrace, "`{`").parse_next(input)?;

        let document = document(input, rec, true);

        punct(Token::RightBrace, "`}`")
            .context(Context::Unclosed("place block opened here", open))
            .parse_next(input)?;

        Ok(types::PlaceDef {
            placement,
            document: Box::new(document),
        })
    })
}

/// Check whether the upcoming line inside an element block is a property.
///
/// A string key is always a property. An identifier key followed by `:` is
/// a property when the colon is followed by a literal value or `(`, or by an
/// identifier that ends the line or starts an attribute list. Anything else
/// is a node or edge statement.
fn is_block_property<'src>(input: &Input<'src>) -> bool {
    match lookahead(input, 0) {
        Some(Token::StringLiteral(_)) => true,
        Some(Token::Identifier(_)) => {
            if !matches!(lookahead(input, 1), Some(Token::Colon)) {
                return false;
            }
            match lookahead(input, 2) {
                Some(
                    Token::StringLiteral(_)
                    | Token::Number(_)
                    | Token::Color(_)
                    | Token::Percent(_)
                    | Token::True
                    | Token::False
                    | Token::LeftParen,
                ) => true,
                Some(Token::Identifier(_)) => matches!(
                    lookahead(input, 3),
                    Some(Token::Newline | Token::LeftBracket)
                ),
                _ => false,
            }
        }
        _ => false,
    }
}

/// Parse a block property: `key: value [attributes]?`
fn block_property<'src>(input: &mut Input<'src>) -> IResult<()> {
    alt((string_literal.void(), raw_identifier.void())).parse_next(input)?;

    cut_err(input, |input| {
        punct(Token::Colon, "`:`").parse_next(input)?;
        value.parse_next(input)?;
        opt(attributes).parse_next(input)?;
        Ok(())
    })
}

fn starts_element_def<'src>(input: &Input<'src>) -> bool {
    matches!(lookahead(input, 0), Some(Token::Element(_)))
        && matches!(lookahead(input, 1), Some(Token::StringLiteral(_)))
}

fn block_entry<'src>(
    input: &mut Input<'src>,
    rec: &mut Recovery<'src>,
) -> IResult<types::BlockEntry> {
    if starts_element_def(input) {
        element_def(input, rec).map(|_| types::BlockEntry::Element)
    } else if is_block_property(input) {
        block_property(input).map(|()| types::BlockEntry::Property)
    } else {
        node_or_edge_statement(input).map(|_| types::BlockEntry::Statement)
    }
}

/// Parse an element definition: `step "Design" [color: #4A90D9] { ... }`
fn element_def<'src>(
    input: &mut Input<'src>,
    rec: &mut Recovery<'src>,
) -> IResult<types::ElementDef<'src>> {
    let keyword = any
        .verify_map(|token: &'src PositionedToken<'src>| match &token.token {
            Token::Element(keyword) => Some(Spanned::new(*keyword, token.span)),
            _ => None,
        })
        .context(Context::Label("element keyword"))
        .parse_next(input)?;

    cut_err(input, |input| {
        let id = string_literal.parse_next(input)?;
        opt(attributes).parse_next(input)?;

        let block = if matches!(lookahead(input, 0), Some(Token::LeftBrace)) {
            let open = punct(Token::LeftBrace, "`{`").parse_next(input)?;
            let entries = recovering_loop(input, rec, true, block_entry);
            punct(Token::RightBrace, "`}`")
                .context(Context::Unclosed("block opened here", open))
                .parse_next(input)?;
            Some(entries)
        } else {
            None
        };

        Ok(types::ElementDef { keyword, id, block })
    })
}

fn statement<'src>(
    input: &mut Input<'src>,
    rec: &mut Recovery<'src>,
) -> IResult<types::Statement<'src>> {
    match lookahead(input, 0) {
        Some(Token::Group) => group_def(input, rec).map(types::Statement::Group),
        Some(Token::Place) => place_def(input, rec).map(types::Statement::Place),
        _ if starts_element_def(input) => element_def(input, rec).map(types::Statement::Element),
        _ => node_or_edge_statement
            .context(Context::Label("statement"))
            .parse_next(input)
            .map(types::Statement::NodeOrEdge),
    }
}

fn body<'src>(
    input: &mut Input<'src>,
    rec: &mut Recovery<'src>,
    nested: bool,
) -> Vec<types::Statement<'src>> {
    recovering_loop(input, rec, nested, statement)
}

/// Parse a document header: `@diagram flowchart`, `@infographic`, `@page`
fn header<'src>(input: &mut Input<'src>) -> IResult<types::Header<'src>> {
    let kind = any
        .verify_map(|token: &'src PositionedToken<'src>| {
            let kind = match token.token {
                Token::AtDiagram => DocumentKind::Diagram,
                Token::AtInfographic => DocumentKind::Infographic,
                Token::AtPage => DocumentKind::Page,
                _ => return None,
            };
            Some(Spanned::new(kind, token.span))
        })
        .context(Context::Label("document header (`@diagram`, `@infographic` or `@page`)"))
        .parse_next(input)?;

    let subtype = if *kind.inner() == DocumentKind::Page {
        None
    } else {
        opt(raw_identifier).parse_next(input)?
    };

    Ok(types::Header { kind, subtype })
}

fn meta_property<'src>(input: &mut Input<'src>) -> IResult<types::MetaProperty<'src>> {
    let key = raw_identifier.parse_next(input)?;

    cut_err(input, |input| {
        punct(Token::Colon, "`:`").parse_next(input)?;
        let value = value.parse_next(input)?;
        Ok(types::MetaProperty { key, value })
    })
}

/// Parse the `---` delimited metadata block.
///
/// The opening delimiter has already been seen by the caller.
fn meta_block<'src>(
    input: &mut Input<'src>,
    rec: &mut Recovery<'src>,
    nested: bool,
) -> Vec<types::MetaProperty<'src>> {
    let mut properties = Vec::new();

    let start_remaining = input.eof_offset();
    let opened = punct(Token::MetaDelimiter, "`---`")
        .parse_next(input)
        .and_then(|span| line_end(input).map(|()| span));
    let open = match opened {
        Ok(span) => span,
        Err(e) => {
            rec.report(e, start_remaining, input);
            skip_line(input, nested);
            return properties;
        }
    };

    loop {
        skip_newlines(input);
        let start_remaining = input.eof_offset();

        match lookahead(input, 0) {
            Some(Token::MetaDelimiter) => {
                input.next_token();
                if let Err(e) = line_end(input) {
                    rec.report(e, start_remaining, input);
                    skip_line(input, nested);
                }
                return properties;
            }
            None | Some(Token::RightBrace) => {
                let e = backtrack_error_here(input, "closing `---`");
                let e = e.map(|mut ctx| {
                    ctx.push(Context::Unclosed("metadata opened here", open));
                    ctx
                });
                rec.report(e, start_remaining, input);
                return properties;
            }
            _ => {}
        }

        let result = meta_property(input).and_then(|property| {
            line_end(input)?;
            Ok(property)
        });
        match result {
            Ok(property) => properties.push(property),
            Err(e) => {
                rec.report(e, start_remaining, input);
                skip_line(input, nested);
            }
        }
    }
}

/// Parse a document: `NEWLINE* header metaBlock? body`
///
/// A broken header is reported and parsing continues with the rest of the
/// document so later errors are reported too.
fn document<'src>(
    input: &mut Input<'src>,
    rec: &mut Recovery<'src>,
    nested: bool,
) -> types::Document<'src> {
    skip_newlines(input);

    let start_remaining = input.eof_offset();
    let header = match header(input).and_then(|header| {
        line_end(input)?;
        Ok(header)
    }) {
        Ok(header) => header,
        Err(e) => {
            rec.report(e, start_remaining, input);
            skip_line(input, nested);
            types::Header {
                kind: Spanned::new(DocumentKind::Diagram, Span::default()),
                subtype: None,
            }
        }
    };

    skip_newlines(input);
    let meta = if matches!(lookahead(input, 0), Some(Token::MetaDelimiter)) {
        meta_block(input, rec, nested)
    } else {
        Vec::new()
    };

    let body = body(input, rec, nested);

    types::Document { header, meta, body }
}

/// Build the error span from token positions.
fn error_span(tokens: &[PositionedToken], start_offset: usize, end_offset: usize) -> Span {
    if tokens.is_empty() {
        return Span::default();
    }

    let examine_range = if start_offset < end_offset {
        // Parser consumed tokens - examine that range
        start_offset..end_offset.min(tokens.len())
    } else if end_offset < tokens.len() {
        // At a specific token without consuming - examine just that token
        end_offset..end_offset + 1
    } else {
        // EOF - point at the last token
        tokens.len() - 1..tokens.len()
    };

    let slice = &tokens[examine_range];
    let Some(fallback) = slice.first() else {
        return Span::default();
    };
    let first = slice
        .iter()
        .find(|t| !matches!(t.token, Token::Newline))
        .map(|t| t.span)
        .unwrap_or(fallback.span);
    let last = slice
        .iter()
        .rev()
        .find(|t| !matches!(t.token, Token::Newline))
        .map(|t| t.span)
        .unwrap_or(fallback.span);
    first.union(last)
}

/// Empty span at the end of the last token.
fn eof_span(tokens: &[PositionedToken]) -> Span {
    tokens
        .last()
        .map(|token| Span::new(token.span.end()..token.span.end()))
        .unwrap_or_default()
}

fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken],
    fallback_start_remaining: usize,
    current_remaining: usize,
) -> Diagnostic {
    // Extract start offset from error context if available
    let start_remaining = match &error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.context().find_map(|ctx| match ctx {
            Context::StartOffset(n) => Some(*n),
            _ => None,
        }),
        _ => None,
    }
    .unwrap_or(fallback_start_remaining);

    // Calculate offsets from remaining token counts
    let end_offset = tokens.len().saturating_sub(current_remaining);
    let start_offset = tokens.len().saturating_sub(start_remaining);

    match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => {
            let contexts: Vec<String> = e
                .context()
                .filter_map(|ctx| match ctx {
                    Context::Label(label) => Some(format!("expected {label}")),
                    _ => None,
                })
                .collect();

            let message = if contexts.is_empty() {
                "unexpected token or end of input".to_string()
            } else {
                contexts.join(" → ")
            };

            let unclosed: Vec<(&str, Span)> = e
                .context()
                .filter_map(|ctx| match ctx {
                    Context::Unclosed(label, open) => Some((*label, *open)),
                    _ => None,
                })
                .collect();

            // An unclosed delimiter is reported where the closer was expected.
            let mut diagnostic = if current_remaining == 0 && !unclosed.is_empty() {
                Diagnostic::error(format!("unexpected end of input: {message}"))
                    .with_code(ErrorCode::E100)
                    .with_label(eof_span(tokens), "input ends here")
                    .with_help("close every `{` and `---` block before the end of the file")
            } else {
                let span = error_span(tokens, start_offset, end_offset);
                Diagnostic::error(format!("unexpected token: {message}"))
                    .with_code(ErrorCode::E100)
                    .with_label(span, "unexpected token")
                    .with_help("check syntax and token positioning")
            };

            for (label, open) in unclosed {
                diagnostic = diagnostic.with_secondary_label(open, label);
            }
            diagnostic
        }
        ErrMode::Incomplete(_) => {
            // This should not happen as we are not supporting streaming input.
            let span = error_span(tokens, end_offset, end_offset);
            Diagnostic::error("incomplete input, more tokens expected")
                .with_code(ErrorCode::E101)
                .with_label(span, "incomplete")
                .with_help("ensure input is complete")
        }
    }
}

/// Build a document from tokens
///
/// All syntax errors found while recovering line by line are returned
/// together.
pub fn build_document<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<types::Document<'src>, ParseError> {
    let mut input = TokenSlice::new(tokens);
    let mut rec = Recovery::new(tokens);

    let document = document(&mut input, &mut rec, false);

    rec.diagnostics.finish().map(|()| document)
}
