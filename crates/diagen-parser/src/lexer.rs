//! Lexical analyzer for Diagen source text.
//!
//! The lexer converts source text into a stream of [`Token`]s for parsing.
//! Spaces, tabs and comments are consumed between tokens and never reach the
//! token stream; newlines are significant because the grammar is
//! line-structured.
//!
//! The public entry point is [`tokenize`], which performs error-recovering
//! lexical analysis and collects all diagnostics in a single pass.

use winnow::{
    Parser as _,
    ascii::digit1,
    combinator::{alt, cut_err, not, opt, peek, preceded, repeat, terminated},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{any, literal, none_of, one_of, take_until, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{ELEMENT_KEYWORDS, PositionedToken, Token},
};

/// Rich diagnostic information for lexer errors.
///
/// Attached to winnow errors via `.context()` to provide detailed error
/// messages with codes, help text, and precise span information.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    pub code: ErrorCode,
    pub message: &'static str,
    pub help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    pub start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<'a, O> = ModalResult<O, ContextError<LexerDiagnostic>>;

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Piece of a string literal body.
enum StringFragment {
    Char(char),
    /// Escape with no special meaning, kept with its backslash.
    UnknownEscape(char),
}

/// Parse an escape sequence in a string starting with backslash.
///
/// `\"`, `\n` and `\\` are unescaped. Any other escaped character is kept
/// verbatim. A backslash at the end of the line or input is an error.
fn string_escape<'a>(input: &mut Input<'a>) -> IResult<'a, StringFragment> {
    let escape_start = input.current_token_start();

    '\\'.parse_next(input)?;

    if let Ok(c) = one_of::<_, _, ContextError<LexerDiagnostic>>(['"', 'n', '\\']).parse_next(input)
    {
        let unescaped = match c {
            'n' => '\n',
            other => other,
        };
        return Ok(StringFragment::Char(unescaped));
    }

    if let Ok(c) =
        none_of::<_, _, ContextError<LexerDiagnostic>>(['\n', '\r']).parse_next(input)
    {
        return Ok(StringFragment::UnknownEscape(c));
    }

    Err(ErrMode::Cut(ContextError::new().add_context(
        input,
        &input.checkpoint(),
        LexerDiagnostic {
            code: ErrorCode::E003,
            message: "invalid escape sequence",
            help: Some("a backslash must be followed by a character on the same line"),
            start: escape_start,
        },
    )))
}

/// Parse a double-quoted string literal.
///
/// Strings cannot span lines. The returned token holds the unescaped text.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let string_char = none_of(['"', '\\', '\n', '\r']).map(StringFragment::Char);

    let string_content =
        repeat(0.., alt((string_escape, string_char))).fold(String::new, |mut acc, fragment| {
            match fragment {
                StringFragment::Char(c) => acc.push(c),
                StringFragment::UnknownEscape(c) => {
                    acc.push('\\');
                    acc.push(c);
                }
            }
            acc
        });

    let start_pos = input.current_token_start();

    '"'.parse_next(input)?;

    // Committed after the opening quote; the span runs from it to the failure.
    cut_err(terminated(string_content, '"'))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add closing `\"` before the end of the line"),
            start: start_pos,
        })
        .parse_next(input)
        .map(Token::StringLiteral)
}

/// Parse a hex color: `#RRGGBB`
fn color_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    preceded('#', take_while(6, |c: char| c.is_ascii_hexdigit()))
        .take()
        .map(Token::Color)
        .parse_next(input)
}

/// Parse a signed percentage: `50%`, `+5%`, `-20%`
fn percent_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    terminated((opt(one_of(['+', '-'])), digit1).take(), '%')
        .verify_map(|digits: &str| digits.parse::<i64>().ok())
        .map(Token::Percent)
        .parse_next(input)
}

/// Parse a number: `42`, `-3`, `1.5`
///
/// A number directly followed by a letter or underscore is malformed.
fn number_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let start_pos = input.current_token_start();

    let value = (opt('-'), digit1, opt(('.', digit1)))
        .take()
        .verify_map(|text: &str| text.parse::<f64>().ok())
        .parse_next(input)?;

    cut_err(peek(not(one_of(|c: char| c.is_ascii_alphabetic() || c == '_'))))
        .context(LexerDiagnostic {
            code: ErrorCode::E004,
            message: "malformed number",
            help: Some("separate the number from the following name"),
            start: start_pos,
        })
        .parse_next(input)?;

    Ok(Token::Number(value))
}

/// Parse the text of an identifier.
///
/// Identifiers start with a letter or underscore. A hyphen continues the
/// identifier only when another identifier character follows it, so `A->B`
/// stays three tokens.
fn identifier_text<'a>(input: &mut Input<'a>) -> IResult<'a, &'a str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., is_ident_char),
        repeat::<_, _, (), _, _>(0.., ('-', take_while(1.., is_ident_char))),
    )
        .take()
        .parse_next(input)
}

/// Parse keywords and identifiers.
///
/// The whole word is read first, so keywords only match on a word boundary.
fn keyword_or_identifier<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    identifier_text
        .map(|word: &str| match word {
            "group" => Token::Group,
            "place" => Token::Place,
            "true" => Token::True,
            "false" => Token::False,
            _ if ELEMENT_KEYWORDS.iter().any(|keyword| *keyword == word) => Token::Element(word),
            _ => Token::Identifier(word),
        })
        .parse_next(input)
}

/// Parse document headers: `@diagram`, `@infographic`, `@page`
fn header<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    preceded('@', identifier_text)
        .verify_map(|word: &str| match word {
            "diagram" => Some(Token::AtDiagram),
            "infographic" => Some(Token::AtInfographic),
            "page" => Some(Token::AtPage),
            _ => None,
        })
        .parse_next(input)
}

/// Parse arrow operators (order matters - longest first)
fn arrow<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt((
        literal("<=>").value(Token::BoldBiArrow),
        literal("==>").value(Token::BoldArrow),
        literal("<-->").value(Token::DashedBiArrow),
        literal("-->").value(Token::DashedArrow),
        literal("<->").value(Token::BiArrow),
        literal("->").value(Token::Arrow),
    ))
    .parse_next(input)
}

/// Parse single character punctuation
fn punctuation<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt((
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
        ','.value(Token::Comma),
        ':'.value(Token::Colon),
        '.'.value(Token::Dot),
    ))
    .parse_next(input)
}

/// Parse newline, `\n` or `\r\n`
fn newline<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt(("\r\n", "\n")).value(Token::Newline).parse_next(input)
}

/// Parse one piece of trivia: spaces and tabs, a line comment, or a block comment.
///
/// An unterminated block comment runs to the end of the input.
fn trivia<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    alt((
        take_while(1.., [' ', '\t']).void(),
        preceded("//", take_while(0.., |c| c != '\n' && c != '\r')).void(),
        preceded(
            "/*",
            alt((
                terminated(take_until(0.., "*/"), "*/").void(),
                repeat::<_, _, (), _, _>(0.., any).void(),
            )),
        )
        .void(),
    ))
    .parse_next(input)
}

fn skip_trivia<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    repeat(0.., trivia).parse_next(input)
}

/// Parse a single token with position tracking
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<'a, PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        newline,
        literal("---").value(Token::MetaDelimiter), // Must come before arrows
        arrow,                                      // Must come before numbers (`-`)
        punctuation,
        header,
        color_literal,
        percent_literal, // Must come before numbers
        number_literal,
        string_literal,
        keyword_or_identifier,
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    let span = Span::new(start_pos..end_pos);

    Ok(PositionedToken::new(token, span))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Tokenize the input, collecting tokens and errors.
    fn tokenize(&mut self, mut input: Input<'a>) {
        loop {
            if let Err(e) = skip_trivia(&mut input) {
                let error_pos = input.current_token_start();
                self.diagnostics.emit(Self::convert_err_mode(e, error_pos));
            }
            if input.is_empty() {
                break;
            }

            match positioned_token(&mut input) {
                Ok(token) => {
                    self.tokens.push(token);
                }
                Err(e) => {
                    let error_pos = input.current_token_start();

                    let diagnostic = Self::convert_err_mode(e, error_pos);
                    self.diagnostics.emit(diagnostic);

                    if !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    /// Finish lexing and return tokens or collected errors.
    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish().map(|()| self.tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Extracts `LexerDiagnostic` from the error context for rich error info
    /// with code, message, and help. Falls back to E002 (unexpected character)
    /// if no diagnostic context is found.
    fn convert_err_mode(
        err: ErrMode<ContextError<LexerDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos);

            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description())
    }
}

/// Tokenize source text, collecting every lexical error.
///
/// After an error the offending character is skipped and lexing continues,
/// so one call reports all unrecognized characters.
///
/// # Returns
///
/// - `Ok(tokens)` - All tokens successfully lexed
/// - `Err(ParseError)` - One or more errors occurred; contains all diagnostics
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let located_input = LocatingSlice::new(input);
    let mut lexer = Lexer::new();
    lexer.tokenize(located_input);
    lexer.finish()
}
