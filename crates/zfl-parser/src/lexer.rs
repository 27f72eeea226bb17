//! Lexical analyzer for ZFL source text.
//!
//! The lexer converts source text into a stream of [`Token`]s for parsing.
//! It never gives up: an unrecognized character is reported and skipped, and
//! lexing resumes at the next character so one pass reports every problem.

use winnow::{
    Parser as _,
    ascii::float,
    combinator::{alt, cut_err, not, peek, preceded, repeat, terminated},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{literal, none_of, one_of, take_until, take_while},
};

use zfl_core::{
    diagnostic::{Diagnostic, DiagnosticCollector, ErrorCode},
    span::Span,
};

use crate::tokens::{PositionedToken, Token};

/// Diagnostic details attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// Parse an escape sequence after the opening backslash.
fn string_escape(input: &mut Input<'_>) -> IResult<char> {
    let escape_start = input.current_token_start();
    '\\'.parse_next(input)?;

    let escaped: IResult<char> = one_of(['n', 'r', 't', '\\', '/', '\'', '"', '0'])
        .map(|c| match c {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            '0' => '\0',
            other => other,
        })
        .parse_next(input);

    match escaped {
        Ok(ch) => Ok(ch),
        Err(_) => Err(ErrMode::Cut(ContextError::new().add_context(
            input,
            &input.checkpoint(),
            LexerDiagnostic {
                code: ErrorCode::E003,
                message: "invalid escape sequence",
                help: Some("valid escapes: `\\n`, `\\r`, `\\t`, `\\\\`, `\\/`, `\\'`, `\\\"`, `\\0`"),
                start: escape_start,
            },
        ))),
    }
}

/// Parse a double-quoted string literal.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let string_content = repeat(0.., alt((string_escape, none_of(['"', '\\', '\n', '\r']))))
        .fold(String::new, |mut acc, ch| {
            acc.push(ch);
            acc
        });

    let start = input.current_token_start();
    '"'.parse_next(input)?;

    // Committed after the opening quote so the error spans from it.
    cut_err(terminated(string_content, '"'))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add closing `\"`"),
            start,
        })
        .parse_next(input)
        .map(Token::StringLiteral)
}

/// Parse a number. Must start with a digit or sign so `inf`/`nan` stay identifiers.
fn number_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    (
        peek(one_of(|c: char| c.is_ascii_digit() || c == '-' || c == '+')),
        float,
        peek(not(one_of(|c: char| c.is_alphanumeric() || c == '_'))),
    )
        .map(|(_, value, _)| Token::NumberLiteral(value))
        .parse_next(input)
}

/// Body of a `/* */` style comment after its opening delimiter.
fn comment_body<'a>(input: &mut Input<'a>, start: usize) -> IResult<&'a str> {
    cut_err(terminated(take_until(0.., "*/"), "*/"))
        .context(LexerDiagnostic {
            code: ErrorCode::E004,
            message: "unterminated comment",
            help: Some("add closing `*/`"),
            start,
        })
        .parse_next(input)
}

/// Parse a `/** ... */` doc comment. `/**/` is an empty block comment instead.
fn doc_comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    ("/**", peek(not('/'))).parse_next(input)?;
    comment_body(input, start).map(Token::DocComment)
}

fn block_comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    "/*".parse_next(input)?;
    comment_body(input, start).map(Token::BlockComment)
}

fn line_comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    preceded("//", take_while(0.., |c| c != '\n'))
        .map(Token::LineComment)
        .parse_next(input)
}

/// Parse keywords with word boundary checking.
///
/// `commands` precedes `command`: a matched alternative is never retried.
fn keyword<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    terminated(
        alt((
            literal("flow"),
            literal("systems"),
            literal("service"),
            literal("commands"),
            literal("command"),
            literal("start"),
            literal("when"),
            literal("and"),
            literal("event"),
            literal("end"),
            literal("import"),
            literal("config"),
        )),
        peek(not(one_of(|c: char| c.is_ascii_alphanumeric() || c == '_'))),
    )
    .map(|keyword: &str| match keyword {
        "flow" => Token::Flow,
        "systems" => Token::Systems,
        "service" => Token::Service,
        "commands" => Token::Commands,
        "command" => Token::Command,
        "start" => Token::Start,
        "when" => Token::When,
        "and" => Token::And,
        "event" => Token::Event,
        "end" => Token::End,
        "import" => Token::Import,
        "config" => Token::Config,
        _ => unreachable!(),
    })
    .parse_next(input)
}

fn identifier<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_')
        .verify(|s: &str| {
            s.chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        })
        .map(Token::Identifier)
        .parse_next(input)
}

fn single_char_token<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        '@'.value(Token::At),
        ':'.value(Token::Colon),
        ','.value(Token::Comma),
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
    ))
    .parse_next(input)
}

/// Spaces, tabs and carriage returns; newlines are separate tokens.
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .value(Token::Whitespace)
        .parse_next(input)
}

fn newline<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    '\n'.value(Token::Newline).parse_next(input)
}

/// Parse a single token with position tracking.
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<PositionedToken<'a>> {
    let start = input.current_token_start();

    let token = alt((
        doc_comment,    // Must come before block comment
        block_comment,  // Must come before line comment
        line_comment,
        string_literal,
        keyword,        // Must come before identifier
        number_literal, // Must come before identifier
        identifier,
        single_char_token,
        newline, // Must come before whitespace
        whitespace,
    ))
    .parse_next(input)?;

    let end = input.current_token_start();
    Ok(PositionedToken::new(token, Span::new(start..end)))
}

/// Accumulates tokens and diagnostics during tokenization.
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

    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            match positioned_token(&mut input) {
                Ok(token) => self.tokens.push(token),
                Err(err) => {
                    let error_pos = input.current_token_start();
                    self.diagnostics.emit(Self::convert_err_mode(err, error_pos));

                    // Skip one character and resume.
                    if !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    fn finish(self) -> (Vec<PositionedToken<'a>>, Vec<Diagnostic>) {
        (self.tokens, self.diagnostics.finish())
    }

    /// Falls back to E002 (unexpected character) when no context is attached.
    fn convert_err_mode(err: ErrMode<ContextError<LexerDiagnostic>>, error_pos: usize) -> Diagnostic {
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
            if let Some(help) = help {
                diag = diag.with_help(*help);
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
/// Never fails: the returned diagnostics describe skipped input, and the
/// token stream holds everything that could be recognized.
pub fn tokenize(input: &str) -> (Vec<PositionedToken<'_>>, Vec<Diagnostic>) {
    let mut lexer = Lexer::new();
    lexer.tokenize(LocatingSlice::new(input));
    lexer.finish()
}
