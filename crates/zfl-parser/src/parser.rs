//! Token-level parser for ZFL documents.
//!
//! The parser never fails as a whole: a broken top-level item or flow member
//! is recorded as an error node carrying a [`Diagnostic`], and parsing resumes
//! at the next token that can start a new item or member.

use winnow::{
    Parser as _,
    combinator::{opt, repeat, separated},
    error::{ContextError, ErrMode},
    stream::{Location, Stream, TokenSlice},
    token::any,
};

use zfl_core::{
    diagnostic::{Diagnostic, ErrorCode},
    span::{Span, Spanned},
};

use crate::{
    parser_types as types,
    tokens::{PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Construct being parsed when the error occurred
    Label(&'static str),
    /// Token or construct the parser expected at the error position
    Expected(&'static str),
}

type Input<'src> = ZflTokenSlice<'src>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;
type ZflTokenSlice<'src> = TokenSlice<'src, PositionedToken<'src>>;

/// Run `f` and turn any backtrack into a cut labelled with `label`.
fn cut_err<'src, O, F>(input: &mut Input<'src>, label: &'static str, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    match f(input) {
        Ok(o) => Ok(o),
        Err(ErrMode::Backtrack(mut e)) | Err(ErrMode::Cut(mut e)) => {
            e.push(Context::Label(label));
            Err(ErrMode::Cut(e))
        }
        Err(e) => Err(e),
    }
}

fn expected_error(expected: &'static str) -> ErrMode<ContextError<Context>> {
    let mut e = ContextError::new();
    e.push(Context::Expected(expected));
    ErrMode::Backtrack(e)
}

/// Parse whitespace, newlines, or comments (including doc comments)
fn ws_comment<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| token.token.is_trivia())
        .void()
        .parse_next(input)
}

/// Parse zero or more whitespace/comments
fn ws_comments0<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(0.., ws_comment).parse_next(input)
}

/// Next token that is not trivia, without consuming anything.
fn peek_significant<'src>(input: &Input<'src>) -> Option<&'src PositionedToken<'src>> {
    let remaining: &'src [PositionedToken<'src>] = input.peek_slice(input.eof_offset());
    remaining.iter().find(|token| !token.token.is_trivia())
}

fn next_is(input: &Input<'_>, is_token: fn(&Token<'_>) -> bool) -> bool {
    peek_significant(input).is_some_and(|token| is_token(&token.token))
}

/// Parse a single punctuation or keyword token.
fn symbol<'src>(
    input: &mut Input<'src>,
    is_symbol: fn(&Token<'_>) -> bool,
    expected: &'static str,
) -> IResult<Span> {
    any.verify_map(|token: &PositionedToken<'_>| is_symbol(&token.token).then_some(token.span))
        .context(Context::Expected(expected))
        .parse_next(input)
}

fn left_brace<'src>(input: &mut Input<'src>) -> IResult<Span> {
    symbol(input, |t| matches!(t, Token::LeftBrace), "`{`")
}

fn right_brace<'src>(input: &mut Input<'src>) -> IResult<Span> {
    symbol(input, |t| matches!(t, Token::RightBrace), "`}`")
}

fn colon<'src>(input: &mut Input<'src>) -> IResult<Span> {
    symbol(input, |t| matches!(t, Token::Colon), "`:`")
}

fn comma<'src>(input: &mut Input<'src>) -> IResult<Span> {
    symbol(input, |t| matches!(t, Token::Comma), "`,`")
}

/// Parse an identifier
///
/// Every keyword except `and` doubles as an identifier, so entities may be
/// named `end`, `event` or `command`.
fn raw_identifier<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    any.verify_map(|token: &PositionedToken<'src>| match &token.token {
        Token::Identifier(name) => Some(Spanned::new(*name, token.span)),
        Token::And => None,
        other => other
            .keyword()
            .map(|keyword| Spanned::new(keyword, token.span)),
    })
    .context(Context::Expected("identifier"))
    .parse_next(input)
}

/// Comma separated identifiers: `a, b, c`
fn identifier_list<'src>(input: &mut Input<'src>) -> IResult<Vec<Spanned<&'src str>>> {
    separated(
        1..,
        raw_identifier,
        (ws_comments0, comma, ws_comments0),
    )
    .parse_next(input)
}

fn string_literal<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::StringLiteral(value) => Some(Spanned::new(value.clone(), token.span)),
        _ => None,
    })
    .context(Context::Expected("string literal"))
    .parse_next(input)
}

/// Scalar value: string, number, `true`/`false`, or a bare identifier
fn value<'src>(input: &mut Input<'src>) -> IResult<Spanned<types::Value<'src>>> {
    any.verify_map(|token: &PositionedToken<'src>| {
        let value = match &token.token {
            Token::StringLiteral(value) => types::Value::String(value.clone()),
            Token::NumberLiteral(value) => types::Value::Number(*value),
            Token::Identifier("true") => types::Value::Bool(true),
            Token::Identifier("false") => types::Value::Bool(false),
            Token::Identifier(name) => types::Value::Identifier(*name),
            other => types::Value::Identifier(other.keyword()?),
        };
        Some(Spanned::new(value, token.span))
    })
    .context(Context::Expected("value"))
    .parse_next(input)
}

/// Strip `/** */` framing from doc comment text.
///
/// Leading `*` on each line is removed, lines are trimmed and blank lines at
/// either end are dropped.
pub(crate) fn normalize_doc_comment(raw: &str) -> String {
    let lines: Vec<&str> = raw
        .lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix('*').map_or(line, str::trim)
        })
        .collect();

    let first = lines
        .iter()
        .position(|line| !line.is_empty())
        .unwrap_or(lines.len());
    let last = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .map_or(first, |index| index + 1);

    lines[first..last].join("\n")
}

/// Skip trivia and return the last doc comment seen.
fn leading_doc<'src>(input: &mut Input<'src>) -> IResult<Option<Spanned<String>>> {
    let mut doc = None;
    while let Some(token) = input.peek_token() {
        match &token.token {
            Token::DocComment(text) => doc = Some(Spanned::new(normalize_doc_comment(text), token.span)),
            other if other.is_trivia() => {}
            _ => break,
        }
        input.next_token();
    }
    Ok(doc)
}

/// Doc comment opening the document.
///
/// The first doc comment before any item belongs to the document unless it
/// is directly followed by a `flow` or its annotations, in which case it
/// documents that flow and nothing is consumed.
fn document_doc(input: &mut Input<'_>) -> Option<Spanned<String>> {
    let checkpoint = input.checkpoint();
    let mut doc = None;
    while let Some(token) = input.peek_token() {
        match &token.token {
            Token::DocComment(text) => {
                doc = Some(Spanned::new(normalize_doc_comment(text), token.span));
                input.next_token();
                break;
            }
            other if other.is_trivia() => {}
            _ => break,
        }
        input.next_token();
    }

    let remaining: &[PositionedToken<'_>] = input.peek_slice(input.eof_offset());
    let documents_flow = remaining
        .iter()
        .find(|token| !token.token.is_trivia() || matches!(token.token, Token::DocComment(_)))
        .is_some_and(|token| matches!(token.token, Token::Flow | Token::At));
    if doc.is_none() || documents_flow {
        input.reset(&checkpoint);
        return None;
    }
    doc
}

/// `@name` or `@name(value, ...)`
fn annotation<'src>(input: &mut Input<'src>) -> IResult<types::Annotation<'src>> {
    let at = symbol(input, |t| matches!(t, Token::At), "`@`")?;

    cut_err(input, "annotation", |input| {
        let name = raw_identifier.parse_next(input)?;
        let mut span = at.union(name.span());

        let checkpoint = input.checkpoint();
        ws_comments0(input)?;
        if !next_is(input, |t| matches!(t, Token::LeftParen)) {
            input.reset(&checkpoint);
            return Ok(types::Annotation {
                name,
                value: None,
                span,
            });
        }

        symbol(input, |t| matches!(t, Token::LeftParen), "`(`")?;
        ws_comments0(input)?;
        let mut args: Vec<Spanned<types::Value<'src>>> =
            separated(0.., value, (ws_comments0, comma, ws_comments0)).parse_next(input)?;
        ws_comments0(input)?;
        let close = symbol(input, |t| matches!(t, Token::RightParen), "`)`")?;
        span = span.union(close);

        let value = match args.len() {
            0 => None,
            1 => args.pop(),
            _ => {
                let args_span = args[0].span().union(args[args.len() - 1].span());
                let values = args.into_iter().map(Spanned::into_inner).collect();
                Some(Spanned::new(types::Value::List(values), args_span))
            }
        };

        Ok(types::Annotation { name, value, span })
    })
}

/// Doc comment and annotations in front of a declaration.
fn parse_decorations<'src>(input: &mut Input<'src>) -> IResult<types::Decorations<'src>> {
    let mut decorations = types::Decorations::default();
    loop {
        if let Some(doc) = leading_doc(input)? {
            decorations.doc = Some(doc);
        }
        if !matches!(input.peek_token().map(|t| &t.token), Some(Token::At)) {
            break;
        }
        decorations.annotations.push(annotation(input)?);
    }
    Ok(decorations)
}

/// `import <key>: "<value>"`
fn import<'src>(input: &mut Input<'src>) -> IResult<types::Import<'src>> {
    let keyword = symbol(input, |t| matches!(t, Token::Import), "`import`")?;

    cut_err(input, "import", |input| {
        ws_comments0(input)?;
        let key = raw_identifier.parse_next(input)?;
        ws_comments0(input)?;
        colon(input)?;
        ws_comments0(input)?;
        let value = string_literal.parse_next(input)?;
        let span = keyword.union(value.span());
        Ok(types::Import { key, value, span })
    })
}

/// `config { <name>: <value> ... }`
fn config<'src>(input: &mut Input<'src>) -> IResult<types::Config<'src>> {
    let keyword = symbol(input, |t| matches!(t, Token::Config), "`config`")?;

    cut_err(input, "config block", |input| {
        ws_comments0(input)?;
        left_brace(input)?;
        let mut entries = Vec::new();
        loop {
            ws_comments0(input)?;
            if next_is(input, |t| matches!(t, Token::RightBrace)) {
                break;
            }
            let name = raw_identifier.parse_next(input)?;
            ws_comments0(input)?;
            colon(input)?;
            ws_comments0(input)?;
            let value = value.parse_next(input)?;
            entries.push(types::ConfigEntry { name, value });
        }
        let close = right_brace(input)?;
        Ok(types::Config {
            entries,
            span: keyword.union(close),
        })
    })
}

/// `systems { <system>* }`
fn systems<'src>(input: &mut Input<'src>) -> IResult<types::Systems<'src>> {
    let keyword = symbol(input, |t| matches!(t, Token::Systems), "`systems`")?;

    cut_err(input, "systems block", |input| {
        ws_comments0(input)?;
        left_brace(input)?;
        let mut systems = Vec::new();
        loop {
            let decorations = parse_decorations(input)?;
            if next_is(input, |t| matches!(t, Token::RightBrace)) || input.eof_offset() == 0 {
                break;
            }
            systems.push(system(input, decorations)?);
        }
        let close = right_brace(input)?;
        Ok(types::Systems {
            systems,
            span: keyword.union(close),
        })
    })
}

/// `<Name> { <service>* }`
fn system<'src>(
    input: &mut Input<'src>,
    decorations: types::Decorations<'src>,
) -> IResult<types::System<'src>> {
    let name = raw_identifier.parse_next(input)?;

    cut_err(input, "system", |input| {
        ws_comments0(input)?;
        left_brace(input)?;
        let mut services = Vec::new();
        loop {
            let decorations = parse_decorations(input)?;
            if next_is(input, |t| matches!(t, Token::RightBrace)) || input.eof_offset() == 0 {
                break;
            }
            services.push(service(input, decorations)?);
        }
        let close = right_brace(input)?;
        Ok(types::System {
            decorations,
            name,
            services,
            span: name.span().union(close),
        })
    })
}

/// `service [<Name>] { [commands: a, b] }`
fn service<'src>(
    input: &mut Input<'src>,
    decorations: types::Decorations<'src>,
) -> IResult<types::Service<'src>> {
    let keyword = symbol(input, |t| matches!(t, Token::Service), "`service`")?;

    cut_err(input, "service", |input| {
        ws_comments0(input)?;
        let name = opt(raw_identifier).parse_next(input)?;
        ws_comments0(input)?;
        left_brace(input)?;
        ws_comments0(input)?;

        let mut commands = Vec::new();
        if next_is(input, |t| matches!(t, Token::Commands)) {
            symbol(input, |t| matches!(t, Token::Commands), "`commands`")?;
            ws_comments0(input)?;
            colon(input)?;
            ws_comments0(input)?;
            commands = identifier_list(input)?;
            ws_comments0(input)?;
        }

        let close = right_brace(input)?;
        Ok(types::Service {
            decorations,
            name,
            commands,
            span: keyword.union(close),
        })
    })
}

/// `start <Name> [{ <field>* }]`
fn start<'src>(
    input: &mut Input<'src>,
    decorations: types::Decorations<'src>,
) -> IResult<types::Start<'src>> {
    let keyword = symbol(input, |t| matches!(t, Token::Start), "`start`")?;

    cut_err(input, "start declaration", |input| {
        ws_comments0(input)?;
        let name = raw_identifier.parse_next(input)?;
        let mut span = keyword.union(name.span());

        let checkpoint = input.checkpoint();
        ws_comments0(input)?;
        let mut fields = Vec::new();
        if next_is(input, |t| matches!(t, Token::LeftBrace)) {
            left_brace(input)?;
            loop {
                let decorations = parse_decorations(input)?;
                if next_is(input, |t| matches!(t, Token::RightBrace)) || input.eof_offset() == 0 {
                    break;
                }
                fields.push(field(input, decorations)?);
            }
            span = span.union(right_brace(input)?);
        } else {
            input.reset(&checkpoint);
        }

        Ok(types::Start {
            decorations,
            name,
            fields,
            span,
        })
    })
}

/// `<name>[:] <Type>[[]]`
fn field<'src>(
    input: &mut Input<'src>,
    decorations: types::Decorations<'src>,
) -> IResult<types::Field<'src>> {
    let name = raw_identifier.parse_next(input)?;

    cut_err(input, "field", |input| {
        ws_comments0(input)?;
        if next_is(input, |t| matches!(t, Token::Colon)) {
            colon(input)?;
            ws_comments0(input)?;
        }
        let type_name = raw_identifier.parse_next(input)?;
        let mut span = name.span().union(type_name.span());

        let checkpoint = input.checkpoint();
        ws_comments0(input)?;
        let is_array = if next_is(input, |t| matches!(t, Token::LeftBracket)) {
            symbol(input, |t| matches!(t, Token::LeftBracket), "`[`")?;
            ws_comments0(input)?;
            span = span.union(symbol(input, |t| matches!(t, Token::RightBracket), "`]`")?);
            true
        } else {
            input.reset(&checkpoint);
            false
        };

        Ok(types::Field {
            decorations,
            name,
            type_name,
            is_array,
            span,
        })
    })
}

/// `when A and B { command c  event E* }`
fn when<'src>(
    input: &mut Input<'src>,
    decorations: types::Decorations<'src>,
) -> IResult<types::When<'src>> {
    let keyword = symbol(input, |t| matches!(t, Token::When), "`when`")?;

    cut_err(input, "when clause", |input| {
        ws_comments0(input)?;
        let triggers: Vec<Spanned<&'src str>> = separated(
            1..,
            raw_identifier,
            (
                ws_comments0,
                |input: &mut Input<'src>| symbol(input, |t| matches!(t, Token::And), "`and`"),
                ws_comments0,
            ),
        )
        .parse_next(input)?;
        ws_comments0(input)?;
        left_brace(input)?;
        ws_comments0(input)?;
        symbol(input, |t| matches!(t, Token::Command), "`command`")?;
        ws_comments0(input)?;
        let command = raw_identifier.parse_next(input)?;

        let mut events = Vec::new();
        loop {
            let doc = leading_doc(input)?;
            if !next_is(input, |t| matches!(t, Token::Event)) {
                break;
            }
            symbol(input, |t| matches!(t, Token::Event), "`event`")?;
            ws_comments0(input)?;
            let name = raw_identifier.parse_next(input)?;
            events.push(types::WhenEvent { doc, name });
        }

        let close = right_brace(input)?;
        Ok(types::When {
            decorations,
            triggers,
            command,
            events,
            span: keyword.union(close),
        })
    })
}

/// `end { <category>: A, B ... }`
fn end<'src>(input: &mut Input<'src>) -> IResult<types::End<'src>> {
    let keyword = symbol(input, |t| matches!(t, Token::End), "`end`")?;

    cut_err(input, "end block", |input| {
        ws_comments0(input)?;
        left_brace(input)?;
        let mut outcomes = Vec::new();
        loop {
            ws_comments0(input)?;
            if next_is(input, |t| matches!(t, Token::RightBrace)) || input.eof_offset() == 0 {
                break;
            }
            let category = raw_identifier.parse_next(input)?;
            ws_comments0(input)?;
            colon(input)?;
            ws_comments0(input)?;
            let events = identifier_list(input)?;
            outcomes.push(types::OutcomeList { category, events });
        }
        let close = right_brace(input)?;
        Ok(types::End {
            outcomes,
            span: keyword.union(close),
        })
    })
}

fn is_member_start(token: &Token<'_>) -> bool {
    matches!(
        token,
        Token::Systems
            | Token::Start
            | Token::When
            | Token::End
            | Token::At
            | Token::DocComment(_)
            | Token::RightBrace
    )
}

fn is_item_start(token: &Token<'_>) -> bool {
    matches!(
        token,
        Token::Flow | Token::Import | Token::Config | Token::At | Token::DocComment(_)
    )
}

/// Consume at least one token, then stop before the next token at brace
/// depth zero for which `is_start` holds.
fn skip_to_recovery_point(input: &mut Input<'_>, is_start: fn(&Token<'_>) -> bool) {
    let mut depth = 0usize;
    let mut first = true;
    while let Some(token) = input.peek_token() {
        if !first && depth == 0 && is_start(&token.token) {
            break;
        }
        match token.token {
            Token::LeftBrace => depth += 1,
            Token::RightBrace => depth = depth.saturating_sub(1),
            _ => {}
        }
        input.next_token();
        first = false;
    }
}

/// Members of a flow body, up to (not including) the closing brace.
fn flow_members<'src>(input: &mut Input<'src>) -> IResult<Vec<types::FlowMember<'src>>> {
    let mut members = Vec::new();
    loop {
        let member_start = input.checkpoint();
        let start_span = peek_significant(input).map(|token| token.span);

        let result = parse_decorations(input).and_then(|decorations| {
            let Some(token) = peek_significant(input) else {
                return Ok(None);
            };
            let member = match token.token {
                Token::RightBrace => return Ok(None),
                Token::Systems => types::FlowMember::Systems(systems(input)?),
                Token::Start => types::FlowMember::Start(start(input, decorations)?),
                Token::When => types::FlowMember::When(when(input, decorations)?),
                Token::End => types::FlowMember::End(end(input)?),
                _ => return Err(expected_error("`systems`, `start`, `when` or `end`")),
            };
            Ok(Some(member))
        });

        match result {
            Ok(Some(member)) => members.push(member),
            Ok(None) => break,
            Err(error) => {
                let diagnostic = convert_error(error, input, start_span);
                log::debug!(code = "E100"; "Recovered from error in flow member");
                members.push(types::FlowMember::Error(diagnostic));
                input.reset(&member_start);
                ws_comments0(input)?;
                skip_to_recovery_point(input, is_member_start);
            }
        }
    }
    Ok(members)
}

/// `flow <Name> { <member>* }`
fn flow<'src>(
    input: &mut Input<'src>,
    decorations: types::Decorations<'src>,
) -> IResult<types::Flow<'src>> {
    let keyword = symbol(input, |t| matches!(t, Token::Flow), "`flow`")?;

    cut_err(input, "flow", |input| {
        ws_comments0(input)?;
        let name = raw_identifier.parse_next(input)?;
        ws_comments0(input)?;
        left_brace(input)?;
        let members = flow_members(input)?;
        ws_comments0(input)?;
        let close = right_brace(input)?;
        Ok(types::Flow {
            decorations,
            name,
            members,
            span: keyword.union(close),
        })
    })
}

fn item<'src>(input: &mut Input<'src>) -> IResult<Option<types::Item<'src>>> {
    let decorations = parse_decorations(input)?;
    let Some(token) = input.peek_token() else {
        return Ok(None);
    };
    let item = match token.token {
        Token::Flow => types::Item::Flow(flow(input, decorations)?),
        Token::Import => types::Item::Import(import(input)?),
        Token::Config => types::Item::Config(config(input)?),
        _ => return Err(expected_error("`flow`, `import` or `config`")),
    };
    Ok(Some(item))
}

/// Build a diagnostic from a parser error.
///
/// The primary label points at the first significant token at or after the
/// error position; `start` marks where the failed construct began.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    input: &Input<'_>,
    start: Option<Span>,
) -> Diagnostic {
    let contexts: Vec<&Context> = match &error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.context().collect(),
        ErrMode::Incomplete(_) => Vec::new(),
    };
    let expected = contexts.iter().find_map(|ctx| match ctx {
        Context::Expected(expected) => Some(*expected),
        Context::Label(_) => None,
    });
    let label = contexts.iter().find_map(|ctx| match ctx {
        Context::Label(label) => Some(*label),
        Context::Expected(_) => None,
    });

    let (mut diagnostic, span) = match peek_significant(input) {
        Some(token) => {
            let message = match expected {
                Some(expected) => format!("unexpected `{token}`, expected {expected}"),
                None => format!("unexpected `{token}`"),
            };
            (
                Diagnostic::error(message).with_code(ErrorCode::E100),
                token.span,
            )
        }
        None => {
            let end = input.previous_token_end();
            let message = match expected {
                Some(expected) => format!("unexpected end of input, expected {expected}"),
                None => "unexpected end of input".to_string(),
            };
            (
                Diagnostic::error(message).with_code(ErrorCode::E101),
                Span::new(end..end),
            )
        }
    };

    diagnostic = diagnostic.with_label(span, "unexpected here");
    if let (Some(label), Some(start)) = (label, start) {
        if start != span {
            diagnostic = diagnostic.with_secondary_label(start, format!("while parsing this {label}"));
        }
    }
    diagnostic
}

/// Parse a token stream into a [`types::Document`].
///
/// Never fails; items that cannot be parsed become [`types::Item::Error`].
pub fn build_document<'src>(tokens: &'src [PositionedToken<'src>]) -> types::Document<'src> {
    let mut input = TokenSlice::new(tokens);
    let mut items = Vec::new();
    let doc = document_doc(&mut input);

    loop {
        let item_start = input.checkpoint();
        let start_span = peek_significant(&input).map(|token| token.span);

        match item(&mut input) {
            Ok(Some(item)) => items.push(item),
            Ok(None) => break,
            Err(error) => {
                let diagnostic = convert_error(error, &input, start_span);
                log::debug!(message = diagnostic.message(); "Recovered from error in document");
                items.push(types::Item::Error(diagnostic));
                input.reset(&item_start);
                let _ = ws_comments0(&mut input);
                skip_to_recovery_point(&mut input, is_item_start);
            }
        }
    }

    types::Document { doc, items }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(source: &'static str) -> types::Document<'static> {
        let (tokens, diagnostics) = tokenize(source);
        assert!(diagnostics.is_empty(), "lexer diagnostics: {diagnostics:?}");
        let tokens: &'static [PositionedToken<'static>] = Box::leak(tokens.into_boxed_slice());
        build_document(tokens)
    }

    fn single_flow<'a>(document: &'a types::Document<'static>) -> &'a types::Flow<'static> {
        let flows: Vec<_> = document
            .items
            .iter()
            .filter_map(|item| match item {
                types::Item::Flow(flow) => Some(flow),
                _ => None,
            })
            .collect();
        assert_eq!(flows.len(), 1, "items: {:?}", document.items);
        flows[0]
    }

    fn errors(document: &types::Document<'_>) -> Vec<Diagnostic> {
        let mut errors = Vec::new();
        for item in &document.items {
            match item {
                types::Item::Error(diagnostic) => errors.push(diagnostic.clone()),
                types::Item::Flow(flow) => {
                    for member in &flow.members {
                        if let types::FlowMember::Error(diagnostic) = member {
                            errors.push(diagnostic.clone());
                        }
                    }
                }
                _ => {}
            }
        }
        errors
    }

    #[test]
    fn test_normalize_doc_comment() {
        assert_eq!(normalize_doc_comment(" Single line "), "Single line");
        assert_eq!(
            normalize_doc_comment("\n * First line\n * Second line\n "),
            "First line\nSecond line"
        );
        assert_eq!(normalize_doc_comment("\n *\n * Body\n *\n "), "Body");
        assert_eq!(normalize_doc_comment("   "), "");
    }

    #[test]
    fn test_empty_document() {
        let document = parse("  // nothing here\n");
        assert!(document.items.is_empty());
    }

    #[test]
    fn test_document_doc() {
        let document = parse("// header\n/** Subscription flows. */\nimport subs: \"subs.zdl\"\nflow F { start A }");
        let doc = document.doc.as_ref().unwrap();
        assert_eq!(doc.inner(), "Subscription flows.");
        assert_eq!(document.items.len(), 2);
        assert!(errors(&document).is_empty());

        let document = parse("/** Flow doc */\nflow F { start A }");
        assert!(document.doc.is_none());
        let flow = single_flow(&document);
        assert_eq!(flow.decorations.doc.as_ref().unwrap().inner(), "Flow doc");

        let document = parse("/** Lonely */");
        assert_eq!(document.doc.as_ref().unwrap().inner(), "Lonely");
        assert!(document.items.is_empty());
    }

    #[test]
    fn test_minimal_flow() {
        let document = parse("flow Renewals { start Tick when Tick { command renew } }");
        let flow = single_flow(&document);
        assert_eq!(*flow.name.inner(), "Renewals");
        assert_eq!(flow.members.len(), 2);
        assert!(errors(&document).is_empty());

        let types::FlowMember::When(when) = &flow.members[1] else {
            panic!("expected when clause, got {:?}", flow.members[1]);
        };
        assert_eq!(*when.command.inner(), "renew");
        assert!(when.events.is_empty());
    }

    #[test]
    fn test_when_with_multiple_triggers_and_event_docs() {
        let source = r#"
flow F {
    when A and B and C {
        command run
        /** Produced on success */
        event Done
        event Failed
    }
}
"#;
        let document = parse(source);
        let flow = single_flow(&document);
        let types::FlowMember::When(when) = &flow.members[0] else {
            panic!("expected when clause");
        };
        let triggers: Vec<&str> = when.triggers.iter().map(|t| *t.inner()).collect();
        assert_eq!(triggers, ["A", "B", "C"]);
        assert_eq!(when.events.len(), 2);
        assert_eq!(
            when.events[0].doc.as_ref().map(|d| d.inner().as_str()),
            Some("Produced on success")
        );
        assert!(when.events[1].doc.is_none());
    }

    #[test]
    fn test_decorations_collect_doc_and_annotations() {
        let source = r#"
/** Handles renewals */
@zdl
@actor(Scheduler)
@tags("a", 2, true)
flow F { }
"#;
        let document = parse(source);
        let flow = single_flow(&document);
        assert_eq!(
            flow.decorations.doc.as_ref().map(|d| d.inner().as_str()),
            Some("Handles renewals")
        );
        let annotations = &flow.decorations.annotations;
        assert_eq!(annotations.len(), 3);
        assert!(annotations[0].value.is_none());
        assert_eq!(
            annotations[1].value.as_ref().map(|v| v.inner().clone()),
            Some(types::Value::Identifier("Scheduler"))
        );
        assert_eq!(
            annotations[2].value.as_ref().map(|v| v.inner().clone()),
            Some(types::Value::List(vec![
                types::Value::String("a".to_string()),
                types::Value::Number(2.0),
                types::Value::Bool(true),
            ]))
        );
    }

    #[test]
    fn test_systems_and_services() {
        let source = r#"
flow F {
    systems {
        @zdl
        Billing {
            service Invoices { commands: generateInvoice, voidInvoice }
            service { }
        }
        Empty { }
    }
}
"#;
        let document = parse(source);
        let flow = single_flow(&document);
        let types::FlowMember::Systems(systems) = &flow.members[0] else {
            panic!("expected systems block");
        };
        assert_eq!(systems.systems.len(), 2);
        let billing = &systems.systems[0];
        assert_eq!(billing.decorations.annotations.len(), 1);
        assert_eq!(billing.services.len(), 2);
        assert_eq!(billing.services[0].name.map(|n| *n.inner()), Some("Invoices"));
        assert_eq!(billing.services[0].commands.len(), 2);
        assert!(billing.services[1].name.is_none());
        assert!(billing.services[1].commands.is_empty());
    }

    #[test]
    fn test_start_fields() {
        let source = r#"
flow F {
    start Signup {
        /** Customer id */
        customerId: String
        items Item[]
        @optional note String
    }
    start Bare
}
"#;
        let document = parse(source);
        let flow = single_flow(&document);
        assert_eq!(flow.members.len(), 2);
        let types::FlowMember::Start(start) = &flow.members[0] else {
            panic!("expected start");
        };
        assert_eq!(start.fields.len(), 3);
        assert_eq!(*start.fields[0].type_name.inner(), "String");
        assert!(!start.fields[0].is_array);
        assert!(start.fields[0].decorations.doc.is_some());
        assert!(start.fields[1].is_array);
        assert_eq!(start.fields[2].decorations.annotations.len(), 1);

        let types::FlowMember::Start(bare) = &flow.members[1] else {
            panic!("expected start");
        };
        assert!(bare.fields.is_empty());
    }

    #[test]
    fn test_end_block() {
        let document = parse("flow F { end { completed: A, B suspended: C } }");
        let flow = single_flow(&document);
        let types::FlowMember::End(end) = &flow.members[0] else {
            panic!("expected end");
        };
        assert_eq!(end.outcomes.len(), 2);
        assert_eq!(*end.outcomes[0].category.inner(), "completed");
        assert_eq!(end.outcomes[0].events.len(), 2);
        assert_eq!(*end.outcomes[1].events[0].inner(), "C");
    }

    #[test]
    fn test_keywords_as_identifiers() {
        let document = parse("flow end { when event { command start event command } }");
        let flow = single_flow(&document);
        assert_eq!(*flow.name.inner(), "end");
        let types::FlowMember::When(when) = &flow.members[0] else {
            panic!("expected when clause");
        };
        assert_eq!(*when.triggers[0].inner(), "event");
        assert_eq!(*when.command.inner(), "start");
        assert_eq!(*when.events[0].name.inner(), "command");
    }

    #[test]
    fn test_imports_and_config() {
        let source = r#"
import common: "./common.zfl"
config { basePackage: "io.example" strict: true retries: 3 }
flow F { }
"#;
        let document = parse(source);
        assert_eq!(document.items.len(), 3);
        let types::Item::Import(import) = &document.items[0] else {
            panic!("expected import");
        };
        assert_eq!(*import.key.inner(), "common");
        assert_eq!(import.value.inner(), "./common.zfl");
        let types::Item::Config(config) = &document.items[1] else {
            panic!("expected config");
        };
        assert_eq!(config.entries.len(), 3);
        assert_eq!(*config.entries[1].value.inner(), types::Value::Bool(true));
    }

    #[test]
    fn test_member_error_recovers_at_next_member() {
        let source = r#"
flow F {
    when A { event B }
    when C { command d }
}
"#;
        let document = parse(source);
        let flow = single_flow(&document);
        assert_eq!(flow.members.len(), 2);
        assert!(matches!(flow.members[0], types::FlowMember::Error(_)));
        assert!(matches!(flow.members[1], types::FlowMember::When(_)));

        let errors = errors(&document);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), Some(ErrorCode::E100));
        assert!(errors[0].message().contains("`command`"), "{}", errors[0].message());
    }

    #[test]
    fn test_unknown_member_is_reported() {
        let document = parse("flow F { bogus { } start S }");
        let flow = single_flow(&document);
        assert!(matches!(flow.members[0], types::FlowMember::Error(_)));
        assert!(matches!(flow.members.last(), Some(types::FlowMember::Start(_))));
    }

    #[test]
    fn test_top_level_error_recovers_at_next_flow() {
        let document = parse("garbage here { x } flow F { start S }");
        assert!(matches!(document.items[0], types::Item::Error(_)));
        let flow = single_flow(&document);
        assert_eq!(*flow.name.inner(), "F");
    }

    #[test]
    fn test_unexpected_end_of_input() {
        let document = parse("flow F { when A { command x ");
        let errors = errors(&document);
        assert!(!errors.is_empty());
        assert!(errors.iter().any(|e| e.code() == Some(ErrorCode::E101)));
    }
}
