//! Token definitions for the ZFL lexer.

use std::{fmt, ops::Deref};

use winnow::stream::Location;

use zfl_core::span::Span;

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // Keywords
    Flow,
    Systems,
    Service,
    Commands,
    Start,
    When,
    And,
    Command,
    Event,
    End,
    Import,
    Config,

    // Literals
    Identifier(&'src str),
    StringLiteral(String),
    NumberLiteral(f64),

    // Punctuation
    At,
    Colon,
    Comma,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,

    // Trivia
    /// `/** ... */`, raw text between the delimiters.
    DocComment(&'src str),
    LineComment(&'src str),
    BlockComment(&'src str),
    Whitespace,
    Newline,
}

impl Token<'_> {
    /// Source text of a keyword token, `None` for anything else.
    pub fn keyword(&self) -> Option<&'static str> {
        let text = match self {
            Token::Flow => "flow",
            Token::Systems => "systems",
            Token::Service => "service",
            Token::Commands => "commands",
            Token::Start => "start",
            Token::When => "when",
            Token::And => "and",
            Token::Command => "command",
            Token::Event => "event",
            Token::End => "end",
            Token::Import => "import",
            Token::Config => "config",
            _ => return None,
        };
        Some(text)
    }

    /// Whitespace, newlines and comments, including doc comments.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Token::Whitespace
                | Token::Newline
                | Token::LineComment(_)
                | Token::BlockComment(_)
                | Token::DocComment(_)
        )
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(keyword) = self.keyword() {
            return write!(f, "{keyword}");
        }
        match self {
            Token::Identifier(name) => write!(f, "{name}"),
            Token::StringLiteral(value) => write!(f, "\"{value}\""),
            Token::NumberLiteral(value) => write!(f, "{value}"),
            Token::At => write!(f, "@"),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::DocComment(text) => write!(f, "/**{text}*/"),
            Token::LineComment(text) => write!(f, "//{text}"),
            Token::BlockComment(text) => write!(f, "/*{text}*/"),
            Token::Whitespace => write!(f, " "),
            Token::Newline => writeln!(f),
            _ => Ok(()),
        }
    }
}

/// A token with its byte span in the source text.
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

impl<'src> Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl fmt::Display for PositionedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}

impl Location for PositionedToken<'_> {
    fn previous_token_end(&self) -> usize {
        self.span.end()
    }

    fn current_token_start(&self) -> usize {
        self.span.start()
    }
}
