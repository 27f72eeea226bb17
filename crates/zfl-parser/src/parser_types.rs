//! Concrete syntax tree produced by the [`parser`](super::parser).
//!
//! Every named element keeps its [`Span`] so later stages can point
//! diagnostics and source refs at the exact declaration.

use zfl_core::{
    diagnostic::Diagnostic,
    span::{Span, Spanned},
};

/// A parsed `.zfl` document.
#[derive(Debug, Clone, Default)]
pub struct Document<'src> {
    /// Doc comment heading the document, before any import or config.
    pub doc: Option<Spanned<String>>,
    pub items: Vec<Item<'src>>,
}

#[derive(Debug, Clone)]
pub enum Item<'src> {
    Import(Import<'src>),
    Config(Config<'src>),
    Flow(Flow<'src>),
    /// An item that failed to parse; the parser skipped past it.
    Error(Diagnostic),
}

/// `import <key>: "<value>"`
#[derive(Debug, Clone)]
pub struct Import<'src> {
    pub key: Spanned<&'src str>,
    pub value: Spanned<String>,
    pub span: Span,
}

/// `config { <name>: <value> ... }`
#[derive(Debug, Clone)]
pub struct Config<'src> {
    pub entries: Vec<ConfigEntry<'src>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ConfigEntry<'src> {
    pub name: Spanned<&'src str>,
    pub value: Spanned<Value<'src>>,
}

/// Argument of an annotation or value of a config entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'src> {
    String(String),
    Number(f64),
    Bool(bool),
    Identifier(&'src str),
    List(Vec<Value<'src>>),
}

/// `@name` or `@name(value, ...)`
#[derive(Debug, Clone)]
pub struct Annotation<'src> {
    pub name: Spanned<&'src str>,
    pub value: Option<Spanned<Value<'src>>>,
    pub span: Span,
}

/// Doc comment and annotations preceding a declaration.
#[derive(Debug, Clone, Default)]
pub struct Decorations<'src> {
    pub doc: Option<Spanned<String>>,
    pub annotations: Vec<Annotation<'src>>,
}

#[derive(Debug, Clone)]
pub struct Flow<'src> {
    pub decorations: Decorations<'src>,
    pub name: Spanned<&'src str>,
    pub members: Vec<FlowMember<'src>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum FlowMember<'src> {
    Systems(Systems<'src>),
    Start(Start<'src>),
    When(When<'src>),
    End(End<'src>),
    /// A member that failed to parse; the parser skipped past it.
    Error(Diagnostic),
}

/// `systems { ... }`
#[derive(Debug, Clone)]
pub struct Systems<'src> {
    pub systems: Vec<System<'src>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct System<'src> {
    pub decorations: Decorations<'src>,
    pub name: Spanned<&'src str>,
    pub services: Vec<Service<'src>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Service<'src> {
    pub decorations: Decorations<'src>,
    /// `None` for an anonymous `service { ... }` block.
    pub name: Option<Spanned<&'src str>>,
    pub commands: Vec<Spanned<&'src str>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Start<'src> {
    pub decorations: Decorations<'src>,
    pub name: Spanned<&'src str>,
    pub fields: Vec<Field<'src>>,
    pub span: Span,
}

/// `name: Type` or `name Type[]` inside a start block.
#[derive(Debug, Clone)]
pub struct Field<'src> {
    pub decorations: Decorations<'src>,
    pub name: Spanned<&'src str>,
    pub type_name: Spanned<&'src str>,
    pub is_array: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct When<'src> {
    pub decorations: Decorations<'src>,
    pub triggers: Vec<Spanned<&'src str>>,
    pub command: Spanned<&'src str>,
    pub events: Vec<WhenEvent<'src>>,
    pub span: Span,
}

/// `event <Name>` statement inside a when-clause.
#[derive(Debug, Clone)]
pub struct WhenEvent<'src> {
    pub doc: Option<Spanned<String>>,
    pub name: Spanned<&'src str>,
}

#[derive(Debug, Clone)]
pub struct End<'src> {
    pub outcomes: Vec<OutcomeList<'src>>,
    pub span: Span,
}

/// `<category>: Event, Event` inside an end block.
///
/// The category is validated by the tree builder, not the parser.
#[derive(Debug, Clone)]
pub struct OutcomeList<'src> {
    pub category: Spanned<&'src str>,
    pub events: Vec<Spanned<&'src str>>,
}
