//! Typed semantic model of a ZFL document.
//!
//! The analyzer resolves the raw parse tree into these types: flows with
//! their starts, policies (one per when-clause), commands, events and end
//! outcomes, plus the systems and actors shared across flows.
//!
//! Collections keep first-occurrence order so repeated analysis of the same
//! source yields identical output.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::{diagnostic::Diagnostic, source::SourceRef};

/// A named initiator of a start trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    name: String,
    source_ref: SourceRef,
}

impl Actor {
    pub fn new(name: impl Into<String>, source_ref: SourceRef) -> Self {
        Self {
            name: name.into(),
            source_ref,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_ref(&self) -> &SourceRef {
        &self.source_ref
    }
}

/// A service declared inside a system.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    name: String,
    bounded_context: bool,
}

impl Service {
    pub fn new(name: impl Into<String>, bounded_context: bool) -> Self {
        Self {
            name: name.into(),
            bounded_context,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounded_context(&self) -> bool {
        self.bounded_context
    }
}

/// A declared system grouping services and their commands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct System {
    name: String,
    bounded_context: bool,
    services: IndexMap<String, Service>,
}

impl System {
    pub fn new(name: impl Into<String>, bounded_context: bool) -> Self {
        Self {
            name: name.into(),
            bounded_context,
            services: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounded_context(&self) -> bool {
        self.bounded_context
    }

    pub fn services(&self) -> &IndexMap<String, Service> {
        &self.services
    }

    /// Add a service unless one with the same name exists. Returns whether it was added.
    pub fn add_service(&mut self, service: Service) -> bool {
        if self.services.contains_key(service.name()) {
            return false;
        }
        self.services.insert(service.name.clone(), service);
        true
    }
}

/// An action performed within a system/service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    name: String,
    system: Option<String>,
    service: Option<String>,
    actor: Option<String>,
    source_ref: SourceRef,
}

impl Command {
    pub fn new(name: impl Into<String>, source_ref: SourceRef) -> Self {
        Self {
            name: name.into(),
            system: None,
            service: None,
            actor: None,
            source_ref,
        }
    }

    pub fn with_system(mut self, system: Option<String>) -> Self {
        self.system = system;
        self
    }

    pub fn with_service(mut self, service: Option<String>) -> Self {
        self.service = service;
        self
    }

    pub fn with_actor(mut self, actor: Option<String>) -> Self {
        self.actor = actor;
        self
    }

    pub fn set_actor(&mut self, actor: impl Into<String>) {
        self.actor = Some(actor.into());
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    pub fn source_ref(&self) -> &SourceRef {
        &self.source_ref
    }
}

/// A fact emitted by a command or raised by a start.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    name: String,
    system: Option<String>,
    service: Option<String>,
    description: Option<String>,
    is_error: bool,
    is_start: bool,
    source_ref: SourceRef,
}

impl Event {
    pub fn new(name: impl Into<String>, source_ref: SourceRef) -> Self {
        Self {
            name: name.into(),
            system: None,
            service: None,
            description: None,
            is_error: false,
            is_start: false,
            source_ref,
        }
    }

    pub fn with_system(mut self, system: Option<String>) -> Self {
        self.system = system;
        self
    }

    pub fn with_service(mut self, service: Option<String>) -> Self {
        self.service = service;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_error(mut self, is_error: bool) -> Self {
        self.is_error = is_error;
        self
    }

    pub fn with_start(mut self, is_start: bool) -> Self {
        self.is_start = is_start;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// Whether this event stands for a start trigger of the flow.
    pub fn is_start(&self) -> bool {
        self.is_start
    }

    pub fn source_ref(&self) -> &SourceRef {
        &self.source_ref
    }
}

/// One when-clause: when all `triggers` occurred (and `condition` holds),
/// invoke `command`, which emits `events`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    triggers: Vec<String>,
    condition: Option<String>,
    command: String,
    events: Vec<String>,
    description: Option<String>,
    source_ref: SourceRef,
}

impl Policy {
    pub fn new(
        triggers: Vec<String>,
        command: impl Into<String>,
        events: Vec<String>,
        source_ref: SourceRef,
    ) -> Self {
        Self {
            triggers,
            condition: None,
            command: command.into(),
            events,
            description: None,
            source_ref,
        }
    }

    pub fn with_condition(mut self, condition: Option<String>) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn source_ref(&self) -> &SourceRef {
        &self.source_ref
    }
}

/// An external stimulus that begins a flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Start {
    name: String,
    description: String,
    actor: Option<String>,
    timer: Option<String>,
    system: Option<String>,
    source_ref: SourceRef,
}

impl Start {
    pub fn new(name: impl Into<String>, source_ref: SourceRef) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            actor: None,
            timer: None,
            system: None,
            source_ref,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_actor(mut self, actor: Option<String>) -> Self {
        self.actor = actor;
        self
    }

    pub fn with_timer(mut self, timer: Option<String>) -> Self {
        self.timer = timer;
        self
    }

    pub fn with_system(mut self, system: Option<String>) -> Self {
        self.system = system;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    pub fn timer(&self) -> Option<&str> {
        self.timer.as_deref()
    }

    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    pub fn source_ref(&self) -> &SourceRef {
        &self.source_ref
    }
}

/// Terminal outcome category of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Completed,
    Suspended,
    Cancelled,
}

impl Outcome {
    /// All categories in canonical order.
    pub const ALL: [Outcome; 3] = [Outcome::Completed, Outcome::Suspended, Outcome::Cancelled];

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Completed => "completed",
            Outcome::Suspended => "suspended",
            Outcome::Cancelled => "cancelled",
        }
    }

    /// Parse a category keyword, returning `None` for anything else.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|outcome| outcome.as_str() == keyword)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome classification of a flow's events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct End {
    completed: Vec<String>,
    suspended: Vec<String>,
    cancelled: Vec<String>,
    source_ref: SourceRef,
}

impl End {
    pub fn new(source_ref: SourceRef) -> Self {
        Self {
            completed: Vec::new(),
            suspended: Vec::new(),
            cancelled: Vec::new(),
            source_ref,
        }
    }

    pub fn with_outcome(mut self, outcome: Outcome, events: Vec<String>) -> Self {
        match outcome {
            Outcome::Completed => self.completed = events,
            Outcome::Suspended => self.suspended = events,
            Outcome::Cancelled => self.cancelled = events,
        }
        self
    }

    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    pub fn suspended(&self) -> &[String] {
        &self.suspended
    }

    pub fn cancelled(&self) -> &[String] {
        &self.cancelled
    }

    /// Events listed under `outcome`.
    pub fn events(&self, outcome: Outcome) -> &[String] {
        match outcome {
            Outcome::Completed => &self.completed,
            Outcome::Suspended => &self.suspended,
            Outcome::Cancelled => &self.cancelled,
        }
    }

    pub fn source_ref(&self) -> &SourceRef {
        &self.source_ref
    }
}

/// One named event-driven process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    name: String,
    description: String,
    starts: Vec<Start>,
    policies: Vec<Policy>,
    commands: Vec<Command>,
    events: Vec<Event>,
    end: End,
}

impl Flow {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        starts: Vec<Start>,
        policies: Vec<Policy>,
        commands: Vec<Command>,
        events: Vec<Event>,
        end: End,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            starts,
            policies,
            commands,
            events,
            end,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn starts(&self) -> &[Start] {
        &self.starts
    }

    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn end(&self) -> &End {
        &self.end
    }

    pub fn command(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|command| command.name() == name)
    }

    pub fn event(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.name() == name)
    }

    pub fn start(&self, name: &str) -> Option<&Start> {
        self.starts.iter().find(|start| start.name() == name)
    }
}

/// Result of semantic analysis over one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticModel {
    flows: Vec<Flow>,
    systems: IndexMap<String, System>,
    actors: IndexMap<String, Actor>,
    diagnostics: Vec<Diagnostic>,
}

impl SemanticModel {
    pub fn new(
        flows: Vec<Flow>,
        systems: IndexMap<String, System>,
        actors: IndexMap<String, Actor>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            flows,
            systems,
            actors,
            diagnostics,
        }
    }

    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    pub fn flow(&self, name: &str) -> Option<&Flow> {
        self.flows.iter().find(|flow| flow.name() == name)
    }

    pub fn systems(&self) -> &IndexMap<String, System> {
        &self.systems
    }

    pub fn actors(&self) -> &IndexMap<String, Actor> {
        &self.actors
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity().is_error())
    }
}
