//! Semantic analysis: raw tree to [`SemanticModel`].
//!
//! Each flow is analyzed in three ordered passes over its raw map:
//!
//! 1. registry: declared systems, services and their commands
//! 2. starts: start triggers, their actors and start events
//! 3. clauses: one policy per `when`, resolving (or synthesizing) the
//!    invoked command and collecting emitted events
//!
//! followed by the end block and cross-reference checks. Analysis never
//! fails; every problem becomes a diagnostic on the model.

use indexmap::{IndexMap, IndexSet};
use log::{debug, info, trace};

use zfl_core::{
    diagnostic::{Diagnostic, DiagnosticCollector, ErrorCode},
    semantic::{
        Actor, Command, End, Event, Flow, Outcome, Policy, SemanticModel, Service, Start, System,
    },
    source::SourceRef,
};

use crate::raw::{RawDocument, RawMap, RawValue};

/// Whether an event name denotes a failure.
///
/// ```
/// # use zfl_parser::analyze::is_error_event;
/// assert!(is_error_event("PaymentFailed"));
/// assert!(is_error_event("ValidationError"));
/// assert!(!is_error_event("PaymentSucceeded"));
/// ```
pub fn is_error_event(name: &str) -> bool {
    let name = name.to_lowercase();
    name.contains("failed") || name.contains("error")
}

/// Option value of a scope as text.
fn option_text(scope: &RawMap, name: &str) -> Option<String> {
    scope.get_map("options").get(name).and_then(RawValue::to_text)
}

fn option_bool(scope: &RawMap, name: &str) -> Option<bool> {
    scope.get_map("options").get_bool(name)
}

/// Analyzes a [`RawDocument`] into a [`SemanticModel`].
pub struct SemanticAnalyzer<'a> {
    document: &'a RawDocument,
    diagnostics: DiagnosticCollector,
    systems: IndexMap<String, System>,
    actors: IndexMap<String, Actor>,
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn new(document: &'a RawDocument) -> Self {
        Self {
            document,
            diagnostics: DiagnosticCollector::new(),
            systems: IndexMap::new(),
            actors: IndexMap::new(),
        }
    }

    pub fn analyze(mut self) -> SemanticModel {
        let document = self.document;
        let flows: Vec<Flow> = document
            .root()
            .get_map("flows")
            .iter()
            .filter_map(|(name, value)| value.as_map().map(|flow| (name, flow)))
            .map(|(name, flow)| self.analyze_flow(name, flow))
            .collect();

        let mut diagnostics = document.diagnostics().to_vec();
        diagnostics.extend(self.diagnostics.finish());

        info!(
            flows = flows.len(),
            systems = self.systems.len(),
            actors = self.actors.len(),
            diagnostics = diagnostics.len();
            "Semantic analysis complete"
        );

        SemanticModel::new(flows, self.systems, self.actors, diagnostics)
    }

    fn location(&self, path: &str) -> SourceRef {
        self.document.location(path)
    }

    fn warn(&mut self, code: ErrorCode, message: String, path: &str) {
        let diagnostic = Diagnostic::warning(message)
            .with_code(code)
            .with_source_ref(self.location(path));
        self.diagnostics.emit(diagnostic);
    }

    fn analyze_flow(&mut self, key: &str, flow: &RawMap) -> Flow {
        let path = format!("flows.{key}");
        let name = match flow.get_str("name") {
            "" => key,
            name => name,
        };
        debug!(flow = name; "Analyzing flow");

        let mut commands = self.register_commands(&path, flow);
        let (starts, mut events) = self.collect_starts(&path, flow);

        let mut policies = Vec::new();
        for (index, clause) in flow.get_list("whens").iter().enumerate() {
            let Some(clause) = clause.as_map() else {
                continue;
            };
            let clause_path = format!("{path}.whens[{index}]");
            if let Some(policy) =
                self.analyze_clause(&clause_path, clause, &starts, &mut commands, &mut events)
            {
                policies.push(policy);
            }
        }

        self.check_triggers(&path, flow, &starts, &policies);
        let end = self.analyze_end(&path, flow, &events);

        Flow::new(
            name,
            flow.get_str("javadoc"),
            starts.into_values().collect(),
            policies,
            commands.into_values().collect(),
            events.into_values().collect(),
            end,
        )
    }

    /// Registry pass: systems, services and declared commands.
    fn register_commands(&mut self, flow_path: &str, flow: &RawMap) -> IndexMap<String, Command> {
        let mut commands: IndexMap<String, Command> = IndexMap::new();

        for (system_key, system) in flow.get_map("systems").iter() {
            let Some(system) = system.as_map() else {
                continue;
            };
            let system_path = format!("{flow_path}.systems.{system_key}");
            let bounded_context = option_bool(system, "boundedContext").unwrap_or(true);
            let entry = self
                .systems
                .entry(system_key.to_string())
                .or_insert_with(|| System::new(system_key, bounded_context));

            for (service_key, service) in system.get_map("services").iter() {
                let Some(service) = service.as_map() else {
                    continue;
                };
                let bounded_context = option_bool(service, "boundedContext").unwrap_or(true);
                entry.add_service(Service::new(service_key, bounded_context));

                let service_path = format!("{system_path}.services.{service_key}");
                for (index, command) in service.get_strings("commands").into_iter().enumerate() {
                    let command_path = format!("{service_path}.commands[{index}]");
                    if commands.contains_key(&command) {
                        debug!(command = command.as_str(); "Skipping duplicate command");
                        let diagnostic = Diagnostic::warning(format!("duplicate command `{command}`"))
                            .with_code(ErrorCode::E201)
                            .with_source_ref(self.document.location(&command_path))
                            .with_help("the first declaration is used");
                        self.diagnostics.emit(diagnostic);
                        continue;
                    }
                    let declared = Command::new(command.as_str(), self.document.location(&command_path))
                        .with_system(Some(system_key.to_string()))
                        .with_service(Some(service_key.to_string()));
                    commands.insert(command, declared);
                }
            }
        }

        trace!(commands = commands.len(); "Registered commands");
        commands
    }

    /// Start pass: starts, their actors and the events they stand for.
    fn collect_starts(
        &mut self,
        flow_path: &str,
        flow: &RawMap,
    ) -> (IndexMap<String, Start>, IndexMap<String, Event>) {
        let mut starts = IndexMap::new();
        let mut events = IndexMap::new();

        for (key, start) in flow.get_map("starts").iter() {
            let Some(start) = start.as_map() else {
                continue;
            };
            let start_path = format!("{flow_path}.starts.{key}");
            let source_ref = self.location(&start_path);

            let actor = option_text(start, "actor");
            if let Some(actor) = &actor {
                let actor_ref = self.location(&format!("{start_path}.options.actor"));
                self.actors
                    .entry(actor.clone())
                    .or_insert_with(|| Actor::new(actor.as_str(), actor_ref));
            }
            let system = option_text(start, "system");

            let entity = Start::new(key, source_ref.clone())
                .with_description(start.get_str("javadoc"))
                .with_actor(actor)
                .with_timer(option_text(start, "time"))
                .with_system(system.clone());
            starts.insert(key.to_string(), entity);

            let event = Event::new(key, source_ref)
                .with_system(system)
                .with_error(is_error_event(key))
                .with_start(true);
            events.insert(key.to_string(), event);
        }

        (starts, events)
    }

    /// Clause pass for one `when`.
    fn analyze_clause(
        &mut self,
        clause_path: &str,
        clause: &RawMap,
        starts: &IndexMap<String, Start>,
        commands: &mut IndexMap<String, Command>,
        events: &mut IndexMap<String, Event>,
    ) -> Option<Policy> {
        let command_name = match clause.get_opt_str("command") {
            Some(name) if !name.is_empty() => name,
            _ => {
                let diagnostic = Diagnostic::error("when-clause has no command")
                    .with_code(ErrorCode::E202)
                    .with_source_ref(self.location(clause_path));
                self.diagnostics.emit(diagnostic);
                return None;
            }
        };
        let triggers = clause.get_strings("triggers");
        let emitted = clause.get_strings("events");

        if !commands.contains_key(command_name) {
            let command_path = format!("{clause_path}.command");
            debug!(command = command_name; "Synthesizing undeclared command");
            let diagnostic = Diagnostic::warning(format!(
                "command `{command_name}` is not declared by any system or service"
            ))
            .with_code(ErrorCode::E200)
            .with_source_ref(self.location(&command_path))
            .with_help("declare it under `systems { <System> { service <Service> { commands: ... } } }`");
            self.diagnostics.emit(diagnostic);

            let synthesized = Command::new(command_name, self.location(&command_path))
                .with_system(option_text(clause, "system"))
                .with_service(option_text(clause, "service"));
            commands.insert(command_name.to_string(), synthesized);
        }

        let command = commands.get_mut(command_name)?;
        if command.actor().is_none() {
            let inherited = triggers
                .iter()
                .find_map(|trigger| starts.get(trigger).and_then(Start::actor));
            if let Some(actor) = inherited {
                command.set_actor(actor);
            }
        }

        let docs = clause.get_map("eventsJavadoc");
        for (index, name) in emitted.iter().enumerate() {
            if events.contains_key(name) {
                continue;
            }
            let event_ref = self.location(&format!("{clause_path}.events[{index}]"));
            let event = Event::new(name.as_str(), event_ref)
                .with_system(command.system().map(str::to_string))
                .with_service(command.service().map(str::to_string))
                .with_description(docs.get_opt_str(name).map(str::to_string))
                .with_error(is_error_event(name));
            events.insert(name.clone(), event);
        }

        let policy = Policy::new(triggers, command_name, emitted, self.location(clause_path))
            .with_condition(option_text(clause, "if"))
            .with_description(clause.get_opt_str("javadoc").map(str::to_string));
        Some(policy)
    }

    /// Triggers must be starts or events emitted by some clause of the flow.
    fn check_triggers(
        &mut self,
        flow_path: &str,
        flow: &RawMap,
        starts: &IndexMap<String, Start>,
        policies: &[Policy],
    ) {
        let emitted: IndexSet<&str> = policies
            .iter()
            .flat_map(|policy| policy.events().iter().map(String::as_str))
            .collect();

        for (index, clause) in flow.get_list("whens").iter().enumerate() {
            let Some(clause) = clause.as_map() else {
                continue;
            };
            for (position, trigger) in clause.get_strings("triggers").iter().enumerate() {
                if starts.contains_key(trigger) || emitted.contains(trigger.as_str()) {
                    continue;
                }
                self.warn(
                    ErrorCode::E204,
                    format!("trigger `{trigger}` is never emitted in this flow"),
                    &format!("{flow_path}.whens[{index}].triggers[{position}]"),
                );
            }
        }
    }

    /// End pass: outcome lists, checked against the flow's events.
    fn analyze_end(&mut self, flow_path: &str, flow: &RawMap, events: &IndexMap<String, Event>) -> End {
        let raw_end = flow.get_map("end");
        let mut end = End::new(self.location(&format!("{flow_path}.end")));

        for outcome in Outcome::ALL {
            let names = raw_end.get_strings(outcome.as_str());
            for name in &names {
                if !events.contains_key(name) {
                    self.warn(
                        ErrorCode::E205,
                        format!("{outcome} event `{name}` is not produced by this flow"),
                        &format!("{flow_path}.end.{outcome}"),
                    );
                }
            }
            end = end.with_outcome(outcome, names);
        }
        end
    }
}

/// Analyze `document` with a fresh [`SemanticAnalyzer`].
pub fn analyze(document: &RawDocument) -> SemanticModel {
    SemanticAnalyzer::new(document).analyze()
}
