//! Raw tree construction from walk callbacks.
//!
//! [`RawTreeBuilder`] keeps a stack of open scopes (flow, system, service,
//! start, field, when). Entering a scope pushes a fresh map; leaving it links
//! the finished map into its parent, either under its name or appended to
//! the parent's `whens` list. Every named element also gets an entry in the
//! path → [`SourceRef`] index.

use indexmap::IndexMap;
use log::{debug, trace};

use zfl_core::{
    diagnostic::{Diagnostic, DiagnosticCollector, ErrorCode},
    semantic::Outcome,
    source::{SourceMap, SourceRef},
    span::{Span, Spanned},
};

use crate::{
    listener::FlowListener,
    parser_types::{
        Annotation, ConfigEntry, Decorations, End, Field, Flow, Import, OutcomeList, Service,
        Start, System, Systems, Value, When, WhenEvent,
    },
    raw::{RawDocument, RawMap, RawValue},
};

/// Key used for a `service { ... }` block without a name.
pub const DEFAULT_SERVICE: &str = "DefaultService";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Flow,
    System,
    Service,
    Start,
    Field,
    When,
}

impl ScopeKind {
    /// Slot in the parent map this scope is linked into.
    fn parent_slot(self) -> &'static str {
        match self {
            ScopeKind::Flow => "flows",
            ScopeKind::System => "systems",
            ScopeKind::Service => "services",
            ScopeKind::Start => "starts",
            ScopeKind::Field => "fields",
            ScopeKind::When => "whens",
        }
    }
}

#[derive(Debug)]
struct Frame {
    kind: ScopeKind,
    key: String,
    path: String,
    map: RawMap,
    /// Set for duplicate declarations (and everything inside them); such
    /// scopes are built but never linked and record no locations.
    discarded: bool,
}

/// Builds a [`RawDocument`] from [`FlowListener`] callbacks.
pub struct RawTreeBuilder<'src> {
    source_map: SourceMap<'src>,
    root: RawMap,
    locations: IndexMap<String, SourceRef>,
    diagnostics: DiagnosticCollector,
    stack: Vec<Frame>,
}

impl<'src> RawTreeBuilder<'src> {
    pub fn new(source_map: SourceMap<'src>) -> Self {
        let mut root = RawMap::new();
        root.insert("javadoc", RawValue::null());
        root.insert("imports", Vec::<RawValue>::new());
        root.insert("config", RawMap::new());
        root.insert("flows", RawMap::new());

        Self {
            source_map,
            root,
            locations: IndexMap::new(),
            diagnostics: DiagnosticCollector::new(),
            stack: Vec::new(),
        }
    }

    /// Add diagnostics produced before the walk, such as lexer errors.
    pub fn add_diagnostics(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            let diagnostic = self.locate(diagnostic);
            self.diagnostics.emit(diagnostic);
        }
    }

    pub fn finish(self) -> RawDocument {
        RawDocument::new(
            self.root,
            self.locations,
            self.diagnostics.finish(),
            self.source_map.file(),
        )
    }

    /// Attach a source ref derived from the primary span, if missing.
    fn locate(&self, diagnostic: Diagnostic) -> Diagnostic {
        if diagnostic.source_ref().is_some() {
            return diagnostic;
        }
        match diagnostic.primary_span() {
            Some(span) => {
                let source_ref = self.source_map.span_ref(span);
                diagnostic.with_source_ref(source_ref)
            }
            None => diagnostic,
        }
    }

    fn is_discarding(&self) -> bool {
        self.stack.last().is_some_and(|frame| frame.discarded)
    }

    /// Record the location of `path`; the first recording wins.
    fn record(&mut self, path: String, span: Span) {
        if self.is_discarding() {
            return;
        }
        let source_ref = self.source_map.span_ref(span);
        self.locations.entry(path).or_insert(source_ref);
    }

    fn duplicate(&mut self, what: &str, name: &str, span: Span) {
        debug!(kind = what, name; "Skipping duplicate declaration");
        let diagnostic = Diagnostic::warning(format!("duplicate {what} `{name}`"))
            .with_code(ErrorCode::E201)
            .with_label(span, "declared again here")
            .with_help("the first declaration is used");
        let diagnostic = self.locate(diagnostic);
        self.diagnostics.emit(diagnostic);
    }

    /// Map in `parent` that scopes of `kind` are linked into.
    fn parent_slot(&self, kind: ScopeKind) -> Option<&RawMap> {
        match self.stack.last() {
            Some(parent) => parent.map.get(kind.parent_slot()).and_then(RawValue::as_map),
            None => self.root.get(kind.parent_slot()).and_then(RawValue::as_map),
        }
    }

    /// Path of the innermost open scope, empty at the top level.
    fn top_path(&self) -> String {
        self.stack
            .last()
            .map(|frame| frame.path.clone())
            .unwrap_or_default()
    }

    /// Open a named scope; a name already present in the parent slot is
    /// reported and the new scope discarded.
    fn push_named(&mut self, kind: ScopeKind, what: &str, name: &Spanned<&str>, span: Span, map: RawMap) {
        let key = name.inner().to_string();
        let parent_path = self.top_path();
        let path = match kind {
            ScopeKind::Flow => format!("flows.{key}"),
            _ => format!("{parent_path}.{}.{key}", kind.parent_slot()),
        };

        let already_declared = self
            .parent_slot(kind)
            .is_some_and(|slot| slot.contains_key(&key));
        let parent_discarded = self.is_discarding();
        if already_declared && !parent_discarded {
            self.duplicate(what, &key, name.span());
        }

        self.stack.push(Frame {
            kind,
            key,
            path: path.clone(),
            map,
            discarded: already_declared || parent_discarded,
        });
        self.record(path.clone(), span);
        self.record(format!("{path}.name"), name.span());
    }

    /// Close the innermost scope and link it into its parent.
    fn pop(&mut self, kind: ScopeKind) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        debug_assert_eq!(frame.kind, kind);
        if frame.discarded {
            return;
        }
        trace!(path = frame.path.as_str(); "Closing scope");

        let slot = frame.kind.parent_slot();
        let parent = match self.stack.last_mut() {
            Some(parent) => &mut parent.map,
            None => &mut self.root,
        };
        match frame.kind {
            ScopeKind::When => {
                if let Some(whens) = parent.get_list_mut(slot) {
                    whens.push(RawValue::Mapping(frame.map));
                }
            }
            _ => {
                if let Some(children) = parent.get_map_mut(slot) {
                    children.insert(frame.key, frame.map);
                }
            }
        }
    }

    fn current_map(&mut self) -> Option<&mut RawMap> {
        self.stack.last_mut().map(|frame| &mut frame.map)
    }

    fn current_path(&self, kind: ScopeKind) -> Option<String> {
        self.stack
            .iter()
            .rev()
            .find(|frame| frame.kind == kind)
            .map(|frame| frame.path.clone())
    }
}

fn class_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn raw_value(value: &Value<'_>) -> RawValue {
    match value {
        Value::String(text) => RawValue::from(text.as_str()),
        Value::Number(number) => RawValue::from(*number),
        Value::Bool(flag) => RawValue::from(*flag),
        Value::Identifier(name) => RawValue::from(*name),
        Value::List(values) => RawValue::Sequence(values.iter().map(raw_value).collect()),
    }
}

fn javadoc(decorations: &Decorations<'_>) -> RawValue {
    decorations
        .doc
        .as_ref()
        .map(|doc| doc.inner().clone())
        .into()
}

/// Common keys of every decorated scope.
fn scope_map(name: Option<&str>, decorations: &Decorations<'_>) -> RawMap {
    let mut map = RawMap::new();
    if let Some(name) = name {
        map.insert("name", name);
    }
    map.insert("javadoc", javadoc(decorations));
    map.insert("options", RawMap::new());
    map.insert("optionsList", Vec::<RawValue>::new());
    map
}

fn names(names: &[Spanned<&str>]) -> Vec<RawValue> {
    names.iter().map(|name| RawValue::from(*name.inner())).collect()
}

/// Fill each system's `events` with the events of the clauses whose command
/// one of its services declares, in clause order and without repeats.
fn attribute_events(flow: &mut RawMap) {
    let clauses: Vec<(String, Vec<String>)> = flow
        .get_list("whens")
        .iter()
        .filter_map(RawValue::as_map)
        .filter_map(|when| Some((when.get_opt_str("command")?.to_string(), when.get_strings("events"))))
        .collect();
    let Some(systems) = flow.get_map_mut("systems") else {
        return;
    };

    for system in systems.values_mut() {
        let RawValue::Mapping(system) = system else {
            continue;
        };
        let commands: Vec<String> = system
            .get_map("services")
            .iter()
            .filter_map(|(_, service)| service.as_map())
            .flat_map(|service| service.get_strings("commands"))
            .collect();

        let mut events: Vec<String> = Vec::new();
        for (command, emitted) in &clauses {
            if !commands.contains(command) {
                continue;
            }
            for event in emitted {
                if !events.contains(event) {
                    events.push(event.clone());
                }
            }
        }
        system.insert("events", events.into_iter().map(RawValue::from).collect::<Vec<_>>());
    }
}

impl FlowListener for RawTreeBuilder<'_> {
    fn visit_document_doc(&mut self, doc: &Spanned<String>) {
        self.root.insert("javadoc", doc.inner().as_str());
        self.record("javadoc".to_string(), doc.span());
    }

    fn visit_import(&mut self, import: &Import<'_>) {
        let index = self.root.get_list("imports").len();
        let mut entry = RawMap::new();
        entry.insert("key", *import.key.inner());
        entry.insert("value", import.value.inner().as_str());
        if let Some(imports) = self.root.get_list_mut("imports") {
            imports.push(entry.into());
        }
        self.record(format!("imports[{index}]"), import.span);
    }

    fn visit_config_entry(&mut self, entry: &ConfigEntry<'_>) {
        let name = entry.name.inner().to_string();
        if let Some(config) = self.root.get_map_mut("config") {
            config.insert(name.as_str(), raw_value(entry.value.inner()));
        }
        self.record(format!("config.{name}"), entry.name.span());
    }

    fn enter_flow(&mut self, flow: &Flow<'_>) {
        let name = *flow.name.inner();
        let mut map = scope_map(Some(name), &flow.decorations);
        map.insert("className", class_name(name));
        map.insert("systems", RawMap::new());
        map.insert("starts", RawMap::new());
        map.insert("whens", Vec::<RawValue>::new());
        let mut end = RawMap::new();
        for outcome in Outcome::ALL {
            end.insert(outcome.as_str(), Vec::<RawValue>::new());
        }
        map.insert("end", end);

        self.push_named(ScopeKind::Flow, "flow", &flow.name, flow.span, map);
    }

    fn exit_flow(&mut self, _flow: &Flow<'_>) {
        if let Some(flow) = self.current_map() {
            attribute_events(flow);
        }
        self.pop(ScopeKind::Flow);
    }

    fn visit_annotation(&mut self, annotation: &Annotation<'_>) {
        let name = annotation.name.inner().to_string();
        let value = annotation
            .value
            .as_ref()
            .map_or(RawValue::from(true), |value| raw_value(value.inner()));

        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        let path = format!("{}.options.{name}", frame.path);
        if let Some(options) = frame.map.get_map_mut("options") {
            options.insert(name.as_str(), value.clone());
        }
        if let Some(options_list) = frame.map.get_list_mut("optionsList") {
            let mut entry = RawMap::new();
            entry.insert("name", name.as_str());
            entry.insert("value", value);
            options_list.push(entry.into());
        }
        self.record(path, annotation.span);
    }

    fn enter_systems(&mut self, systems: &Systems<'_>) {
        if let Some(flow_path) = self.current_path(ScopeKind::Flow) {
            self.record(format!("{flow_path}.systems"), systems.span);
        }
    }

    fn enter_system(&mut self, system: &System<'_>) {
        let name = *system.name.inner();
        let mut map = scope_map(Some(name), &system.decorations);
        map.insert("zdl", RawValue::null());
        map.insert("services", RawMap::new());
        map.insert("events", Vec::<RawValue>::new());
        self.push_named(ScopeKind::System, "system", &system.name, system.span, map);
    }

    fn exit_system(&mut self, _system: &System<'_>) {
        // Annotations arrive after `enter_system`, so `@zdl` is only known here.
        if let Some(system) = self.current_map() {
            let zdl = system.get_map("options").get_opt_str("zdl").map(str::to_string);
            if let Some(zdl) = zdl {
                system.insert("zdl", zdl);
            }
        }
        self.pop(ScopeKind::System);
    }

    fn enter_service(&mut self, service: &Service<'_>) {
        let name = service
            .name
            .unwrap_or_else(|| Spanned::new(DEFAULT_SERVICE, service.span));
        let mut map = scope_map(Some(*name.inner()), &service.decorations);
        map.insert("commands", names(&service.commands));
        self.push_named(ScopeKind::Service, "service", &name, service.span, map);

        let path = self.top_path();
        for (index, command) in service.commands.iter().enumerate() {
            self.record(format!("{path}.commands[{index}]"), command.span());
        }
    }

    fn exit_service(&mut self, _service: &Service<'_>) {
        self.pop(ScopeKind::Service);
    }

    fn enter_start(&mut self, start: &Start<'_>) {
        let name = *start.name.inner();
        let mut map = scope_map(Some(name), &start.decorations);
        map.insert("className", class_name(name));
        map.insert("fields", RawMap::new());
        self.push_named(ScopeKind::Start, "start", &start.name, start.span, map);
    }

    fn exit_start(&mut self, _start: &Start<'_>) {
        self.pop(ScopeKind::Start);
    }

    fn enter_field(&mut self, field: &Field<'_>) {
        let mut map = scope_map(Some(*field.name.inner()), &field.decorations);
        map.insert("type", *field.type_name.inner());
        map.insert("isArray", field.is_array);
        self.push_named(ScopeKind::Field, "field", &field.name, field.span, map);
    }

    fn exit_field(&mut self, _field: &Field<'_>) {
        self.pop(ScopeKind::Field);
    }

    fn enter_when(&mut self, when: &When<'_>) {
        let Some(flow) = self.stack.last() else {
            return;
        };
        let index = flow.map.get_list("whens").len();
        let path = format!("{}.whens[{index}]", flow.path);
        let discarded = flow.discarded;

        let mut map = scope_map(None, &when.decorations);
        map.insert("triggers", names(&when.triggers));
        map.insert("command", RawValue::null());
        map.insert("events", Vec::<RawValue>::new());
        map.insert("eventsJavadoc", RawMap::new());

        self.stack.push(Frame {
            kind: ScopeKind::When,
            key: index.to_string(),
            path: path.clone(),
            map,
            discarded,
        });
        self.record(path.clone(), when.span);
        if let Some(first) = when.triggers.first() {
            self.record(format!("{path}.triggers"), first.span());
        }
        for (index, trigger) in when.triggers.iter().enumerate() {
            self.record(format!("{path}.triggers[{index}]"), trigger.span());
        }
    }

    fn exit_when(&mut self, _when: &When<'_>) {
        self.pop(ScopeKind::When);
    }

    fn visit_when_command(&mut self, command: &Spanned<&str>) {
        let Some(path) = self.current_path(ScopeKind::When) else {
            return;
        };
        if let Some(map) = self.current_map() {
            map.insert("command", *command.inner());
        }
        self.record(format!("{path}.command"), command.span());
    }

    fn visit_when_event(&mut self, event: &WhenEvent<'_>) {
        let Some(path) = self.current_path(ScopeKind::When) else {
            return;
        };
        let name = *event.name.inner();
        let Some(map) = self.current_map() else {
            return;
        };

        let index = map.get_list("events").len();
        if let Some(events) = map.get_list_mut("events") {
            events.push(RawValue::from(name));
        }
        if let Some(doc) = &event.doc {
            if let Some(docs) = map.get_map_mut("eventsJavadoc") {
                if !docs.contains_key(name) {
                    docs.insert(name, doc.inner().as_str());
                }
            }
        }
        self.record(format!("{path}.events[{index}]"), event.name.span());
    }

    fn enter_end(&mut self, end: &End<'_>) {
        if let Some(flow_path) = self.current_path(ScopeKind::Flow) {
            self.record(format!("{flow_path}.end"), end.span);
        }
    }

    fn visit_end_outcome(&mut self, outcome: &OutcomeList<'_>) {
        let category = *outcome.category.inner();
        let Some(kind) = Outcome::from_keyword(category) else {
            let diagnostic = Diagnostic::error(format!("unknown outcome category `{category}`"))
                .with_code(ErrorCode::E203)
                .with_label(outcome.category.span(), "not an outcome category")
                .with_help("use `completed`, `suspended` or `cancelled`");
            let diagnostic = self.locate(diagnostic);
            self.diagnostics.emit(diagnostic);
            return;
        };

        let Some(flow_path) = self.current_path(ScopeKind::Flow) else {
            return;
        };
        let events = names(&outcome.events);
        if let Some(list) = self
            .current_map()
            .and_then(|flow| flow.get_map_mut("end"))
            .and_then(|end| end.get_list_mut(kind.as_str()))
        {
            list.extend(events);
        }
        self.record(format!("{flow_path}.end.{}", kind.as_str()), outcome.category.span());
    }

    fn visit_error_node(&mut self, diagnostic: &Diagnostic) {
        let diagnostic = self.locate(diagnostic.clone());
        self.diagnostics.emit(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{listener::walk, lexer::tokenize, parser::build_document};

    fn build(source: &str) -> RawDocument {
        let (tokens, lexer_diagnostics) = tokenize(source);
        let document = build_document(&tokens);
        let mut builder = RawTreeBuilder::new(SourceMap::new("test.zfl", source));
        builder.add_diagnostics(lexer_diagnostics);
        walk(&document, &mut builder);
        builder.finish()
    }

    fn str_at<'a>(document: &'a RawDocument, path: &str) -> Option<&'a str> {
        document.query(path).and_then(RawValue::as_str)
    }

    #[test]
    fn test_flow_shape() {
        let document = build(
            r#"
/** Order handling */
@zdl("orders.zdl")
flow orders {
    start PlaceOrder
}
"#,
        );
        assert_eq!(str_at(&document, "flows.orders.name"), Some("orders"));
        assert_eq!(str_at(&document, "flows.orders.className"), Some("Orders"));
        assert_eq!(
            str_at(&document, "flows.orders.javadoc"),
            Some("Order handling")
        );
        assert_eq!(
            str_at(&document, "flows.orders.options.zdl"),
            Some("orders.zdl")
        );
        assert_eq!(
            str_at(&document, "flows.orders.optionsList[0].name"),
            Some("zdl")
        );
        for outcome in ["completed", "suspended", "cancelled"] {
            let list = document
                .query(&format!("flows.orders.end.{outcome}"))
                .and_then(RawValue::as_list);
            assert_eq!(list.map(<[RawValue]>::len), Some(0));
        }
        assert!(document.diagnostics().is_empty());
    }

    #[test]
    fn test_options_keep_every_occurrence() {
        let document = build("@tag(\"a\") @tag(\"b\") @flag flow F { }");
        assert_eq!(str_at(&document, "flows.F.options.tag"), Some("b"));
        assert_eq!(
            document
                .query("flows.F.options.flag")
                .and_then(RawValue::as_bool),
            Some(true)
        );
        let list = document.query("flows.F.optionsList").and_then(RawValue::as_list);
        assert_eq!(list.map(<[RawValue]>::len), Some(3));
    }

    #[test]
    fn test_systems_services_and_locations() {
        let source = "flow F {\n  systems {\n    Billing {\n      service { commands: invoice, refund }\n    }\n  }\n}\n";
        let document = build(source);
        let service = "flows.F.systems.Billing.services.DefaultService";
        assert_eq!(
            str_at(&document, &format!("{service}.name")),
            Some("DefaultService")
        );
        assert_eq!(
            str_at(&document, &format!("{service}.commands[1]")),
            Some("refund")
        );

        let location = document.location(&format!("{service}.commands[1]"));
        assert_eq!((location.line(), location.column()), (4, 36));
        let system = document.location("flows.F.systems.Billing");
        assert_eq!((system.line(), system.column()), (3, 5));
        assert!(document.locations().contains_key("flows.F.systems"));
    }

    #[test]
    fn test_whens_are_ordered_with_event_docs() {
        let source = r#"
flow F {
    @if("amount > 0")
    when A and B {
        command charge
        /** Money taken */
        event Charged
        event ChargeFailed
    }
    when Charged { command ship }
}
"#;
        let document = build(source);
        assert_eq!(str_at(&document, "flows.F.whens[0].command"), Some("charge"));
        assert_eq!(str_at(&document, "flows.F.whens[0].triggers[1]"), Some("B"));
        assert_eq!(
            str_at(&document, "flows.F.whens[0].options.if"),
            Some("amount > 0")
        );
        assert_eq!(
            str_at(&document, "flows.F.whens[0].eventsJavadoc.Charged"),
            Some("Money taken")
        );
        assert_eq!(str_at(&document, "flows.F.whens[1].command"), Some("ship"));
        for path in [
            "flows.F.whens[0]",
            "flows.F.whens[0].triggers",
            "flows.F.whens[0].triggers[1]",
            "flows.F.whens[0].command",
            "flows.F.whens[0].events[1]",
            "flows.F.whens[1].command",
        ] {
            assert!(document.locations().contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_start_fields() {
        let document = build(
            "flow F { @actor(Customer) start signUp { /** Email */ email: String tags String[] } }",
        );
        assert_eq!(
            str_at(&document, "flows.F.starts.signUp.className"),
            Some("SignUp")
        );
        assert_eq!(
            str_at(&document, "flows.F.starts.signUp.options.actor"),
            Some("Customer")
        );
        assert_eq!(
            str_at(&document, "flows.F.starts.signUp.fields.email.javadoc"),
            Some("Email")
        );
        assert_eq!(
            document
                .query("flows.F.starts.signUp.fields.tags.isArray")
                .and_then(RawValue::as_bool),
            Some(true)
        );
        assert!(
            document
                .locations()
                .contains_key("flows.F.starts.signUp.fields.tags")
        );
    }

    #[test]
    fn test_end_outcomes_and_unknown_category() {
        let document = build("flow F { end { completed: A, B finished: C cancelled: D } }");
        let completed = document.root().get_map("flows").get_map("F").get_map("end").get_strings("completed");
        assert_eq!(completed, ["A", "B"]);
        assert_eq!(
            str_at(&document, "flows.F.end.cancelled[0]"),
            Some("D")
        );

        let diagnostics = document.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E203));
        assert!(diagnostics[0].severity().is_error());
        assert!(diagnostics[0].source_ref().is_some());
    }

    #[test]
    fn test_duplicate_declarations_keep_first() {
        let document = build(
            "flow F { start S { a: One } start S { a: Two } } flow F { start Other }",
        );
        assert_eq!(
            str_at(&document, "flows.F.starts.S.fields.a.type"),
            Some("One")
        );
        assert!(document.query("flows.F.starts.Other").is_none());

        let duplicates: Vec<_> = document
            .diagnostics()
            .iter()
            .filter(|d| d.code() == Some(ErrorCode::E201))
            .collect();
        assert_eq!(duplicates.len(), 2);
        assert!(duplicates.iter().all(|d| d.severity().is_warning()));
    }

    #[test]
    fn test_document_doc() {
        let document = build("/** Subscription flows. */\nimport subs: \"subs.zdl\"\nflow F { start A }");
        assert_eq!(str_at(&document, "javadoc"), Some("Subscription flows."));
        assert!(document.query("flows.F.javadoc").is_some_and(RawValue::is_null));
        assert_eq!(document.location("javadoc").line(), 1);
        assert!(document.diagnostics().is_empty());
    }

    #[test]
    fn test_doc_before_first_flow_belongs_to_the_flow() {
        let document = build("/** Only the flow */\n@zdl(\"f.zdl\")\nflow F { start A }");
        assert!(document.query("javadoc").is_some_and(RawValue::is_null));
        assert_eq!(str_at(&document, "flows.F.javadoc"), Some("Only the flow"));

        let document = build("/** Whole file */\n\n/** The flow */\nflow F { start A }");
        assert_eq!(str_at(&document, "javadoc"), Some("Whole file"));
        assert_eq!(str_at(&document, "flows.F.javadoc"), Some("The flow"));
    }

    #[test]
    fn test_system_zdl_and_events() {
        let document = build(
            r#"
flow F {
    systems {
        @zdl("subscriptions.zdl")
        Subscription {
            service SubscriptionService { commands: renew, cancel }
        }
        Payments {
            service { commands: charge }
        }
    }
    start Tick
    when Tick { command renew event Renewed event RenewFailed }
    when Renewed { command charge event Charged }
    when RenewFailed { command renew event Renewed }
    when Charged { command unknown event Lost }
}
"#,
        );
        let systems = document.root().get_map("flows").get_map("F").get_map("systems");

        let subscription = systems.get_map("Subscription");
        assert_eq!(subscription.get_opt_str("zdl"), Some("subscriptions.zdl"));
        assert_eq!(subscription.get_strings("events"), ["Renewed", "RenewFailed"]);

        let payments = systems.get_map("Payments");
        assert!(payments.get("zdl").is_some_and(RawValue::is_null));
        assert_eq!(payments.get_strings("events"), ["Charged"]);
    }

    #[test]
    fn test_imports_and_config() {
        let document = build("import base: \"base.zfl\"\nconfig { strict: true }\n");
        assert_eq!(str_at(&document, "imports[0].key"), Some("base"));
        assert_eq!(str_at(&document, "imports[0].value"), Some("base.zfl"));
        assert_eq!(
            document.query("config.strict").and_then(RawValue::as_bool),
            Some(true)
        );
        assert!(document.locations().contains_key("config.strict"));
    }

    #[test]
    fn test_syntax_errors_become_diagnostics() {
        let document = build("flow F { when { } start S }\n\"open");
        let codes: Vec<_> = document
            .diagnostics()
            .iter()
            .filter_map(|d| d.code())
            .collect();
        assert!(codes.contains(&ErrorCode::E001), "{codes:?}");
        assert!(codes.contains(&ErrorCode::E100), "{codes:?}");
        assert!(document.diagnostics().iter().all(|d| d.source_ref().is_some()));
        assert!(document.query("flows.F.starts.S").is_some());
    }
}
