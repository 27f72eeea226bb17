//! Enter/exit callbacks over a parsed [`Document`].
//!
//! [`walk`] visits the syntax tree depth-first in source order. Annotations
//! are delivered right after the `enter_*` call of the scope they decorate.

use zfl_core::{diagnostic::Diagnostic, span::Spanned};

use crate::parser_types::{
    Annotation, Config, ConfigEntry, Document, End, Field, Flow, FlowMember, Import, Item,
    OutcomeList, Service, Start, System, Systems, When, WhenEvent,
};

/// Receiver of the walk callbacks. Every method defaults to a no-op.
#[allow(unused_variables)]
pub trait FlowListener {
    fn enter_document(&mut self, document: &Document<'_>) {}
    fn exit_document(&mut self, document: &Document<'_>) {}
    /// The doc comment heading the document, before any item.
    fn visit_document_doc(&mut self, doc: &Spanned<String>) {}

    fn visit_import(&mut self, import: &Import<'_>) {}
    fn enter_config(&mut self, config: &Config<'_>) {}
    fn visit_config_entry(&mut self, entry: &ConfigEntry<'_>) {}

    fn enter_flow(&mut self, flow: &Flow<'_>) {}
    fn exit_flow(&mut self, flow: &Flow<'_>) {}

    /// An annotation on the innermost open scope.
    fn visit_annotation(&mut self, annotation: &Annotation<'_>) {}

    fn enter_systems(&mut self, systems: &Systems<'_>) {}
    fn exit_systems(&mut self, systems: &Systems<'_>) {}
    fn enter_system(&mut self, system: &System<'_>) {}
    fn exit_system(&mut self, system: &System<'_>) {}
    fn enter_service(&mut self, service: &Service<'_>) {}
    fn exit_service(&mut self, service: &Service<'_>) {}

    fn enter_start(&mut self, start: &Start<'_>) {}
    fn exit_start(&mut self, start: &Start<'_>) {}
    fn enter_field(&mut self, field: &Field<'_>) {}
    fn exit_field(&mut self, field: &Field<'_>) {}

    fn enter_when(&mut self, when: &When<'_>) {}
    fn exit_when(&mut self, when: &When<'_>) {}
    fn visit_when_command(&mut self, command: &Spanned<&str>) {}
    fn visit_when_event(&mut self, event: &WhenEvent<'_>) {}

    fn enter_end(&mut self, end: &End<'_>) {}
    fn exit_end(&mut self, end: &End<'_>) {}
    fn visit_end_outcome(&mut self, outcome: &OutcomeList<'_>) {}

    /// A top-level item or flow member the parser could not read.
    fn visit_error_node(&mut self, diagnostic: &Diagnostic) {}
}

/// Drive `listener` over `document` in source order.
pub fn walk<L: FlowListener + ?Sized>(document: &Document<'_>, listener: &mut L) {
    listener.enter_document(document);
    if let Some(doc) = &document.doc {
        listener.visit_document_doc(doc);
    }
    for item in &document.items {
        match item {
            Item::Import(import) => listener.visit_import(import),
            Item::Config(config) => {
                listener.enter_config(config);
                for entry in &config.entries {
                    listener.visit_config_entry(entry);
                }
            }
            Item::Flow(flow) => walk_flow(flow, listener),
            Item::Error(diagnostic) => listener.visit_error_node(diagnostic),
        }
    }
    listener.exit_document(document);
}

fn walk_annotations<L: FlowListener + ?Sized>(annotations: &[Annotation<'_>], listener: &mut L) {
    for annotation in annotations {
        listener.visit_annotation(annotation);
    }
}

fn walk_flow<L: FlowListener + ?Sized>(flow: &Flow<'_>, listener: &mut L) {
    listener.enter_flow(flow);
    walk_annotations(&flow.decorations.annotations, listener);

    for member in &flow.members {
        match member {
            FlowMember::Systems(systems) => {
                listener.enter_systems(systems);
                for system in &systems.systems {
                    listener.enter_system(system);
                    walk_annotations(&system.decorations.annotations, listener);
                    for service in &system.services {
                        listener.enter_service(service);
                        walk_annotations(&service.decorations.annotations, listener);
                        listener.exit_service(service);
                    }
                    listener.exit_system(system);
                }
                listener.exit_systems(systems);
            }
            FlowMember::Start(start) => {
                listener.enter_start(start);
                walk_annotations(&start.decorations.annotations, listener);
                for field in &start.fields {
                    listener.enter_field(field);
                    walk_annotations(&field.decorations.annotations, listener);
                    listener.exit_field(field);
                }
                listener.exit_start(start);
            }
            FlowMember::When(when) => {
                listener.enter_when(when);
                walk_annotations(&when.decorations.annotations, listener);
                listener.visit_when_command(&when.command);
                for event in &when.events {
                    listener.visit_when_event(event);
                }
                listener.exit_when(when);
            }
            FlowMember::End(end) => {
                listener.enter_end(end);
                for outcome in &end.outcomes {
                    listener.visit_end_outcome(outcome);
                }
                listener.exit_end(end);
            }
            FlowMember::Error(diagnostic) => listener.visit_error_node(diagnostic),
        }
    }

    listener.exit_flow(flow);
}
