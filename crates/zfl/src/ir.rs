//! Lowering of the semantic model into the flow IR.
//!
//! Every flow contributes START, COMMAND, EVENT, POLICY and END nodes and the
//! typed edges between them. A policy node is always interposed between the
//! events that trigger a clause and the command it invokes:
//!
//! ```text
//! start:X -> event:X -> policy:X:cmd -> command:cmd -> event:Done -> end:completed
//! ```
//!
//! Nodes and edges are keyed by id, so entities shared by several flows (or
//! clauses with the same triggers and command) appear once, with the
//! attributes of their first occurrence.

use indexmap::{IndexMap, map::Entry};
use log::{debug, info, trace};

use zfl_core::{
    flow::{FlowEdge, FlowEdgeType, FlowGraph, FlowNode, FlowNodeType},
    semantic::{Flow, Outcome, Policy, SemanticModel},
};

/// Id of the policy node for a clause.
///
/// Triggers are sorted so that `when A and B` and `when B and A` share a node.
/// The condition is not part of the id.
///
/// ```
/// # use zfl::ir::policy_id;
/// let triggers = vec!["PaymentFailed".to_string(), "RetryScheduled".to_string()];
/// assert_eq!(policy_id(&triggers, "retryPayment"), "policy:PaymentFailed,RetryScheduled:retryPayment");
/// ```
pub fn policy_id(triggers: &[String], command: &str) -> String {
    let mut sorted: Vec<&str> = triggers.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    FlowNodeType::Policy.node_id(&format!("{}:{command}", sorted.join(",")))
}

/// Builds a [`FlowGraph`] from a [`SemanticModel`].
#[derive(Debug, Default)]
pub struct IrTransformer {
    nodes: IndexMap<String, FlowNode>,
    edges: IndexMap<String, FlowEdge>,
}

impl IrTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lower every flow of `model`, in declaration order.
    pub fn transform(mut self, model: &SemanticModel) -> FlowGraph {
        for flow in model.flows() {
            self.transform_flow(flow);
        }

        let graph = FlowGraph::new(
            self.nodes.into_values().collect(),
            self.edges.into_values().collect(),
        );
        info!(
            flows = model.flows().len(),
            nodes = graph.nodes().len(),
            edges = graph.edges().len();
            "Transformed semantic model"
        );
        trace!(graph:?; "Flow graph");
        graph
    }

    fn transform_flow(&mut self, flow: &Flow) {
        debug!(flow = flow.name(); "Lowering flow");

        for start in flow.starts() {
            self.add_node(
                FlowNode::new(
                    FlowNodeType::Start.node_id(start.name()),
                    FlowNodeType::Start,
                    start.name(),
                    start.source_ref().clone(),
                )
                .with_system(start.system().map(str::to_string)),
            );
        }

        for command in flow.commands() {
            self.add_node(
                FlowNode::new(
                    FlowNodeType::Command.node_id(command.name()),
                    FlowNodeType::Command,
                    command.name(),
                    command.source_ref().clone(),
                )
                .with_system(command.system().map(str::to_string))
                .with_service(command.service().map(str::to_string)),
            );
        }

        for event in flow.events() {
            self.add_node(
                FlowNode::new(
                    FlowNodeType::Event.node_id(event.name()),
                    FlowNodeType::Event,
                    event.name(),
                    event.source_ref().clone(),
                )
                .with_system(event.system().map(str::to_string))
                .with_service(event.service().map(str::to_string)),
            );
        }

        for policy in flow.policies() {
            self.add_node(policy_node(flow, policy));
        }

        let end = flow.end();
        for outcome in Outcome::ALL {
            if end.events(outcome).is_empty() {
                continue;
            }
            self.add_node(FlowNode::new(
                FlowNodeType::End.node_id(outcome.as_str()),
                FlowNodeType::End,
                outcome.as_str(),
                end.source_ref().clone(),
            ));
        }

        self.add_start_edges(flow);
        for policy in flow.policies() {
            self.add_policy_edges(policy);
        }
        self.add_end_edges(flow);
    }

    fn add_start_edges(&mut self, flow: &Flow) {
        for start in flow.starts() {
            self.add_edge(
                FlowEdge::new(
                    FlowNodeType::Start.node_id(start.name()),
                    FlowNodeType::Event.node_id(start.name()),
                    FlowEdgeType::Trigger,
                )
                .with_source_ref(start.source_ref().clone()),
            );
        }
    }

    fn add_policy_edges(&mut self, policy: &Policy) {
        let id = policy_id(policy.triggers(), policy.command());
        let command = FlowNodeType::Command.node_id(policy.command());
        let (edge_type, label) = match policy.condition() {
            Some(condition) => (FlowEdgeType::Conditional, Some(condition.to_string())),
            None => (FlowEdgeType::Trigger, None),
        };
        let edge = |source: String, target: String| {
            FlowEdge::new(source, target, edge_type)
                .with_label(label.clone())
                .with_source_ref(policy.source_ref().clone())
        };

        for trigger in policy.triggers() {
            self.add_edge(edge(FlowNodeType::Event.node_id(trigger), id.clone()));
            self.add_edge(edge(id.clone(), command.clone()));
        }

        for event in policy.events() {
            self.add_edge(
                FlowEdge::new(
                    command.clone(),
                    FlowNodeType::Event.node_id(event),
                    FlowEdgeType::Causation,
                )
                .with_source_ref(policy.source_ref().clone()),
            );
        }
    }

    fn add_end_edges(&mut self, flow: &Flow) {
        let end = flow.end();
        for outcome in Outcome::ALL {
            let target = FlowNodeType::End.node_id(outcome.as_str());
            for event in end.events(outcome) {
                self.add_edge(
                    FlowEdge::new(
                        FlowNodeType::Event.node_id(event),
                        target.clone(),
                        FlowEdgeType::Causation,
                    )
                    .with_source_ref(end.source_ref().clone()),
                );
            }
        }
    }

    fn add_node(&mut self, node: FlowNode) {
        match self.nodes.entry(node.id().to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(node);
            }
            Entry::Occupied(_) => {
                debug!(id = node.id(); "Skipping duplicate node");
            }
        }
    }

    fn add_edge(&mut self, edge: FlowEdge) {
        match self.edges.entry(edge.id().to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(edge);
            }
            Entry::Occupied(_) => {
                trace!(id = edge.id(); "Skipping duplicate edge");
            }
        }
    }
}

fn policy_node(flow: &Flow, policy: &Policy) -> FlowNode {
    let label = match policy.condition() {
        Some(condition) => condition.to_string(),
        None => policy.triggers().join(" and "),
    };
    let command = flow.command(policy.command());
    FlowNode::new(
        policy_id(policy.triggers(), policy.command()),
        FlowNodeType::Policy,
        label,
        policy.source_ref().clone(),
    )
    .with_system(command.and_then(|c| c.system()).map(str::to_string))
    .with_service(command.and_then(|c| c.service()).map(str::to_string))
}

/// Lower `model` into a [`FlowGraph`].
pub fn transform(model: &SemanticModel) -> FlowGraph {
    IrTransformer::new().transform(model)
}
