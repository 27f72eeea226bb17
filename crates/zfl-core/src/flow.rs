//! Flow IR: a flat, typed node/edge graph derived from the semantic model.
//!
//! Node ids are namespaced by node type (`start:X`, `command:X`, `event:X`,
//! `policy:<triggers>:<command>`, `end:<outcome>`) so entities sharing a bare
//! name never collide.

use std::fmt;

use serde::Serialize;

use crate::source::SourceRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowNodeType {
    Start,
    Command,
    Event,
    Policy,
    End,
}

impl FlowNodeType {
    /// Prefix used in node ids of this type.
    pub fn prefix(&self) -> &'static str {
        match self {
            FlowNodeType::Start => "start",
            FlowNodeType::Command => "command",
            FlowNodeType::Event => "event",
            FlowNodeType::Policy => "policy",
            FlowNodeType::End => "end",
        }
    }

    /// Namespaced id for a node of this type.
    ///
    /// ```
    /// # use zfl_core::flow::FlowNodeType;
    /// assert_eq!(FlowNodeType::Command.node_id("chargePayment"), "command:chargePayment");
    /// ```
    pub fn node_id(&self, key: &str) -> String {
        format!("{}:{key}", self.prefix())
    }
}

impl fmt::Display for FlowNodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowEdgeType {
    /// Event or start leading to a policy/command without a guard.
    Trigger,
    /// Transition gated by a guard condition.
    Conditional,
    /// Command causing an event, or event reaching an outcome.
    Causation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    id: String,
    #[serde(rename = "type")]
    node_type: FlowNodeType,
    label: String,
    system: Option<String>,
    service: Option<String>,
    source_ref: SourceRef,
}

impl FlowNode {
    pub fn new(
        id: impl Into<String>,
        node_type: FlowNodeType,
        label: impl Into<String>,
        source_ref: SourceRef,
    ) -> Self {
        Self {
            id: id.into(),
            node_type,
            label: label.into(),
            system: None,
            service: None,
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

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn node_type(&self) -> FlowNodeType {
        self.node_type
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn source_ref(&self) -> &SourceRef {
        &self.source_ref
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
    id: String,
    source: String,
    target: String,
    #[serde(rename = "type")]
    edge_type: FlowEdgeType,
    label: Option<String>,
    source_ref: Option<SourceRef>,
}

impl FlowEdge {
    /// Create an edge whose id is `<source>-><target>`.
    pub fn new(source: impl Into<String>, target: impl Into<String>, edge_type: FlowEdgeType) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("{source}->{target}"),
            source,
            target,
            edge_type,
            label: None,
            source_ref: None,
        }
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn with_source_ref(mut self, source_ref: SourceRef) -> Self {
        self.source_ref = Some(source_ref);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn edge_type(&self) -> FlowEdgeType {
        self.edge_type
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn source_ref(&self) -> Option<&SourceRef> {
        self.source_ref.as_ref()
    }
}

/// Nodes and edges of one document, in deterministic insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowGraph {
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
}

impl FlowGraph {
    pub fn new(nodes: Vec<FlowNode>, edges: Vec<FlowEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    pub fn edge(&self, id: &str) -> Option<&FlowEdge> {
        self.edges.iter().find(|edge| edge.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
