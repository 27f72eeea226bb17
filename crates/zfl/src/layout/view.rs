//! Positioned output of the layout stage.
//!
//! Everything here serializes to the JSON view contract consumed by
//! renderers: camelCase keys, `type` for node/edge kinds and a fixed
//! [`VIEW_SCHEMA`] tag at the top level.

use serde::Serialize;

use zfl_core::{
    flow::{FlowEdge, FlowNode},
    geometry::{Bounds, Point, Size},
};

/// Schema tag written at the top of every [`ViewModel`].
pub const VIEW_SCHEMA: &str = "zfl.eventflow.view@1";

/// Name of the layout algorithm recorded in [`LayoutMetadata`].
pub const ENGINE_NAME: &str = "zfl-layered";

/// A laid-out flow graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    schema: &'static str,
    nodes: Vec<FlowNodeView>,
    edges: Vec<FlowEdgeView>,
    system_groups: Vec<FlowSystemGroupView>,
    layout: LayoutMetadata,
    bounds: Bounds,
}

impl ViewModel {
    pub fn new(
        nodes: Vec<FlowNodeView>,
        edges: Vec<FlowEdgeView>,
        system_groups: Vec<FlowSystemGroupView>,
        layout: LayoutMetadata,
        bounds: Bounds,
    ) -> Self {
        Self {
            schema: VIEW_SCHEMA,
            nodes,
            edges,
            system_groups,
            layout,
            bounds,
        }
    }

    pub fn schema(&self) -> &str {
        self.schema
    }

    pub fn nodes(&self) -> &[FlowNodeView] {
        &self.nodes
    }

    pub fn edges(&self) -> &[FlowEdgeView] {
        &self.edges
    }

    pub fn system_groups(&self) -> &[FlowSystemGroupView] {
        &self.system_groups
    }

    pub fn layout(&self) -> &LayoutMetadata {
        &self.layout
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn node(&self, id: &str) -> Option<&FlowNodeView> {
        self.nodes.iter().find(|view| view.node().id() == id)
    }
}

/// A flow node with its rank, position and fixed dimensions.
///
/// Serializes as the node's own fields plus `rank`, `position` and
/// `dimensions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowNodeView {
    #[serde(flatten)]
    node: FlowNode,
    rank: usize,
    position: Point,
    dimensions: Size,
}

impl FlowNodeView {
    pub fn new(node: FlowNode, rank: usize, position: Point, dimensions: Size) -> Self {
        Self {
            node,
            rank,
            position,
            dimensions,
        }
    }

    pub fn node(&self) -> &FlowNode {
        &self.node
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Top-left corner.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn dimensions(&self) -> Size {
        self.dimensions
    }

    pub fn bounds(&self) -> Bounds {
        self.position.to_bounds(self.dimensions)
    }
}

/// An edge passed through unchanged; routing is left to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FlowEdgeView(FlowEdge);

impl FlowEdgeView {
    pub fn new(edge: FlowEdge) -> Self {
        Self(edge)
    }

    pub fn edge(&self) -> &FlowEdge {
        &self.0
    }
}

/// Bounding box around every node of one system.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSystemGroupView {
    system_name: String,
    bounds: Bounds,
    node_ids: Vec<String>,
}

impl FlowSystemGroupView {
    pub fn new(system_name: impl Into<String>, bounds: Bounds, node_ids: Vec<String>) -> Self {
        Self {
            system_name: system_name.into(),
            bounds,
            node_ids,
        }
    }

    pub fn system_name(&self) -> &str {
        &self.system_name
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn node_ids(&self) -> &[String] {
        &self.node_ids
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    #[serde(rename = "LR")]
    LeftToRight,
}

/// Algorithm description for renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutMetadata {
    engine: &'static str,
    direction: Direction,
    rank_spacing: f64,
    node_spacing: f64,
}

impl LayoutMetadata {
    pub fn new(rank_spacing: f64, node_spacing: f64) -> Self {
        Self {
            engine: ENGINE_NAME,
            direction: Direction::LeftToRight,
            rank_spacing,
            node_spacing,
        }
    }

    pub fn engine(&self) -> &str {
        self.engine
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn rank_spacing(&self) -> f64 {
        self.rank_spacing
    }

    pub fn node_spacing(&self) -> f64 {
        self.node_spacing
    }
}
