//! Layered left-to-right layout of a [`FlowGraph`].
//!
//! The engine is a pure function of its input and configuration:
//!
//! 1. **Rank** - topological layering, see [`rank`]
//! 2. **Order** - within a rank, nodes without a system first, then by
//!    system name, then by id
//! 3. **Place** - ranks become columns, nodes stack downward with fixed
//!    type-dependent sizes
//! 4. **Group** - one padded box per system around its members
//!
//! Edges are passed through untouched, including edges whose endpoints are
//! not nodes of the graph. A graph without nodes lays out to an empty view,
//! edges included.

pub mod rank;
pub mod view;

use std::collections::BTreeMap;

use indexmap::IndexMap;
use log::{debug, info, trace};

use zfl_core::{
    flow::{FlowGraph, FlowNodeType},
    geometry::{Bounds, Insets, Point, Size},
};

use crate::config::LayoutConfig;

pub use view::{
    Direction, FlowEdgeView, FlowNodeView, FlowSystemGroupView, LayoutMetadata, VIEW_SCHEMA,
    ViewModel,
};

/// Fixed dimensions of a node of `node_type`.
///
/// ```
/// # use zfl::layout::node_size;
/// # use zfl_core::flow::FlowNodeType;
/// let size = node_size(FlowNodeType::Policy);
/// assert_eq!((size.width(), size.height()), (220.0, 64.0));
/// ```
pub fn node_size(node_type: FlowNodeType) -> Size {
    match node_type {
        FlowNodeType::Start => Size::new(160.0, 48.0),
        FlowNodeType::Command => Size::new(180.0, 56.0),
        FlowNodeType::Event => Size::new(160.0, 48.0),
        FlowNodeType::Policy => Size::new(220.0, 64.0),
        FlowNodeType::End => Size::new(140.0, 48.0),
    }
}

/// Computes a [`ViewModel`] from a [`FlowGraph`].
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out `graph`.
    pub fn layout(&self, graph: &FlowGraph) -> ViewModel {
        let metadata = LayoutMetadata::new(self.config.rank_spacing(), self.config.node_spacing());

        if graph.is_empty() {
            debug!(edges = graph.edges().len(); "Empty graph, nothing to lay out");
            return ViewModel::new(Vec::new(), Vec::new(), Vec::new(), metadata, Bounds::default());
        }

        let edges: Vec<FlowEdgeView> = graph.edges().iter().cloned().map(FlowEdgeView::new).collect();

        let ranks = rank::assign_ranks(graph);
        let nodes = self.place_nodes(graph, &ranks);
        let system_groups = self.system_groups(&nodes);
        let bounds = self.canvas_bounds(&nodes);

        info!(
            nodes = nodes.len(),
            edges = edges.len(),
            ranks = ranks.iter().max().map_or(0, |max| max + 1),
            groups = system_groups.len();
            "Laid out flow graph"
        );

        let view = ViewModel::new(nodes, edges, system_groups, metadata, bounds);
        trace!(view:?; "View model");
        view
    }

    /// Positions every node, emitted in rank order then within-rank order.
    fn place_nodes(&self, graph: &FlowGraph, ranks: &[usize]) -> Vec<FlowNodeView> {
        let mut layers: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (position, rank) in ranks.iter().enumerate() {
            layers.entry(*rank).or_default().push(position);
        }

        let nodes = graph.nodes();
        let padding = self.config.canvas_padding();
        let mut views = Vec::with_capacity(nodes.len());

        for (rank, mut members) in layers {
            members.sort_by(|a, b| {
                let (a, b) = (&nodes[*a], &nodes[*b]);
                a.system().cmp(&b.system()).then_with(|| a.id().cmp(b.id()))
            });

            let x = padding + rank as f64 * self.config.rank_spacing();
            let mut y = padding;
            for member in members {
                let node = &nodes[member];
                let size = node_size(node.node_type());
                views.push(FlowNodeView::new(node.clone(), rank, Point::new(x, y), size));
                y += size.height() + self.config.node_spacing();
            }
        }

        views
    }

    /// One box per system, in order of the first member node.
    fn system_groups(&self, nodes: &[FlowNodeView]) -> Vec<FlowSystemGroupView> {
        let mut groups: IndexMap<&str, (Bounds, Vec<String>)> = IndexMap::new();
        for view in nodes {
            let Some(system) = view.node().system() else {
                continue;
            };
            let bounds = view.bounds();
            let id = view.node().id().to_string();
            groups
                .entry(system)
                .and_modify(|(group, members)| {
                    *group = group.merge(&bounds);
                    members.push(id.clone());
                })
                .or_insert_with(|| (bounds, vec![id]));
        }

        let padding = Insets::uniform(self.config.system_group_padding());
        groups
            .into_iter()
            .map(|(system, (bounds, node_ids))| {
                FlowSystemGroupView::new(system, bounds.add_padding(padding), node_ids)
            })
            .collect()
    }

    /// Origin-anchored bounds reaching past the far node edges by the canvas
    /// padding.
    fn canvas_bounds(&self, nodes: &[FlowNodeView]) -> Bounds {
        let (max_x, max_y) = nodes.iter().map(FlowNodeView::bounds).fold(
            (0.0_f64, 0.0_f64),
            |(max_x, max_y), bounds| (max_x.max(bounds.max_x()), max_y.max(bounds.max_y())),
        );
        let padding = self.config.canvas_padding();
        Point::default().to_bounds(Size::new(max_x + padding, max_y + padding))
    }
}

/// Lay out `graph` with the default [`LayoutConfig`].
pub fn layout(graph: &FlowGraph) -> ViewModel {
    LayoutEngine::default().layout(graph)
}
