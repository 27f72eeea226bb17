//! Rank assignment for the layered layout.
//!
//! Ranks come from a FIFO topological pass: every node with no incoming
//! edges starts at rank 0, and a node gets `r + 1` when the edge from a node
//! at rank `r` brings its remaining in-degree to zero. On a DAG this is the
//! length of the longest path reaching the node.
//!
//! Nodes the pass never reaches (cycle members and anything downstream of a
//! cycle) are placed one per rank after the current maximum, in graph order.

use std::collections::{HashMap, VecDeque};

use log::{debug, trace};

use zfl_core::flow::FlowGraph;

/// Rank of every node of `graph`, indexed like [`FlowGraph::nodes`].
///
/// Edges whose source or target is not a node of the graph are ignored. When
/// two nodes share an id, edges resolve to the first of them.
pub fn assign_ranks(graph: &FlowGraph) -> Vec<usize> {
    let nodes = graph.nodes();

    let mut index: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
    for (position, node) in nodes.iter().enumerate() {
        index.entry(node.id()).or_insert(position);
    }

    let mut in_degree = vec![0usize; nodes.len()];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for edge in graph.edges() {
        let (Some(&source), Some(&target)) = (index.get(edge.source()), index.get(edge.target()))
        else {
            trace!(edge = edge.id(); "Ignoring dangling edge for ranking");
            continue;
        };
        successors[source].push(target);
        in_degree[target] += 1;
    }

    let mut ranks: Vec<Option<usize>> = vec![None; nodes.len()];
    let mut queue: VecDeque<usize> = VecDeque::new();
    for (position, degree) in in_degree.iter().enumerate() {
        if *degree == 0 {
            ranks[position] = Some(0);
            queue.push_back(position);
        }
    }

    while let Some(current) = queue.pop_front() {
        let rank = ranks[current].unwrap_or_default();
        for &target in &successors[current] {
            in_degree[target] -= 1;
            if in_degree[target] == 0 {
                ranks[target] = Some(rank + 1);
                queue.push_back(target);
            }
        }
    }

    let mut max_rank = ranks.iter().flatten().copied().max();
    ranks
        .iter()
        .enumerate()
        .map(|(position, rank)| match rank {
            Some(rank) => *rank,
            None => {
                let rank = max_rank.map_or(0, |max| max + 1);
                debug!(node = nodes[position].id(), rank = rank; "Assigned fallback rank");
                max_rank = Some(rank);
                rank
            }
        })
        .collect()
}
