//! Connectivity-preserving edge pruning.
//!
//! Both passes only ever commit a removal through
//! [`Graph::try_remove_edge`], so the graph is connected after every
//! accepted edit. A pass that cannot remove anything leaves the graph as it
//! found it.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::graph::{Edge, Graph, NodeId};

/// Outcome of [`reduce_high_degree`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReductionReport {
    /// Edges removed by the pass.
    pub removed: usize,
    /// Nodes still above the cap, because every qualifying removal would
    /// have disconnected the graph.
    pub over_cap: Vec<NodeId>,
}

/// Remove as many edges longer than `max_length` as possible, longest first.
///
/// An edge qualifies only if both endpoints have degree > 2 and the graph
/// stays connected without it. After each removal the candidate list is
/// rebuilt; the pass ends when no over-length edge qualifies.
///
/// Returns the number of edges removed.
pub fn remove_long_edges(graph: &mut Graph, max_length: f64) -> usize {
    let mut removed = 0;

    loop {
        let mut candidates: Vec<(Edge, f64)> = graph
            .edges()
            .iter()
            .map(|e| (*e, graph.edge_length(e)))
            .filter(|(_, len)| *len > max_length)
            .collect();
        if candidates.is_empty() {
            break;
        }
        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let hit = candidates.iter().find(|(e, _)| {
            graph.degree(e.a) > 2 && graph.degree(e.b) > 2 && graph.is_connected_without(e)
        });
        match hit {
            Some((edge, _)) => {
                let edge = *edge;
                graph.remove_edge(&edge);
                removed += 1;
            }
            None => break,
        }
    }

    removed
}

/// Remove edges touching nodes with degree above `max_degree`.
///
/// Sweeps the edge list in order; an edge is removed when either endpoint
/// is over the cap, both endpoints have degree > 1, and the graph stays
/// connected. Sweeps repeat until one removes nothing. The cap is soft:
/// nodes that cannot be brought under it are returned in the report.
pub fn reduce_high_degree(graph: &mut Graph, max_degree: usize) -> ReductionReport {
    let mut report = ReductionReport::default();

    loop {
        let mut removed_this_sweep = 0;
        let mut idx = 0;
        while idx < graph.edge_count() {
            let e = graph.edges()[idx];
            let degree_a = graph.degree(e.a);
            let degree_b = graph.degree(e.b);
            let over = degree_a > max_degree || degree_b > max_degree;
            if over && degree_a > 1 && degree_b > 1 && graph.try_remove_edge(&e) {
                // The next edge shifted into `idx`.
                removed_this_sweep += 1;
                continue;
            }
            idx += 1;
        }
        report.removed += removed_this_sweep;
        if removed_this_sweep == 0 {
            break;
        }
    }

    report.over_cap = over_cap_nodes(graph, max_degree);
    for node in &report.over_cap {
        log::warn!(
            "Node {} keeps degree {} above cap {}: every removal would disconnect the graph",
            node,
            graph.degree(*node),
            max_degree
        );
    }
    report
}

/// Nodes whose degree exceeds `max_degree`.
pub fn over_cap_nodes(graph: &Graph, max_degree: usize) -> Vec<NodeId> {
    graph
        .node_ids()
        .filter(|&n| graph.degree(n) > max_degree)
        .collect()
}
