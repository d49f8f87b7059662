//! Undirected star-system graph used during generation.
//!
//! `Graph` owns the point arena and the edge list. The adjacency sets are
//! derived data: every edit goes through [`Graph::remove_edge`], which
//! rebuilds them from the edge list so they can never drift.

use std::collections::{BTreeSet, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Stable identifier of a node: its index in the point arena.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for NodeId {
    /// Panics when `index` does not fit in a `u32`. Generation caps galaxies
    /// at `generation::MAX_STAR_SYSTEMS`, far below that.
    fn from(index: usize) -> Self {
        match u32::try_from(index) {
            Ok(id) => Self(id),
            Err(_) => panic!("node index {} exceeds the u32 id space", index),
        }
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unordered node pair. Always stored with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
}

impl Edge {
    /// Normalized edge between two nodes, `None` for a self-loop.
    pub fn new(a: NodeId, b: NodeId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { a, b }),
            std::cmp::Ordering::Greater => Some(Self { a: b, b: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.a == node || self.b == node
    }

    /// The endpoint that is not `node`.
    pub fn other(&self, node: NodeId) -> NodeId {
        if self.a == node {
            self.b
        } else {
            self.a
        }
    }
}

/// Point arena + edge list + derived adjacency.
#[derive(Debug, Clone)]
pub struct Graph {
    points: Vec<Point>,
    edges: Vec<Edge>,
    adj: Vec<BTreeSet<NodeId>>,
}

impl Graph {
    /// Build a graph from points and candidate edges.
    ///
    /// Self-loops, duplicates (in either orientation) and edges referencing
    /// nodes outside the arena are dropped. Edge order is otherwise kept.
    pub fn new(points: Vec<Point>, edges: impl IntoIterator<Item = (NodeId, NodeId)>) -> Self {
        let n = points.len();
        let mut seen = HashSet::new();
        let edges = edges
            .into_iter()
            .filter(|(a, b)| a.index() < n && b.index() < n)
            .filter_map(|(a, b)| Edge::new(a, b))
            .filter(|e| seen.insert(*e))
            .collect();
        let mut graph = Self {
            points,
            edges,
            adj: Vec::new(),
        };
        graph.rebuild_adjacency();
        graph
    }

    /// Graph with no edges.
    pub fn empty(points: Vec<Point>) -> Self {
        Self::new(points, std::iter::empty())
    }

    pub fn node_count(&self) -> usize {
        self.points.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn point(&self, node: NodeId) -> Point {
        self.points[node.index()]
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.points.len()).map(NodeId::from)
    }

    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adj[node.index()].iter().copied()
    }

    pub fn degree(&self, node: NodeId) -> usize {
        self.adj[node.index()].len()
    }

    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.adj
            .get(a.index())
            .map(|set| set.contains(&b))
            .unwrap_or(false)
    }

    /// Euclidean length of an edge.
    pub fn edge_length(&self, edge: &Edge) -> f64 {
        self.point(edge.a).distance(&self.point(edge.b))
    }

    pub fn max_degree(&self) -> usize {
        self.adj.iter().map(BTreeSet::len).max().unwrap_or(0)
    }

    /// True when a BFS from node 0 reaches every node.
    ///
    /// An empty graph counts as disconnected; a single node is connected.
    pub fn is_connected(&self) -> bool {
        self.reach_all(None)
    }

    /// Connectivity as if `edge` were absent. The graph is not modified.
    pub fn is_connected_without(&self, edge: &Edge) -> bool {
        self.reach_all(Some(*edge))
    }

    /// Remove `edge` from the edge list and rebuild adjacency.
    ///
    /// Returns false when the edge is not present.
    pub fn remove_edge(&mut self, edge: &Edge) -> bool {
        let Some(pos) = self.edges.iter().position(|e| e == edge) else {
            return false;
        };
        self.edges.remove(pos);
        self.rebuild_adjacency();
        true
    }

    /// Remove `edge` only if the graph stays connected afterwards.
    pub fn try_remove_edge(&mut self, edge: &Edge) -> bool {
        if !self.has_edge(edge.a, edge.b) || !self.is_connected_without(edge) {
            return false;
        }
        self.remove_edge(edge)
    }

    fn rebuild_adjacency(&mut self) {
        let mut adj = vec![BTreeSet::new(); self.points.len()];
        for e in &self.edges {
            adj[e.a.index()].insert(e.b);
            adj[e.b.index()].insert(e.a);
        }
        self.adj = adj;
    }

    fn reach_all(&self, skip: Option<Edge>) -> bool {
        let n = self.points.len();
        if n == 0 {
            return false;
        }
        let mut visited = vec![false; n];
        let mut queue = VecDeque::new();
        visited[0] = true;
        queue.push_back(NodeId(0));
        let mut reached = 1;

        while let Some(current) = queue.pop_front() {
            for &next in &self.adj[current.index()] {
                if skip.is_some_and(|e| e.touches(current) && e.other(current) == next) {
                    continue;
                }
                if !visited[next.index()] {
                    visited[next.index()] = true;
                    reached += 1;
                    queue.push_back(next);
                }
            }
        }

        reached == n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(pairs: &[(u32, u32)]) -> Vec<(NodeId, NodeId)> {
        pairs.iter().map(|&(a, b)| (NodeId(a), NodeId(b))).collect()
    }

    #[test]
    fn test_node_id_from_index() {
        assert_eq!(NodeId::from(7usize), NodeId(7));
        assert_eq!(NodeId::from(u32::MAX as usize), NodeId(u32::MAX));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    #[should_panic(expected = "exceeds the u32 id space")]
    fn test_node_id_overflow_panics() {
        let _ = NodeId::from(u32::MAX as usize + 1);
    }

    fn square() -> Graph {
        // 0 -- 1
        // |    |
        // 3 -- 2
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        Graph::new(points, ids(&[(0, 1), (1, 2), (2, 3), (3, 0)]))
    }

    #[test]
    fn test_edge_normalized() {
        let e = Edge::new(NodeId(5), NodeId(2)).unwrap();
        assert_eq!(e.a, NodeId(2));
        assert_eq!(e.b, NodeId(5));
        assert_eq!(e.other(NodeId(2)), NodeId(5));
        assert!(Edge::new(NodeId(3), NodeId(3)).is_none());
    }

    #[test]
    fn test_new_drops_duplicates_and_loops() {
        let points = vec![Point::ORIGIN, Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
        let g = Graph::new(points, ids(&[(0, 1), (1, 0), (1, 1), (1, 2), (2, 9)]));
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.degree(NodeId(1)), 2);
        assert!(g.has_edge(NodeId(1), NodeId(0)));
        assert!(!g.has_edge(NodeId(2), NodeId(2)));
    }

    #[test]
    fn test_adjacency_symmetric() {
        let g = square();
        for e in g.edges() {
            assert!(g.has_edge(e.a, e.b));
            assert!(g.has_edge(e.b, e.a));
        }
        assert_eq!(g.max_degree(), 2);
    }

    #[test]
    fn test_connectivity() {
        let g = square();
        assert!(g.is_connected());
        let e = Edge::new(NodeId(0), NodeId(1)).unwrap();
        // Cycle: any single edge can go.
        assert!(g.is_connected_without(&e));

        let points = vec![Point::ORIGIN, Point::new(1.0, 0.0), Point::new(5.0, 5.0)];
        let split = Graph::new(points, ids(&[(0, 1)]));
        assert!(!split.is_connected());
    }

    #[test]
    fn test_empty_and_single() {
        assert!(!Graph::empty(vec![]).is_connected());
        assert!(Graph::empty(vec![Point::ORIGIN]).is_connected());
    }

    #[test]
    fn test_try_remove_keeps_connected() {
        let mut g = square();
        let first = Edge::new(NodeId(0), NodeId(1)).unwrap();
        assert!(g.try_remove_edge(&first));
        assert_eq!(g.edge_count(), 3);
        assert!(!g.has_edge(NodeId(1), NodeId(0)));

        // Now a path: every remaining edge is a bridge.
        for e in g.edges().to_vec() {
            assert!(!g.try_remove_edge(&e));
        }
        assert_eq!(g.edge_count(), 3);
        assert!(g.is_connected());
    }

    #[test]
    fn test_remove_missing_edge() {
        let mut g = square();
        let diagonal = Edge::new(NodeId(0), NodeId(2)).unwrap();
        assert!(!g.remove_edge(&diagonal));
        assert!(!g.try_remove_edge(&diagonal));
        assert_eq!(g.edge_count(), 4);
    }

    #[test]
    fn test_edge_length() {
        let g = square();
        let e = g.edges()[0];
        assert!((g.edge_length(&e) - 1.0).abs() < 1e-12);
    }
}
