//! Shortest routes over the hyperlane graph.
//!
//! `WeightedGraph` is a read-only view of a finished galaxy where each
//! hyperlane costs the squared distance between its systems. `Navigator`
//! answers route queries with A*, guided by a `HeuristicTable` of exact
//! all-pairs distances. The table is built on first query and then shared
//! read-only, so one `Navigator` can serve many threads.
//!
//! Squared costs favour many short hops over one long jump: two unit hops
//! cost 2, a single jump of length 2 costs 4.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::galaxy::Galaxy;
use crate::geometry::Point;
use crate::graph::{Graph, NodeId};

/// Adjacency list with squared-distance weights.
#[derive(Debug, Clone)]
pub struct WeightedGraph {
    points: Vec<Point>,
    adj: Vec<Vec<(NodeId, f64)>>,
}

impl WeightedGraph {
    pub fn from_graph(graph: &Graph) -> Self {
        let points = graph.points().to_vec();
        let mut adj = vec![Vec::new(); points.len()];
        for edge in graph.edges() {
            let weight = points[edge.a.index()].distance_squared(&points[edge.b.index()]);
            adj[edge.a.index()].push((edge.b, weight));
            adj[edge.b.index()].push((edge.a, weight));
        }
        Self { points, adj }
    }

    pub fn from_galaxy(galaxy: &Galaxy) -> Self {
        Self::from_graph(&galaxy.to_graph())
    }

    pub fn node_count(&self) -> usize {
        self.points.len()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.points.len()
    }

    pub fn point(&self, node: NodeId) -> Point {
        self.points[node.index()]
    }

    /// Neighbours of `node` with the cost of reaching them.
    pub fn neighbors(&self, node: NodeId) -> &[(NodeId, f64)] {
        self.adj.get(node.index()).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Cost of the hyperlane between `a` and `b`, if there is one.
    pub fn weight(&self, a: NodeId, b: NodeId) -> Option<f64> {
        self.neighbors(a)
            .iter()
            .find(|&&(n, _)| n == b)
            .map(|&(_, w)| w)
    }

    /// Single-source shortest distances; `f64::INFINITY` where unreachable.
    pub fn dijkstra(&self, source: NodeId) -> Vec<f64> {
        let mut dist = vec![f64::INFINITY; self.node_count()];
        if !self.contains(source) {
            return dist;
        }

        let mut frontier = BinaryHeap::new();
        dist[source.index()] = 0.0;
        frontier.push(Frontier::new(0.0, 0.0, source));

        while let Some(Frontier { cost, node, .. }) = frontier.pop() {
            if cost > dist[node.index()] {
                continue;
            }
            for &(next, weight) in self.neighbors(node) {
                let candidate = cost + weight;
                if candidate < dist[next.index()] {
                    dist[next.index()] = candidate;
                    frontier.push(Frontier::new(candidate, candidate, next));
                }
            }
        }

        dist
    }
}

/// Exact shortest distance between every pair of nodes.
#[derive(Debug, Clone)]
pub struct HeuristicTable {
    size: usize,
    distances: Vec<f64>,
}

impl HeuristicTable {
    /// One Dijkstra run per node.
    pub fn build(graph: &WeightedGraph) -> Self {
        let size = graph.node_count();
        let mut distances = Vec::with_capacity(size * size);
        for source in 0..size {
            distances.extend(graph.dijkstra(NodeId::from(source)));
        }
        log::debug!("Built heuristic table for {} systems", size);
        Self { size, distances }
    }

    pub fn node_count(&self) -> usize {
        self.size
    }

    /// Distance from `from` to `to`; infinite when unreachable or unknown.
    pub fn get(&self, from: NodeId, to: NodeId) -> f64 {
        if from.index() >= self.size || to.index() >= self.size {
            return f64::INFINITY;
        }
        self.distances[from.index() * self.size + to.index()]
    }
}

/// A found route, including both endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub start: NodeId,
    pub goal: NodeId,
    pub steps: Vec<NodeId>,
    pub cost: f64,
}

impl Route {
    /// Number of hyperlanes travelled.
    pub fn hops(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }
}

/// Route planner over one immutable galaxy graph.
#[derive(Debug)]
pub struct Navigator {
    graph: WeightedGraph,
    heuristic: OnceLock<HeuristicTable>,
}

impl Navigator {
    pub fn new(graph: WeightedGraph) -> Self {
        Self {
            graph,
            heuristic: OnceLock::new(),
        }
    }

    pub fn from_graph(graph: &Graph) -> Self {
        Self::new(WeightedGraph::from_graph(graph))
    }

    pub fn from_galaxy(galaxy: &Galaxy) -> Self {
        Self::new(WeightedGraph::from_galaxy(galaxy))
    }

    pub fn graph(&self) -> &WeightedGraph {
        &self.graph
    }

    /// The heuristic table, built on first use.
    pub fn heuristic(&self) -> &HeuristicTable {
        self.heuristic
            .get_or_init(|| HeuristicTable::build(&self.graph))
    }

    /// Node sequence from `start` to `goal`, both included.
    ///
    /// `None` if either node is unknown or no route exists.
    pub fn shortest_path(&self, start: NodeId, goal: NodeId) -> Option<Vec<NodeId>> {
        self.route(start, goal).map(|route| route.steps)
    }

    /// A* from `start` to `goal`.
    pub fn route(&self, start: NodeId, goal: NodeId) -> Option<Route> {
        if !self.graph.contains(start) || !self.graph.contains(goal) {
            return None;
        }
        if start == goal {
            return Some(Route {
                start,
                goal,
                steps: vec![start],
                cost: 0.0,
            });
        }

        let heuristic = self.heuristic();
        let estimate = |node: NodeId| heuristic.get(node, goal);
        if !estimate(start).is_finite() {
            return None;
        }

        let n = self.graph.node_count();
        let mut g_score = vec![f64::INFINITY; n];
        let mut came_from: Vec<Option<NodeId>> = vec![None; n];
        let mut closed = vec![false; n];
        let mut frontier = BinaryHeap::new();

        g_score[start.index()] = 0.0;
        frontier.push(Frontier::new(estimate(start), 0.0, start));

        while let Some(Frontier { cost, node, .. }) = frontier.pop() {
            if node == goal {
                return Some(Route {
                    start,
                    goal,
                    steps: reconstruct(&came_from, goal),
                    cost,
                });
            }
            if closed[node.index()] {
                continue;
            }
            closed[node.index()] = true;

            for &(next, weight) in self.graph.neighbors(node) {
                if closed[next.index()] {
                    continue;
                }
                let tentative = cost + weight;
                if tentative < g_score[next.index()] {
                    g_score[next.index()] = tentative;
                    came_from[next.index()] = Some(node);
                    frontier.push(Frontier::new(tentative + estimate(next), tentative, next));
                }
            }
        }

        None
    }

    /// Total cost of walking `steps`, or `None` if two consecutive steps
    /// are not linked.
    pub fn path_cost(&self, steps: &[NodeId]) -> Option<f64> {
        steps
            .windows(2)
            .map(|pair| self.graph.weight(pair[0], pair[1]))
            .sum()
    }
}

fn reconstruct(came_from: &[Option<NodeId>], goal: NodeId) -> Vec<NodeId> {
    let mut steps = vec![goal];
    let mut current = goal;
    while let Some(prev) = came_from[current.index()] {
        steps.push(prev);
        current = prev;
    }
    steps.reverse();
    steps
}

/// Min-heap entry ordered by estimated total cost, then node id.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    estimate: f64,
    cost: f64,
    node: NodeId,
}

impl Frontier {
    fn new(estimate: f64, cost: f64, node: NodeId) -> Self {
        Self {
            estimate,
            cost,
            node,
        }
    }
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the cheapest entry first.
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| other.node.cmp(&self.node))
    }
}
