//! Delaunay triangulation of a point field into the initial hyperlane graph.

use crate::geometry::Point;
use crate::graph::{Graph, NodeId};

/// Triangulate `points` and return the graph of triangle edges.
///
/// Node ids are the indices into `points`. Degenerate input (fewer than
/// three points, or all collinear) yields a graph with no edges, which the
/// caller sees as disconnected.
pub fn build_graph(points: &[Point]) -> Graph {
    let triangles = triangulate(points);
    Graph::new(points.to_vec(), triangle_edges(&triangles))
}

/// Flat triangle index list: every three entries form one triangle.
pub fn triangulate(points: &[Point]) -> Vec<usize> {
    let input: Vec<delaunator::Point> = points
        .iter()
        .map(|p| delaunator::Point { x: p.x, y: p.y })
        .collect();
    let result = delaunator::triangulate(&input);
    if result.triangles.is_empty() && points.len() >= 3 {
        log::debug!("Triangulation of {} points is degenerate", points.len());
    }
    result.triangles
}

/// The three edges of every triangle. Shared edges appear once per
/// triangle here; [`Graph::new`] collapses them.
pub fn triangle_edges(triangles: &[usize]) -> Vec<(NodeId, NodeId)> {
    triangles
        .chunks_exact(3)
        .flat_map(|t| {
            let (a, b, c) = (NodeId::from(t[0]), NodeId::from(t[1]), NodeId::from(t[2]));
            [(a, b), (b, c), (c, a)]
        })
        .collect()
}
