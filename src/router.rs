use itertools::Itertools;
use petgraph::algo::astar;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::graph::NetworkGraph;

/// Edges of a path in traversal order and their summed weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub edges: Vec<EdgeIndex>,
    pub weight: f64,
}

/// Single-source single-target shortest path over non-negative weights.
///
/// Ties between equally fast paths may be broken either way.
pub trait ShortestPath {
    fn shortest_path(
        &self,
        graph: &NetworkGraph,
        source: NodeIndex,
        target: NodeIndex,
    ) -> Option<Path>;
}

/// A* with a zero heuristic, i.e. Dijkstra that also returns the path.
#[derive(Debug, Default, Clone, Copy)]
pub struct AStarRouter;

impl ShortestPath for AStarRouter {
    fn shortest_path(
        &self,
        graph: &NetworkGraph,
        source: NodeIndex,
        target: NodeIndex,
    ) -> Option<Path> {
        let graph = graph.graph();
        let (weight, vertices) = astar(
            graph,
            source,
            |vertex| vertex == target,
            |edge| edge.weight().minutes,
            |_| 0.0,
        )?;

        let edges = vertices
            .iter()
            .tuple_windows()
            .map(|(&from, &to)| {
                graph
                    .edges_connecting(from, to)
                    .min_by(|a, b| a.weight().minutes.total_cmp(&b.weight().minutes))
                    .map(|edge| edge.id())
            })
            .collect::<Option<Vec<_>>>()?;

        Some(Path { edges, weight })
    }
}
