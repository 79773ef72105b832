//! Result of a single shortest-path query.

use super::cost::{CostModel, Criterion};
use super::road_graph::{EdgeId, NodeId, RoadGraph};

/// An origin-to-destination path with its cost under the search criterion.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    nodes: Vec<NodeId>,
    edges: Vec<EdgeId>,
    cost: f64,
    criterion: Criterion,
}

impl Path {
    pub(crate) fn new(
        nodes: Vec<NodeId>,
        edges: Vec<EdgeId>,
        cost: f64,
        criterion: Criterion,
    ) -> Self {
        Self {
            nodes,
            edges,
            cost,
            criterion,
        }
    }

    /// Node ids from origin to destination, inclusive.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Edges traversed, one fewer than [`nodes`](Self::nodes).
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    pub fn origin(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn destination(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// Re-prices the same edges under another criterion, e.g. the length of
    /// a fuel-optimal path.
    pub fn cost_under(&self, graph: &RoadGraph, costs: &CostModel, criterion: Criterion) -> f64 {
        self.edges
            .iter()
            .fold(0.0, |acc, &e| acc + costs.cost(graph.edge(e), criterion))
    }
}
