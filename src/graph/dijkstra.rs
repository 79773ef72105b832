//! Single-source Dijkstra search with early termination at the destination.
//!
//! # Algorithm
//!
//! The unsettled node with the smallest tentative cost is settled and its
//! outgoing edges relaxed. The search stops as soon as the destination is
//! settled (not merely discovered), so work is bounded by the set of nodes
//! closer to the origin than the destination. Ties between equal tentative
//! costs are broken by the lowest dense node index, which keeps results
//! reproducible.
//!
//! Per-node search state lives in dense arrays owned by one invocation, so
//! concurrent searches over one [`RoadGraph`] never interfere.
//!
//! # Complexity
//!
//! O((V + E) log V) with a binary heap. [`LinearScanDijkstra`] is the
//! O(V²) variant without a heap and is only suitable for small graphs.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::trace;

use crate::error::{Result, RoutingError};

use super::cost::{CostModel, Criterion};
use super::path::Path;
use super::road_graph::{EdgeId, NodeId, RoadGraph};

/// A point-to-point shortest path algorithm.
pub trait ShortestPathAlgorithm {
    fn calc_path(
        &self,
        graph: &RoadGraph,
        costs: &CostModel,
        origin: NodeId,
        destination: NodeId,
        criterion: Criterion,
    ) -> Result<Path>;
}

/// Counters collected during one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub settled: usize,
    pub relaxed: usize,
}

#[derive(Debug, Clone, Copy)]
struct NodeState {
    cost: f64,
    parent_edge: Option<EdgeId>,
    settled: bool,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            cost: f64::INFINITY,
            parent_edge: None,
            settled: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct HeapItem {
    cost: f64,
    node: usize,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapItem {}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Flipped on both keys to make this a min-heap
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Heap-based Dijkstra.
///
/// # Examples
///
/// ```
/// use eco_routing::graph::{CostModel, Criterion, Dijkstra, EdgeSpec, Node, RoadGraph, ShortestPathAlgorithm};
///
/// let graph = RoadGraph::build(
///     vec![Node::new(1, 0.0, 0.0), Node::new(2, 0.0, 0.0), Node::new(3, 0.0, 0.0)],
///     vec![
///         EdgeSpec::new(1, 2, 5.0, 50.0),
///         EdgeSpec::new(2, 3, 5.0, 50.0),
///         EdgeSpec::new(1, 3, 20.0, 50.0),
///     ],
/// )
/// .unwrap();
///
/// let path = Dijkstra::new()
///     .calc_path(&graph, &CostModel::default(), 1, 3, Criterion::Distance)
///     .unwrap();
/// assert_eq!(path.nodes(), &[1, 2, 3]);
/// assert_eq!(path.cost(), 10.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Dijkstra {
    early_exit: bool,
}

impl Default for Dijkstra {
    fn default() -> Self {
        Self::new()
    }
}

impl Dijkstra {
    pub fn new() -> Self {
        Self { early_exit: true }
    }

    /// Keeps relaxing until the frontier is empty instead of stopping at the
    /// destination. Yields the same path, with more work.
    pub fn without_early_exit() -> Self {
        Self { early_exit: false }
    }

    /// Runs the search and also returns the work counters.
    pub fn calc_path_with_stats(
        &self,
        graph: &RoadGraph,
        costs: &CostModel,
        origin: NodeId,
        destination: NodeId,
        criterion: Criterion,
    ) -> Result<(Path, SearchStats)> {
        let start = graph.index_of(origin)?;
        let end = graph.index_of(destination)?;

        let mut state = vec![NodeState::default(); graph.node_count()];
        let mut heap = BinaryHeap::with_capacity(64);
        let mut stats = SearchStats::default();

        state[start].cost = 0.0;
        heap.push(HeapItem {
            cost: 0.0,
            node: start,
        });

        while let Some(HeapItem { cost, node }) = heap.pop() {
            if state[node].settled || cost > state[node].cost {
                continue;
            }
            state[node].settled = true;
            stats.settled += 1;

            if self.early_exit && node == end {
                break;
            }

            relax(graph, costs, criterion, &mut state, node, &mut stats, |next, cost| {
                heap.push(HeapItem { cost, node: next })
            });
        }

        trace!(
            origin,
            destination,
            settled = stats.settled,
            relaxed = stats.relaxed,
            "dijkstra finished"
        );

        let path = build_path(graph, &state, start, end, criterion)?;
        Ok((path, stats))
    }
}

impl ShortestPathAlgorithm for Dijkstra {
    fn calc_path(
        &self,
        graph: &RoadGraph,
        costs: &CostModel,
        origin: NodeId,
        destination: NodeId,
        criterion: Criterion,
    ) -> Result<Path> {
        self.calc_path_with_stats(graph, costs, origin, destination, criterion)
            .map(|(path, _)| path)
    }
}

/// Dijkstra that selects the next node by scanning all tentative costs.
///
/// O(V²) per query. Only meant for small graphs; use [`Dijkstra`] otherwise.
/// Shares the early-exit rule and tie-break with [`Dijkstra`], so both return
/// identical paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearScanDijkstra;

impl ShortestPathAlgorithm for LinearScanDijkstra {
    fn calc_path(
        &self,
        graph: &RoadGraph,
        costs: &CostModel,
        origin: NodeId,
        destination: NodeId,
        criterion: Criterion,
    ) -> Result<Path> {
        let start = graph.index_of(origin)?;
        let end = graph.index_of(destination)?;

        let mut state = vec![NodeState::default(); graph.node_count()];
        let mut stats = SearchStats::default();
        state[start].cost = 0.0;

        loop {
            let mut current: Option<usize> = None;
            for (i, s) in state.iter().enumerate() {
                if s.settled || !s.cost.is_finite() {
                    continue;
                }
                if current.is_none_or(|c| s.cost < state[c].cost) {
                    current = Some(i);
                }
            }
            let Some(node) = current else { break };

            state[node].settled = true;
            stats.settled += 1;
            if node == end {
                break;
            }
            relax(graph, costs, criterion, &mut state, node, &mut stats, |_, _| {});
        }

        build_path(graph, &state, start, end, criterion)
    }
}

/// Finds the cheapest `origin -> destination` path with the default cost model.
pub fn shortest_path(
    graph: &RoadGraph,
    origin: NodeId,
    destination: NodeId,
    criterion: Criterion,
) -> Result<Path> {
    Dijkstra::new().calc_path(graph, &CostModel::default(), origin, destination, criterion)
}

fn relax(
    graph: &RoadGraph,
    costs: &CostModel,
    criterion: Criterion,
    state: &mut [NodeState],
    node: usize,
    stats: &mut SearchStats,
    mut on_improve: impl FnMut(usize, f64),
) {
    let base = state[node].cost;
    for &edge_id in graph.out_edges(node) {
        let edge = graph.edge(edge_id);
        if edge.is_self_loop() {
            continue;
        }
        let next = edge.target_index();
        if state[next].settled {
            continue;
        }
        stats.relaxed += 1;

        let candidate = base + costs.cost(edge, criterion);
        if candidate < state[next].cost {
            state[next].cost = candidate;
            state[next].parent_edge = Some(edge_id);
            on_improve(next, candidate);
        }
    }
}

fn build_path(
    graph: &RoadGraph,
    state: &[NodeState],
    start: usize,
    end: usize,
    criterion: Criterion,
) -> Result<Path> {
    if !state[end].cost.is_finite() {
        return Err(RoutingError::Unreachable {
            origin: graph.node_id_at(start),
            destination: graph.node_id_at(end),
        });
    }

    let mut nodes = vec![graph.node_id_at(end)];
    let mut edges = Vec::new();
    let mut current = end;
    while let Some(edge_id) = state[current].parent_edge {
        edges.push(edge_id);
        current = graph.edge(edge_id).source_index();
        nodes.push(graph.node_id_at(current));
    }
    nodes.reverse();
    edges.reverse();

    Ok(Path::new(nodes, edges, state[end].cost, criterion))
}
