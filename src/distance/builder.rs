//! Distance matrix construction from road-graph shortest paths.

use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::graph::{CostModel, Criterion, Dijkstra, NodeId, RoadGraph, ShortestPathAlgorithm};

use super::DistanceMatrix;

/// Builds the pairwise cost matrix between `locations` with the default cost model.
///
/// Entry `(i, j)` is the cost of the cheapest path from `locations[i]` to
/// `locations[j]`. Fails with the first unknown or unreachable pair.
///
/// # Examples
///
/// ```
/// use eco_routing::distance::build_distance_matrix;
/// use eco_routing::graph::{Criterion, EdgeSpec, Node, RoadGraph};
///
/// let graph = RoadGraph::build(
///     vec![Node::new(1, 0.0, 0.0), Node::new(2, 0.0, 0.0)],
///     vec![EdgeSpec::new(1, 2, 7.0, 50.0), EdgeSpec::new(2, 1, 9.0, 50.0)],
/// )
/// .unwrap();
/// let dm = build_distance_matrix(&graph, &[1, 2], Criterion::Distance).unwrap();
/// assert_eq!(dm.get(0, 1), 7.0);
/// assert_eq!(dm.get(1, 0), 9.0);
/// ```
pub fn build_distance_matrix(
    graph: &RoadGraph,
    locations: &[NodeId],
    criterion: Criterion,
) -> Result<DistanceMatrix> {
    build_distance_matrix_with(graph, &CostModel::default(), locations, criterion)
}

/// Like [`build_distance_matrix`] with an explicit [`CostModel`].
///
/// One early-exit query runs per ordered pair of distinct locations; the
/// queries are independent and run on the rayon pool.
#[instrument(skip_all, fields(locations = locations.len(), criterion = %criterion))]
pub fn build_distance_matrix_with(
    graph: &RoadGraph,
    costs: &CostModel,
    locations: &[NodeId],
    criterion: Criterion,
) -> Result<DistanceMatrix> {
    let started = Instant::now();
    let n = locations.len();

    for &id in locations {
        graph.node(id)?;
    }

    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
        .collect();

    let search = Dijkstra::new();
    let cells: Vec<(usize, usize, f64)> = pairs
        .par_iter()
        .map(|&(i, j)| {
            search
                .calc_path(graph, costs, locations[i], locations[j], criterion)
                .map(|path| (i, j, path.cost()))
        })
        .collect::<Result<_>>()?;

    let mut matrix = DistanceMatrix::new(n);
    for (i, j, cost) in cells {
        matrix.set(i, j, cost);
    }

    debug!(
        queries = pairs.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "distance matrix built"
    );
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RoutingError;
    use crate::graph::{EdgeSpec, Node};

    fn grid() -> RoadGraph {
        // 1 - 2 - 3 in both directions, plus a one-way shortcut 1 -> 3
        let nodes = (1..=3).map(|i| Node::new(i, 0.0, 0.0)).collect();
        let edges = vec![
            EdgeSpec::new(1, 2, 4.0, 30.0),
            EdgeSpec::new(2, 1, 4.0, 30.0),
            EdgeSpec::new(2, 3, 6.0, 30.0),
            EdgeSpec::new(3, 2, 6.0, 30.0),
            EdgeSpec::new(1, 3, 7.0, 30.0),
        ];
        RoadGraph::build(nodes, edges).unwrap()
    }

    #[test]
    fn test_matrix_entries_are_shortest_paths() {
        let dm = build_distance_matrix(&grid(), &[1, 2, 3], Criterion::Distance).unwrap();
        assert_eq!(dm.get(0, 2), 7.0);
        assert_eq!(dm.get(2, 0), 10.0);
        assert_eq!(dm.get(1, 2), 6.0);
        assert!(!dm.is_symmetric(1e-10));
        assert!(dm.validate().is_ok());
    }

    #[test]
    fn test_matrix_is_idempotent() {
        let g = grid();
        let a = build_distance_matrix(&g, &[3, 1, 2], Criterion::Time).unwrap();
        let b = build_distance_matrix(&g, &[3, 1, 2], Criterion::Time).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unreachable_pair_fails() {
        let g = RoadGraph::build(
            vec![Node::new(1, 0.0, 0.0), Node::new(2, 0.0, 0.0)],
            vec![EdgeSpec::new(1, 2, 1.0, 30.0)],
        )
        .unwrap();
        assert!(matches!(
            build_distance_matrix(&g, &[1, 2], Criterion::Distance),
            Err(RoutingError::Unreachable { .. })
        ));
    }

    #[test]
    fn test_unknown_location_fails() {
        assert_eq!(
            build_distance_matrix(&grid(), &[1, 9], Criterion::Distance),
            Err(RoutingError::UnknownNode(9))
        );
    }

    #[test]
    fn test_repeated_location_has_zero_cost() {
        let dm = build_distance_matrix(&grid(), &[2, 2], Criterion::Distance).unwrap();
        assert_eq!(dm.get(0, 1), 0.0);
    }
}
