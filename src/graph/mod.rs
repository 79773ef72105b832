//! Road network model and multi-criteria shortest paths.
//!
//! - [`RoadGraph`] — Immutable directed multigraph built from node/edge lists
//! - [`Criterion`], [`CostModel`] — Distance, time, and fuel/CO2 edge costs
//! - [`Dijkstra`] — Early-terminating point-to-point search

mod cost;
mod dijkstra;
mod path;
mod road_graph;

pub use cost::{cost, CostModel, Criterion, FuelModel};
pub use dijkstra::{shortest_path, Dijkstra, LinearScanDijkstra, SearchStats, ShortestPathAlgorithm};
pub use path::Path;
pub use road_graph::{Edge, EdgeId, EdgeSpec, GraphSource, Node, NodeId, RoadGraph};
