//! # eco-routing
//!
//! Multi-criteria shortest paths over road graphs and capacitated vehicle
//! routing with time windows and range limits.
//!
//! ## Modules
//!
//! - [`graph`] — Road graph, edge cost criteria (distance, time, fuel), Dijkstra
//! - [`distance`] — Distance matrices from coordinates or road-graph paths
//! - [`models`] — Customers, vehicles, routes, instances and assignments
//! - [`evaluation`] — Route feasibility checking and objective costs
//! - [`constructive`] — Cheapest-arc construction
//! - [`local_search`] — 2-opt, relocate and 2-opt* exchange
//! - [`ga`] — Permutation GA for per-vehicle deadheading, run on `u-metaheur`
//! - [`solver`] — Strategy selection, budgets, cancellation, multi-start
//! - [`io`] — JSON planning requests and Solomon benchmark files
//!
//! ## Example
//!
//! ```
//! use eco_routing::graph::{shortest_path, Criterion, EdgeSpec, Node, RoadGraph};
//!
//! let graph = RoadGraph::build(
//!     vec![Node::new(1, 0.0, 0.0), Node::new(2, 0.0, 0.0), Node::new(3, 0.0, 0.0)],
//!     vec![
//!         EdgeSpec::new(1, 2, 5.0, 50.0),
//!         EdgeSpec::new(2, 3, 5.0, 50.0),
//!         EdgeSpec::new(1, 3, 20.0, 50.0),
//!     ],
//! )
//! .unwrap();
//! let path = shortest_path(&graph, 1, 3, Criterion::Distance).unwrap();
//! assert_eq!(path.nodes(), &[1, 2, 3]);
//! assert_eq!(path.cost(), 10.0);
//! ```

pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod ga;
pub mod graph;
pub mod io;
pub mod local_search;
pub mod models;
pub mod solver;

pub use error::{GraphBuildError, Result, RoutingError};
pub use evaluation::Objective;
pub use solver::{solve_multi_start, solve_vrp, solve_vrp_with, SolverConfig, Strategy};
