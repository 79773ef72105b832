//! Error types shared by the graph, search, and routing layers.

use thiserror::Error;

use crate::graph::NodeId;

/// Malformed road-network input rejected by [`RoadGraph::build`](crate::graph::RoadGraph::build).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphBuildError {
    #[error("duplicate node id {0}")]
    DuplicateNode(NodeId),
    #[error("edge {from} -> {to} references an unknown node")]
    DanglingEdge { from: NodeId, to: NodeId },
    #[error("edge {from} -> {to} has non-positive length {length}")]
    NonPositiveLength {
        from: NodeId,
        to: NodeId,
        length: f64,
    },
    #[error("edge {from} -> {to} has invalid {attribute}: {value}")]
    InvalidAttribute {
        from: NodeId,
        to: NodeId,
        attribute: &'static str,
        value: f64,
    },
}

/// Errors surfaced by the public routing API.
///
/// Input-validation errors are returned immediately. Running out of search
/// budget is not an error: solvers return their best solution together with a
/// [`SolveStatus`](crate::models::SolveStatus).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    #[error("graph build failed: {0}")]
    GraphBuild(#[from] GraphBuildError),

    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("unknown criterion '{0}' (expected distance, time or fuel)")]
    UnknownCriterion(String),

    #[error("node {destination} is unreachable from {origin}")]
    Unreachable { origin: NodeId, destination: NodeId },

    #[error("invalid instance: {0}")]
    InvalidInstance(String),

    #[error("no feasible solution: {0}")]
    NoFeasibleSolution(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RoutingError>;

impl From<serde_json::Error> for RoutingError {
    fn from(err: serde_json::Error) -> Self {
        RoutingError::Config(err.to_string())
    }
}
