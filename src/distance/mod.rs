//! Distance and travel time matrices.
//!
//! Provides a dense cost matrix and its construction from road-graph
//! shortest paths.

mod builder;
mod matrix;

pub use builder::{build_distance_matrix, build_distance_matrix_with};
pub use matrix::DistanceMatrix;
