//! Constructive heuristics for the initial route assignment.
//!
//! - [`path_cheapest_arc`]: greedy cheapest-arc extension per vehicle

mod cheapest_arc;

pub use cheapest_arc::path_cheapest_arc;
