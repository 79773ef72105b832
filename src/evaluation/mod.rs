//! Route feasibility checking and cost evaluation.

mod evaluator;
mod objective;

pub use evaluator::{evaluate_assignment, is_complete_partition, route_distance, RouteEvaluator};
pub use objective::Objective;
