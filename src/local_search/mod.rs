//! Local search operators for improving route assignments.
//!
//! Operators work on plain customer sequences, one per vehicle of the
//! instance in fleet order (`tours[k]` belongs to `instance.vehicles()[k]`).
//! Every operator only applies moves that keep all affected routes feasible.
//!
//! - [`two_opt_improve`] — Intra-route segment reversal
//! - [`relocate_improve`] — Inter-route customer relocation
//! - [`exchange_improve`] — Inter-route tail exchange (2-opt*)
//! - [`insert_unserved`], [`route_pending`] — Insertion repair for customers
//!   no tour took

mod exchange;
mod insertion;
mod relocate;
mod two_opt;

pub use exchange::exchange_improve;
pub use insertion::{
    backtrack_insertion, insert_unserved, route_pending, unrouted, BACKTRACK_NODE_LIMIT,
};
pub use relocate::relocate_improve;
pub use two_opt::two_opt_improve;

use crate::evaluation::{Objective, RouteEvaluator};
use crate::models::{RouteAssignment, Vehicle, VrpInstance};

/// Cost of `vehicle` serving `sequence`, or `None` if the route violates any
/// of the vehicle's constraints. An empty sequence costs zero.
pub fn sequence_cost(
    instance: &VrpInstance,
    vehicle: &Vehicle,
    objective: Objective,
    sequence: &[usize],
) -> Option<f64> {
    let (route, violations) = RouteEvaluator::new(instance, vehicle).build_route(sequence);
    violations
        .is_empty()
        .then(|| objective.route_cost(&route, vehicle))
}

/// Per-vehicle cost of `tours`; infeasible tours cost `f64::INFINITY`.
pub(crate) fn tour_costs(
    instance: &VrpInstance,
    objective: Objective,
    tours: &[Vec<usize>],
) -> Vec<f64> {
    tours
        .iter()
        .zip(instance.vehicles())
        .map(|(t, v)| sequence_cost(instance, v, objective, t).unwrap_or(f64::INFINITY))
        .collect()
}

/// Splits an assignment into one sequence per vehicle, empty for unused vehicles.
pub fn tours_of(instance: &VrpInstance, assignment: &RouteAssignment) -> Vec<Vec<usize>> {
    instance
        .vehicles()
        .iter()
        .map(|v| {
            assignment
                .routes()
                .iter()
                .find(|r| r.vehicle_id() == v.id())
                .map(|r| r.customer_ids())
                .unwrap_or_default()
        })
        .collect()
}

/// Rebuilds an assignment from per-vehicle sequences.
///
/// Unserved entries of `base` are kept for customers `tours` does not route,
/// and its status is carried over; route and total costs are recomputed under
/// `objective`.
pub fn assemble(
    instance: &VrpInstance,
    objective: Objective,
    tours: &[Vec<usize>],
    base: &RouteAssignment,
) -> RouteAssignment {
    let mut assignment = RouteAssignment::new();
    for (tour, vehicle) in tours.iter().zip(instance.vehicles()) {
        if tour.is_empty() {
            continue;
        }
        let (mut route, _) = RouteEvaluator::new(instance, vehicle).build_route(tour);
        route.set_cost(objective.route_cost(&route, vehicle));
        assignment.add_route(route);
    }
    let mut routed = vec![false; instance.customers().len()];
    for &cid in tours.iter().flatten() {
        routed[cid] = true;
    }
    for u in base.unserved().iter().filter(|u| !routed[u.customer_id]) {
        assignment.add_unserved(u.customer_id, u.reason);
    }
    assignment.set_status(base.status());
    let total = objective.assignment_cost(instance, &assignment);
    assignment.set_total_cost(total);
    assignment
}
