//! Construction plus local search.
//!
//! # Algorithm
//!
//! 1. Build a first solution with [`path_cheapest_arc`] and route the
//!    customers it left over with [`route_pending`].
//! 2. Each pass runs 2-opt on every route, then applies the best relocate
//!    move and the best 2-opt* exchange, and retries insertion for any
//!    customer still unrouted.
//! 3. Stop at a local optimum (no operator improves), when the pass or time
//!    budget runs out, or when cancelled.
//!
//! Every operator keeps routes feasible, so the assignment is feasible after
//! any pass and can be returned at any stop.

use rand::RngCore;
use tracing::{debug, instrument};

use crate::constructive::path_cheapest_arc;
use crate::error::Result;
use crate::evaluation::Objective;
use crate::local_search::{
    assemble, exchange_improve, insert_unserved, relocate_improve, route_pending, sequence_cost,
    tours_of, two_opt_improve, unrouted,
};
use crate::models::{RouteAssignment, SolveStatus, VrpInstance};

use super::{Budget, CancellationToken, RouteSolver};

/// Cheapest-arc construction improved by arc-exchange local search.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSearchSolver {
    budget: Budget,
}

impl ConstraintSearchSolver {
    pub fn new(budget: Budget) -> Self {
        Self { budget }
    }
}

impl RouteSolver for ConstraintSearchSolver {
    fn name(&self) -> &'static str {
        "constraint_search"
    }

    #[instrument(skip_all, fields(solver = "constraint_search"))]
    fn solve(
        &self,
        instance: &VrpInstance,
        objective: Objective,
        _rng: &mut dyn RngCore,
        cancel: &CancellationToken,
    ) -> Result<RouteAssignment> {
        let deadline = self.budget.deadline();
        let initial = path_cheapest_arc(instance, objective);
        let mut tours = tours_of(instance, &initial);
        let mut pending = unrouted(&initial);
        route_pending(instance, objective, &mut tours, &mut pending);
        let mut status = SolveStatus::Completed;
        let mut passes = 0;

        loop {
            if cancel.is_cancelled() {
                status = SolveStatus::Interrupted;
                break;
            }
            if passes >= self.budget.max_iterations || deadline.expired() {
                status = SolveStatus::BudgetExhausted;
                break;
            }
            passes += 1;

            let mut improved = false;
            for (tour, vehicle) in tours.iter_mut().zip(instance.vehicles()) {
                let before =
                    sequence_cost(instance, vehicle, objective, tour).unwrap_or(f64::INFINITY);
                let (candidate, cost) = two_opt_improve(instance, vehicle, objective, tour);
                if cost < before - 1e-10 {
                    *tour = candidate;
                    improved = true;
                }
            }
            improved |= relocate_improve(instance, objective, &mut tours).is_some();
            improved |= exchange_improve(instance, objective, &mut tours).is_some();
            if !pending.is_empty() {
                improved |= insert_unserved(instance, objective, &mut tours, &mut pending) > 0;
            }

            if !improved {
                break;
            }
        }

        let mut assignment = assemble(instance, objective, &tours, &initial);
        assignment.set_status(status);
        debug!(
            passes,
            unrouted = pending.len(),
            initial_cost = initial.total_cost(),
            cost = assignment.total_cost(),
            ?status,
            "local search finished"
        );
        Ok(assignment)
    }
}
