//! Construction plus a GA per vehicle tour.
//!
//! Cheapest-arc construction decides which customers each vehicle serves,
//! which keeps every partition within capacity. The GA then reorders each
//! vehicle's customers to cut deadheading. A GA tour replaces the constructed
//! one only if it is feasible and strictly cheaper.
//!
//! Customers the construction could not place are inserted before the GA
//! runs, ejecting others between tours when that frees capacity. Each GA run
//! is seeded from the solver's rng so results are reproducible.

use rand::RngCore;
use tracing::{debug, instrument};
use u_metaheur::ga::GaRunner;

use crate::constructive::path_cheapest_arc;
use crate::error::{Result, RoutingError};
use crate::evaluation::Objective;
use crate::ga::{DeadheadingProblem, GaSettings};
use crate::local_search::{assemble, route_pending, sequence_cost, tours_of, unrouted};
use crate::models::{RouteAssignment, SolveStatus, VrpInstance};

use super::{Budget, CancellationToken, RouteSolver};

/// Population-based tour improvement.
#[derive(Debug, Clone, Default)]
pub struct EvolutionarySolver {
    ga: GaSettings,
    budget: Budget,
}

impl EvolutionarySolver {
    /// `ga.generations` is the per-vehicle generation budget.
    pub fn new(ga: GaSettings, budget: Budget) -> Self {
        Self { ga, budget }
    }
}

impl RouteSolver for EvolutionarySolver {
    fn name(&self) -> &'static str {
        "evolutionary"
    }

    #[instrument(skip_all, fields(solver = "evolutionary"))]
    fn solve(
        &self,
        instance: &VrpInstance,
        objective: Objective,
        rng: &mut dyn RngCore,
        cancel: &CancellationToken,
    ) -> Result<RouteAssignment> {
        let deadline = self.budget.deadline();
        let initial = path_cheapest_arc(instance, objective);
        let mut tours = tours_of(instance, &initial);
        let mut pending = unrouted(&initial);
        route_pending(instance, objective, &mut tours, &mut pending);
        let mut status = SolveStatus::Completed;

        for (tour, vehicle) in tours.iter_mut().zip(instance.vehicles()) {
            if tour.len() < 2 {
                continue;
            }
            if cancel.is_cancelled() {
                status = SolveStatus::Interrupted;
                break;
            }
            if self.ga.generations == 0 {
                status = SolveStatus::BudgetExhausted;
                break;
            }

            let mut config = self.ga.runner_config(rng.next_u64());
            match deadline.remaining_ms() {
                Some(0) => {
                    status = SolveStatus::BudgetExhausted;
                    break;
                }
                Some(ms) => config = config.with_time_limit_ms(ms),
                None => {}
            }

            let problem = DeadheadingProblem::new(instance, vehicle, objective, tour.clone())
                .with_gene_mutation_rate(self.ga.gene_mutation_rate);
            let result = GaRunner::run_with_cancel(&problem, &config, Some(cancel.flag()))
                .map_err(RoutingError::Config)?;

            let current =
                sequence_cost(instance, vehicle, objective, tour).unwrap_or(f64::INFINITY);
            let evolved = sequence_cost(instance, vehicle, objective, result.best.customers());
            if let Some(cost) = evolved.filter(|&c| c < current - 1e-10) {
                debug!(vehicle = vehicle.id(), before = current, after = cost, "tour improved");
                *tour = result.best.into_customers();
            }

            if result.cancelled {
                status = SolveStatus::Interrupted;
                break;
            }
            if result.timed_out {
                status = SolveStatus::BudgetExhausted;
                break;
            }
        }

        let mut assignment = assemble(instance, objective, &tours, &initial);
        assignment.set_status(status);
        debug!(
            initial_cost = initial.total_cost(),
            cost = assignment.total_cost(),
            unrouted = pending.len(),
            ?status,
            "evolutionary search finished"
        );
        Ok(assignment)
    }
}
