//! Route assignment entry points.
//!
//! Two strategies sit behind the [`RouteSolver`] trait:
//!
//! - [`ConstraintSearchSolver`] — cheapest-arc construction and local search
//! - [`EvolutionarySolver`] — cheapest-arc construction and a GA per tour
//!
//! [`solve_vrp`] picks one from a [`SolverConfig`], applies the
//! [`UnservedPolicy`], and prices the result under the chosen [`Objective`].
//! [`solve_multi_start`] runs several seeds in parallel and keeps the best.

mod cancel;
mod config;
mod constraint_search;
mod evolutionary;

pub use cancel::CancellationToken;
pub use config::{Budget, SolverConfig, Strategy, UnservedPolicy};
pub use constraint_search::ConstraintSearchSolver;
pub use evolutionary::EvolutionarySolver;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::error::{Result, RoutingError};
use crate::evaluation::Objective;
use crate::models::{RouteAssignment, VrpInstance};

/// A route assignment strategy.
///
/// Implementations return a feasible assignment in which every customer is
/// either routed exactly once or listed as unserved with a reason. Budget
/// exhaustion and cancellation are reported through
/// [`RouteAssignment::status`], never as errors.
pub trait RouteSolver: Send + Sync {
    fn name(&self) -> &'static str;

    fn solve(
        &self,
        instance: &VrpInstance,
        objective: Objective,
        rng: &mut dyn RngCore,
        cancel: &CancellationToken,
    ) -> Result<RouteAssignment>;
}

impl Strategy {
    /// The solver implementing this strategy under `config`.
    pub fn solver(&self, config: &SolverConfig) -> Box<dyn RouteSolver> {
        match self {
            Strategy::ConstraintSearch => {
                Box::new(ConstraintSearchSolver::new(config.budget.clone()))
            }
            Strategy::Evolutionary => Box::new(EvolutionarySolver::new(
                config.effective_ga(),
                config.budget.clone(),
            )),
        }
    }
}

/// Reproducible random source for a seed.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Solves with the configured strategy, seeding randomness from `config.seed`.
///
/// # Examples
///
/// ```
/// use eco_routing::distance::DistanceMatrix;
/// use eco_routing::evaluation::Objective;
/// use eco_routing::models::{Customer, Location, SolveStatus, Vehicle, VrpInstance};
/// use eco_routing::solver::{solve_vrp, SolverConfig};
///
/// let customers = vec![
///     Customer::depot(Location::new(0.0, 0.0)),
///     Customer::new(1, Location::new(1.0, 0.0), 3),
///     Customer::new(2, Location::new(0.0, 1.0), 3),
/// ];
/// let dm = DistanceMatrix::from_customers(&customers);
/// let instance =
///     VrpInstance::new(customers, vec![Vehicle::new(0, 5), Vehicle::new(1, 5)], dm).unwrap();
///
/// let assignment = solve_vrp(&instance, Objective::Distance, &SolverConfig::default()).unwrap();
/// assert_eq!(assignment.num_routes(), 2);
/// assert!(assignment.is_complete());
/// assert_eq!(assignment.status(), SolveStatus::Completed);
/// ```
pub fn solve_vrp(
    instance: &VrpInstance,
    objective: Objective,
    config: &SolverConfig,
) -> Result<RouteAssignment> {
    let mut rng = seeded_rng(config.seed);
    solve_vrp_with(instance, objective, config, &mut rng, &CancellationToken::new())
}

/// Like [`solve_vrp`] with an injected random source and cancellation token.
#[instrument(skip_all, fields(
    customers = instance.num_customers(),
    vehicles = instance.vehicles().len(),
    strategy = ?config.strategy,
))]
pub fn solve_vrp_with<R: RngCore>(
    instance: &VrpInstance,
    objective: Objective,
    config: &SolverConfig,
    rng: &mut R,
    cancel: &CancellationToken,
) -> Result<RouteAssignment> {
    config.validate()?;

    let solver = config.strategy.solver(config);
    let assignment = solver.solve(instance, objective, rng, cancel)?;

    for u in assignment.unserved() {
        warn!(customer = u.customer_id, reason = %u.reason, "customer unserved");
    }
    if config.unserved_policy == UnservedPolicy::Reject && !assignment.is_complete() {
        let ids: Vec<String> = assignment
            .unserved()
            .iter()
            .map(|u| format!("{} ({})", u.customer_id, u.reason))
            .collect();
        return Err(RoutingError::NoFeasibleSolution(format!(
            "unserved customers: {}",
            ids.join(", ")
        )));
    }

    info!(
        solver = solver.name(),
        routes = assignment.num_routes(),
        served = assignment.num_served(),
        unserved = assignment.num_unserved(),
        cost = assignment.total_cost(),
        status = ?assignment.status(),
        "route assignment solved"
    );
    Ok(assignment)
}

/// Runs one solve per seed in parallel and keeps the assignment with the
/// fewest unserved customers, then the lowest cost; ties go to the earlier
/// seed.
pub fn solve_multi_start(
    instance: &VrpInstance,
    objective: Objective,
    config: &SolverConfig,
    seeds: &[u64],
) -> Result<RouteAssignment> {
    if seeds.is_empty() {
        return Err(RoutingError::Config("multi-start needs at least one seed".into()));
    }

    let cancel = CancellationToken::new();
    let results: Vec<RouteAssignment> = seeds
        .par_iter()
        .map(|&seed| {
            let mut rng = seeded_rng(seed);
            solve_vrp_with(instance, objective, config, &mut rng, &cancel)
        })
        .collect::<Result<_>>()?;

    results
        .into_iter()
        .min_by(|a, b| {
            a.num_unserved()
                .cmp(&b.num_unserved())
                .then(a.total_cost().total_cmp(&b.total_cost()))
        })
        .ok_or_else(|| RoutingError::Config("multi-start produced no result".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMatrix;
    use crate::evaluation::{evaluate_assignment, is_complete_partition, RouteEvaluator};
    use crate::ga::GaSettings;
    use crate::models::{Customer, Location, SolveStatus, UnservedReason, Vehicle};
    use proptest::prelude::{
        any, prop, prop_assert, prop_assert_eq, prop_assume, proptest, ProptestConfig,
    };
    use proptest::strategy::Strategy as _;

    /// The 5-location matrix of the classic two-vehicle CVRP demo.
    fn demo_instance(demands: [i32; 4], capacities: &[i32]) -> VrpInstance {
        let dm = DistanceMatrix::from_rows(vec![
            vec![0.0, 9.0, 8.0, 7.0, 6.0],
            vec![9.0, 0.0, 10.0, 15.0, 20.0],
            vec![8.0, 10.0, 0.0, 12.0, 14.0],
            vec![7.0, 15.0, 12.0, 0.0, 5.0],
            vec![6.0, 20.0, 14.0, 5.0, 0.0],
        ])
        .unwrap();
        let mut customers = vec![Customer::depot(Location::default())];
        for (i, &d) in demands.iter().enumerate() {
            customers.push(Customer::new(i + 1, Location::default(), d));
        }
        let vehicles = capacities
            .iter()
            .enumerate()
            .map(|(i, &c)| Vehicle::new(i, c))
            .collect();
        VrpInstance::new(customers, vehicles, dm).unwrap()
    }

    fn both_strategies() -> [SolverConfig; 2] {
        [
            SolverConfig::default(),
            SolverConfig::default()
                .with_strategy(Strategy::Evolutionary)
                .with_ga(GaSettings::default().with_generations(10)),
        ]
    }

    #[test]
    fn test_demo_loads_stay_within_capacity() {
        let inst = demo_instance([1, 1, 2, 4], &[5, 5]);
        for config in both_strategies() {
            let a = solve_vrp(&inst, Objective::Distance, &config).unwrap();
            assert!(a.is_complete());
            assert!(is_complete_partition(&inst, &a));
            for route in a.routes() {
                assert!(route.load_profile().iter().all(|&l| l <= 5));
                // the demand-4 customer never joins a vehicle already carrying 2
                let ids = route.customer_ids();
                if let Some(pos) = ids.iter().position(|&c| c == 4) {
                    let before = if pos == 0 { 0 } else { route.load_profile()[pos - 1] };
                    assert!(before + 4 <= 5);
                }
            }
        }
    }

    #[test]
    fn test_oversized_customer_reported_others_routed() {
        let inst = demo_instance([1, 10, 2, 1], &[5, 5]);
        for config in both_strategies() {
            let a = solve_vrp(&inst, Objective::Distance, &config).unwrap();
            assert_eq!(a.unserved_reason(2), Some(UnservedReason::DemandExceedsCapacity));
            assert_eq!(a.num_unserved(), 1);
            for c in [1, 3, 4] {
                assert!(a.customer_vehicle(c).is_some());
            }
        }
    }

    #[test]
    fn test_reject_policy_fails() {
        let inst = demo_instance([1, 10, 2, 1], &[5, 5]);
        let config = SolverConfig::default().with_unserved_policy(UnservedPolicy::Reject);
        assert!(matches!(
            solve_vrp(&inst, Objective::Distance, &config),
            Err(RoutingError::NoFeasibleSolution(_))
        ));
    }

    #[test]
    fn test_greedy_hostile_packing_is_completed() {
        // cheapest-arc fills one vehicle with 4 and 3, stranding customer 1;
        // {1, 3} and {2, 4} serve everyone
        let inst = demo_instance([3, 3, 2, 2], &[5, 5]);
        for config in both_strategies() {
            let a = solve_vrp(&inst, Objective::Distance, &config).unwrap();
            assert!(a.is_complete(), "{:?}", a.unserved());
            assert!(is_complete_partition(&inst, &a));
            assert!(evaluate_assignment(&inst, &a).1.is_empty());
            for route in a.routes() {
                assert_eq!(route.peak_load(), 5);
            }

            let reject = config.with_unserved_policy(UnservedPolicy::Reject);
            assert!(solve_vrp(&inst, Objective::Distance, &reject).is_ok());
        }
    }

    #[test]
    fn test_empty_fleet_and_empty_customers() {
        let inst = demo_instance([1, 1, 2, 4], &[]);
        let a = solve_vrp(&inst, Objective::Distance, &SolverConfig::default()).unwrap();
        assert_eq!(a.num_routes(), 0);
        assert_eq!(a.num_unserved(), 4);
        assert!(is_complete_partition(&inst, &a));

        let dm = DistanceMatrix::new(1);
        let inst = VrpInstance::new(
            vec![Customer::depot(Location::default())],
            vec![Vehicle::new(0, 5)],
            dm,
        )
        .unwrap();
        let a = solve_vrp(&inst, Objective::Distance, &SolverConfig::default()).unwrap();
        assert_eq!(a.num_routes(), 0);
        assert!(a.is_complete());
        assert_eq!(a.total_cost(), 0.0);
    }

    #[test]
    fn test_cancellation_returns_best_so_far() {
        let inst = demo_instance([1, 1, 2, 4], &[5, 5]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        for config in both_strategies() {
            let mut rng = seeded_rng(1);
            let a = solve_vrp_with(&inst, Objective::Distance, &config, &mut rng, &cancel).unwrap();
            assert_eq!(a.status(), SolveStatus::Interrupted);
            assert!(a.is_complete());
        }
    }

    #[test]
    fn test_seeded_solves_are_reproducible() {
        let inst = demo_instance([1, 1, 2, 4], &[5, 5]);
        let config = both_strategies()[1].clone().with_seed(7);
        let a = solve_vrp(&inst, Objective::Distance, &config).unwrap();
        let b = solve_vrp(&inst, Objective::Distance, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_multi_start_keeps_best() {
        let inst = demo_instance([1, 1, 2, 4], &[5, 5]);
        let config = both_strategies()[1].clone();
        let best = solve_multi_start(&inst, Objective::Distance, &config, &[1, 2, 3]).unwrap();
        for seed in [1, 2, 3] {
            let single = solve_vrp(&inst, Objective::Distance, &config.clone().with_seed(seed))
                .unwrap();
            assert!(best.total_cost() <= single.total_cost() + 1e-10);
        }
        assert!(solve_multi_start(&inst, Objective::Distance, &config, &[]).is_err());
    }

    #[test]
    fn test_max_distance_respected() {
        let inst = demo_instance([1, 1, 1, 1], &[5, 5]);
        let vehicles = inst
            .vehicles()
            .iter()
            .map(|v| v.clone().with_max_distance(30.0))
            .collect();
        let inst = VrpInstance::new(
            inst.customers().to_vec(),
            vehicles,
            inst.distances().clone(),
        )
        .unwrap();
        let a = solve_vrp(&inst, Objective::Distance, &SolverConfig::default()).unwrap();
        for route in a.routes() {
            assert!(route.total_distance() <= 30.0);
        }
        assert!(is_complete_partition(&inst, &a));
    }

    fn arb_instance() -> impl proptest::strategy::Strategy<Value = VrpInstance> {
        (
            prop::collection::vec((-50.0..50.0f64, -50.0..50.0f64, 0..8i32), 0..9),
            prop::collection::vec((1..15i32, prop::option::of(60.0..300.0f64)), 0..4),
        )
            .prop_map(|(points, fleet)| {
                let mut customers = vec![Customer::depot(Location::default())];
                for (i, &(x, y, d)) in points.iter().enumerate() {
                    customers.push(Customer::new(i + 1, Location::new(x, y), d));
                }
                let vehicles = fleet
                    .iter()
                    .enumerate()
                    .map(|(i, &(cap, range))| {
                        let v = Vehicle::new(i, cap);
                        match range {
                            Some(r) => v.with_max_distance(r),
                            None => v,
                        }
                    })
                    .collect();
                let dm = DistanceMatrix::from_customers(&customers);
                VrpInstance::new(customers, vehicles, dm).expect("generated instance is valid")
            })
    }

    /// Small instances for exhaustive comparison: at most 6 customers.
    fn arb_small_instance() -> impl proptest::strategy::Strategy<Value = VrpInstance> {
        (
            prop::collection::vec((-30.0..30.0f64, -30.0..30.0f64, 0..6i32), 1..=6),
            prop::collection::vec((1..12i32, prop::option::of(40.0..200.0f64)), 1..=3),
        )
            .prop_map(|(points, fleet)| {
                let mut customers = vec![Customer::depot(Location::default())];
                for (i, &(x, y, d)) in points.iter().enumerate() {
                    customers.push(Customer::new(i + 1, Location::new(x, y), d));
                }
                let vehicles = fleet
                    .iter()
                    .enumerate()
                    .map(|(i, &(cap, range))| match range {
                        Some(r) => Vehicle::new(i, cap).with_max_distance(r),
                        None => Vehicle::new(i, cap),
                    })
                    .collect();
                let dm = DistanceMatrix::from_customers(&customers);
                VrpInstance::new(customers, vehicles, dm).expect("generated instance is valid")
            })
    }

    /// Tries every order of `stops` for one vehicle.
    fn any_order_feasible(evaluator: &RouteEvaluator<'_>, stops: &mut Vec<usize>, k: usize) -> bool {
        if k == stops.len() {
            return evaluator.is_feasible(stops);
        }
        for i in k..stops.len() {
            stops.swap(k, i);
            if any_order_feasible(evaluator, stops, k + 1) {
                stops.swap(k, i);
                return true;
            }
            stops.swap(k, i);
        }
        false
    }

    /// Whether some split of all customers over the fleet is feasible.
    fn exists_complete_assignment(inst: &VrpInstance) -> bool {
        let n = inst.customers().len() - 1;
        let full = (1usize << n) - 1;
        let feasible: Vec<Vec<bool>> = inst
            .vehicles()
            .iter()
            .map(|v| {
                let evaluator = RouteEvaluator::new(inst, v);
                (0..=full)
                    .map(|mask| {
                        let mut stops: Vec<usize> =
                            (0..n).filter(|b| mask & (1 << b) != 0).map(|b| b + 1).collect();
                        any_order_feasible(&evaluator, &mut stops, 0)
                    })
                    .collect()
            })
            .collect();

        fn covers(feasible: &[Vec<bool>], left: usize) -> bool {
            let Some((first, rest)) = feasible.split_first() else {
                return left == 0;
            };
            // every submask of what is left, the empty one included
            let mut sub = left;
            loop {
                if first[sub] && covers(rest, left & !sub) {
                    return true;
                }
                if sub == 0 {
                    return false;
                }
                sub = (sub - 1) & left;
            }
        }
        covers(&feasible, full)
    }

    #[test]
    fn test_exhaustive_check_on_hostile_packing() {
        assert!(exists_complete_assignment(&demo_instance([3, 3, 2, 2], &[5, 5])));
        assert!(!exists_complete_assignment(&demo_instance([3, 3, 3, 2], &[5, 5])));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_complete_assignment_found_when_one_exists(
            inst in arb_small_instance(),
            seed in any::<u64>(),
        ) {
            prop_assume!(exists_complete_assignment(&inst));
            for config in both_strategies() {
                let a = solve_vrp(&inst, Objective::Distance, &config.with_seed(seed)).unwrap();
                prop_assert_eq!(a.num_unserved(), 0, "unserved: {:?}", a.unserved());
                prop_assert!(evaluate_assignment(&inst, &a).1.is_empty());
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_assignments_are_feasible_partitions(inst in arb_instance(), seed in any::<u64>()) {
            let config = SolverConfig::default().with_seed(seed);
            let a = solve_vrp(&inst, Objective::Distance, &config).unwrap();
            prop_assert!(is_complete_partition(&inst, &a));
            prop_assert!(evaluate_assignment(&inst, &a).1.is_empty());
            for route in a.routes() {
                let vehicle = inst.vehicles().iter().find(|v| v.id() == route.vehicle_id());
                prop_assert!(vehicle.is_some());
                let vehicle = vehicle.unwrap();
                prop_assert!(route.peak_load() <= vehicle.capacity());
                if let Some(max) = vehicle.max_distance() {
                    prop_assert!(route.total_distance() <= max + 1e-9);
                }
            }
        }
    }
}
