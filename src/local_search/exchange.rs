//! Inter-route exchange operator (2-opt*).
//!
//! # Algorithm
//!
//! The cross-exchange (2-opt*) operator swaps tail segments between two routes.
//! Given routes R1 = [a₁, ..., aᵢ, aᵢ₊₁, ..., aₙ] and
//! R2 = [b₁, ..., bⱼ, bⱼ₊₁, ..., bₘ], produce:
//!
//! R1' = [a₁, ..., aᵢ, bⱼ₊₁, ..., bₘ]
//! R2' = [b₁, ..., bⱼ, aᵢ₊₁, ..., aₙ]
//!
//! Each route keeps its vehicle, so the swapped tails end at the other
//! vehicle's end location. Cutting both routes at 0 hands a whole route to
//! the other vehicle, which matters for a heterogeneous fleet.
//!
//! # Complexity
//!
//! O(n² × R²) route evaluations per call, where n = customers per route and
//! R = number of vehicles.
//!
//! # Reference
//!
//! Potvin, J.-Y. & Rousseau, J.-M. (1995). "An Exchange Heuristic for
//! Routeing Problems with Time Windows", *Journal of the Operational Research
//! Society* 46(12), 1433-1446.

use crate::evaluation::Objective;
use crate::models::VrpInstance;

use super::{sequence_cost, tour_costs};

#[derive(Debug, Clone)]
struct ExchangeMove {
    r1: usize,
    r2: usize,
    cut1: usize,
    cut2: usize,
    delta: f64,
}

/// Applies the best improving tail exchange to `tours`.
///
/// `tours[k]` is the customer sequence of `instance.vehicles()[k]`. Returns
/// the cost reduction, or `None` if no feasible exchange improves.
///
/// # Examples
///
/// ```
/// use eco_routing::distance::DistanceMatrix;
/// use eco_routing::evaluation::Objective;
/// use eco_routing::local_search::exchange_improve;
/// use eco_routing::models::{Customer, Location, Vehicle, VrpInstance};
///
/// let customers = vec![
///     Customer::depot(Location::new(0.0, 0.0)),
///     Customer::new(1, Location::new(1.0, 1.0), 10),
///     Customer::new(2, Location::new(-1.0, -1.0), 10),
///     Customer::new(3, Location::new(2.0, 2.0), 10),
///     Customer::new(4, Location::new(-2.0, -2.0), 10),
/// ];
/// let dm = DistanceMatrix::from_customers(&customers);
/// let vehicles = vec![Vehicle::new(0, 20), Vehicle::new(1, 20)];
/// let instance = VrpInstance::new(customers, vehicles, dm).unwrap();
///
/// // each route zig-zags across the depot
/// let mut tours = vec![vec![1, 4], vec![2, 3]];
/// assert!(exchange_improve(&instance, Objective::Distance, &mut tours).is_some());
/// assert_eq!(tours, vec![vec![1, 3], vec![2, 4]]);
/// ```
pub fn exchange_improve(
    instance: &VrpInstance,
    objective: Objective,
    tours: &mut [Vec<usize>],
) -> Option<f64> {
    let mv = find_best_exchange(instance, objective, tours)?;
    let tail1 = tours[mv.r1].split_off(mv.cut1);
    let tail2 = tours[mv.r2].split_off(mv.cut2);
    tours[mv.r1].extend(tail2);
    tours[mv.r2].extend(tail1);
    Some(-mv.delta)
}

fn find_best_exchange(
    instance: &VrpInstance,
    objective: Objective,
    tours: &[Vec<usize>],
) -> Option<ExchangeMove> {
    let vehicles = instance.vehicles();
    let costs = tour_costs(instance, objective, tours);
    let mut best: Option<ExchangeMove> = None;

    for r1 in 0..tours.len() {
        for r2 in r1 + 1..tours.len() {
            let (route1, route2) = (&tours[r1], &tours[r2]);
            if route1.is_empty() && route2.is_empty() {
                continue;
            }

            for cut1 in 0..=route1.len() {
                for cut2 in 0..=route2.len() {
                    // both tails empty: nothing moves
                    if cut1 == route1.len() && cut2 == route2.len() {
                        continue;
                    }

                    let new1: Vec<usize> =
                        route1[..cut1].iter().chain(&route2[cut2..]).copied().collect();
                    let new2: Vec<usize> =
                        route2[..cut2].iter().chain(&route1[cut1..]).copied().collect();

                    let Some(c1) = sequence_cost(instance, &vehicles[r1], objective, &new1)
                    else {
                        continue;
                    };
                    let Some(c2) = sequence_cost(instance, &vehicles[r2], objective, &new2)
                    else {
                        continue;
                    };

                    let delta = c1 + c2 - costs[r1] - costs[r2];
                    if delta < -1e-10 && best.as_ref().is_none_or(|b| delta < b.delta) {
                        best = Some(ExchangeMove {
                            r1,
                            r2,
                            cut1,
                            cut2,
                            delta,
                        });
                    }
                }
            }
        }
    }

    best
}
