//! Inter-route customer relocation operator.
//!
//! # Algorithm
//!
//! Tries moving each customer from its current route to every insertion
//! position of every other vehicle's route, including vehicles that are
//! still unused. The best move that keeps both routes feasible and reduces
//! the combined cost is applied.
//!
//! # Complexity
//!
//! O(n² × R) route evaluations per call, where n = customers and R = vehicles.
//!
//! # Reference
//!
//! Or, I. (1976). "Traveling Salesman-Type Combinatorial Problems and Their
//! Relation to the Logistics of Blood Banking". PhD thesis.

use crate::evaluation::Objective;
use crate::models::VrpInstance;

use super::{sequence_cost, tour_costs};

/// A relocate move: move customer from one route to another.
#[derive(Debug, Clone)]
struct RelocateMove {
    from_route: usize,
    from_pos: usize,
    to_route: usize,
    to_pos: usize,
    delta: f64,
}

/// Applies the best improving relocate move to `tours`.
///
/// `tours[k]` is the customer sequence of `instance.vehicles()[k]`. Returns
/// the cost reduction, or `None` if no feasible move improves.
///
/// # Examples
///
/// ```
/// use eco_routing::distance::DistanceMatrix;
/// use eco_routing::evaluation::Objective;
/// use eco_routing::local_search::relocate_improve;
/// use eco_routing::models::{Customer, Location, Vehicle, VrpInstance};
///
/// let customers = vec![
///     Customer::depot(Location::new(0.0, 0.0)),
///     Customer::new(1, Location::new(1.0, 0.0), 10),
///     Customer::new(2, Location::new(2.0, 0.0), 10),
///     Customer::new(3, Location::new(0.0, 3.0), 10),
/// ];
/// let dm = DistanceMatrix::from_customers(&customers);
/// let vehicles = vec![Vehicle::new(0, 20), Vehicle::new(1, 20)];
/// let instance = VrpInstance::new(customers, vehicles, dm).unwrap();
///
/// // customer 2 rides with 3 although it sits next to 1
/// let mut tours = vec![vec![1], vec![2, 3]];
/// let gain = relocate_improve(&instance, Objective::Distance, &mut tours);
/// assert!(gain.is_some());
/// assert_eq!(tours[0].len(), 2);
/// assert_eq!(tours[1], vec![3]);
/// ```
pub fn relocate_improve(
    instance: &VrpInstance,
    objective: Objective,
    tours: &mut [Vec<usize>],
) -> Option<f64> {
    let mv = find_best_relocate(instance, objective, tours)?;
    let customer_id = tours[mv.from_route].remove(mv.from_pos);
    tours[mv.to_route].insert(mv.to_pos, customer_id);
    Some(-mv.delta)
}

/// Finds the best single improving relocate move across all route pairs.
fn find_best_relocate(
    instance: &VrpInstance,
    objective: Objective,
    tours: &[Vec<usize>],
) -> Option<RelocateMove> {
    let vehicles = instance.vehicles();
    let costs = tour_costs(instance, objective, tours);
    let mut best: Option<RelocateMove> = None;

    for from_r in 0..tours.len() {
        for from_pos in 0..tours[from_r].len() {
            let cid = tours[from_r][from_pos];
            let mut shortened = tours[from_r].clone();
            shortened.remove(from_pos);
            let Some(shortened_cost) =
                sequence_cost(instance, &vehicles[from_r], objective, &shortened)
            else {
                continue;
            };

            for (to_r, to_route) in tours.iter().enumerate() {
                if to_r == from_r {
                    continue;
                }
                let to_load: i32 = to_route
                    .iter()
                    .map(|&c| instance.customers()[c].demand())
                    .sum();
                if to_load + instance.customers()[cid].demand() > vehicles[to_r].capacity() {
                    continue;
                }

                let mut extended = to_route.clone();
                for to_pos in 0..=to_route.len() {
                    extended.insert(to_pos, cid);
                    let cost = sequence_cost(instance, &vehicles[to_r], objective, &extended);
                    extended.remove(to_pos);

                    let Some(extended_cost) = cost else { continue };
                    let delta =
                        shortened_cost + extended_cost - costs[from_r] - costs[to_r];
                    if delta < -1e-10 && best.as_ref().is_none_or(|b| delta < b.delta) {
                        best = Some(RelocateMove {
                            from_route: from_r,
                            from_pos,
                            to_route: to_r,
                            to_pos,
                            delta,
                        });
                    }
                }
            }
        }
    }

    best
}
