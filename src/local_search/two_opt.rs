//! Intra-route 2-opt improvement.
//!
//! # Algorithm
//!
//! For each pair of positions (i, j) with i < j, reverse the segment
//! `route[i..=j]`. A reversal is kept if the resulting route is feasible for
//! the vehicle and strictly cheaper under the objective. Repeat until no
//! reversal improves (first-improvement strategy).
//!
//! Candidates are priced on the whole route rather than by the four-arc delta:
//! matrices built from one-way road segments are asymmetric, and reversing a
//! segment changes the arcs inside it as well as waiting times downstream.
//!
//! # Complexity
//!
//! O(n³) per pass, O(n⁴) worst case for convergence.
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.

use crate::evaluation::Objective;
use crate::models::{Vehicle, VrpInstance};

use super::sequence_cost;

/// Applies 2-opt improvement to one vehicle's customer sequence.
///
/// Returns the improved sequence and its cost, or the input unchanged when it
/// is already 2-opt optimal. An infeasible input costs `f64::INFINITY`, so any
/// feasible reversal replaces it.
///
/// # Arguments
///
/// * `instance` — Instance supplying distances, travel times, and customers
/// * `vehicle` — Vehicle driving the route (start/end, capacity, limits)
/// * `objective` — Cost to minimize
/// * `route` — Ordered customer indices (excluding start and end)
///
/// # Examples
///
/// ```
/// use eco_routing::distance::DistanceMatrix;
/// use eco_routing::evaluation::Objective;
/// use eco_routing::local_search::two_opt_improve;
/// use eco_routing::models::{Customer, Location, Vehicle, VrpInstance};
///
/// let customers = vec![
///     Customer::depot(Location::new(0.0, 0.0)),
///     Customer::new(1, Location::new(1.0, 0.0), 10),
///     Customer::new(2, Location::new(2.0, 0.0), 10),
///     Customer::new(3, Location::new(3.0, 0.0), 10),
/// ];
/// let dm = DistanceMatrix::from_customers(&customers);
/// let instance = VrpInstance::new(customers, vec![Vehicle::new(0, 100)], dm).unwrap();
///
/// let (improved, cost) =
///     two_opt_improve(&instance, &instance.vehicles()[0], Objective::Distance, &[2, 1, 3]);
/// assert_eq!(improved, vec![1, 2, 3]);
/// assert!((cost - 6.0).abs() < 1e-10);
/// ```
pub fn two_opt_improve(
    instance: &VrpInstance,
    vehicle: &Vehicle,
    objective: Objective,
    route: &[usize],
) -> (Vec<usize>, f64) {
    let mut current = route.to_vec();
    let mut current_cost =
        sequence_cost(instance, vehicle, objective, &current).unwrap_or(f64::INFINITY);

    if current.len() < 2 {
        return (current, current_cost);
    }

    let n = current.len();
    let mut improved = true;
    while improved {
        improved = false;
        for i in 0..n - 1 {
            for j in i + 1..n {
                current[i..=j].reverse();
                match sequence_cost(instance, vehicle, objective, &current) {
                    Some(cost) if cost < current_cost - 1e-10 => {
                        current_cost = cost;
                        improved = true;
                    }
                    _ => current[i..=j].reverse(),
                }
            }
        }
    }

    (current, current_cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMatrix;
    use crate::models::{Customer, Location, TimeWindow};

    fn instance(customers: Vec<Customer>, vehicle: Vehicle) -> VrpInstance {
        let dm = DistanceMatrix::from_customers(&customers);
        VrpInstance::new(customers, vec![vehicle], dm).unwrap()
    }

    fn line() -> Vec<Customer> {
        vec![
            Customer::depot(Location::new(0.0, 0.0)),
            Customer::new(1, Location::new(1.0, 0.0), 10),
            Customer::new(2, Location::new(2.0, 0.0), 10),
            Customer::new(3, Location::new(3.0, 0.0), 10),
        ]
    }

    #[test]
    fn test_2opt_already_optimal() {
        let inst = instance(line(), Vehicle::new(0, 100));
        let (improved, cost) =
            two_opt_improve(&inst, &inst.vehicles()[0], Objective::Distance, &[1, 2, 3]);
        assert_eq!(improved, vec![1, 2, 3]);
        assert!((cost - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_2opt_removes_crossing() {
        let cs = vec![
            Customer::depot(Location::new(5.0, 5.0)),
            Customer::new(1, Location::new(0.0, 0.0), 5),
            Customer::new(2, Location::new(10.0, 0.0), 5),
            Customer::new(3, Location::new(0.0, 10.0), 5),
            Customer::new(4, Location::new(10.0, 10.0), 5),
        ];
        let inst = instance(cs, Vehicle::new(0, 100));
        let v = &inst.vehicles()[0];
        let before = sequence_cost(&inst, v, Objective::Distance, &[1, 4, 2, 3]).unwrap();
        let (route, after) = two_opt_improve(&inst, v, Objective::Distance, &[1, 4, 2, 3]);
        assert!(after < before - 1e-10);
        assert_eq!(route.len(), 4);
    }

    #[test]
    fn test_2opt_empty_and_single() {
        let inst = instance(line(), Vehicle::new(0, 100));
        let v = &inst.vehicles()[0];
        let (route, cost) = two_opt_improve(&inst, v, Objective::Distance, &[]);
        assert!(route.is_empty());
        assert_eq!(cost, 0.0);
        let (route, cost) = two_opt_improve(&inst, v, Objective::Distance, &[2]);
        assert_eq!(route, vec![2]);
        assert!((cost - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_2opt_keeps_time_windows() {
        // 3 must be served first; without the window [1, 3, 2] would be taken
        let mut cs = line();
        cs[3] = Customer::new(3, Location::new(3.0, 0.0), 10)
            .with_time_window(TimeWindow::new(0.0, 2.5).expect("valid"));
        let inst = instance(cs, Vehicle::new(0, 100));
        let v = &inst.vehicles()[0];
        let (route, cost) = two_opt_improve(&inst, v, Objective::Distance, &[3, 1, 2]);
        assert_eq!(route, vec![3, 2, 1]);
        assert!((cost - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_2opt_uses_end_location() {
        // ending at customer 3's location favors visiting 1 first
        let inst = instance(line(), Vehicle::new(0, 100).with_end(3));
        let v = &inst.vehicles()[0];
        let (route, _) = two_opt_improve(&inst, v, Objective::Distance, &[3, 2, 1]);
        assert_eq!(route, vec![1, 2, 3]);
    }
}
