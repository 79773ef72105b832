//! Path-cheapest-arc construction.
//!
//! Builds one route per vehicle: from the vehicle's start location, repeatedly
//! extend the route with the unrouted customer reached by the cheapest arc,
//! as long as the extended route stays feasible for that vehicle. When no
//! customer can be appended, move on to the next vehicle.
//!
//! # Complexity
//!
//! O(k · n² log n) for k vehicles and n customers in the worst case, since each
//! extension ranks the remaining candidates and re-checks feasibility.
//!
//! # Reference
//!
//! The first-solution strategy of the same name in constraint-based routing
//! solvers; a greedy nearest-neighbor variant that respects every vehicle
//! constraint instead of capacity alone.

use tracing::{debug, instrument};

use crate::evaluation::{Objective, RouteEvaluator};
use crate::models::{RouteAssignment, UnservedReason, VrpInstance};

/// Constructs an initial assignment by cheapest-arc extension.
///
/// Customers whose demand exceeds every vehicle's capacity are reported as
/// [`UnservedReason::DemandExceedsCapacity`] up front. Customers still unrouted
/// after every vehicle has been filled are reported as
/// [`UnservedReason::NoVehicleAvailable`]; with an empty fleet that is every
/// customer. Ties between equally cheap arcs go to the lowest customer index.
///
/// # Arguments
///
/// * `instance` — Validated instance (index 0 = depot)
/// * `objective` — Ranks candidate arcs and prices the resulting routes
///
/// # Examples
///
/// ```
/// use eco_routing::constructive::path_cheapest_arc;
/// use eco_routing::distance::DistanceMatrix;
/// use eco_routing::evaluation::Objective;
/// use eco_routing::models::{Customer, Location, Vehicle, VrpInstance};
///
/// let customers = vec![
///     Customer::depot(Location::new(0.0, 0.0)),
///     Customer::new(1, Location::new(1.0, 0.0), 10),
///     Customer::new(2, Location::new(2.0, 0.0), 10),
///     Customer::new(3, Location::new(3.0, 0.0), 10),
/// ];
/// let dm = DistanceMatrix::from_customers(&customers);
/// let instance = VrpInstance::new(customers, vec![Vehicle::new(0, 30)], dm).unwrap();
///
/// let assignment = path_cheapest_arc(&instance, Objective::Distance);
/// assert_eq!(assignment.routes()[0].customer_ids(), vec![1, 2, 3]);
/// assert!(assignment.is_complete());
/// ```
#[instrument(skip_all, fields(
    customers = instance.num_customers(),
    vehicles = instance.vehicles().len(),
))]
pub fn path_cheapest_arc(instance: &VrpInstance, objective: Objective) -> RouteAssignment {
    let n = instance.customers().len();
    let mut assignment = RouteAssignment::new();
    let mut routed = vec![false; n];
    routed[0] = true;

    let Some(max_capacity) = instance.max_capacity() else {
        for cid in 1..n {
            assignment.add_unserved(cid, UnservedReason::NoVehicleAvailable);
        }
        return assignment;
    };

    for cid in 1..n {
        if instance.customers()[cid].demand() > max_capacity {
            routed[cid] = true;
            assignment.add_unserved(cid, UnservedReason::DemandExceedsCapacity);
        }
    }

    for vehicle in instance.vehicles() {
        if routed.iter().all(|&r| r) {
            break;
        }

        let evaluator = RouteEvaluator::new(instance, vehicle);
        let mut sequence: Vec<usize> = Vec::new();
        let mut load: i32 = 0;
        let mut current = vehicle.start();

        loop {
            let mut candidates: Vec<(usize, f64)> = (1..n)
                .filter(|&i| !routed[i])
                .filter(|&i| load + instance.customers()[i].demand() <= vehicle.capacity())
                .map(|i| (i, objective.arc_cost(instance, current, i)))
                .collect();
            candidates.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

            let next = candidates.into_iter().map(|(i, _)| i).find(|&i| {
                sequence.push(i);
                let feasible = evaluator.is_feasible(&sequence);
                sequence.pop();
                feasible
            });

            let Some(next) = next else { break };
            routed[next] = true;
            load += instance.customers()[next].demand();
            sequence.push(next);
            current = next;
        }

        if !sequence.is_empty() {
            let (mut route, _) = evaluator.build_route(&sequence);
            route.set_cost(objective.route_cost(&route, vehicle));
            debug!(vehicle = vehicle.id(), stops = sequence.len(), load, "route constructed");
            assignment.add_route(route);
        }
    }

    for cid in 1..n {
        if !routed[cid] {
            assignment.add_unserved(cid, UnservedReason::NoVehicleAvailable);
        }
    }

    let total = objective.assignment_cost(instance, &assignment);
    assignment.set_total_cost(total);
    assignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMatrix;
    use crate::evaluation::is_complete_partition;
    use crate::models::{Customer, Location, TimeWindow, Vehicle};

    fn line_customers() -> Vec<Customer> {
        vec![
            Customer::depot(Location::new(0.0, 0.0)),
            Customer::new(1, Location::new(1.0, 0.0), 10),
            Customer::new(2, Location::new(2.0, 0.0), 10),
            Customer::new(3, Location::new(3.0, 0.0), 10),
        ]
    }

    fn instance(customers: Vec<Customer>, vehicles: Vec<Vehicle>) -> VrpInstance {
        let dm = DistanceMatrix::from_customers(&customers);
        VrpInstance::new(customers, vehicles, dm).unwrap()
    }

    #[test]
    fn test_all_on_one_route() {
        let inst = instance(line_customers(), vec![Vehicle::new(0, 100)]);
        let a = path_cheapest_arc(&inst, Objective::Distance);
        assert_eq!(a.num_routes(), 1);
        assert_eq!(a.routes()[0].customer_ids(), vec![1, 2, 3]);
        // 1 + 1 + 1 + 3
        assert!((a.total_cost() - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_split_over_vehicles() {
        let inst = instance(
            line_customers(),
            vec![Vehicle::new(0, 20), Vehicle::new(1, 20)],
        );
        let a = path_cheapest_arc(&inst, Objective::Distance);
        assert_eq!(a.num_routes(), 2);
        assert_eq!(a.num_served(), 3);
        assert!(a.is_complete());
        assert!(a.routes().iter().all(|r| r.peak_load() <= 20));
    }

    #[test]
    fn test_insufficient_fleet_reports_no_vehicle() {
        let inst = instance(line_customers(), vec![Vehicle::new(0, 15)]);
        let a = path_cheapest_arc(&inst, Objective::Distance);
        assert_eq!(a.num_served(), 1);
        assert_eq!(a.num_unserved(), 2);
        assert_eq!(a.unserved_reason(3), Some(UnservedReason::NoVehicleAvailable));
        assert!(is_complete_partition(&inst, &a));
    }

    #[test]
    fn test_oversized_demand_reported() {
        let mut cs = line_customers();
        cs[2] = Customer::new(2, Location::new(2.0, 0.0), 50);
        let inst = instance(cs, vec![Vehicle::new(0, 30), Vehicle::new(1, 20)]);
        let a = path_cheapest_arc(&inst, Objective::Distance);
        assert_eq!(a.unserved_reason(2), Some(UnservedReason::DemandExceedsCapacity));
        assert_eq!(a.num_served(), 2);
        assert!(is_complete_partition(&inst, &a));
    }

    #[test]
    fn test_empty_fleet() {
        let inst = instance(line_customers(), vec![]);
        let a = path_cheapest_arc(&inst, Objective::Distance);
        assert_eq!(a.num_routes(), 0);
        assert_eq!(a.num_unserved(), 3);
        assert!(a
            .unserved()
            .iter()
            .all(|u| u.reason == UnservedReason::NoVehicleAvailable));
    }

    #[test]
    fn test_no_customers() {
        let inst = instance(
            vec![Customer::depot(Location::new(0.0, 0.0))],
            vec![Vehicle::new(0, 10)],
        );
        let a = path_cheapest_arc(&inst, Objective::Distance);
        assert_eq!(a.num_routes(), 0);
        assert!(a.is_complete());
        assert_eq!(a.total_cost(), 0.0);
    }

    #[test]
    fn test_chooses_cheapest_arc() {
        let cs = vec![
            Customer::depot(Location::new(0.0, 0.0)),
            Customer::new(1, Location::new(10.0, 0.0), 5),
            Customer::new(2, Location::new(1.0, 0.0), 5),
        ];
        let inst = instance(cs, vec![Vehicle::new(0, 100)]);
        let a = path_cheapest_arc(&inst, Objective::Distance);
        assert_eq!(a.routes()[0].customer_ids(), vec![2, 1]);
    }

    #[test]
    fn test_respects_max_distance() {
        // a round trip to customer 3 alone is 6
        let inst = instance(
            line_customers(),
            vec![Vehicle::new(0, 100).with_max_distance(4.0), Vehicle::new(1, 100)],
        );
        let a = path_cheapest_arc(&inst, Objective::Distance);
        assert_eq!(a.routes()[0].customer_ids(), vec![1, 2]);
        assert!(a.routes()[0].total_distance() <= 4.0);
        assert_eq!(a.customer_vehicle(3), Some(1));
    }

    #[test]
    fn test_skips_customer_outside_time_window() {
        let mut cs = line_customers();
        cs[1] = Customer::new(1, Location::new(1.0, 0.0), 10).with_service_duration(1.0);
        cs[2] = Customer::new(2, Location::new(2.0, 0.0), 10)
            .with_time_window(TimeWindow::new(0.0, 2.5).expect("valid"));
        let inst = instance(cs, vec![Vehicle::new(0, 100), Vehicle::new(1, 100)]);
        let a = path_cheapest_arc(&inst, Objective::Distance);
        // via 1 the vehicle reaches 2 at 3.0 > 2.5; driving straight there takes 2.0
        assert_eq!(a.routes()[0].customer_ids(), vec![1, 3]);
        assert_eq!(a.routes()[1].customer_ids(), vec![2]);
    }

    #[test]
    fn test_distinct_start_location() {
        let inst = instance(line_customers(), vec![Vehicle::new(0, 100).with_start(3)]);
        let a = path_cheapest_arc(&inst, Objective::Distance);
        assert_eq!(a.routes()[0].customer_ids(), vec![3, 2, 1]);
    }
}
