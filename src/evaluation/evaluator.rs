//! Route evaluator that computes timing, load, and feasibility.

use crate::models::{Route, RouteAssignment, Vehicle, Violation, ViolationType, Visit, VrpInstance};

/// Evaluates routes for one vehicle: visit timing, cumulative load, total
/// distance and duration, and constraint violations (capacity at every stop,
/// time windows, max distance, max duration).
///
/// The max-distance limit is checked against road length
/// ([`VrpInstance::length`]), not against the cost matrix, which may hold
/// seconds or grams of CO2.
///
/// # Examples
///
/// ```
/// use eco_routing::distance::DistanceMatrix;
/// use eco_routing::evaluation::RouteEvaluator;
/// use eco_routing::models::{Customer, Location, Vehicle, VrpInstance};
///
/// let customers = vec![
///     Customer::depot(Location::new(0.0, 0.0)),
///     Customer::new(1, Location::new(3.0, 4.0), 10),
///     Customer::new(2, Location::new(6.0, 8.0), 20),
/// ];
/// let dm = DistanceMatrix::from_customers(&customers);
/// let instance = VrpInstance::new(customers, vec![Vehicle::new(0, 100)], dm).unwrap();
///
/// let evaluator = RouteEvaluator::new(&instance, &instance.vehicles()[0]);
/// let (route, violations) = evaluator.build_route(&[1, 2]);
/// assert_eq!(route.load_profile(), vec![10, 30]);
/// assert!(violations.is_empty());
/// ```
pub struct RouteEvaluator<'a> {
    instance: &'a VrpInstance,
    vehicle: &'a Vehicle,
}

impl<'a> RouteEvaluator<'a> {
    pub fn new(instance: &'a VrpInstance, vehicle: &'a Vehicle) -> Self {
        Self { instance, vehicle }
    }

    pub fn vehicle(&self) -> &Vehicle {
        self.vehicle
    }

    /// Builds a route from the vehicle's start through `customer_ids` to its end.
    pub fn build_route(&self, customer_ids: &[usize]) -> (Route, Vec<Violation>) {
        let mut route = Route::new(self.vehicle.id());
        let mut violations = Vec::new();
        let customers = self.instance.customers();
        let capacity = self.vehicle.capacity();

        let mut current_time = 0.0;
        let mut current_load: i32 = 0;
        let mut total_distance = 0.0;
        let mut total_length = 0.0;
        let mut prev = self.vehicle.start();
        let mut capacity_reported = false;

        for &cid in customer_ids {
            total_distance += self.instance.distance(prev, cid);
            total_length += self.instance.length(prev, cid);
            let arrival = current_time + self.instance.travel_time(prev, cid);
            let customer = &customers[cid];

            let service_start = match customer.time_window() {
                Some(tw) => {
                    if tw.is_violated(arrival) {
                        violations.push(Violation::new(ViolationType::TimeWindowViolated {
                            customer_id: cid,
                            arrival,
                            due: tw.due(),
                        }));
                    }
                    arrival + tw.waiting_time(arrival)
                }
                None => arrival,
            };

            let departure = service_start + customer.service_duration();
            current_load += customer.demand();

            if current_load > capacity && !capacity_reported {
                capacity_reported = true;
                violations.push(Violation::new(ViolationType::CapacityExceeded {
                    route_index: 0,
                    customer_id: cid,
                    load: current_load,
                    capacity,
                }));
            }

            route.push_visit(Visit {
                customer_id: cid,
                arrival_time: arrival,
                departure_time: departure,
                load_after: current_load,
            });

            current_time = departure;
            prev = cid;
        }

        // An unused vehicle does not drive, even when start != end
        if !customer_ids.is_empty() {
            let end = self.vehicle.end();
            total_distance += self.instance.distance(prev, end);
            total_length += self.instance.length(prev, end);
            current_time += self.instance.travel_time(prev, end);
        }

        route.set_total_distance(total_distance);
        route.set_total_duration(current_time);

        if let Some(max_d) = self.vehicle.max_distance() {
            if total_length > max_d {
                violations.push(Violation::new(ViolationType::MaxDistanceExceeded {
                    route_index: 0,
                    distance: total_length,
                    max_distance: max_d,
                }));
            }
        }

        if let Some(max_t) = self.vehicle.max_duration() {
            if current_time > max_t {
                violations.push(Violation::new(ViolationType::MaxDurationExceeded {
                    route_index: 0,
                    duration: current_time,
                    max_duration: max_t,
                }));
            }
        }

        (route, violations)
    }

    /// `true` if the sequence violates no constraint of this vehicle.
    pub fn is_feasible(&self, customer_ids: &[usize]) -> bool {
        self.build_route(customer_ids).1.is_empty()
    }

    /// Start → customers → end distance, without building visits.
    pub fn route_distance(&self, customer_ids: &[usize]) -> f64 {
        route_distance(
            customer_ids,
            self.vehicle.start(),
            self.vehicle.end(),
            self.instance.distances(),
        )
    }
}

/// Distance of `start → route[0] → … → route[n-1] → end`; zero for an empty route.
pub fn route_distance(
    route: &[usize],
    start: usize,
    end: usize,
    distances: &crate::distance::DistanceMatrix,
) -> f64 {
    let (Some(&first), Some(&last)) = (route.first(), route.last()) else {
        return 0.0;
    };
    let inner: f64 = route.windows(2).map(|w| distances.get(w[0], w[1])).sum();
    distances.get(start, first) + inner + distances.get(last, end)
}

/// Re-evaluates every route of an assignment against its vehicle.
///
/// Returns the total distance and all violations, with `route_index` set to
/// the route's position in the assignment.
pub fn evaluate_assignment(
    instance: &VrpInstance,
    assignment: &RouteAssignment,
) -> (f64, Vec<Violation>) {
    let mut total_distance = 0.0;
    let mut all_violations = Vec::new();

    for (idx, route) in assignment.routes().iter().enumerate() {
        let Some(vehicle) = instance.vehicles().iter().find(|v| v.id() == route.vehicle_id())
        else {
            continue;
        };
        let evaluator = RouteEvaluator::new(instance, vehicle);
        let (rebuilt, mut violations) = evaluator.build_route(&route.customer_ids());

        for v in &mut violations {
            match &mut v.kind {
                ViolationType::CapacityExceeded { route_index, .. }
                | ViolationType::MaxDistanceExceeded { route_index, .. }
                | ViolationType::MaxDurationExceeded { route_index, .. } => {
                    *route_index = idx;
                }
                ViolationType::TimeWindowViolated { .. } => {}
            }
        }

        total_distance += rebuilt.total_distance();
        all_violations.append(&mut violations);
    }

    (total_distance, all_violations)
}

/// `true` if each customer is routed exactly once or reported unserved,
/// never both, and each vehicle drives at most one route.
pub fn is_complete_partition(instance: &VrpInstance, assignment: &RouteAssignment) -> bool {
    let n = instance.customers().len();
    let mut seen = vec![0usize; n];
    for route in assignment.routes() {
        for cid in route.customer_ids() {
            if cid == 0 || cid >= n {
                return false;
            }
            seen[cid] += 1;
        }
    }
    for u in assignment.unserved() {
        if u.customer_id == 0 || u.customer_id >= n {
            return false;
        }
        seen[u.customer_id] += 1;
    }

    let mut vehicles: Vec<usize> = assignment.routes().iter().map(|r| r.vehicle_id()).collect();
    vehicles.sort_unstable();
    vehicles.dedup();

    vehicles.len() == assignment.num_routes() && seen.iter().skip(1).all(|&count| count == 1)
}
