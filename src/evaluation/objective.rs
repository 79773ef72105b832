//! Objective functions over routes.

use serde::Deserialize;

use crate::models::{Route, RouteAssignment, Vehicle, VrpInstance};

/// What the route assignment minimizes.
///
/// Emission-optimal planning uses [`Objective::Distance`] over a matrix built
/// with [`Criterion::Fuel`](crate::graph::Criterion::Fuel).
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Matrix cost scaled by each vehicle's cost per distance.
    #[default]
    Distance,
    /// Total route duration, including waiting and service.
    Duration,
    Weighted { distance: f64, duration: f64 },
}

impl Objective {
    /// Cost of one arc, used to rank candidate moves during construction.
    pub fn arc_cost(&self, instance: &VrpInstance, from: usize, to: usize) -> f64 {
        match *self {
            Objective::Distance => instance.distance(from, to),
            Objective::Duration => instance.travel_time(from, to),
            Objective::Weighted { distance, duration } => {
                distance * instance.distance(from, to) + duration * instance.travel_time(from, to)
            }
        }
    }

    pub fn route_cost(&self, route: &Route, vehicle: &Vehicle) -> f64 {
        let distance_cost = route.total_distance() * vehicle.cost_per_distance();
        match *self {
            Objective::Distance => distance_cost,
            Objective::Duration => route.total_duration(),
            Objective::Weighted { distance, duration } => {
                distance * distance_cost + duration * route.total_duration()
            }
        }
    }

    /// Sums [`route_cost`](Self::route_cost) over all routes of an assignment.
    pub fn assignment_cost(&self, instance: &VrpInstance, assignment: &RouteAssignment) -> f64 {
        assignment
            .routes()
            .iter()
            .filter_map(|r| {
                instance
                    .vehicles()
                    .iter()
                    .find(|v| v.id() == r.vehicle_id())
                    .map(|v| self.route_cost(r, v))
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMatrix;
    use crate::evaluation::RouteEvaluator;
    use crate::models::{Customer, Location};

    fn instance() -> VrpInstance {
        let cs = vec![
            Customer::depot(Location::new(0.0, 0.0)),
            Customer::new(1, Location::new(3.0, 4.0), 1).with_service_duration(2.0),
        ];
        let dm = DistanceMatrix::from_customers(&cs);
        let mut tm = DistanceMatrix::new(2);
        tm.set(0, 1, 1.0);
        tm.set(1, 0, 1.0);
        VrpInstance::new(cs, vec![Vehicle::new(0, 5).with_cost_per_distance(2.0)], dm)
            .unwrap()
            .with_durations(tm)
            .unwrap()
    }

    #[test]
    fn test_arc_cost() {
        let inst = instance();
        assert_eq!(Objective::Distance.arc_cost(&inst, 0, 1), 5.0);
        assert_eq!(Objective::Duration.arc_cost(&inst, 0, 1), 1.0);
        let w = Objective::Weighted {
            distance: 1.0,
            duration: 10.0,
        };
        assert_eq!(w.arc_cost(&inst, 0, 1), 15.0);
    }

    #[test]
    fn test_route_cost() {
        let inst = instance();
        let v = &inst.vehicles()[0];
        let (route, _) = RouteEvaluator::new(&inst, v).build_route(&[1]);
        // distance 10 at 2 per unit; duration 1 + 2 + 1
        assert_eq!(Objective::Distance.route_cost(&route, v), 20.0);
        assert_eq!(Objective::Duration.route_cost(&route, v), 4.0);
    }

    #[test]
    fn test_deserialize() {
        let o: Objective = serde_json::from_str("\"duration\"").unwrap();
        assert_eq!(o, Objective::Duration);
        let o: Objective =
            serde_json::from_str(r#"{"weighted": {"distance": 1.0, "duration": 0.5}}"#).unwrap();
        assert_eq!(
            o,
            Objective::Weighted {
                distance: 1.0,
                duration: 0.5
            }
        );
    }
}
