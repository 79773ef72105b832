//! JSON planning requests.

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::distance::{build_distance_matrix, DistanceMatrix};
use crate::error::{Result, RoutingError};
use crate::evaluation::Objective;
use crate::graph::{Criterion, NodeId, RoadGraph};
use crate::models::{Customer, Location, TimeWindow, Vehicle, VrpInstance};
use crate::solver::SolverConfig;

/// `(lat, lon)` in degrees.
pub type LatLon = (f64, f64);

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DepotRecord {
    pub location: LatLon,
    #[serde(default)]
    pub road_node: Option<NodeId>,
}

/// One vehicle of the fleet file.
///
/// A missing start or end location means the depot. Otherwise it must match
/// the depot or a customer location exactly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VehicleRecord {
    pub id: String,
    pub capacity: i32,
    #[serde(default)]
    pub start_location: Option<LatLon>,
    #[serde(default)]
    pub end_location: Option<LatLon>,
    #[serde(default)]
    pub max_distance_km: Option<f64>,
    #[serde(default)]
    pub max_duration: Option<f64>,
    #[serde(default = "default_cost_per_distance")]
    pub cost_per_distance: f64,
}

fn default_cost_per_distance() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomerRecord {
    pub location: LatLon,
    #[serde(default)]
    pub road_node: Option<NodeId>,
    pub demand: i32,
    /// `(ready, due)` in seconds from the start of the shift.
    #[serde(default)]
    pub time_window: Option<(f64, f64)>,
    #[serde(default)]
    pub service_duration: f64,
}

/// Everything one planning call needs, passed in whole and never mutated.
///
/// # Examples
///
/// ```
/// use eco_routing::io::PlanningRequest;
///
/// let request = PlanningRequest::from_json(r#"{
///     "depot": {"location": [52.52, 13.405]},
///     "vehicles": [{"id": "vehicle_1", "capacity": 100, "max_distance_km": 200}],
///     "customers": [
///         {"location": [52.53, 13.41], "demand": 10},
///         {"location": [52.51, 13.38], "demand": 20}
///     ],
///     "criterion": "distance"
/// }"#).unwrap();
///
/// let instance = request.into_instance(None).unwrap();
/// assert_eq!(instance.num_customers(), 2);
/// assert_eq!(instance.vehicles()[0].name(), Some("vehicle_1"));
/// assert_eq!(instance.vehicles()[0].max_distance(), Some(200_000.0));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlanningRequest {
    pub depot: DepotRecord,
    pub vehicles: Vec<VehicleRecord>,
    pub customers: Vec<CustomerRecord>,
    /// Edge cost used for road-graph matrices. Required: there is no
    /// fallback criterion.
    pub criterion: Criterion,
    #[serde(default)]
    pub objective: Objective,
    #[serde(default)]
    pub solver: SolverConfig,
}

impl PlanningRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the instance.
    ///
    /// With a road graph every stop needs a `road_node`; the matrix holds
    /// shortest-path costs under [`criterion`](Self::criterion), travel
    /// times come from the `time` criterion and `max_distance_km` limits are
    /// checked against shortest-path lengths in metres. Without a graph the
    /// matrix holds great-circle metres and travel time equals distance.
    #[instrument(skip_all, fields(
        customers = self.customers.len(),
        vehicles = self.vehicles.len(),
        road_graph = graph.is_some(),
    ))]
    pub fn into_instance(&self, graph: Option<&RoadGraph>) -> Result<VrpInstance> {
        let mut customers = Vec::with_capacity(self.customers.len() + 1);
        let mut depot = Customer::depot(to_location(self.depot.location));
        if let Some(node) = self.depot.road_node {
            depot = depot.with_road_node(node);
        }
        customers.push(depot);

        for (i, record) in self.customers.iter().enumerate() {
            let id = i + 1;
            let mut c = Customer::new(id, to_location(record.location), record.demand)
                .with_service_duration(record.service_duration);
            if let Some((ready, due)) = record.time_window {
                let tw = TimeWindow::new(ready, due).ok_or_else(|| {
                    RoutingError::InvalidInstance(format!(
                        "customer {id} has invalid time window ({ready}, {due})"
                    ))
                })?;
                c = c.with_time_window(tw);
            }
            if let Some(node) = record.road_node {
                c = c.with_road_node(node);
            }
            customers.push(c);
        }

        let vehicles = self
            .vehicles
            .iter()
            .enumerate()
            .map(|(i, record)| vehicle_from(i, record, &customers))
            .collect::<Result<Vec<_>>>()?;

        let instance = match graph {
            Some(graph) => {
                let nodes = road_nodes(&customers)?;
                let costs = build_distance_matrix(graph, &nodes, self.criterion)?;
                let times = if self.criterion == Criterion::Time {
                    costs.clone()
                } else {
                    build_distance_matrix(graph, &nodes, Criterion::Time)?
                };
                let instance = VrpInstance::new(customers, vehicles, costs)?.with_durations(times)?;
                if self.criterion == Criterion::Distance {
                    instance
                } else {
                    // range limits are in metres whatever the cost criterion
                    let lengths = build_distance_matrix(graph, &nodes, Criterion::Distance)?;
                    instance.with_lengths(lengths)?
                }
            }
            None => {
                let dm = DistanceMatrix::from_customers_haversine(&customers);
                VrpInstance::new(customers, vehicles, dm)?
            }
        };

        debug!(locations = instance.customers().len(), "planning request loaded");
        Ok(instance)
    }
}

fn to_location((lat, lon): LatLon) -> Location {
    Location::from_lat_lon(lat, lon)
}

fn vehicle_from(index: usize, record: &VehicleRecord, customers: &[Customer]) -> Result<Vehicle> {
    let locate = |at: Option<LatLon>, what: &str| -> Result<usize> {
        let Some(at) = at else {
            return Ok(0);
        };
        let at = to_location(at);
        customers
            .iter()
            .position(|c| c.location() == at)
            .ok_or_else(|| {
                RoutingError::InvalidInstance(format!(
                    "vehicle '{}' {what} location ({}, {}) is not a known stop",
                    record.id,
                    at.lat(),
                    at.lon()
                ))
            })
    };

    let mut v = Vehicle::new(index, record.capacity)
        .with_name(record.id.clone())
        .with_start(locate(record.start_location, "start")?)
        .with_end(locate(record.end_location, "end")?)
        .with_cost_per_distance(record.cost_per_distance);
    if let Some(km) = record.max_distance_km {
        v = v.with_max_distance(km * 1000.0);
    }
    if let Some(max) = record.max_duration {
        v = v.with_max_duration(max);
    }
    Ok(v)
}

fn road_nodes(customers: &[Customer]) -> Result<Vec<NodeId>> {
    customers
        .iter()
        .map(|c| {
            c.road_node().ok_or_else(|| {
                RoutingError::InvalidInstance(format!(
                    "location {} has no road node but a road graph was given",
                    c.id()
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeSpec, Node};
    use crate::solver::{solve_vrp, Strategy};

    const FLEET: &str = r#"{
        "depot": {"location": [52.52, 13.405], "road_node": 1},
        "vehicles": [
            {"id": "vehicle_1", "capacity": 100, "start_location": [52.52, 13.405],
             "end_location": [52.52, 13.405], "max_distance_km": 200},
            {"id": "vehicle_2", "capacity": 80, "max_distance_km": 150}
        ],
        "customers": [
            {"location": [52.53, 13.41], "road_node": 2, "demand": 30},
            {"location": [52.50, 13.39], "road_node": 3, "demand": 60,
             "time_window": [0, 3600], "service_duration": 300}
        ],
        "criterion": "time",
        "solver": {"strategy": "evolutionary", "seed": 3}
    }"#;

    fn graph() -> RoadGraph {
        let nodes = vec![
            Node::new(1, 52.52, 13.405),
            Node::new(2, 52.53, 13.41),
            Node::new(3, 52.50, 13.39),
        ];
        let mut edges = Vec::new();
        for (a, b, len) in [(1, 2, 1200.0), (2, 3, 3500.0), (1, 3, 2600.0)] {
            edges.push(EdgeSpec::new(a, b, len, 36.0));
            edges.push(EdgeSpec::new(b, a, len, 36.0));
        }
        RoadGraph::build(nodes, edges).unwrap()
    }

    #[test]
    fn test_parse_fleet_file() {
        let r = PlanningRequest::from_json(FLEET).unwrap();
        assert_eq!(r.vehicles.len(), 2);
        assert_eq!(r.vehicles[1].start_location, None);
        assert_eq!(r.vehicles[0].cost_per_distance, 1.0);
        assert_eq!(r.customers[1].time_window, Some((0.0, 3600.0)));
        assert_eq!(r.criterion, Criterion::Time);
        assert_eq!(r.objective, Objective::Distance);
        assert_eq!(r.solver.strategy, Strategy::Evolutionary);
        assert_eq!(r.solver.seed, 3);
    }

    #[test]
    fn test_unknown_criterion_rejected() {
        let json = FLEET.replace(r#""criterion": "time""#, r#""criterion": "scenic""#);
        assert!(matches!(
            PlanningRequest::from_json(&json),
            Err(RoutingError::Config(_))
        ));
    }

    #[test]
    fn test_haversine_instance() {
        let inst = PlanningRequest::from_json(FLEET).unwrap().into_instance(None).unwrap();
        assert_eq!(inst.customers().len(), 3);
        assert!(inst.durations().is_none());
        let d = inst.distance(0, 1);
        // about 1.2 km between the depot and the first stop
        assert!(d > 1_000.0 && d < 1_400.0, "{d}");
        assert_eq!(inst.customers()[2].service_duration(), 300.0);
    }

    #[test]
    fn test_road_graph_instance() {
        let r = PlanningRequest::from_json(FLEET).unwrap();
        let inst = r.into_instance(Some(&graph())).unwrap();
        // 36 km/h is 10 m/s
        assert!((inst.distance(0, 1) - 120.0).abs() < 1e-9);
        assert!((inst.distance(1, 2) - 350.0).abs() < 1e-9);
        assert!((inst.travel_time(0, 2) - 260.0).abs() < 1e-9);

        let a = solve_vrp(&inst, r.objective, &r.solver).unwrap();
        assert!(a.is_complete());
    }

    #[test]
    fn test_max_distance_binds_on_length_under_time_criterion() {
        // a 1 km limit: the 120 s leg to node 2 is 1.2 km of road each way
        let json = FLEET
            .replace(r#""max_distance_km": 200"#, r#""max_distance_km": 1"#)
            .replace(r#""max_distance_km": 150"#, r#""max_distance_km": 1"#);
        let r = PlanningRequest::from_json(&json).unwrap();
        let inst = r.into_instance(Some(&graph())).unwrap();
        assert!((inst.distance(0, 1) - 120.0).abs() < 1e-9);
        assert!((inst.length(0, 1) - 1_200.0).abs() < 1e-9);

        let a = solve_vrp(&inst, r.objective, &r.solver).unwrap();
        assert_eq!(a.num_served(), 0);
        assert_eq!(a.num_unserved(), 2);
        assert_eq!(a.num_routes(), 0);
    }

    #[test]
    fn test_distance_criterion_needs_no_length_matrix() {
        let json = FLEET.replace(r#""criterion": "time""#, r#""criterion": "distance""#);
        let inst = PlanningRequest::from_json(&json)
            .unwrap()
            .into_instance(Some(&graph()))
            .unwrap();
        assert!(inst.lengths().is_none());
        assert!((inst.length(1, 2) - 3_500.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_road_node() {
        let json = FLEET.replace(r#", "road_node": 3"#, "");
        let r = PlanningRequest::from_json(&json).unwrap();
        assert!(matches!(
            r.into_instance(Some(&graph())),
            Err(RoutingError::InvalidInstance(_))
        ));
    }

    #[test]
    fn test_vehicle_start_must_be_known_stop() {
        let json = FLEET.replace(
            r#""start_location": [52.52, 13.405]"#,
            r#""start_location": [48.85, 2.35]"#,
        );
        let r = PlanningRequest::from_json(&json).unwrap();
        assert!(matches!(r.into_instance(None), Err(RoutingError::InvalidInstance(_))));
    }

    #[test]
    fn test_vehicle_can_end_at_customer() {
        let json = FLEET.replace(
            r#""end_location": [52.52, 13.405]"#,
            r#""end_location": [52.50, 13.39]"#,
        );
        let inst = PlanningRequest::from_json(&json).unwrap().into_instance(None).unwrap();
        assert_eq!(inst.vehicles()[0].end(), 2);
    }
}
