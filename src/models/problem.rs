//! Validated VRP instance.

use fxhash::FxHashSet;

use crate::distance::DistanceMatrix;
use crate::error::{Result, RoutingError};

use super::{Customer, Vehicle};

/// Depot, fleet, customers, and the cost matrix over `{depot} ∪ customers`.
///
/// Location index 0 is the depot; customer `i` sits at index `i`. Vehicle ids
/// are unique, since routes name their vehicle by id. Whether the fleet can
/// carry the total demand is not checked here: an infeasible instance is
/// reported by the solver, not rejected.
///
/// # Examples
///
/// ```
/// use eco_routing::distance::DistanceMatrix;
/// use eco_routing::models::{Customer, Location, Vehicle, VrpInstance};
///
/// let customers = vec![
///     Customer::depot(Location::new(0.0, 0.0)),
///     Customer::new(1, Location::new(3.0, 4.0), 10),
/// ];
/// let dm = DistanceMatrix::from_customers(&customers);
/// let instance = VrpInstance::new(customers, vec![Vehicle::new(0, 20)], dm).unwrap();
/// assert_eq!(instance.num_customers(), 1);
/// assert_eq!(instance.distance(0, 1), 5.0);
/// ```
#[derive(Debug, Clone)]
pub struct VrpInstance {
    customers: Vec<Customer>,
    vehicles: Vec<Vehicle>,
    distances: DistanceMatrix,
    durations: Option<DistanceMatrix>,
    lengths: Option<DistanceMatrix>,
}

impl VrpInstance {
    pub fn new(
        customers: Vec<Customer>,
        vehicles: Vec<Vehicle>,
        distances: DistanceMatrix,
    ) -> Result<Self> {
        let Some(depot) = customers.first() else {
            return Err(RoutingError::InvalidInstance(
                "instance needs a depot at index 0".into(),
            ));
        };
        if depot.demand() != 0 {
            return Err(RoutingError::InvalidInstance(format!(
                "depot demand must be 0, got {}",
                depot.demand()
            )));
        }

        for (i, c) in customers.iter().enumerate() {
            if c.id() != i {
                return Err(RoutingError::InvalidInstance(format!(
                    "customer at index {i} has id {}",
                    c.id()
                )));
            }
            if c.demand() < 0 {
                return Err(RoutingError::InvalidInstance(format!(
                    "customer {i} has negative demand {}",
                    c.demand()
                )));
            }
        }

        check_matrix(&distances, customers.len(), "distance")?;

        let mut ids = FxHashSet::default();
        for v in &vehicles {
            if !ids.insert(v.id()) {
                return Err(RoutingError::InvalidInstance(format!(
                    "vehicle id {} is used more than once",
                    v.id()
                )));
            }
            if v.capacity() < 0 {
                return Err(RoutingError::InvalidInstance(format!(
                    "vehicle {} has negative capacity {}",
                    v.id(),
                    v.capacity()
                )));
            }
            if v.start() >= customers.len() || v.end() >= customers.len() {
                return Err(RoutingError::InvalidInstance(format!(
                    "vehicle {} start/end ({}, {}) outside the {} locations",
                    v.id(),
                    v.start(),
                    v.end(),
                    customers.len()
                )));
            }
        }

        Ok(Self {
            customers,
            vehicles,
            distances,
            durations: None,
            lengths: None,
        })
    }

    /// Adds a travel-time matrix. Without one, travel time equals distance.
    pub fn with_durations(mut self, durations: DistanceMatrix) -> Result<Self> {
        check_matrix(&durations, self.customers.len(), "duration")?;
        self.durations = Some(durations);
        Ok(self)
    }

    /// Adds a road-length matrix in metres for vehicle range limits, for when
    /// the cost matrix holds another quantity (seconds, grams of CO2).
    /// Without one, length equals distance.
    pub fn with_lengths(mut self, lengths: DistanceMatrix) -> Result<Self> {
        check_matrix(&lengths, self.customers.len(), "length")?;
        self.lengths = Some(lengths);
        Ok(self)
    }

    pub fn depot(&self) -> &Customer {
        &self.customers[0]
    }

    /// All locations, depot first.
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Number of customers, excluding the depot.
    pub fn num_customers(&self) -> usize {
        self.customers.len() - 1
    }

    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    pub fn durations(&self) -> Option<&DistanceMatrix> {
        self.durations.as_ref()
    }

    pub fn lengths(&self) -> Option<&DistanceMatrix> {
        self.lengths.as_ref()
    }

    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances.get(from, to)
    }

    pub fn travel_time(&self, from: usize, to: usize) -> f64 {
        match &self.durations {
            Some(d) => d.get(from, to),
            None => self.distances.get(from, to),
        }
    }

    /// Road length of the arc, checked against vehicle max-distance limits.
    pub fn length(&self, from: usize, to: usize) -> f64 {
        match &self.lengths {
            Some(l) => l.get(from, to),
            None => self.distances.get(from, to),
        }
    }

    /// Largest vehicle capacity, or `None` for an empty fleet.
    pub fn max_capacity(&self) -> Option<i32> {
        self.vehicles.iter().map(|v| v.capacity()).max()
    }
}

fn check_matrix(matrix: &DistanceMatrix, locations: usize, what: &str) -> Result<()> {
    if matrix.size() != locations {
        return Err(RoutingError::InvalidInstance(format!(
            "{what} matrix covers {} locations, expected {locations}",
            matrix.size()
        )));
    }
    matrix.validate()
}
