//! Route assignments, unserved customers, and constraint violations.

use std::fmt;

use super::Route;

/// A type of constraint violation found while evaluating a route.
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationType {
    /// Load exceeded capacity after visiting `customer_id`.
    CapacityExceeded {
        route_index: usize,
        customer_id: usize,
        load: i32,
        capacity: i32,
    },
    /// Arrival after the customer's time window closed.
    TimeWindowViolated {
        customer_id: usize,
        arrival: f64,
        due: f64,
    },
    MaxDistanceExceeded {
        route_index: usize,
        distance: f64,
        max_distance: f64,
    },
    MaxDurationExceeded {
        route_index: usize,
        duration: f64,
        max_duration: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub kind: ViolationType,
}

impl Violation {
    pub fn new(kind: ViolationType) -> Self {
        Self { kind }
    }
}

/// Why a customer could not be placed on any route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnservedReason {
    /// Demand is larger than the capacity of every vehicle.
    DemandExceedsCapacity,
    /// No vehicle had enough remaining capacity or range.
    NoVehicleAvailable,
}

impl fmt::Display for UnservedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnservedReason::DemandExceedsCapacity => f.write_str("demand exceeds capacity"),
            UnservedReason::NoVehicleAvailable => f.write_str("no vehicle available"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unserved {
    pub customer_id: usize,
    pub reason: UnservedReason,
}

/// How a solver run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolveStatus {
    /// The search converged (no improving move, or all generations ran).
    #[default]
    Completed,
    /// The iteration or time budget ran out first.
    BudgetExhausted,
    /// A cancellation was requested; routes are the best found so far.
    Interrupted,
}

/// Per-vehicle routes plus every customer that could not be served.
///
/// Each customer index appears either in exactly one route or in
/// [`unserved`](Self::unserved).
///
/// # Examples
///
/// ```
/// use eco_routing::models::{Route, RouteAssignment, UnservedReason};
///
/// let mut assignment = RouteAssignment::new();
/// assignment.add_route(Route::new(0));
/// assignment.add_unserved(4, UnservedReason::DemandExceedsCapacity);
/// assert_eq!(assignment.num_routes(), 1);
/// assert!(!assignment.is_complete());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteAssignment {
    routes: Vec<Route>,
    unserved: Vec<Unserved>,
    total_cost: f64,
    status: SolveStatus,
}

impl RouteAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    pub fn add_unserved(&mut self, customer_id: usize, reason: UnservedReason) {
        self.unserved.push(Unserved {
            customer_id,
            reason,
        });
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    pub fn unserved(&self) -> &[Unserved] {
        &self.unserved
    }

    pub fn num_unserved(&self) -> usize {
        self.unserved.len()
    }

    pub fn unserved_reason(&self, customer_id: usize) -> Option<UnservedReason> {
        self.unserved
            .iter()
            .find(|u| u.customer_id == customer_id)
            .map(|u| u.reason)
    }

    /// `true` when no customer is unserved.
    pub fn is_complete(&self) -> bool {
        self.unserved.is_empty()
    }

    /// Vehicle serving `customer_id`, if any.
    pub fn customer_vehicle(&self, customer_id: usize) -> Option<usize> {
        self.routes
            .iter()
            .find(|r| r.visits().iter().any(|v| v.customer_id == customer_id))
            .map(|r| r.vehicle_id())
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn set_total_cost(&mut self, cost: f64) {
        self.total_cost = cost;
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn set_status(&mut self, status: SolveStatus) {
        self.status = status;
    }

    pub fn total_distance(&self) -> f64 {
        self.routes.iter().map(|r| r.total_distance()).sum()
    }

    pub fn num_served(&self) -> usize {
        self.routes.iter().map(|r| r.len()).sum()
    }
}
