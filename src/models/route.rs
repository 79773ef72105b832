//! Route and visit types.

/// One stop on a route.
#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    /// Customer index being visited.
    pub customer_id: usize,
    pub arrival_time: f64,
    /// Arrival + waiting + service duration.
    pub departure_time: f64,
    /// Cumulative load after this visit.
    pub load_after: i32,
}

/// The ordered stops of one vehicle, between its start and end locations
/// (which are not stored in `visits`).
///
/// # Examples
///
/// ```
/// use eco_routing::models::{Route, Visit};
///
/// let mut route = Route::new(0);
/// route.push_visit(Visit {
///     customer_id: 1,
///     arrival_time: 10.0,
///     departure_time: 20.0,
///     load_after: 10,
/// });
/// assert_eq!(route.load_profile(), vec![10]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    vehicle_id: usize,
    visits: Vec<Visit>,
    total_distance: f64,
    total_duration: f64,
    total_load: i32,
    cost: f64,
}

impl Route {
    pub fn new(vehicle_id: usize) -> Self {
        Self {
            vehicle_id,
            visits: Vec::new(),
            total_distance: 0.0,
            total_duration: 0.0,
            total_load: 0,
            cost: 0.0,
        }
    }

    pub fn push_visit(&mut self, visit: Visit) {
        self.total_load = visit.load_after;
        self.visits.push(visit);
    }

    pub fn vehicle_id(&self) -> usize {
        self.vehicle_id
    }

    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    pub fn customer_ids(&self) -> Vec<usize> {
        self.visits.iter().map(|v| v.customer_id).collect()
    }

    /// Cumulative load after each stop.
    pub fn load_profile(&self) -> Vec<i32> {
        self.visits.iter().map(|v| v.load_after).collect()
    }

    /// Largest load carried at any point of the route.
    pub fn peak_load(&self) -> i32 {
        self.visits.iter().map(|v| v.load_after).max().unwrap_or(0)
    }

    /// Distance including the leg back to the end location.
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn total_load(&self) -> i32 {
        self.total_load
    }

    /// Objective value of this route (set by the solver).
    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn set_total_distance(&mut self, d: f64) {
        self.total_distance = d;
    }

    pub fn set_total_duration(&mut self, d: f64) {
        self.total_duration = d;
    }

    pub fn set_cost(&mut self, cost: f64) {
        self.cost = cost;
    }
}
