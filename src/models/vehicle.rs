//! Vehicle type with capacity, start/end locations, and range limits.

/// A vehicle of the fleet.
///
/// `start` and `end` are location indices into the instance's distance
/// matrix; both default to the depot (index 0).
///
/// # Examples
///
/// ```
/// use eco_routing::models::Vehicle;
///
/// let v = Vehicle::new(0, 100).with_end(3).with_max_distance(200_000.0);
/// assert_eq!(v.start(), 0);
/// assert_eq!(v.end(), 3);
/// assert_eq!(v.max_distance(), Some(200_000.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    id: usize,
    name: Option<String>,
    capacity: i32,
    start: usize,
    end: usize,
    cost_per_distance: f64,
    max_distance: Option<f64>,
    max_duration: Option<f64>,
}

impl Vehicle {
    /// A vehicle starting and ending at the depot, with no range limits.
    pub fn new(id: usize, capacity: i32) -> Self {
        Self {
            id,
            name: None,
            capacity,
            start: 0,
            end: 0,
            cost_per_distance: 1.0,
            max_distance: None,
            max_duration: None,
        }
    }

    /// External label, e.g. `"vehicle_1"` from a fleet file.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_start(mut self, location: usize) -> Self {
        self.start = location;
        self
    }

    pub fn with_end(mut self, location: usize) -> Self {
        self.end = location;
        self
    }

    pub fn with_cost_per_distance(mut self, cost: f64) -> Self {
        self.cost_per_distance = cost;
        self
    }

    pub fn with_max_distance(mut self, max: f64) -> Self {
        self.max_distance = Some(max);
        self
    }

    pub fn with_max_duration(mut self, max: f64) -> Self {
        self.max_duration = Some(max);
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    /// Location index where the route begins.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Location index where the route ends.
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn cost_per_distance(&self) -> f64 {
        self.cost_per_distance
    }

    pub fn max_distance(&self) -> Option<f64> {
        self.max_distance
    }

    pub fn max_duration(&self) -> Option<f64> {
        self.max_duration
    }
}
