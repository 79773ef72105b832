//! Locations, service time windows, and customers.

use serde::Deserialize;

use crate::graph::NodeId;

/// A point on the plane, or `(lon, lat)` in degrees for geographic data.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Builds a geographic location; stored as `x = lon`, `y = lat`.
    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self { x: lon, y: lat }
    }

    pub fn lat(&self) -> f64 {
        self.y
    }

    pub fn lon(&self) -> f64 {
        self.x
    }

    /// Straight-line distance in coordinate units.
    pub fn euclidean_to(&self, other: &Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Great-circle distance in metres, treating coordinates as lon/lat.
    pub fn haversine_to(&self, other: &Location) -> f64 {
        const EARTH_RADIUS_M: f64 = 6_371_008.8;
        let (lat1, lat2) = (self.lat().to_radians(), other.lat().to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.lon() - self.lon()).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
    }
}

/// Service window at a customer.
///
/// Arriving before `ready` means waiting; arriving after `due` is a violation.
///
/// # Examples
///
/// ```
/// use eco_routing::models::TimeWindow;
///
/// let tw = TimeWindow::new(100.0, 200.0).unwrap();
/// assert!(tw.contains(150.0));
/// assert_eq!(tw.waiting_time(40.0), 60.0);
/// assert!(tw.is_violated(250.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    ready: f64,
    due: f64,
}

impl TimeWindow {
    /// Returns `None` if `ready > due` or either bound is not finite.
    pub fn new(ready: f64, due: f64) -> Option<Self> {
        if !ready.is_finite() || !due.is_finite() || ready > due {
            return None;
        }
        Some(Self { ready, due })
    }

    pub fn ready(&self) -> f64 {
        self.ready
    }

    pub fn due(&self) -> f64 {
        self.due
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.ready && time <= self.due
    }

    pub fn waiting_time(&self, arrival: f64) -> f64 {
        (self.ready - arrival).max(0.0)
    }

    pub fn is_violated(&self, arrival: f64) -> bool {
        arrival > self.due
    }
}

/// A delivery stop, or the depot at index 0.
///
/// # Examples
///
/// ```
/// use eco_routing::models::{Customer, Location};
///
/// let depot = Customer::depot(Location::new(35.0, 35.0));
/// assert_eq!(depot.id(), 0);
/// assert_eq!(depot.demand(), 0);
///
/// let c = Customer::new(1, Location::new(41.0, 49.0), 10).with_road_node(7731);
/// assert_eq!(c.road_node(), Some(7731));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    id: usize,
    location: Location,
    road_node: Option<NodeId>,
    demand: i32,
    service_duration: f64,
    time_window: Option<TimeWindow>,
}

impl Customer {
    pub fn new(id: usize, location: Location, demand: i32) -> Self {
        Self {
            id,
            location,
            road_node: None,
            demand,
            service_duration: 0.0,
            time_window: None,
        }
    }

    /// The depot: id 0 and zero demand.
    pub fn depot(location: Location) -> Self {
        Self::new(0, location, 0)
    }

    pub fn with_service_duration(mut self, duration: f64) -> Self {
        self.service_duration = duration;
        self
    }

    pub fn with_time_window(mut self, tw: TimeWindow) -> Self {
        self.time_window = Some(tw);
        self
    }

    /// Road-graph node nearest to this stop, used when building the matrix
    /// from shortest paths.
    pub fn with_road_node(mut self, node: NodeId) -> Self {
        self.road_node = Some(node);
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn road_node(&self) -> Option<NodeId> {
        self.road_node
    }

    pub fn demand(&self) -> i32 {
        self.demand
    }

    pub fn service_duration(&self) -> f64 {
        self.service_duration
    }

    pub fn time_window(&self) -> Option<&TimeWindow> {
        self.time_window.as_ref()
    }

    pub fn distance_to(&self, other: &Customer) -> f64 {
        self.location.euclidean_to(&other.location)
    }
}
