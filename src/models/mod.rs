//! Domain model types for vehicle routing problems.
//!
//! Customers with demands and time windows, vehicles with capacity and range
//! limits, routes as ordered visits, and the validated [`VrpInstance`] that
//! ties them to a distance matrix.

mod assignment;
mod customer;
mod problem;
mod route;
mod vehicle;

pub use assignment::{
    RouteAssignment, SolveStatus, Unserved, UnservedReason, Violation, ViolationType,
};
pub use customer::{Customer, Location, TimeWindow};
pub use problem::VrpInstance;
pub use route::{Route, Visit};
pub use vehicle::Vehicle;
