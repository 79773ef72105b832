//! Problem input: JSON planning requests and Solomon benchmark text.

mod request;
mod solomon;

pub use request::{CustomerRecord, DepotRecord, LatLon, PlanningRequest, VehicleRecord};
pub use solomon::{parse_solomon, SolomonInstance};
