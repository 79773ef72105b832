//! Solomon VRPTW benchmark files.
//!
//! ```text
//! C101
//!
//! VEHICLE
//! NUMBER     CAPACITY
//!   25         200
//!
//! CUSTOMER
//! CUST NO.  XCOORD.   YCOORD.    DEMAND   READY TIME  DUE DATE   SERVICE   TIME
//!
//!     0      40         50          0          0       1236          0
//!     1      45         68         10        912        967         90
//! ```
//!
//! The fifth line holds the fleet; customer rows start on the tenth line,
//! the first row being the depot. A vehicle without customers is never used,
//! so the fleet is capped at the number of customers.

use tracing::debug;

use crate::distance::DistanceMatrix;
use crate::error::{Result, RoutingError};
use crate::models::{Customer, Location, TimeWindow, Vehicle, VrpInstance};

const FLEET_LINE: usize = 4;
const FIRST_CUSTOMER_LINE: usize = 9;

/// A parsed benchmark: depot-first customers and a homogeneous fleet.
#[derive(Debug, Clone, PartialEq)]
pub struct SolomonInstance {
    pub name: String,
    pub customers: Vec<Customer>,
    pub vehicles: Vec<Vehicle>,
}

impl SolomonInstance {
    /// Validates the instance with Euclidean distances between coordinates.
    pub fn into_instance(self) -> Result<VrpInstance> {
        let dm = DistanceMatrix::from_customers(&self.customers);
        VrpInstance::new(self.customers, self.vehicles, dm)
    }
}

/// Parses Solomon benchmark text.
///
/// # Examples
///
/// ```
/// use eco_routing::io::parse_solomon;
///
/// let text = "R101\n\nVEHICLE\nNUMBER     CAPACITY\n  25         200\n\n\
///             CUSTOMER\nCUST NO. XCOORD. YCOORD. DEMAND READY DUE SERVICE\n\n\
///             0 35 35 0 0 230 0\n\
///             1 41 49 10 161 171 10\n";
/// let parsed = parse_solomon(text).unwrap();
/// assert_eq!(parsed.name, "R101");
/// // 25 declared, one customer to serve
/// assert_eq!(parsed.vehicles.len(), 1);
/// assert_eq!(parsed.customers[1].demand(), 10);
/// ```
pub fn parse_solomon(text: &str) -> Result<SolomonInstance> {
    let lines: Vec<&str> = text.lines().collect();
    let name = lines.first().map(|l| l.trim().to_string()).unwrap_or_default();

    let fleet = lines
        .get(FLEET_LINE)
        .ok_or_else(|| malformed(FLEET_LINE, "missing vehicle line"))?;
    let fields: Vec<&str> = fleet.split_whitespace().collect();
    let [count, capacity] = fields.as_slice() else {
        return Err(malformed(FLEET_LINE, "expected vehicle count and capacity"));
    };
    let count: usize = parse_field(count, FLEET_LINE)?;
    let capacity: i32 = parse_field(capacity, FLEET_LINE)?;

    let mut customers = Vec::new();
    for (n, line) in lines.iter().enumerate().skip(FIRST_CUSTOMER_LINE) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let [id, x, y, demand, ready, due, service] = fields.as_slice() else {
            return Err(malformed(n, "expected 7 columns"));
        };

        let id: usize = parse_field(id, n)?;
        if id != customers.len() {
            return Err(malformed(n, "customer numbers must run 0, 1, 2, ..."));
        }
        let location = Location::new(parse_field(x, n)?, parse_field(y, n)?);
        let (ready, due): (f64, f64) = (parse_field(ready, n)?, parse_field(due, n)?);
        let tw = TimeWindow::new(ready, due).ok_or_else(|| malformed(n, "ready after due"))?;

        let customer = if id == 0 {
            Customer::depot(location)
        } else {
            Customer::new(id, location, parse_field(demand, n)?)
                .with_service_duration(parse_field(service, n)?)
                .with_time_window(tw)
        };
        customers.push(customer);
    }

    if customers.is_empty() {
        return Err(malformed(FIRST_CUSTOMER_LINE, "no depot row"));
    }

    let fleet_size = count.min(customers.len() - 1);
    let vehicles = (0..fleet_size).map(|k| Vehicle::new(k, capacity)).collect();

    debug!(
        %name,
        customers = customers.len() - 1,
        declared = count,
        vehicles = fleet_size,
        "solomon instance parsed"
    );
    Ok(SolomonInstance {
        name,
        customers,
        vehicles,
    })
}

fn parse_field<T: std::str::FromStr>(field: &str, line: usize) -> Result<T> {
    field
        .parse()
        .map_err(|_| malformed(line, &format!("cannot parse '{field}'")))
}

fn malformed(line: usize, msg: &str) -> RoutingError {
    RoutingError::InvalidInstance(format!("solomon line {}: {msg}", line + 1))
}
