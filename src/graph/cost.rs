//! Per-edge cost functions for distance, time, and fuel/CO2 criteria.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RoutingError;

use super::road_graph::Edge;

/// Optimization criterion for a search.
///
/// Parsing an unrecognized name fails with [`RoutingError::UnknownCriterion`];
/// there is no fallback criterion.
///
/// # Examples
///
/// ```
/// use eco_routing::graph::Criterion;
///
/// assert_eq!("Time".parse::<Criterion>().unwrap(), Criterion::Time);
/// assert!("Emissions".parse::<Criterion>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Criterion {
    /// Edge length in metres.
    Distance,
    /// Edge travel time in seconds.
    Time,
    /// Estimated CO2 in grams, see [`FuelModel`].
    Fuel,
}

impl Criterion {
    pub fn name(&self) -> &'static str {
        match self {
            Criterion::Distance => "distance",
            Criterion::Time => "time",
            Criterion::Fuel => "fuel",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Criterion {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distance" => Ok(Criterion::Distance),
            "time" => Ok(Criterion::Time),
            "fuel" => Ok(Criterion::Fuel),
            _ => Err(RoutingError::UnknownCriterion(s.to_string())),
        }
    }
}

impl TryFrom<String> for Criterion {
    type Error = RoutingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Criterion> for String {
    fn from(c: Criterion) -> Self {
        c.name().to_string()
    }
}

/// Emission-proxy curve used by [`Criterion::Fuel`].
///
/// Grams of CO2 for an edge are
/// `length_km * (base + speed_coeff * v^2 + grade_coeff * grade)` where `v`
/// is the effective speed in m/s (`speed_kph / 3.6 * speed_factor`) and
/// `grade` is the uphill grade in percent. All coefficients must be
/// nonnegative, which keeps the curve nonnegative and non-decreasing in both
/// grade and speed; [`FuelModel::validate`] checks it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelModel {
    /// g/km at standstill on flat ground.
    pub base: f64,
    /// g/km per (m/s)^2.
    pub speed_coeff: f64,
    /// g/km per percent of grade.
    pub grade_coeff: f64,
    /// Multiplier from free-flow to effective speed.
    pub speed_factor: f64,
}

impl Default for FuelModel {
    fn default() -> Self {
        Self {
            base: 140.0,
            speed_coeff: 0.08,
            grade_coeff: 14.0,
            speed_factor: 1.0,
        }
    }
}

impl FuelModel {
    /// Rejects negative or non-finite coefficients.
    ///
    /// # Examples
    ///
    /// ```
    /// use eco_routing::graph::FuelModel;
    ///
    /// assert!(FuelModel::default().validate().is_ok());
    /// let downhill_credit = FuelModel { grade_coeff: -5.0, ..FuelModel::default() };
    /// assert!(downhill_credit.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), RoutingError> {
        for (name, value) in [
            ("base", self.base),
            ("speed_coeff", self.speed_coeff),
            ("grade_coeff", self.grade_coeff),
            ("speed_factor", self.speed_factor),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(RoutingError::Config(format!(
                    "fuel model {name} must be finite and nonnegative, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Estimated grams of CO2 for traversing `length_m` metres.
    pub fn emission(&self, grade: f64, speed_kph: f64, length_m: f64) -> f64 {
        let v = (speed_kph / 3.6 * self.speed_factor).max(0.0);
        let rate = self.base + self.speed_coeff * v * v + self.grade_coeff * grade.max(0.0);
        (length_m / 1000.0 * rate).max(0.0)
    }
}

/// Maps edges to nonnegative costs under a [`Criterion`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CostModel {
    fuel: FuelModel,
}

impl CostModel {
    /// Fails if `fuel` does not pass [`FuelModel::validate`].
    pub fn new(fuel: FuelModel) -> Result<Self, RoutingError> {
        fuel.validate()?;
        Ok(Self { fuel })
    }

    pub fn fuel_model(&self) -> &FuelModel {
        &self.fuel
    }

    pub fn cost(&self, edge: &Edge, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::Distance => edge.length(),
            Criterion::Time => edge.travel_time(),
            Criterion::Fuel => self.fuel.emission(edge.grade(), edge.speed_kph(), edge.length()),
        }
    }
}

/// Cost of `edge` under `criterion` with the default [`FuelModel`].
pub fn cost(edge: &Edge, criterion: Criterion) -> f64 {
    CostModel::default().cost(edge, criterion)
}
