//! Dense distance matrix.

use crate::error::{Result, RoutingError};
use crate::models::Customer;

/// A dense n×n cost matrix stored in row-major order.
///
/// Entries may be asymmetric. A valid matrix (see [`validate`](Self::validate))
/// has a zero diagonal and finite, nonnegative entries.
///
/// # Examples
///
/// ```
/// use eco_routing::distance::DistanceMatrix;
///
/// let dm = DistanceMatrix::from_rows(vec![
///     vec![0.0, 9.0, 8.0],
///     vec![9.0, 0.0, 10.0],
///     vec![8.0, 10.0, 0.0],
/// ])
/// .unwrap();
/// assert_eq!(dm.get(1, 2), 10.0);
/// assert!(dm.is_symmetric(1e-10));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// A matrix of the given size filled with zeros.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Euclidean distances between customer coordinates.
    pub fn from_customers(customers: &[Customer]) -> Self {
        Self::from_fn(customers.len(), |i, j| customers[i].distance_to(&customers[j]))
    }

    /// Great-circle distances in metres, reading locations as lon/lat.
    pub fn from_customers_haversine(customers: &[Customer]) -> Self {
        Self::from_fn(customers.len(), |i, j| {
            customers[i].location().haversine_to(&customers[j].location())
        })
    }

    fn from_fn(n: usize, f: impl Fn(usize, usize) -> f64) -> Self {
        let mut dm = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = f(i, j);
                dm.set(i, j, d);
                dm.set(j, i, d);
            }
        }
        dm
    }

    /// Wraps a row-major `size * size` buffer and validates it.
    pub fn from_data(size: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != size * size {
            return Err(RoutingError::InvalidInstance(format!(
                "matrix data has {} entries, expected {}",
                data.len(),
                size * size
            )));
        }
        let dm = Self { data, size };
        dm.validate()?;
        Ok(dm)
    }

    /// Builds a matrix from nested rows, which must form a square.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let size = rows.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(RoutingError::InvalidInstance(format!(
                "matrix row {i} has {} entries, expected {size}",
                row.len()
            )));
        }
        Self::from_data(size, rows.into_iter().flatten().collect())
    }

    /// Checks for a zero diagonal and finite, nonnegative entries.
    pub fn validate(&self) -> Result<()> {
        for i in 0..self.size {
            for j in 0..self.size {
                let d = self.get(i, j);
                if !d.is_finite() || d < 0.0 {
                    return Err(RoutingError::InvalidInstance(format!(
                        "matrix entry ({i}, {j}) = {d} is not a finite nonnegative cost"
                    )));
                }
                if i == j && d != 0.0 {
                    return Err(RoutingError::InvalidInstance(format!(
                        "matrix diagonal ({i}, {i}) = {d}, expected 0"
                    )));
                }
            }
        }
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    pub fn set(&mut self, from: usize, to: usize, distance: f64) {
        self.data[from * self.size + to] = distance;
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Closest candidate to `from`; ties go to the earlier candidate.
    pub fn nearest_neighbor(&self, from: usize, candidates: &[usize]) -> Option<usize> {
        candidates
            .iter()
            .copied()
            .min_by(|&a, &b| self.get(from, a).total_cmp(&self.get(from, b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;

    fn sample_customers() -> Vec<Customer> {
        vec![
            Customer::depot(Location::new(0.0, 0.0)),
            Customer::new(1, Location::new(3.0, 4.0), 10),
            Customer::new(2, Location::new(0.0, 8.0), 20),
        ]
    }

    #[test]
    fn test_from_customers() {
        let dm = DistanceMatrix::from_customers(&sample_customers());
        assert_eq!(dm.size(), 3);
        assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
        assert!((dm.get(0, 2) - 8.0).abs() < 1e-10);
        assert_eq!(dm.get(0, 0), 0.0);
        assert!(dm.is_symmetric(1e-10));
        assert!(dm.validate().is_ok());
    }

    #[test]
    fn test_from_customers_haversine() {
        let cs = vec![
            Customer::depot(Location::from_lat_lon(52.52, 13.405)),
            Customer::new(1, Location::from_lat_lon(52.53, 13.405), 1),
        ];
        let dm = DistanceMatrix::from_customers_haversine(&cs);
        // 0.01 degrees of latitude is about 1.11 km
        assert!((dm.get(0, 1) - 1112.0).abs() < 5.0);
    }

    #[test]
    fn test_from_rows() {
        let dm = DistanceMatrix::from_rows(vec![vec![0.0, 2.0], vec![1.0, 0.0]]).unwrap();
        assert_eq!(dm.get(0, 1), 2.0);
        assert_eq!(dm.get(1, 0), 1.0);
        assert!(!dm.is_symmetric(1e-10));
    }

    #[test]
    fn test_from_rows_not_square() {
        assert!(DistanceMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0]]).is_err());
    }

    #[test]
    fn test_from_data_invalid_size() {
        assert!(DistanceMatrix::from_data(2, vec![0.0, 1.0, 2.0]).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_entries() {
        assert!(DistanceMatrix::from_data(2, vec![0.0, -1.0, 1.0, 0.0]).is_err());
        assert!(DistanceMatrix::from_data(2, vec![0.0, f64::INFINITY, 1.0, 0.0]).is_err());
        assert!(DistanceMatrix::from_data(2, vec![3.0, 1.0, 1.0, 0.0]).is_err());
    }

    #[test]
    fn test_nearest_neighbor() {
        let dm = DistanceMatrix::from_customers(&sample_customers());
        assert_eq!(dm.nearest_neighbor(0, &[1, 2]), Some(1));
        assert_eq!(dm.nearest_neighbor(0, &[2]), Some(2));
        assert_eq!(dm.nearest_neighbor(0, &[]), None);
    }
}
