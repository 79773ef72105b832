//! Permutation chromosome for single-vehicle tours.
//!
//! A tour encodes one vehicle's route as a permutation of the customer
//! indices assigned to it. The vehicle's start and end locations are implied,
//! so the fitness includes the deadheading leg back to the end location.

use u_metaheur::ga::Individual;

/// A permutation of customer indices served by one vehicle.
///
/// Fitness starts at `f64::INFINITY` until the individual is evaluated.
///
/// # Examples
///
/// ```
/// use eco_routing::ga::Tour;
/// use u_metaheur::ga::Individual;
///
/// let tour = Tour::new(vec![3, 1, 2]);
/// assert_eq!(tour.customers(), &[3, 1, 2]);
/// assert_eq!(tour.fitness(), f64::INFINITY);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    customers: Vec<usize>,
    fitness: f64,
}

impl Tour {
    pub fn new(customers: Vec<usize>) -> Self {
        Self {
            customers,
            fitness: f64::INFINITY,
        }
    }

    pub fn customers(&self) -> &[usize] {
        &self.customers
    }

    pub fn customers_mut(&mut self) -> &mut Vec<usize> {
        &mut self.customers
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    pub fn into_customers(self) -> Vec<usize> {
        self.customers
    }
}

impl Individual for Tour {
    type Fitness = f64;

    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}
