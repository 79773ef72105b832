//! Single-vehicle deadheading minimization as a GA problem.
//!
//! # Operators
//!
//! - **Crossover**: Order crossover (OX), preserving relative customer order,
//!   over each customer's slot in the vehicle's customer list
//! - **Mutation**: Shuffle indexes with a per-gene probability
//! - **Evaluation**: Route cost from the vehicle's start through the tour to
//!   its end location, so the empty return leg is always paid for, plus a
//!   penalty per violated constraint

use fxhash::FxHashMap;
use rand::seq::SliceRandom;
use rand::Rng;
use u_metaheur::ga::operators::order_crossover;
use u_metaheur::ga::GaProblem;

use crate::evaluation::{Objective, RouteEvaluator};
use crate::models::{Vehicle, VrpInstance};

use super::operators::shuffle_indexes;
use super::Tour;

/// Orders a fixed set of customers for one vehicle.
///
/// # Examples
///
/// ```
/// use eco_routing::distance::DistanceMatrix;
/// use eco_routing::evaluation::Objective;
/// use eco_routing::ga::{DeadheadingProblem, GaSettings};
/// use eco_routing::models::{Customer, Location, Vehicle, VrpInstance};
/// use u_metaheur::ga::GaRunner;
///
/// let dm = DistanceMatrix::from_rows(vec![
///     vec![0.0, 2.0, 9.0, 10.0],
///     vec![1.0, 0.0, 6.0, 4.0],
///     vec![15.0, 7.0, 0.0, 8.0],
///     vec![6.0, 3.0, 12.0, 0.0],
/// ])
/// .unwrap();
/// let customers = (0..4)
///     .map(|i| Customer::new(i, Location::default(), 0))
///     .collect();
/// let instance = VrpInstance::new(customers, vec![Vehicle::new(0, 10)], dm).unwrap();
///
/// let problem = DeadheadingProblem::new(
///     &instance,
///     &instance.vehicles()[0],
///     Objective::Distance,
///     vec![1, 2, 3],
/// );
/// let config = GaSettings::default().runner_config(42);
/// let result = GaRunner::run(&problem, &config).unwrap();
/// // 0 -> 2 -> 3 -> 1 -> 0
/// assert_eq!(result.best_fitness, 21.0);
/// assert_eq!(result.best.customers(), &[2, 3, 1]);
/// ```
pub struct DeadheadingProblem<'a> {
    instance: &'a VrpInstance,
    vehicle: &'a Vehicle,
    objective: Objective,
    customers: Vec<usize>,
    /// Position of each customer in `customers`.
    slots: FxHashMap<usize, usize>,
    gene_mutation_rate: f64,
    penalty: f64,
}

impl<'a> DeadheadingProblem<'a> {
    /// `customers` are the location indices the vehicle must visit.
    ///
    /// The default violation penalty exceeds the cost of any tour over these
    /// customers, so every feasible tour beats every infeasible one.
    pub fn new(
        instance: &'a VrpInstance,
        vehicle: &'a Vehicle,
        objective: Objective,
        customers: Vec<usize>,
    ) -> Self {
        let penalty = penalty_bound(instance, vehicle, objective, &customers);
        let slots = customers.iter().enumerate().map(|(slot, &c)| (c, slot)).collect();
        Self {
            instance,
            vehicle,
            objective,
            customers,
            slots,
            gene_mutation_rate: 0.05,
            penalty,
        }
    }

    pub fn with_gene_mutation_rate(mut self, rate: f64) -> Self {
        self.gene_mutation_rate = rate;
        self
    }

    pub fn with_penalty(mut self, penalty: f64) -> Self {
        self.penalty = penalty;
        self
    }

    pub fn customers(&self) -> &[usize] {
        &self.customers
    }

    /// Slots of the tour's customers, or `None` if it holds a stranger.
    fn slots_of(&self, tour: &Tour) -> Option<Vec<usize>> {
        tour.customers()
            .iter()
            .map(|c| self.slots.get(c).copied())
            .collect()
    }

    fn tour_from_slots(&self, slots: &[usize]) -> Tour {
        Tour::new(slots.iter().map(|&s| self.customers[s]).collect())
    }
}

impl GaProblem for DeadheadingProblem<'_> {
    type Individual = Tour;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> Tour {
        let mut perm = self.customers.clone();
        perm.shuffle(rng);
        Tour::new(perm)
    }

    fn evaluate(&self, individual: &Tour) -> f64 {
        let evaluator = RouteEvaluator::new(self.instance, self.vehicle);
        let (route, violations) = evaluator.build_route(individual.customers());
        self.objective.route_cost(&route, self.vehicle) + self.penalty * violations.len() as f64
    }

    fn crossover<R: Rng>(&self, parent1: &Tour, parent2: &Tour, rng: &mut R) -> Vec<Tour> {
        let parents = (self.slots_of(parent1), self.slots_of(parent2));
        let (Some(p1), Some(p2)) = parents else {
            return vec![parent1.clone(), parent2.clone()];
        };
        if p1.len() < 2 || p1.len() != p2.len() {
            return vec![parent1.clone(), parent2.clone()];
        }
        let (c1, c2) = order_crossover(&p1, &p2, rng);
        vec![self.tour_from_slots(&c1), self.tour_from_slots(&c2)]
    }

    fn mutate<R: Rng>(&self, individual: &mut Tour, rng: &mut R) {
        shuffle_indexes(individual.customers_mut(), self.gene_mutation_rate, rng);
    }
}

/// Upper bound on the cost of any route over `customers`: every arc at the
/// priciest rate plus all service and the latest ready time as waiting.
fn penalty_bound(
    instance: &VrpInstance,
    vehicle: &Vehicle,
    objective: Objective,
    customers: &[usize],
) -> f64 {
    let stops: Vec<usize> = std::iter::once(vehicle.start())
        .chain(customers.iter().copied())
        .chain(std::iter::once(vehicle.end()))
        .collect();
    let arcs = customers.len() + 1;

    let mut max_distance: f64 = 0.0;
    let mut max_time: f64 = 0.0;
    for &a in &stops {
        for &b in &stops {
            max_distance = max_distance.max(instance.distance(a, b));
            max_time = max_time.max(instance.travel_time(a, b));
        }
    }

    let service: f64 = customers
        .iter()
        .map(|&c| instance.customers()[c].service_duration())
        .sum();
    let waiting = customers
        .iter()
        .filter_map(|&c| instance.customers()[c].time_window().map(|tw| tw.ready()))
        .fold(0.0, f64::max);
    let duration = arcs as f64 * max_time + service + waiting;
    let distance = arcs as f64 * max_distance * vehicle.cost_per_distance();

    let bound = match objective {
        Objective::Distance => distance,
        Objective::Duration => duration,
        Objective::Weighted {
            distance: wd,
            duration: wt,
        } => wd.abs() * distance + wt.abs() * duration,
    };
    1.0 + bound
}
