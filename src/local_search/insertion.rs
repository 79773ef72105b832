//! Insertion repair for customers the construction left unrouted.
//!
//! # Operators
//!
//! - [`insert_unserved`] — Cheapest feasible insertion; when nothing fits,
//!   one routed customer is ejected to another tour to make room
//! - [`backtrack_insertion`] — Exhaustive insertion search under a node limit
//! - [`route_pending`] — Both of the above, in that order
//!
//! # Reference
//!
//! Ropke, S. & Pisinger, D. (2006). "An Adaptive Large Neighborhood Search
//! Heuristic for the Pickup and Delivery Problem with Time Windows",
//! *Transportation Science* 40(4), 455-472.

use std::cmp::Reverse;

use tracing::debug;

use crate::evaluation::{Objective, RouteEvaluator};
use crate::models::{RouteAssignment, UnservedReason, Vehicle, VrpInstance};

use super::{sequence_cost, tour_costs};

/// Partial solutions [`route_pending`] explores before giving up.
pub const BACKTRACK_NODE_LIMIT: usize = 200_000;

/// Customer moved out of the receiving tour to make room.
#[derive(Debug, Clone)]
struct Ejection {
    from_pos: usize,
    to_route: usize,
    to_pos: usize,
}

#[derive(Debug, Clone)]
struct InsertMove {
    pending_idx: usize,
    route: usize,
    /// Position in the receiving tour after any ejection.
    pos: usize,
    ejection: Option<Ejection>,
    delta: f64,
}

/// Moves `pending` customers into `tours`, one move at a time.
///
/// Each move is the cheapest feasible insertion of any pending customer. If
/// none fits anywhere, the cheapest ejection is tried instead: a routed
/// customer leaves its tour for another one and the pending customer takes
/// the freed capacity. Customers left in `pending` fit under neither move.
///
/// Returns how many customers were inserted.
///
/// # Examples
///
/// ```
/// use eco_routing::distance::DistanceMatrix;
/// use eco_routing::evaluation::Objective;
/// use eco_routing::local_search::insert_unserved;
/// use eco_routing::models::{Customer, Location, Vehicle, VrpInstance};
///
/// let customers = vec![
///     Customer::depot(Location::new(0.0, 0.0)),
///     Customer::new(1, Location::new(1.0, 0.0), 10),
///     Customer::new(2, Location::new(2.0, 0.0), 10),
/// ];
/// let dm = DistanceMatrix::from_customers(&customers);
/// let instance = VrpInstance::new(customers, vec![Vehicle::new(0, 20)], dm).unwrap();
///
/// let mut tours = vec![vec![2]];
/// let mut pending = vec![1];
/// assert_eq!(insert_unserved(&instance, Objective::Distance, &mut tours, &mut pending), 1);
/// assert_eq!(tours, vec![vec![1, 2]]);
/// assert!(pending.is_empty());
/// ```
pub fn insert_unserved(
    instance: &VrpInstance,
    objective: Objective,
    tours: &mut [Vec<usize>],
    pending: &mut Vec<usize>,
) -> usize {
    let mut inserted = 0;
    while !pending.is_empty() {
        let costs = tour_costs(instance, objective, tours);
        let Some(mv) = best_direct(instance, objective, tours, &costs, pending)
            .or_else(|| best_ejection(instance, objective, tours, &costs, pending))
        else {
            break;
        };

        let cid = pending.remove(mv.pending_idx);
        if let Some(ej) = &mv.ejection {
            let ejected = tours[mv.route].remove(ej.from_pos);
            tours[ej.to_route].insert(ej.to_pos, ejected);
        }
        tours[mv.route].insert(mv.pos, cid);
        inserted += 1;
    }
    inserted
}

/// Searches for tours that serve every one of `customers`.
///
/// Customers are inserted one at a time, largest demand first, at every
/// feasible position of every tour, backtracking on dead ends. Returns `None`
/// once `node_limit` partial solutions have been tried without success.
///
/// When travel costs obey the triangle inequality, dropping a customer from a
/// feasible tour leaves it feasible, so a search that finishes within the
/// limit finds a complete assignment whenever one exists.
pub fn backtrack_insertion(
    instance: &VrpInstance,
    customers: &[usize],
    node_limit: usize,
) -> Option<Vec<Vec<usize>>> {
    let mut order = customers.to_vec();
    order.sort_by_key(|&c| Reverse(instance.customers()[c].demand()));

    let fleet = instance.vehicles().len();
    let mut search = Backtrack {
        instance,
        tours: vec![Vec::new(); fleet],
        loads: vec![0; fleet],
        nodes: 0,
        node_limit,
    };
    let found = search.place(&order);
    debug!(customers = order.len(), nodes = search.nodes, found, "backtracking insertion");
    found.then_some(search.tours)
}

struct Backtrack<'a> {
    instance: &'a VrpInstance,
    tours: Vec<Vec<usize>>,
    loads: Vec<i32>,
    nodes: usize,
    node_limit: usize,
}

impl Backtrack<'_> {
    fn place(&mut self, order: &[usize]) -> bool {
        let Some((&cid, rest)) = order.split_first() else {
            return true;
        };
        let instance = self.instance;
        let demand = instance.customers()[cid].demand();
        let vehicles = instance.vehicles();

        for r in 0..self.tours.len() {
            if self.loads[r] + demand > vehicles[r].capacity() {
                continue;
            }
            let evaluator = RouteEvaluator::new(instance, &vehicles[r]);
            for pos in 0..=self.tours[r].len() {
                if self.nodes >= self.node_limit {
                    return false;
                }
                self.nodes += 1;

                self.tours[r].insert(pos, cid);
                if evaluator.is_feasible(&self.tours[r]) {
                    self.loads[r] += demand;
                    if self.place(rest) {
                        return true;
                    }
                    self.loads[r] -= demand;
                }
                self.tours[r].remove(pos);
            }
        }
        false
    }
}

/// Routes as many `pending` customers as possible.
///
/// Runs [`insert_unserved`] first. If customers are still pending, a
/// [`backtrack_insertion`] over every routable customer replaces `tours` when
/// it serves them all.
pub fn route_pending(
    instance: &VrpInstance,
    objective: Objective,
    tours: &mut Vec<Vec<usize>>,
    pending: &mut Vec<usize>,
) {
    if pending.is_empty() {
        return;
    }
    let inserted = insert_unserved(instance, objective, tours, pending);
    debug!(inserted, pending = pending.len(), "insertion repair");
    if pending.is_empty() {
        return;
    }

    let routable: Vec<usize> = tours.iter().flatten().chain(pending.iter()).copied().collect();
    if let Some(complete) = backtrack_insertion(instance, &routable, BACKTRACK_NODE_LIMIT) {
        *tours = complete;
        pending.clear();
    }
}

/// Customers of `assignment` left over for lack of a vehicle. Customers too
/// large for every vehicle are not included.
pub fn unrouted(assignment: &RouteAssignment) -> Vec<usize> {
    assignment
        .unserved()
        .iter()
        .filter(|u| u.reason == UnservedReason::NoVehicleAvailable)
        .map(|u| u.customer_id)
        .collect()
}

fn best_direct(
    instance: &VrpInstance,
    objective: Objective,
    tours: &[Vec<usize>],
    costs: &[f64],
    pending: &[usize],
) -> Option<InsertMove> {
    let vehicles = instance.vehicles();
    let mut best: Option<InsertMove> = None;

    for (pending_idx, &cid) in pending.iter().enumerate() {
        for (r, tour) in tours.iter().enumerate() {
            let Some((pos, cost)) = cheapest_position(instance, &vehicles[r], objective, tour, cid)
            else {
                continue;
            };
            let delta = cost - costs[r];
            if best.as_ref().is_none_or(|b| delta < b.delta) {
                best = Some(InsertMove {
                    pending_idx,
                    route: r,
                    pos,
                    ejection: None,
                    delta,
                });
            }
        }
    }
    best
}

fn best_ejection(
    instance: &VrpInstance,
    objective: Objective,
    tours: &[Vec<usize>],
    costs: &[f64],
    pending: &[usize],
) -> Option<InsertMove> {
    let vehicles = instance.vehicles();
    let mut best: Option<InsertMove> = None;

    for (pending_idx, &cid) in pending.iter().enumerate() {
        for (r, tour) in tours.iter().enumerate() {
            for from_pos in 0..tour.len() {
                let mut shortened = tour.clone();
                let ejected = shortened.remove(from_pos);
                let Some((pos, cost)) =
                    cheapest_position(instance, &vehicles[r], objective, &shortened, cid)
                else {
                    continue;
                };

                for (to_r, to_tour) in tours.iter().enumerate() {
                    if to_r == r {
                        continue;
                    }
                    let Some((to_pos, to_cost)) =
                        cheapest_position(instance, &vehicles[to_r], objective, to_tour, ejected)
                    else {
                        continue;
                    };
                    let delta = cost + to_cost - costs[r] - costs[to_r];
                    if best.as_ref().is_none_or(|b| delta < b.delta) {
                        best = Some(InsertMove {
                            pending_idx,
                            route: r,
                            pos,
                            ejection: Some(Ejection {
                                from_pos,
                                to_route: to_r,
                                to_pos,
                            }),
                            delta,
                        });
                    }
                }
            }
        }
    }
    best
}

/// Cheapest feasible position for `cid` in `tour`, with the cost of the
/// extended tour.
fn cheapest_position(
    instance: &VrpInstance,
    vehicle: &Vehicle,
    objective: Objective,
    tour: &[usize],
    cid: usize,
) -> Option<(usize, f64)> {
    let load: i32 = tour.iter().map(|&c| instance.customers()[c].demand()).sum();
    if load + instance.customers()[cid].demand() > vehicle.capacity() {
        return None;
    }

    let mut extended = tour.to_vec();
    let mut best: Option<(usize, f64)> = None;
    for pos in 0..=tour.len() {
        extended.insert(pos, cid);
        let cost = sequence_cost(instance, vehicle, objective, &extended);
        extended.remove(pos);
        if let Some(cost) = cost {
            if best.is_none_or(|(_, b)| cost < b) {
                best = Some((pos, cost));
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMatrix;
    use crate::models::{Customer, Location};

    /// The 5-location matrix of the classic two-vehicle CVRP demo.
    fn demo(demands: &[i32], capacities: &[i32]) -> VrpInstance {
        let dm = DistanceMatrix::from_rows(vec![
            vec![0.0, 9.0, 8.0, 7.0, 6.0],
            vec![9.0, 0.0, 10.0, 15.0, 20.0],
            vec![8.0, 10.0, 0.0, 12.0, 14.0],
            vec![7.0, 15.0, 12.0, 0.0, 5.0],
            vec![6.0, 20.0, 14.0, 5.0, 0.0],
        ])
        .unwrap();
        let mut customers = vec![Customer::depot(Location::default())];
        for (i, &d) in demands.iter().enumerate() {
            customers.push(Customer::new(i + 1, Location::default(), d));
        }
        let vehicles = capacities
            .iter()
            .enumerate()
            .map(|(i, &c)| Vehicle::new(i, c))
            .collect();
        VrpInstance::new(customers, vehicles, dm).unwrap()
    }

    fn line(demands: &[i32], capacities: &[i32]) -> VrpInstance {
        let mut customers = vec![Customer::depot(Location::new(0.0, 0.0))];
        for (i, &d) in demands.iter().enumerate() {
            customers.push(Customer::new(i + 1, Location::new(i as f64 + 1.0, 0.0), d));
        }
        let dm = DistanceMatrix::from_customers(&customers);
        let vehicles = capacities
            .iter()
            .enumerate()
            .map(|(i, &c)| Vehicle::new(i, c))
            .collect();
        VrpInstance::new(customers, vehicles, dm).unwrap()
    }

    fn loads(inst: &VrpInstance, tours: &[Vec<usize>]) -> Vec<i32> {
        tours
            .iter()
            .map(|t| t.iter().map(|&c| inst.customers()[c].demand()).sum())
            .collect()
    }

    #[test]
    fn test_direct_insertion_picks_cheapest_tour() {
        let inst = demo(&[1, 1, 1, 1], &[5, 5]);
        let mut tours = vec![vec![4], vec![1]];
        let mut pending = vec![3];
        insert_unserved(&inst, Objective::Distance, &mut tours, &mut pending);
        // 3 sits 5 from customer 4 and 15 from customer 1
        assert_eq!(tours[1], vec![1]);
        assert_eq!(tours[0].len(), 2);
        assert!(pending.is_empty());
    }

    #[test]
    fn test_ejection_frees_capacity() {
        // cheapest-arc leaves customer 1 over: [4, 3] carries 4 and [2] carries 3
        let inst = demo(&[3, 3, 2, 2], &[5, 5]);
        let mut tours = vec![vec![4, 3], vec![2]];
        let mut pending = vec![1];
        let inserted = insert_unserved(&inst, Objective::Distance, &mut tours, &mut pending);
        assert_eq!(inserted, 1);
        assert!(pending.is_empty());
        assert_eq!(loads(&inst, &tours), vec![5, 5]);
        let mut served: Vec<usize> = tours.iter().flatten().copied().collect();
        served.sort_unstable();
        assert_eq!(served, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_nothing_fits_leaves_pending() {
        let inst = demo(&[3, 3, 3, 2], &[5, 5]);
        let mut tours = vec![vec![4, 3], vec![2]];
        let mut pending = vec![1];
        assert_eq!(insert_unserved(&inst, Objective::Distance, &mut tours, &mut pending), 0);
        assert_eq!(pending, vec![1]);
        assert_eq!(tours, vec![vec![4, 3], vec![2]]);
    }

    #[test]
    fn test_backtracking_packs_tight_bins() {
        // only {1, 2} and {3, 4, 5} fill both vehicles exactly
        let inst = line(&[3, 3, 2, 2, 2], &[6, 6]);
        let tours = backtrack_insertion(&inst, &[1, 2, 3, 4, 5], BACKTRACK_NODE_LIMIT).unwrap();
        assert_eq!(loads(&inst, &tours), vec![6, 6]);
        assert_eq!(tours.iter().map(Vec::len).sum::<usize>(), 5);
    }

    #[test]
    fn test_backtracking_gives_up() {
        let inst = line(&[3, 3, 2, 2, 2], &[6, 5]);
        assert!(backtrack_insertion(&inst, &[1, 2, 3, 4, 5], BACKTRACK_NODE_LIMIT).is_none());

        let inst = line(&[3, 3, 2, 2, 2], &[6, 6]);
        assert!(backtrack_insertion(&inst, &[1, 2, 3, 4, 5], 0).is_none());
        assert_eq!(backtrack_insertion(&inst, &[], 0), Some(vec![vec![], vec![]]));
    }

    #[test]
    fn test_route_pending_falls_back_to_backtracking() {
        let inst = line(&[3, 3, 2, 2, 2], &[6, 6]);
        // a packing no single ejection can fix
        let mut tours = vec![vec![1, 3], vec![2, 4]];
        let mut pending = vec![5];
        route_pending(&inst, Objective::Distance, &mut tours, &mut pending);
        assert!(pending.is_empty());
        assert_eq!(loads(&inst, &tours), vec![6, 6]);
    }
}
