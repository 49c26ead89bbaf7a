//! Clarke-Wright savings construction.

use crate::construction::unservable_stops;
use crate::evaluation::RouteEvaluator;
use crate::problem::{Algorithm, Problem};
use crate::solution::Solution;
use crate::strategy::{SearchContext, Strategy};
use itertools::Itertools;
use log::trace;
use petgraph::unionfind::UnionFind;
use std::collections::HashMap;

/// Merges single-stop routes end to end in order of decreasing savings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Savings;

/// `d(depot, i) + d(depot, j) - d(i, j)` for every pair of stops, sorted by
/// decreasing saving. Equal savings keep pair order.
pub fn savings_list(problem: &Problem, stops: &[usize]) -> Vec<(usize, usize, f64)> {
    let depot = Problem::DEPOT;
    stops
        .iter()
        .copied()
        .tuple_combinations()
        .map(|(i, j)| {
            let (ni, nj) = (problem.stop_node(i), problem.stop_node(j));
            let saving = problem.get_distance(depot, ni) + problem.get_distance(depot, nj)
                - problem.get_distance(ni, nj);
            (i, j, saving)
        })
        .sorted_by(|a, b| b.2.total_cmp(&a.2))
        .collect()
}

/// Join two routes through the endpoints `i` (in `a`) and `j` (in `b`).
/// Returns `None` when either stop is interior to its route.
fn join(a: &[usize], b: &[usize], i: usize, j: usize) -> Option<Vec<usize>> {
    let (a_first, a_last) = (*a.first()?, *a.last()?);
    let (b_first, b_last) = (*b.first()?, *b.last()?);

    let merged: Vec<usize> = if a_last == i && b_first == j {
        a.iter().chain(b.iter()).copied().collect()
    } else if b_last == j && a_first == i {
        b.iter().chain(a.iter()).copied().collect()
    } else if a_last == i && b_last == j {
        a.iter().chain(b.iter().rev()).copied().collect()
    } else if a_first == i && b_first == j {
        a.iter().rev().chain(b.iter()).copied().collect()
    } else {
        return None;
    };
    Some(merged)
}

impl Savings {
    pub fn build(evaluator: &RouteEvaluator<'_>) -> Solution {
        let problem = evaluator.problem;
        let n = problem.stop_count();
        let largest = problem.largest_vehicle();
        let largest_capacity = problem.vehicles[largest].capacity();

        let mut unassigned = unservable_stops(problem);
        let seeds: Vec<usize> = (0..n).filter(|s| !unassigned.contains(s)).collect();

        let mut membership = UnionFind::<usize>::new(n);
        let mut routes: HashMap<usize, Vec<usize>> = seeds.iter().map(|&s| (s, vec![s])).collect();

        for (i, j, saving) in savings_list(problem, &seeds) {
            if saving <= 0.0 || membership.equiv(i, j) {
                continue;
            }

            let (ri, rj) = (membership.find(i), membership.find(j));
            let merged = match (routes.get(&ri), routes.get(&rj)) {
                (Some(a), Some(b)) => join(a, b, i, j),
                _ => None,
            };
            let Some(merged) = merged else { continue };

            let mergeable = problem.total_demand(&merged).fits_within(&largest_capacity)
                && evaluator.fits_working_time(largest, &merged)
                && problem.vehicles.iter().any(|v| {
                    merged
                        .iter()
                        .all(|&s| v.has_skills_for(&problem.stops[s]))
                });
            if !mergeable {
                continue;
            }

            trace!("savings merge ({}, {}) saving {:.3}", i, j, saving);
            routes.remove(&ri);
            routes.remove(&rj);
            membership.union(i, j);
            routes.insert(membership.find(i), merged);
        }

        let mut solution = Solution::new(problem);
        let mut free = vec![true; problem.vehicle_count()];

        // Heaviest routes pick first; each takes the tightest vehicle that fits.
        let ordered = routes
            .into_values()
            .map(|r| (problem.total_demand(&r).weight, r))
            .sorted_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1[0].cmp(&b.1[0])));

        for (weight, route) in ordered {
            let vehicle = (0..problem.vehicle_count())
                .filter(|&v| free[v] && evaluator.fits(v, &route))
                .min_by(|&a, &b| {
                    let slack_a = problem.vehicles[a].capacity_weight - weight;
                    let slack_b = problem.vehicles[b].capacity_weight - weight;
                    slack_a.total_cmp(&slack_b).then_with(|| a.cmp(&b))
                });

            match vehicle {
                Some(v) => {
                    free[v] = false;
                    solution.routes[v].stops = route;
                }
                None => unassigned.extend(route),
            }
        }

        unassigned.sort_unstable();
        solution.unassigned = unassigned;
        solution
    }
}

impl Strategy for Savings {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Savings
    }

    fn solve(&self, ctx: &mut SearchContext<'_>) -> Solution {
        let evaluator = ctx.evaluator();
        let mut solution = Self::build(&evaluator);
        evaluator.evaluate(&mut solution);
        solution
    }
}
