//! Utility functions for local search operations.

use crate::evaluation::RouteEvaluator;
use crate::problem::Problem;
use crate::solution::Solution;
use rand::seq::SliceRandom;
use rand::Rng;

use super::Move;

/// Improvements smaller than this are treated as noise.
pub const IMPROVEMENT_EPS: f64 = 1e-6;

/// Objective change when the given routes are replaced by new stop lists.
pub fn cost_delta(
    evaluator: &RouteEvaluator<'_>,
    solution: &Solution,
    changes: &[(usize, Vec<usize>)],
) -> f64 {
    changes
        .iter()
        .map(|(r, stops)| {
            let vehicle = solution.routes[*r].vehicle;
            evaluator.route_cost(vehicle, stops)
                - evaluator.route_cost(vehicle, &solution.routes[*r].stops)
        })
        .sum()
}

/// Check that each replacement route respects its vehicle's capacity and
/// skills.
pub fn routes_feasible(problem: &Problem, solution: &Solution, changes: &[(usize, Vec<usize>)]) -> bool {
    changes.iter().all(|(r, stops)| {
        let vehicle = &problem.vehicles[solution.routes[*r].vehicle];
        stops
            .iter()
            .all(|&s| vehicle.has_skills_for(&problem.stops[s]))
            && problem.total_demand(stops).fits_within(&vehicle.capacity())
    })
}

/// Cheapest feasible position for `stop` in `route`, with the cost increase.
pub fn best_insertion(
    evaluator: &RouteEvaluator<'_>,
    solution: &Solution,
    route: usize,
    stop: usize,
) -> Option<(usize, f64)> {
    let problem = evaluator.problem;
    let current = &solution.routes[route];
    let vehicle = &problem.vehicles[current.vehicle];

    if !vehicle.has_skills_for(&problem.stops[stop]) {
        return None;
    }
    let mut with_stop = current.stops.clone();
    with_stop.push(stop);
    if !problem.total_demand(&with_stop).fits_within(&vehicle.capacity()) {
        return None;
    }

    let base = evaluator.route_cost(current.vehicle, &current.stops);
    (0..=current.stops.len())
        .map(|pos| {
            let mut candidate = current.stops.clone();
            candidate.insert(pos, stop);
            (pos, evaluator.route_cost(current.vehicle, &candidate) - base)
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Insert every unassigned stop that fits somewhere at its cheapest
/// position. Returns whether any stop was placed.
pub fn insert_unassigned(evaluator: &RouteEvaluator<'_>, solution: &mut Solution) -> bool {
    let mut placed = false;

    for stop in solution.unassigned.clone() {
        let best = (0..solution.routes.len())
            .filter_map(|r| best_insertion(evaluator, solution, r, stop).map(|(p, d)| (r, p, d)))
            .min_by(|a, b| a.2.total_cmp(&b.2));

        if let Some((r, p, delta)) = best {
            if delta - evaluator.config.unassigned_penalty < -IMPROVEMENT_EPS {
                Move::Insert { stop, to: (r, p) }.apply(solution);
                placed = true;
            }
        }
    }

    placed
}

/// Every placement of every unassigned stop.
pub fn insert_moves(solution: &Solution) -> Vec<Move> {
    let mut moves = Vec::new();
    for &stop in &solution.unassigned {
        for (r, route) in solution.routes.iter().enumerate() {
            for p in 0..=route.stops.len() {
                moves.push(Move::Insert { stop, to: (r, p) });
            }
        }
    }
    moves
}

/// A random placement of a random unassigned stop.
pub fn random_insert<R: Rng>(solution: &Solution, rng: &mut R) -> Option<Move> {
    let &stop = solution.unassigned.choose(rng)?;
    if solution.routes.is_empty() {
        return None;
    }
    let r = rng.gen_range(0..solution.routes.len());
    let p = rng.gen_range(0..=solution.routes[r].stops.len());
    Some(Move::Insert { stop, to: (r, p) })
}
