//! Neighbourhood moves and the deterministic local search polish.

pub mod relocate;
pub mod swap;
pub mod two_opt;
pub mod utils;

use crate::evaluation::RouteEvaluator;
use crate::solution::Solution;
use log::trace;
use rand::Rng;

use self::utils::{cost_delta, routes_feasible};

/// A position on a route: `(route index, stop position)`.
pub type Slot = (usize, usize);

/// A neighbourhood move. Routes are addressed by index into
/// `Solution::routes`, positions by index into `Route::stops`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Remove the stop at `from` and insert it at `to`. For a move inside
    /// one route, `to.1` indexes the route after removal.
    Relocate { from: Slot, to: Slot },
    /// Exchange the stops at `a` and `b`.
    Swap { a: Slot, b: Slot },
    /// Serve the unassigned `stop` at `to`.
    Insert { stop: usize, to: Slot },
}

impl Move {
    /// The stop sequences of every route this move changes, without
    /// touching the solution.
    pub fn preview(&self, solution: &Solution) -> Vec<(usize, Vec<usize>)> {
        match *self {
            Move::Relocate {
                from: (r1, p1),
                to: (r2, p2),
            } => {
                let mut source = solution.routes[r1].stops.clone();
                let stop = source.remove(p1);
                if r1 == r2 {
                    source.insert(p2.min(source.len()), stop);
                    vec![(r1, source)]
                } else {
                    let mut target = solution.routes[r2].stops.clone();
                    target.insert(p2.min(target.len()), stop);
                    vec![(r1, source), (r2, target)]
                }
            }
            Move::Swap {
                a: (r1, p1),
                b: (r2, p2),
            } => {
                if r1 == r2 {
                    let mut stops = solution.routes[r1].stops.clone();
                    stops.swap(p1, p2);
                    vec![(r1, stops)]
                } else {
                    let mut first = solution.routes[r1].stops.clone();
                    let mut second = solution.routes[r2].stops.clone();
                    std::mem::swap(&mut first[p1], &mut second[p2]);
                    vec![(r1, first), (r2, second)]
                }
            }
            Move::Insert { stop, to: (r, p) } => {
                let mut stops = solution.routes[r].stops.clone();
                stops.insert(p.min(stops.len()), stop);
                vec![(r, stops)]
            }
        }
    }

    /// Apply the move in place. The cost is left stale.
    pub fn apply(&self, solution: &mut Solution) {
        for (r, stops) in self.preview(solution) {
            solution.routes[r].stops = stops;
        }
        if let Move::Insert { stop, .. } = *self {
            solution.unassigned.retain(|&s| s != stop);
        }
    }

    /// Objective change the move would cause.
    pub fn delta(&self, evaluator: &RouteEvaluator<'_>, solution: &Solution) -> f64 {
        let changes = self.preview(solution);
        let mut delta = cost_delta(evaluator, solution, &changes);
        if let Move::Insert { .. } = self {
            delta -= evaluator.config.unassigned_penalty;
        }
        delta
    }

    /// Whether every changed route keeps its vehicle's capacity and skills.
    pub fn is_feasible(&self, evaluator: &RouteEvaluator<'_>, solution: &Solution) -> bool {
        routes_feasible(evaluator.problem, solution, &self.preview(solution))
    }
}

/// Every relocate, swap and insert move of a solution.
pub fn neighborhood(solution: &Solution) -> Vec<Move> {
    let mut moves = relocate::relocate_moves(solution);
    moves.extend(swap::swap_moves(solution));
    moves.extend(utils::insert_moves(solution));
    moves
}

/// Draw one random relocate, swap or insert move. Returns `None` when the
/// drawn kind has no candidate in this solution.
pub fn random_move<R: Rng>(solution: &Solution, rng: &mut R) -> Option<Move> {
    let kinds = if solution.unassigned.is_empty() { 2 } else { 3 };
    match rng.gen_range(0..kinds) {
        0 => relocate::random_relocate(solution, rng),
        1 => swap::random_swap(solution, rng),
        _ => utils::random_insert(solution, rng),
    }
}

/// Deterministic first-improvement descent: insert unassigned stops,
/// intra-route 2-opt and inter-route relocate, until no move improves or
/// the pass limit is reached.
pub struct LocalSearch<'a> {
    evaluator: RouteEvaluator<'a>,
    max_passes: usize,
}

impl<'a> LocalSearch<'a> {
    pub fn new(evaluator: RouteEvaluator<'a>, max_passes: usize) -> Self {
        LocalSearch {
            evaluator,
            max_passes,
        }
    }

    /// Improve `solution` in place. Returns whether anything changed.
    pub fn polish(&self, solution: &mut Solution) -> bool {
        let mut changed = false;

        for pass in 0..self.max_passes {
            let mut improvement = false;

            improvement |= utils::insert_unassigned(&self.evaluator, solution);
            improvement |= two_opt::two_opt_routes(&self.evaluator, solution);
            improvement |= relocate::relocate_between_routes(&self.evaluator, solution);

            if !improvement {
                trace!("local search converged after {} passes", pass);
                break;
            }
            changed = true;
        }

        self.evaluator.evaluate(solution);
        changed
    }
}
