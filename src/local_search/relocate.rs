//! Relocate neighborhood for local search.

use crate::evaluation::RouteEvaluator;
use crate::solution::Solution;
use rand::Rng;

use super::utils::{best_insertion, IMPROVEMENT_EPS};
use super::Move;

/// Every relocation of every assigned stop, within and across routes.
pub fn relocate_moves(solution: &Solution) -> Vec<Move> {
    let mut moves = Vec::new();

    for (r1, source) in solution.routes.iter().enumerate() {
        for p1 in 0..source.stops.len() {
            for (r2, target) in solution.routes.iter().enumerate() {
                if r1 == r2 {
                    // Positions in the route after removal; skip the no-op
                    for p2 in (0..source.stops.len()).filter(|&p2| p2 != p1) {
                        moves.push(Move::Relocate {
                            from: (r1, p1),
                            to: (r2, p2),
                        });
                    }
                } else {
                    for p2 in 0..=target.stops.len() {
                        moves.push(Move::Relocate {
                            from: (r1, p1),
                            to: (r2, p2),
                        });
                    }
                }
            }
        }
    }

    moves
}

/// A random relocation of a random assigned stop.
pub fn random_relocate<R: Rng>(solution: &Solution, rng: &mut R) -> Option<Move> {
    let sources: Vec<usize> = (0..solution.routes.len())
        .filter(|&r| !solution.routes[r].is_empty())
        .collect();
    if sources.is_empty() {
        return None;
    }

    let r1 = sources[rng.gen_range(0..sources.len())];
    let p1 = rng.gen_range(0..solution.routes[r1].stops.len());
    let r2 = rng.gen_range(0..solution.routes.len());
    let len_after = if r1 == r2 {
        solution.routes[r2].stops.len() - 1
    } else {
        solution.routes[r2].stops.len()
    };
    let p2 = rng.gen_range(0..=len_after);

    Some(Move::Relocate {
        from: (r1, p1),
        to: (r2, p2),
    })
}

/// Move single stops to the cheapest position of another route when that
/// lowers the objective. Returns whether any move was applied.
pub fn relocate_between_routes(evaluator: &RouteEvaluator<'_>, solution: &mut Solution) -> bool {
    let mut improvement = false;

    for r1 in 0..solution.routes.len() {
        let mut p1 = 0;
        while p1 < solution.routes[r1].stops.len() {
            let stop = solution.routes[r1].stops[p1];
            let vehicle = solution.routes[r1].vehicle;

            let mut without = solution.routes[r1].stops.clone();
            without.remove(p1);
            let removal_gain = evaluator.route_cost(vehicle, &solution.routes[r1].stops)
                - evaluator.route_cost(vehicle, &without);

            let best = (0..solution.routes.len())
                .filter(|&r2| r2 != r1)
                .filter_map(|r2| {
                    best_insertion(evaluator, solution, r2, stop).map(|(p2, cost)| (r2, p2, cost))
                })
                .min_by(|a, b| a.2.total_cmp(&b.2));

            match best {
                Some((r2, p2, insertion_cost)) if insertion_cost - removal_gain < -IMPROVEMENT_EPS => {
                    Move::Relocate {
                        from: (r1, p1),
                        to: (r2, p2),
                    }
                    .apply(solution);
                    improvement = true;
                }
                _ => p1 += 1,
            }
        }
    }

    improvement
}
