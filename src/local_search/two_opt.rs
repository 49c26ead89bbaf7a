//! 2-Opt neighborhood for local search (intra-route).

use crate::evaluation::RouteEvaluator;
use crate::solution::Solution;

use super::utils::IMPROVEMENT_EPS;

/// Reverse the segment `i..=j` of a stop sequence.
pub fn reversed(stops: &[usize], i: usize, j: usize) -> Vec<usize> {
    let mut result = stops.to_vec();
    result[i..=j].reverse();
    result
}

/// Apply improving segment reversals to every route. Costs are evaluated on
/// the full schedule, so time windows and traffic count, not only distance.
pub fn two_opt_routes(evaluator: &RouteEvaluator<'_>, solution: &mut Solution) -> bool {
    let mut improvement = false;

    for route in solution.routes.iter_mut() {
        let n = route.stops.len();
        if n < 2 {
            continue;
        }

        let mut current = evaluator.route_cost(route.vehicle, &route.stops);
        let mut improved = true;
        while improved {
            improved = false;

            'search: for i in 0..n - 1 {
                for j in i + 1..n {
                    let candidate = reversed(&route.stops, i, j);
                    let cost = evaluator.route_cost(route.vehicle, &candidate);

                    if cost < current - IMPROVEMENT_EPS {
                        route.stops = candidate;
                        current = cost;
                        improved = true;
                        improvement = true;
                        break 'search;
                    }
                }
            }
        }
    }

    improvement
}
