//! Split a giant tour into vehicle routes.

use crate::evaluation::RouteEvaluator;
use crate::local_search::utils::insert_unassigned;
use crate::solution::Solution;

/// Greedy fleet split used to decode permutations.
pub struct Split;

impl Split {
    /// Cut `tour` into consecutive segments, one per vehicle in fleet order.
    ///
    /// A stop is appended to the current vehicle while skills, capacity and
    /// working time allow it; otherwise the next vehicle is opened. Stops
    /// that fit nowhere on the way are then inserted at their cheapest
    /// feasible position in any route, or left unassigned.
    pub fn split(tour: &[usize], evaluator: &RouteEvaluator<'_>) -> Solution {
        let problem = evaluator.problem;
        let mut solution = Solution::new(problem);
        let mut vehicle = 0;

        for &stop in tour {
            if vehicle >= problem.vehicle_count() {
                solution.unassigned.push(stop);
                continue;
            }

            let fits = |v: usize, stops: &[usize]| {
                problem.can_serve(v, stop) && evaluator.fits(v, &[stops, &[stop]].concat())
            };

            if !fits(vehicle, &solution.routes[vehicle].stops) {
                if solution.routes[vehicle].is_empty() {
                    solution.unassigned.push(stop);
                    continue;
                }
                vehicle += 1;
                if vehicle >= problem.vehicle_count() || !fits(vehicle, &[]) {
                    solution.unassigned.push(stop);
                    continue;
                }
            }

            solution.routes[vehicle].stops.push(stop);
        }

        if !solution.unassigned.is_empty() {
            insert_unassigned(evaluator, &mut solution);
        }
        evaluator.evaluate(&mut solution);
        solution
    }
}
