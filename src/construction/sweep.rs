//! Sweep construction.

use crate::evaluation::RouteEvaluator;
use crate::problem::{Algorithm, Problem};
use crate::solution::Solution;
use crate::strategy::{SearchContext, Strategy};
use itertools::Itertools;

/// Packs stops into vehicles in order of polar angle around the depot.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sweep;

/// Polar angle of a stop around the request depot, `atan2(dlat, dlng)`.
pub fn polar_angle(problem: &Problem, stop: usize) -> f64 {
    let depot = &problem.depot;
    let location = &problem.stops[stop].location;
    (location.lat - depot.lat).atan2(location.lng - depot.lng)
}

impl Sweep {
    /// Build a solution. Stops are taken counter-clockwise (ties by index)
    /// and appended to the current vehicle until a capacity dimension would
    /// overflow or its skills are missing, then the next vehicle that can
    /// take the stop is opened. A stop no remaining vehicle can take is left
    /// unassigned and the current vehicle stays open.
    pub fn build(evaluator: &RouteEvaluator<'_>) -> Solution {
        let problem = evaluator.problem;
        let mut solution = Solution::new(problem);
        let mut vehicle = 0;
        if problem.vehicle_count() == 0 {
            solution.unassigned = (0..problem.stop_count()).collect();
            return solution;
        }

        let order = (0..problem.stop_count())
            .map(|s| (polar_angle(problem, s), s))
            .sorted_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        for (_, s) in order {
            let fits = |v: usize, stops: &[usize]| {
                problem.vehicles[v].has_skills_for(&problem.stops[s])
                    && problem
                        .total_demand(&[stops, &[s]].concat())
                        .fits_within(&problem.vehicles[v].capacity())
            };

            let current = &solution.routes[vehicle].stops;
            if fits(vehicle, current) {
                solution.routes[vehicle].stops.push(s);
                continue;
            }

            // Vehicles past the current one are still empty
            match (vehicle + 1..problem.vehicle_count()).find(|&v| problem.can_serve(v, s)) {
                Some(next) => {
                    vehicle = next;
                    solution.routes[vehicle].stops.push(s);
                }
                None => solution.unassigned.push(s),
            }
        }

        solution.unassigned.sort_unstable();
        solution
    }
}

impl Strategy for Sweep {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Sweep
    }

    fn solve(&self, ctx: &mut SearchContext<'_>) -> Solution {
        let evaluator = ctx.evaluator();
        let mut solution = Self::build(&evaluator);
        evaluator.evaluate(&mut solution);
        solution
    }
}
