//! Nearest neighbor construction.

use crate::evaluation::RouteEvaluator;
use crate::problem::Algorithm;
use crate::solution::Solution;
use crate::strategy::{SearchContext, Strategy};

/// Fills vehicles one at a time in fleet order, always driving to the
/// closest stop that still fits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighbor;

impl NearestNeighbor {
    /// Build a solution. A stop fits when the vehicle has its skills, every
    /// capacity dimension holds and the route including the return leg stays
    /// within the working time. Ties go to the higher priority, then to the
    /// lower stop id.
    pub fn build(evaluator: &RouteEvaluator<'_>) -> Solution {
        let problem = evaluator.problem;
        let n = problem.stop_count();
        let mut assigned = vec![false; n];
        let mut solution = Solution::new(problem);

        for v in 0..problem.vehicle_count() {
            let mut route: Vec<usize> = Vec::new();

            loop {
                let current = route
                    .last()
                    .map_or(problem.vehicle_depot_node(v), |&s| problem.stop_node(s));

                let next = (0..n)
                    .filter(|&s| !assigned[s] && problem.can_serve(v, s))
                    .filter(|&s| evaluator.fits(v, &[route.as_slice(), &[s]].concat()))
                    .min_by(|&a, &b| {
                        let da = problem.get_distance(current, problem.stop_node(a));
                        let db = problem.get_distance(current, problem.stop_node(b));
                        da.total_cmp(&db)
                            .then_with(|| problem.stops[b].priority.cmp(&problem.stops[a].priority))
                            .then_with(|| problem.stops[a].id.cmp(&problem.stops[b].id))
                    });

                match next {
                    Some(s) => {
                        assigned[s] = true;
                        route.push(s);
                    }
                    None => break,
                }
            }

            solution.routes[v].stops = route;
        }

        solution.unassigned = (0..n).filter(|&s| !assigned[s]).collect();
        solution
    }
}

impl Strategy for NearestNeighbor {
    fn algorithm(&self) -> Algorithm {
        Algorithm::NearestNeighbor
    }

    fn solve(&self, ctx: &mut SearchContext<'_>) -> Solution {
        let evaluator = ctx.evaluator();
        let mut solution = Self::build(&evaluator);
        evaluator.evaluate(&mut solution);
        solution
    }
}
