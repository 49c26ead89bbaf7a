//! Default strategy: construct, refine with a metaheuristic, then polish.

use crate::annealing::SimulatedAnnealing;
use crate::construction::{NearestNeighbor, Savings};
use crate::local_search::LocalSearch;
use crate::problem::Algorithm;
use crate::solution::Solution;
use crate::strategy::{SearchContext, Strategy};
use crate::tabu::TabuSearch;
use log::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct Hybrid;

impl Strategy for Hybrid {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Hybrid
    }

    /// Savings (nearest neighbor for very small instances), then tabu search
    /// on small instances or simulated annealing on larger ones, then the
    /// local search polish.
    fn solve(&self, ctx: &mut SearchContext<'_>) -> Solution {
        let evaluator = ctx.evaluator();
        let config = ctx.config;
        let n = ctx.problem.stop_count();

        let mut initial = if n < config.hybrid_small_instance {
            NearestNeighbor::build(&evaluator)
        } else {
            Savings::build(&evaluator)
        };
        evaluator.evaluate(&mut initial);
        debug!("hybrid construction cost {:.2}", initial.cost);

        let mut refined = if n <= config.hybrid_tabu_max_stops {
            TabuSearch::improve(ctx, initial)
        } else {
            SimulatedAnnealing::improve(ctx, initial)
        };
        debug!("hybrid refinement cost {:.2}", refined.cost);

        LocalSearch::new(evaluator, config.local_search_passes).polish(&mut refined);
        debug!("hybrid polish cost {:.2}", refined.cost);
        refined
    }
}
