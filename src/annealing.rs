//! Simulated annealing over relocate, swap and insert moves.

use crate::construction::NearestNeighbor;
use crate::local_search::random_move;
use crate::problem::Algorithm;
use crate::solution::Solution;
use crate::strategy::{SearchContext, Strategy};
use log::{debug, trace};
use rand::Rng;

#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedAnnealing;

impl SimulatedAnnealing {
    /// Anneal from `initial`. Improving moves are always taken, worsening
    /// ones with probability `exp(-delta / T)`. The temperature is multiplied
    /// by the cooling rate each iteration and never drops below the floor.
    /// Moves that would overflow a capacity are never taken.
    pub fn improve(ctx: &mut SearchContext<'_>, initial: Solution) -> Solution {
        let evaluator = ctx.evaluator();
        let config = ctx.config;
        let iterations = ctx.iterations(config.default_annealing_iterations);

        let mut current = initial;
        evaluator.evaluate(&mut current);
        let mut best = current.clone();
        let mut temperature = config.initial_temperature;

        for iteration in 0..iterations {
            if ctx.should_stop() {
                debug!("annealing stopped early at iteration {}", iteration);
                break;
            }

            if let Some(mv) = random_move(&current, &mut ctx.rng) {
                if mv.is_feasible(&evaluator, &current) {
                    let delta = mv.delta(&evaluator, &current);
                    let accept = delta < 0.0 || ctx.rng.gen::<f64>() < (-delta / temperature).exp();

                    if accept {
                        mv.apply(&mut current);
                        current.cost += delta;

                        if current.cost < best.cost - 1e-9 {
                            trace!("iteration {}: best cost {:.2}", iteration, current.cost);
                            best = current.clone();
                        }
                    }
                }
            }

            temperature = (temperature * config.cooling_rate).max(config.min_temperature);
        }

        evaluator.evaluate(&mut best);
        best
    }
}

impl Strategy for SimulatedAnnealing {
    fn algorithm(&self) -> Algorithm {
        Algorithm::SimulatedAnnealing
    }

    fn solve(&self, ctx: &mut SearchContext<'_>) -> Solution {
        let initial = NearestNeighbor::build(&ctx.evaluator());
        Self::improve(ctx, initial)
    }
}
