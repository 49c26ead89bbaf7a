//! The `Strategy` seam and the per-run search context.

use crate::ant_colony::AntColony;
use crate::annealing::SimulatedAnnealing;
use crate::cancel::CancellationToken;
use crate::config::Config;
use crate::construction::{NearestNeighbor, Savings, Sweep};
use crate::evaluation::RouteEvaluator;
use crate::genetic::Genetic;
use crate::hybrid::Hybrid;
use crate::problem::{Algorithm, Problem};
use crate::solution::Solution;
use crate::tabu::TabuSearch;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

/// Everything a strategy needs during one run.
pub struct SearchContext<'a> {
    pub problem: &'a Problem,
    pub config: &'a Config,
    pub rng: ChaCha8Rng,
    cancel: &'a CancellationToken,
    deadline: Option<Instant>,
    stopped_early: bool,
}

impl<'a> SearchContext<'a> {
    /// Create a context whose generator is seeded with `seed`. The timeout
    /// is taken from the problem's options and starts now.
    pub fn new(
        problem: &'a Problem,
        config: &'a Config,
        cancel: &'a CancellationToken,
        seed: u64,
    ) -> Self {
        SearchContext {
            problem,
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            cancel,
            deadline: problem.options.timeout.map(|t| Instant::now() + t),
            stopped_early: false,
        }
    }

    pub fn evaluator(&self) -> RouteEvaluator<'a> {
        RouteEvaluator::new(self.problem, self.config)
    }

    /// Iteration budget: the request's `max_iterations` or `default`.
    pub fn iterations(&self, default: usize) -> usize {
        self.problem.options.max_iterations.unwrap_or(default)
    }

    /// Poll cancellation and the deadline. Once it returns `true` it keeps
    /// doing so.
    pub fn should_stop(&mut self) -> bool {
        if !self.stopped_early {
            let expired = self.deadline.map_or(false, |d| Instant::now() >= d);
            self.stopped_early = expired || self.cancel.is_cancelled();
        }
        self.stopped_early
    }

    /// Whether a search was interrupted during this run.
    pub fn stopped_early(&self) -> bool {
        self.stopped_early
    }
}

/// An optimization algorithm.
pub trait Strategy: Send + Sync {
    /// The algorithm reported in the result.
    fn algorithm(&self) -> Algorithm;

    /// Build a solution. Stochastic strategies draw from `ctx.rng` only and
    /// return their best solution when `ctx.should_stop()` fires.
    fn solve(&self, ctx: &mut SearchContext<'_>) -> Solution;
}

/// The built-in strategy for an algorithm.
pub fn strategy_for(algorithm: Algorithm) -> Box<dyn Strategy> {
    match algorithm {
        Algorithm::NearestNeighbor => Box::new(NearestNeighbor),
        Algorithm::Savings => Box::new(Savings),
        Algorithm::Sweep => Box::new(Sweep),
        Algorithm::Genetic => Box::new(Genetic),
        Algorithm::SimulatedAnnealing => Box::new(SimulatedAnnealing),
        Algorithm::TabuSearch => Box::new(TabuSearch),
        Algorithm::AntColony => Box::new(AntColony),
        Algorithm::Hybrid => Box::new(Hybrid),
    }
}
