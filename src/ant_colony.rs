//! Ant colony optimization.
//!
//! Ants build giant tours edge by edge, biased by pheromone and inverse
//! distance; tours are decoded with the greedy fleet split.

use crate::problem::{Algorithm, Problem};
use crate::solution::Solution;
use crate::split::Split;
use crate::strategy::{SearchContext, Strategy};
use log::{debug, trace};
use rand::Rng;

/// Distances below this are clamped when computing visibility.
const MIN_VISIBILITY_DISTANCE_KM: f64 = 0.01;

/// Pheromone per directed edge. Row and column 0 are the depot, `s + 1` is
/// stop `s`.
#[derive(Debug, Clone)]
pub struct PheromoneMatrix {
    trails: Vec<Vec<f64>>,
    floor: f64,
}

impl PheromoneMatrix {
    pub fn new(stops: usize, initial: f64, floor: f64) -> Self {
        PheromoneMatrix {
            trails: vec![vec![initial.max(floor); stops + 1]; stops + 1],
            floor,
        }
    }

    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.trails[from][to]
    }

    /// Multiply every trail by `1 - rate`, keeping the floor.
    pub fn evaporate(&mut self, rate: f64) {
        for row in self.trails.iter_mut() {
            for trail in row.iter_mut() {
                *trail = (*trail * (1.0 - rate)).max(self.floor);
            }
        }
    }

    /// Add `amount` to every edge the solution drives.
    pub fn deposit(&mut self, solution: &Solution, amount: f64) {
        for route in solution.routes.iter().filter(|r| !r.is_empty()) {
            let mut previous = 0;
            for &s in &route.stops {
                self.trails[previous][s + 1] += amount;
                previous = s + 1;
            }
            self.trails[previous][0] += amount;
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AntColony;

impl AntColony {
    /// Build one giant tour starting at the depot.
    pub fn construct_tour<R: Rng>(
        problem: &Problem,
        pheromone: &PheromoneMatrix,
        alpha: f64,
        beta: f64,
        rng: &mut R,
    ) -> Vec<usize> {
        let n = problem.stop_count();
        let mut remaining: Vec<usize> = (0..n).collect();
        let mut tour = Vec::with_capacity(n);
        let mut current = Problem::DEPOT;

        while !remaining.is_empty() {
            let weights: Vec<f64> = remaining
                .iter()
                .map(|&s| {
                    let next = problem.stop_node(s);
                    let visibility =
                        1.0 / problem.get_distance(current, next).max(MIN_VISIBILITY_DISTANCE_KM);
                    pheromone.get(current, next).powf(alpha) * visibility.powf(beta)
                })
                .collect();
            let total: f64 = weights.iter().sum();

            // Roulette wheel; falls back to the first candidate on degenerate weights
            let mut chosen = 0;
            if total.is_finite() && total > 0.0 {
                let mut ticket = rng.gen::<f64>() * total;
                for (i, w) in weights.iter().enumerate() {
                    ticket -= w;
                    if ticket <= 0.0 {
                        chosen = i;
                        break;
                    }
                }
            }

            let stop = remaining.remove(chosen);
            tour.push(stop);
            current = problem.stop_node(stop);
        }

        tour
    }
}

impl Strategy for AntColony {
    fn algorithm(&self) -> Algorithm {
        Algorithm::AntColony
    }

    fn solve(&self, ctx: &mut SearchContext<'_>) -> Solution {
        let evaluator = ctx.evaluator();
        let problem = ctx.problem;
        let config = ctx.config;
        let iterations = ctx.iterations(config.default_ant_iterations);

        let mut pheromone = PheromoneMatrix::new(problem.stop_count(), 1.0, config.min_pheromone);
        let mut best: Option<Solution> = None;

        for iteration in 0..iterations {
            if ctx.should_stop() {
                debug!("ant colony stopped early at iteration {}", iteration);
                break;
            }

            let mut iteration_best: Option<Solution> = None;
            for _ in 0..config.n_ants.max(1) {
                let tour = Self::construct_tour(
                    problem,
                    &pheromone,
                    config.pheromone_weight,
                    config.heuristic_weight,
                    &mut ctx.rng,
                );
                let solution = Split::split(&tour, &evaluator);
                if iteration_best.as_ref().map_or(true, |b| solution.cost < b.cost) {
                    iteration_best = Some(solution);
                }
            }

            pheromone.evaporate(config.evaporation_rate);
            if let Some(candidate) = iteration_best {
                pheromone.deposit(&candidate, config.pheromone_deposit / candidate.cost.max(1e-9));
                if best.as_ref().map_or(true, |b| candidate.cost < b.cost) {
                    trace!("iteration {}: best cost {:.2}", iteration, candidate.cost);
                    best = Some(candidate);
                }
            }
        }

        // A colony stopped before its first iteration still returns a plan
        best.unwrap_or_else(|| {
            let tour: Vec<usize> = (0..problem.stop_count()).collect();
            Split::split(&tour, &evaluator)
        })
    }
}
