//! Population management for the genetic algorithm.

use crate::config::Config;
use crate::evaluation::RouteEvaluator;
use crate::individual::Individual;
use crate::solution::Solution;
use rand::seq::SliceRandom;
use rand::Rng;

/// A generation of individuals, kept sorted by ascending cost.
pub struct Population {
    pub individuals: Vec<Individual>,
    /// Target number of individuals per generation
    pub size: usize,
    /// Number of elite individuals to preserve
    pub n_elite: usize,
    /// Contestants per tournament
    pub tournament_size: usize,
}

impl Population {
    /// Create an empty population with the given configuration.
    pub fn new(config: &Config) -> Self {
        let size = config.population_size.max(2);
        Population {
            individuals: Vec::with_capacity(size),
            size,
            n_elite: config.n_elite.min(size),
            tournament_size: config.tournament_size.max(1),
        }
    }

    /// Seed the population with the given solutions, then fill it with
    /// random permutations of the stops.
    pub fn initialize<R: Rng>(
        &mut self,
        seeds: Vec<Solution>,
        evaluator: &RouteEvaluator<'_>,
        rng: &mut R,
    ) {
        self.individuals.clear();
        for seed in seeds.into_iter().take(self.size) {
            self.individuals.push(Individual::from_solution(seed));
        }

        let n = evaluator.problem.stop_count();
        while self.individuals.len() < self.size {
            let mut tour: Vec<usize> = (0..n).collect();
            tour.shuffle(rng);
            self.individuals.push(Individual::from_tour(tour, evaluator));
        }

        self.individuals.sort();
    }

    /// Tournament selection: the fittest of `tournament_size` random picks.
    pub fn select_parent<R: Rng>(&self, rng: &mut R) -> &Individual {
        let mut best = &self.individuals[rng.gen_range(0..self.individuals.len())];
        for _ in 1..self.tournament_size {
            let contestant = &self.individuals[rng.gen_range(0..self.individuals.len())];
            if contestant.fitness > best.fitness {
                best = contestant;
            }
        }
        best
    }

    /// The elite individuals, copied unchanged into the next generation.
    pub fn elites(&self) -> Vec<Individual> {
        self.individuals.iter().take(self.n_elite).cloned().collect()
    }

    /// Replace the population with the next generation. Clones of a
    /// cheaper individual are dropped, so the population may shrink.
    pub fn replace(&mut self, mut next: Vec<Individual>) {
        next.sort();
        let mut kept: Vec<Individual> = Vec::with_capacity(self.size);
        for individual in next {
            if kept.len() == self.size {
                break;
            }
            if !kept.iter().any(|k| k.is_clone_of(&individual)) {
                kept.push(individual);
            }
        }
        self.individuals = kept;
    }

    /// The lowest-cost individual.
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.first()
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }
}
