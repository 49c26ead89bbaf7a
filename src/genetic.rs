//! Genetic algorithm over giant-tour permutations.

use crate::construction::{NearestNeighbor, Savings, Sweep};
use crate::evaluation::RouteEvaluator;
use crate::individual::Individual;
use crate::population::Population;
use crate::problem::Algorithm;
use crate::solution::Solution;
use crate::strategy::{SearchContext, Strategy};
use log::{debug, trace};
use rand::Rng;

/// Implements the genetic operators (crossover, mutation) and the
/// generational loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct Genetic;

impl Genetic {
    /// Perform ordered crossover (OX) between two parent tours.
    ///
    /// A random slice of the first parent is kept in place; the remaining
    /// positions are filled, starting after the slice, with the missing stops
    /// in the order they appear in the second parent.
    pub fn crossover<R: Rng>(p1_tour: &[usize], p2_tour: &[usize], rng: &mut R) -> Vec<usize> {
        if p1_tour.is_empty() || p1_tour.len() != p2_tour.len() {
            return p1_tour.to_vec();
        }

        let tour_size = p1_tour.len();
        let cut1 = rng.gen_range(0..tour_size);
        let cut2 = rng.gen_range(0..tour_size);
        let (start, end) = if cut1 <= cut2 {
            (cut1, cut2)
        } else {
            (cut2, cut1)
        };

        let max_stop = p1_tour.iter().copied().max().unwrap_or(0);
        let mut used = vec![false; max_stop + 1];
        let mut offspring = vec![usize::MAX; tour_size];
        for i in start..=end {
            offspring[i] = p1_tour[i];
            used[p1_tour[i]] = true;
        }

        let mut j = (end + 1) % tour_size;
        for k in 0..tour_size {
            let stop = p2_tour[(end + 1 + k) % tour_size];
            if stop <= max_stop && !used[stop] {
                offspring[j] = stop;
                used[stop] = true;
                j = (j + 1) % tour_size;
            }
        }

        offspring
    }

    /// Swap two stops inside one decoded route. The swap keeps the route's
    /// load; it is undone when it would break the working time.
    pub fn mutate<R: Rng>(solution: &mut Solution, evaluator: &RouteEvaluator<'_>, rng: &mut R) -> bool {
        let candidates: Vec<usize> = (0..solution.routes.len())
            .filter(|&r| solution.routes[r].stops.len() >= 2)
            .collect();
        if candidates.is_empty() {
            return false;
        }

        let route = &mut solution.routes[candidates[rng.gen_range(0..candidates.len())]];
        let n = route.stops.len();
        let i = rng.gen_range(0..n);
        let mut j = rng.gen_range(0..n - 1);
        if j >= i {
            j += 1;
        }

        let was_within = evaluator.fits_working_time(route.vehicle, &route.stops);
        route.stops.swap(i, j);
        if was_within && !evaluator.fits_working_time(route.vehicle, &route.stops) {
            route.stops.swap(i, j);
            return false;
        }
        true
    }

    /// Run the generational loop from the given seed solutions.
    pub fn evolve(ctx: &mut SearchContext<'_>, seeds: Vec<Solution>) -> Solution {
        let evaluator = ctx.evaluator();
        let config = ctx.config;
        let generations = ctx.iterations(config.default_generations);

        let mut population = Population::new(config);
        population.initialize(seeds, &evaluator, &mut ctx.rng);

        let mut best = match population.best() {
            Some(individual) => individual.solution.clone(),
            None => return Solution::new(ctx.problem),
        };

        for generation in 0..generations {
            if ctx.should_stop() {
                debug!("genetic search stopped early at generation {}", generation);
                break;
            }

            let mut next = population.elites();
            while next.len() < population.size {
                let p1 = population.select_parent(&mut ctx.rng);
                let p2 = population.select_parent(&mut ctx.rng);
                let tour = Self::crossover(&p1.tour, &p2.tour, &mut ctx.rng);

                let mut child = Individual::from_tour(tour, &evaluator);
                if ctx.rng.gen::<f64>() < config.mutation_rate
                    && Self::mutate(&mut child.solution, &evaluator, &mut ctx.rng)
                {
                    evaluator.evaluate(&mut child.solution);
                    child = Individual::from_solution(child.solution);
                }
                next.push(child);
            }
            population.replace(next);

            if let Some(leader) = population.best() {
                if leader.cost() < best.cost {
                    trace!("generation {}: best cost {:.2}", generation, leader.cost());
                    best = leader.solution.clone();
                }
            }
        }

        best
    }
}

impl Strategy for Genetic {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Genetic
    }

    fn solve(&self, ctx: &mut SearchContext<'_>) -> Solution {
        let evaluator = ctx.evaluator();
        let seeds = [
            NearestNeighbor::build(&evaluator),
            Savings::build(&evaluator),
            Sweep::build(&evaluator),
        ]
        .into_iter()
        .map(|mut s| {
            evaluator.evaluate(&mut s);
            s
        })
        .collect();

        Self::evolve(ctx, seeds)
    }
}
