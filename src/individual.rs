//! Individual representation for the genetic algorithm population.

use crate::evaluation::RouteEvaluator;
use crate::solution::Solution;
use crate::split::Split;
use std::cmp::Ordering;

/// An individual in the genetic algorithm population.
#[derive(Clone, Debug)]
pub struct Individual {
    /// Giant tour: every stop exactly once
    pub tour: Vec<usize>,
    /// The decoded solution
    pub solution: Solution,
    /// `1 / (1 + cost)`
    pub fitness: f64,
}

impl Individual {
    /// Decode a giant tour into an individual.
    pub fn from_tour(tour: Vec<usize>, evaluator: &RouteEvaluator<'_>) -> Self {
        let solution = Split::split(&tour, evaluator);
        Individual::new(tour, solution)
    }

    /// Wrap an already decoded solution. The tour lists routed stops first,
    /// then the unassigned ones.
    pub fn from_solution(solution: Solution) -> Self {
        let mut tour = solution.giant_tour();
        tour.extend(solution.unassigned.iter().copied());
        Individual::new(tour, solution)
    }

    fn new(tour: Vec<usize>, solution: Solution) -> Self {
        let fitness = 1.0 / (1.0 + solution.cost);
        Individual {
            tour,
            solution,
            fitness,
        }
    }

    /// Get the cost of the solution.
    pub fn cost(&self) -> f64 {
        self.solution.cost
    }

    /// Check if this individual is a clone of another.
    pub fn is_clone_of(&self, other: &Individual) -> bool {
        self.tour == other.tour
    }
}

impl PartialEq for Individual {
    fn eq(&self, other: &Self) -> bool {
        self.solution.cost == other.solution.cost
    }
}

impl Eq for Individual {}

impl PartialOrd for Individual {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Individual {
    /// Lower cost orders first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.solution.cost.total_cmp(&other.solution.cost)
    }
}
