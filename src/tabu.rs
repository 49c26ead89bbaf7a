//! Tabu search over the full relocate, swap and insert neighbourhood.

use crate::construction::NearestNeighbor;
use crate::local_search::{neighborhood, Move};
use crate::problem::Algorithm;
use crate::solution::Solution;
use crate::strategy::{SearchContext, Strategy};
use log::{debug, trace};
use std::collections::VecDeque;

/// Attribute of a solution that a move creates and its reversal would undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveAttribute {
    /// `stop` placed on route `route`
    Placement { stop: usize, route: usize },
    /// Two stops exchanged, smaller index first
    Exchange(usize, usize),
}

impl MoveAttribute {
    fn exchange(a: usize, b: usize) -> Self {
        MoveAttribute::Exchange(a.min(b), a.max(b))
    }

    /// The attribute a candidate move would establish.
    pub fn created_by(mv: &Move, solution: &Solution) -> Option<Self> {
        match *mv {
            Move::Relocate { from, to } => Some(MoveAttribute::Placement {
                stop: solution.routes[from.0].stops[from.1],
                route: to.0,
            }),
            Move::Swap { a, b } => Some(Self::exchange(
                solution.routes[a.0].stops[a.1],
                solution.routes[b.0].stops[b.1],
            )),
            Move::Insert { .. } => None,
        }
    }

    /// The attribute that would undo `mv`; it becomes tabu once `mv` is
    /// applied.
    pub fn reversed_by(mv: &Move, solution: &Solution) -> Option<Self> {
        match *mv {
            Move::Relocate { from, .. } => Some(MoveAttribute::Placement {
                stop: solution.routes[from.0].stops[from.1],
                route: from.0,
            }),
            Move::Swap { .. } => Self::created_by(mv, solution),
            Move::Insert { .. } => None,
        }
    }
}

/// Bounded recency memory of forbidden attributes.
#[derive(Debug, Clone)]
pub struct TabuList {
    entries: VecDeque<MoveAttribute>,
    tenure: usize,
}

impl TabuList {
    pub fn new(tenure: usize) -> Self {
        TabuList {
            entries: VecDeque::with_capacity(tenure + 1),
            tenure,
        }
    }

    pub fn push(&mut self, attribute: MoveAttribute) {
        if self.tenure == 0 {
            return;
        }
        self.entries.push_back(attribute);
        while self.entries.len() > self.tenure {
            self.entries.pop_front();
        }
    }

    pub fn contains(&self, attribute: &MoveAttribute) -> bool {
        self.entries.contains(attribute)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TabuSearch;

impl TabuSearch {
    /// Each iteration takes the best feasible non-tabu neighbour, even when
    /// it is worse than the current solution. A tabu move is allowed when it
    /// beats the best solution found so far. The search ends after the
    /// iteration budget or `tabu_stall_limit` iterations without a new best.
    pub fn improve(ctx: &mut SearchContext<'_>, initial: Solution) -> Solution {
        let evaluator = ctx.evaluator();
        let config = ctx.config;
        let iterations = ctx.iterations(config.default_tabu_iterations);

        let mut current = initial;
        evaluator.evaluate(&mut current);
        let mut best = current.clone();
        let mut tabu = TabuList::new(config.tabu_tenure);
        let mut stall = 0;

        for iteration in 0..iterations {
            if ctx.should_stop() {
                debug!("tabu search stopped early at iteration {}", iteration);
                break;
            }

            let mut chosen: Option<(Move, f64)> = None;
            for mv in neighborhood(&current) {
                if !mv.is_feasible(&evaluator, &current) {
                    continue;
                }
                let delta = mv.delta(&evaluator, &current);
                let aspiration = current.cost + delta < best.cost - 1e-9;
                let forbidden = MoveAttribute::created_by(&mv, &current)
                    .map_or(false, |attribute| tabu.contains(&attribute));

                if (forbidden && !aspiration) || chosen.map_or(false, |(_, d)| delta >= d) {
                    continue;
                }
                chosen = Some((mv, delta));
            }

            let Some((mv, delta)) = chosen else {
                debug!("tabu search found no admissible move at iteration {}", iteration);
                break;
            };

            if let Some(attribute) = MoveAttribute::reversed_by(&mv, &current) {
                tabu.push(attribute);
            }
            mv.apply(&mut current);
            current.cost += delta;

            if current.cost < best.cost - 1e-9 {
                trace!("iteration {}: best cost {:.2}", iteration, current.cost);
                best = current.clone();
                stall = 0;
            } else {
                stall += 1;
                if stall >= config.tabu_stall_limit {
                    debug!("tabu search stalled after {} iterations", iteration + 1);
                    break;
                }
            }
        }

        evaluator.evaluate(&mut best);
        best
    }
}

impl Strategy for TabuSearch {
    fn algorithm(&self) -> Algorithm {
        Algorithm::TabuSearch
    }

    fn solve(&self, ctx: &mut SearchContext<'_>) -> Solution {
        let initial = NearestNeighbor::build(&ctx.evaluator());
        Self::improve(ctx, initial)
    }
}
