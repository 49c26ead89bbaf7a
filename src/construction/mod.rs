//! Construction heuristics that build an initial solution from scratch.
//!
//! All three are deterministic. Time windows are soft here: a stop that can
//! only be reached late is still placed and its lateness is penalised by the
//! evaluator.

pub mod nearest_neighbor;
pub mod savings;
pub mod sweep;

pub use self::nearest_neighbor::NearestNeighbor;
pub use self::savings::Savings;
pub use self::sweep::Sweep;

use crate::problem::Problem;

/// Stops that no vehicle in the fleet can serve on its own.
pub(crate) fn unservable_stops(problem: &Problem) -> Vec<usize> {
    (0..problem.stop_count())
        .filter(|&s| !(0..problem.vehicle_count()).any(|v| problem.can_serve(v, s)))
        .collect()
}
