//! Swap neighborhood for local search.

use crate::solution::Solution;
use rand::Rng;

use super::{Move, Slot};

/// Every exchange of two assigned stops.
pub fn swap_moves(solution: &Solution) -> Vec<Move> {
    let slots: Vec<Slot> = solution
        .routes
        .iter()
        .enumerate()
        .flat_map(|(r, route)| (0..route.stops.len()).map(move |p| (r, p)))
        .collect();

    let mut moves = Vec::with_capacity(slots.len() * slots.len() / 2);
    for (i, &a) in slots.iter().enumerate() {
        for &b in &slots[i + 1..] {
            moves.push(Move::Swap { a, b });
        }
    }
    moves
}

/// A random exchange of two distinct assigned stops.
pub fn random_swap<R: Rng>(solution: &Solution, rng: &mut R) -> Option<Move> {
    let slots: Vec<Slot> = solution
        .routes
        .iter()
        .enumerate()
        .flat_map(|(r, route)| (0..route.stops.len()).map(move |p| (r, p)))
        .collect();
    if slots.len() < 2 {
        return None;
    }

    let i = rng.gen_range(0..slots.len());
    let mut j = rng.gen_range(0..slots.len() - 1);
    if j >= i {
        j += 1;
    }

    Some(Move::Swap {
        a: slots[i],
        b: slots[j],
    })
}
