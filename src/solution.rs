//! Internal plan representation shared by every search strategy.

use crate::problem::{Load, Problem};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The ordered stops of one vehicle. Stop values index `Problem::stops`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub vehicle: usize,
    pub stops: Vec<usize>,
}

impl Route {
    /// Create a new, empty route for a vehicle.
    pub fn new(vehicle: usize) -> Self {
        Route {
            vehicle,
            stops: Vec::new(),
        }
    }

    /// Create a route with a given stop sequence.
    pub fn with_stops(vehicle: usize, stops: Vec<usize>) -> Self {
        Route { vehicle, stops }
    }

    /// Check if the route is empty.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Total demand carried by this route.
    pub fn load(&self, problem: &Problem) -> Load {
        problem.total_demand(&self.stops)
    }

    /// Check that the route never exceeds its vehicle's capacity.
    pub fn fits_capacity(&self, problem: &Problem) -> bool {
        self.load(problem)
            .fits_within(&problem.vehicles[self.vehicle].capacity())
    }

    /// Check that the vehicle has every skill the route requires.
    pub fn fits_skills(&self, problem: &Problem) -> bool {
        let vehicle = &problem.vehicles[self.vehicle];
        self.stops
            .iter()
            .all(|&s| vehicle.has_skills_for(&problem.stops[s]))
    }
}

/// A complete assignment: one route per vehicle plus the stops left out.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Indexed by vehicle; routes may be empty
    pub routes: Vec<Route>,
    /// Stops not served by any vehicle
    pub unassigned: Vec<usize>,
    /// Objective value; `f64::INFINITY` until evaluated
    pub cost: f64,
}

impl Solution {
    /// Create a solution with an empty route per vehicle and nothing assigned.
    pub fn new(problem: &Problem) -> Self {
        Solution {
            routes: (0..problem.vehicle_count()).map(Route::new).collect(),
            unassigned: Vec::new(),
            cost: f64::INFINITY,
        }
    }

    /// Create a solution from per-vehicle stop sequences.
    pub fn from_routes(routes: Vec<Vec<usize>>, unassigned: Vec<usize>) -> Self {
        Solution {
            routes: routes
                .into_iter()
                .enumerate()
                .map(|(v, stops)| Route::with_stops(v, stops))
                .collect(),
            unassigned,
            cost: f64::INFINITY,
        }
    }

    /// Number of stops served by some vehicle.
    pub fn assigned_count(&self) -> usize {
        self.routes.iter().map(Route::len).sum()
    }

    /// Number of vehicles with at least one stop.
    pub fn used_vehicles(&self) -> usize {
        self.routes.iter().filter(|r| !r.is_empty()).count()
    }

    /// All assigned stops in route order, routes concatenated.
    pub fn giant_tour(&self) -> Vec<usize> {
        self.routes
            .iter()
            .flat_map(|r| r.stops.iter().copied())
            .collect()
    }

    /// Route index and position of a stop.
    pub fn position_of(&self, stop: usize) -> Option<(usize, usize)> {
        self.routes.iter().enumerate().find_map(|(r, route)| {
            route
                .stops
                .iter()
                .position(|&s| s == stop)
                .map(|pos| (r, pos))
        })
    }

    /// Check every route against its vehicle's capacity and skills.
    pub fn is_capacity_feasible(&self, problem: &Problem) -> bool {
        self.routes
            .iter()
            .all(|r| r.fits_capacity(problem) && r.fits_skills(problem))
    }

    /// Check that every stop appears exactly once across routes and the
    /// unassigned list.
    pub fn is_partition_of(&self, stop_count: usize) -> bool {
        let mut seen = vec![false; stop_count];
        for &s in self.giant_tour().iter().chain(self.unassigned.iter()) {
            if s >= stop_count || seen[s] {
                return false;
            }
            seen[s] = true;
        }
        seen.into_iter().all(|x| x)
    }
}

impl fmt::Debug for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solution:")?;
        writeln!(f, "  Cost: {:.2}", self.cost)?;
        writeln!(f, "  Routes: {}", self.used_vehicles())?;

        for route in self.routes.iter().filter(|r| !r.is_empty()) {
            writeln!(f, "  Vehicle {}: {:?}", route.vehicle, route.stops)?;
        }

        if !self.unassigned.is_empty() {
            writeln!(f, "  Unassigned: {:?}", self.unassigned)?;
        }

        Ok(())
    }
}
