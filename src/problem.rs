//! Problem definition and data structures for the routing engine.

use crate::error::OptimizationError;
use crate::traffic::{haversine_km, TrafficModel};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::ops::Add;
use std::str::FromStr;
use std::time::Duration as StdDuration;

/// A geographic point on the WGS-84 ellipsoid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    /// Create a new unnamed location.
    pub fn new(id: impl Into<String>, lat: f64, lng: f64) -> Self {
        Location {
            id: id.into(),
            name: None,
            address: None,
            lat,
            lng,
        }
    }

    /// Attach a display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name if present, id otherwise.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Delivery urgency. Variants are declared in ascending order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
    Critical,
}

/// Delivery window for a stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default)]
    pub is_flexible: bool,
    /// RON charged for every minute past `end`
    #[serde(default)]
    pub penalty_per_minute_late: f64,
}

/// Weight (kg), volume (m³) and pallet quantities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Load {
    pub weight: f64,
    pub volume: f64,
    pub pallets: f64,
}

impl Load {
    pub fn new(weight: f64, volume: f64, pallets: f64) -> Self {
        Load {
            weight,
            volume,
            pallets,
        }
    }

    /// Check that no dimension exceeds the matching capacity dimension.
    pub fn fits_within(&self, capacity: &Load) -> bool {
        const EPS: f64 = 1e-9;
        self.weight <= capacity.weight + EPS
            && self.volume <= capacity.volume + EPS
            && self.pallets <= capacity.pallets + EPS
    }
}

impl Add for Load {
    type Output = Load;

    fn add(self, other: Load) -> Load {
        Load {
            weight: self.weight + other.weight,
            volume: self.volume + other.volume,
            pallets: self.pallets + other.pallets,
        }
    }
}

/// A customer stop to be served by exactly one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStop {
    pub id: String,
    pub location: Location,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub time_window: Option<TimeWindow>,
    #[serde(default)]
    pub service_time_minutes: f64,
    #[serde(default)]
    pub demand_weight: f64,
    #[serde(default)]
    pub demand_volume: f64,
    #[serde(default)]
    pub demand_pallets: f64,
    /// Skills the serving vehicle must carry (e.g. `COLD_CHAIN`)
    #[serde(default)]
    pub required_skills: Vec<String>,
}

impl DeliveryStop {
    /// Create a stop with no demand, no window and normal priority.
    pub fn new(id: impl Into<String>, location: Location) -> Self {
        DeliveryStop {
            id: id.into(),
            location,
            priority: Priority::Normal,
            time_window: None,
            service_time_minutes: 0.0,
            demand_weight: 0.0,
            demand_volume: 0.0,
            demand_pallets: 0.0,
            required_skills: Vec::new(),
        }
    }

    pub fn with_demand(mut self, weight: f64, volume: f64, pallets: f64) -> Self {
        self.demand_weight = weight;
        self.demand_volume = volume;
        self.demand_pallets = pallets;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_time_window(mut self, window: TimeWindow) -> Self {
        self.time_window = Some(window);
        self
    }

    pub fn with_service_time(mut self, minutes: f64) -> Self {
        self.service_time_minutes = minutes;
        self
    }

    pub fn with_required_skill(mut self, skill: impl Into<String>) -> Self {
        self.required_skills.push(skill.into());
        self
    }

    /// Demand of this stop as a load vector.
    pub fn demand(&self) -> Load {
        Load::new(self.demand_weight, self.demand_volume, self.demand_pallets)
    }
}

/// A delivery vehicle and its cost profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    pub name: String,
    pub capacity_weight: f64,
    pub capacity_volume: f64,
    pub capacity_pallets: f64,
    pub fuel_consumption_l100km: f64,
    pub cost_per_km: f64,
    pub fixed_daily_cost: f64,
    pub max_working_minutes: f64,
    pub depot: Location,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl Vehicle {
    /// Capacity of this vehicle as a load vector.
    pub fn capacity(&self) -> Load {
        Load::new(
            self.capacity_weight,
            self.capacity_volume,
            self.capacity_pallets,
        )
    }

    /// Check that the vehicle carries every skill the stop requires.
    pub fn has_skills_for(&self, stop: &DeliveryStop) -> bool {
        stop.required_skills
            .iter()
            .all(|skill| self.skills.iter().any(|s| s == skill))
    }
}

/// Optimization strategy requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Algorithm {
    NearestNeighbor,
    Savings,
    Sweep,
    Genetic,
    SimulatedAnnealing,
    TabuSearch,
    AntColony,
    Hybrid,
}

impl Algorithm {
    pub const ALL: [Algorithm; 8] = [
        Algorithm::NearestNeighbor,
        Algorithm::Savings,
        Algorithm::Sweep,
        Algorithm::Genetic,
        Algorithm::SimulatedAnnealing,
        Algorithm::TabuSearch,
        Algorithm::AntColony,
        Algorithm::Hybrid,
    ];

    /// Wire name of the algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::NearestNeighbor => "NEAREST_NEIGHBOR",
            Algorithm::Savings => "SAVINGS",
            Algorithm::Sweep => "SWEEP",
            Algorithm::Genetic => "GENETIC",
            Algorithm::SimulatedAnnealing => "SIMULATED_ANNEALING",
            Algorithm::TabuSearch => "TABU_SEARCH",
            Algorithm::AntColony => "ANT_COLONY",
            Algorithm::Hybrid => "HYBRID",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Algorithm::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == normalized)
            .ok_or_else(|| format!("unknown algorithm '{}'", s))
    }
}

/// Per-request knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizationOptions {
    /// Strategy to run; HYBRID when absent
    pub algorithm: Option<Algorithm>,
    pub include_traffic: bool,
    pub respect_time_windows: bool,
    /// Iteration budget for metaheuristics; per-algorithm default when absent
    pub max_iterations: Option<usize>,
    /// Seed for the pseudo-random generator; a fresh one when absent
    pub seed: Option<u64>,
    /// Wall-clock budget after which searches return their best solution
    pub timeout: Option<StdDuration>,
    /// Remove trailing stops from infeasible routes until they become feasible
    pub drop_infeasible_stops: bool,
}

impl Default for OptimizationOptions {
    fn default() -> Self {
        OptimizationOptions {
            algorithm: None,
            include_traffic: true,
            respect_time_windows: true,
            max_iterations: None,
            seed: None,
            timeout: None,
            drop_infeasible_stops: false,
        }
    }
}

impl OptimizationOptions {
    /// The algorithm that will run.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm.unwrap_or(Algorithm::Hybrid)
    }
}

/// Input of a single optimization call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub stops: Vec<DeliveryStop>,
    pub vehicles: Vec<Vehicle>,
    pub depot: Location,
    pub departure_time: NaiveDateTime,
    #[serde(default)]
    pub options: OptimizationOptions,
}

impl RouteRequest {
    /// Reject requests the engine cannot work on.
    pub fn validate(&self) -> Result<(), OptimizationError> {
        if self.stops.is_empty() {
            return Err(OptimizationError::InvalidInput(
                "no stops to optimize".to_string(),
            ));
        }
        if self.vehicles.is_empty() {
            return Err(OptimizationError::InvalidInput(
                "no vehicles available".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for stop in &self.stops {
            if !seen.insert(stop.id.as_str()) {
                return Err(OptimizationError::InvalidInput(format!(
                    "duplicate stop id '{}'",
                    stop.id
                )));
            }
            check_coordinates(&stop.location)?;
        }

        for vehicle in &self.vehicles {
            let cap = vehicle.capacity();
            if cap.weight < 0.0 || cap.volume < 0.0 || cap.pallets < 0.0 {
                return Err(OptimizationError::InvalidInput(format!(
                    "vehicle '{}' has a negative capacity",
                    vehicle.id
                )));
            }
            check_coordinates(&vehicle.depot)?;
        }

        check_coordinates(&self.depot)
    }
}

fn check_coordinates(location: &Location) -> Result<(), OptimizationError> {
    if location.lat.is_finite()
        && location.lng.is_finite()
        && (-90.0..=90.0).contains(&location.lat)
        && (-180.0..=180.0).contains(&location.lng)
    {
        Ok(())
    } else {
        Err(OptimizationError::InvalidInput(format!(
            "location '{}' has invalid coordinates",
            location.id
        )))
    }
}

/// An indexed routing instance built from a validated request.
///
/// Node layout: `0` is the request depot, `1..=n` are the stops in request
/// order, followed by one node per vehicle depot.
#[derive(Debug, Clone)]
pub struct Problem {
    pub depot: Location,
    pub stops: Vec<DeliveryStop>,
    pub vehicles: Vec<Vehicle>,
    pub departure_time: NaiveDateTime,
    pub options: OptimizationOptions,
    pub traffic: TrafficModel,
    pub locations: Vec<Location>,
    pub distance_matrix: Vec<Vec<f64>>,
}

impl Problem {
    /// Node index of the request depot.
    pub const DEPOT: usize = 0;

    /// Create a new routing instance from a request.
    pub fn new(request: &RouteRequest, traffic: TrafficModel) -> Self {
        let mut locations = Vec::with_capacity(1 + request.stops.len() + request.vehicles.len());
        locations.push(request.depot.clone());
        locations.extend(request.stops.iter().map(|s| s.location.clone()));
        locations.extend(request.vehicles.iter().map(|v| v.depot.clone()));

        let distance_matrix = Self::compute_distance_matrix(&locations);

        Problem {
            depot: request.depot.clone(),
            stops: request.stops.clone(),
            vehicles: request.vehicles.clone(),
            departure_time: request.departure_time,
            options: request.options.clone(),
            traffic,
            locations,
            distance_matrix,
        }
    }

    /// Generate the full distance matrix for all nodes.
    fn compute_distance_matrix(locations: &[Location]) -> Vec<Vec<f64>> {
        let n = locations.len();
        let mut matrix = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in (i + 1)..n {
                let d = haversine_km(&locations[i], &locations[j]);
                matrix[i][j] = d;
                matrix[j][i] = d;
            }
        }

        matrix
    }

    /// Number of stops.
    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    /// Number of vehicles.
    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    /// Node index of a stop.
    pub fn stop_node(&self, stop: usize) -> usize {
        stop + 1
    }

    /// Node index of a vehicle's depot.
    pub fn vehicle_depot_node(&self, vehicle: usize) -> usize {
        self.stops.len() + 1 + vehicle
    }

    /// Distance in km between two nodes.
    pub fn get_distance(&self, from: usize, to: usize) -> f64 {
        self.distance_matrix[from][to]
    }

    /// Driving minutes between two nodes when leaving at `at`.
    pub fn travel_minutes(&self, from: usize, to: usize, at: NaiveDateTime) -> f64 {
        self.traffic.travel_minutes(
            self.get_distance(from, to),
            &self.locations[from],
            at,
            self.options.include_traffic,
        )
    }

    /// Wall-clock time `minutes` after departure.
    pub fn time_at(&self, minutes: f64) -> NaiveDateTime {
        self.departure_time + Duration::milliseconds((minutes * 60_000.0).round() as i64)
    }

    /// Minutes between departure and `time` (negative when earlier).
    pub fn minutes_since_departure(&self, time: NaiveDateTime) -> f64 {
        (time - self.departure_time).num_milliseconds() as f64 / 60_000.0
    }

    /// The vehicle with the largest weight capacity, first on ties.
    pub fn largest_vehicle(&self) -> usize {
        let mut best = 0;
        for (v, vehicle) in self.vehicles.iter().enumerate() {
            if vehicle.capacity_weight > self.vehicles[best].capacity_weight {
                best = v;
            }
        }
        best
    }

    /// Check whether vehicle `vehicle` could serve stop `stop` on its own.
    pub fn can_serve(&self, vehicle: usize, stop: usize) -> bool {
        let v = &self.vehicles[vehicle];
        let s = &self.stops[stop];
        v.has_skills_for(s) && s.demand().fits_within(&v.capacity())
    }

    /// Calculate the total demand of a set of stops.
    pub fn total_demand(&self, stops: &[usize]) -> Load {
        stops
            .iter()
            .fold(Load::default(), |acc, &s| acc + self.stops[s].demand())
    }
}
