//! Configuration parameters for the route optimizer.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration settings shared by every optimization strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Average urban driving speed (km/h) before traffic adjustment
    pub base_speed_kmh: f64,
    /// Diesel price (RON per litre)
    pub fuel_price_ron: f64,
    /// CO2 emitted per litre of diesel (kg)
    pub co2_kg_per_liter: f64,
    /// Objective penalty per minute beyond a vehicle's working time
    pub overtime_penalty_per_minute: f64,
    /// Objective penalty per stop left unassigned
    pub unassigned_penalty: f64,
    /// Waiting time (minutes) above which a route gets a long-wait warning
    pub long_wait_minutes: f64,

    /// Number of individuals in the genetic population
    pub population_size: usize,
    /// Number of elite individuals copied unchanged into each generation
    pub n_elite: usize,
    /// Tournament size used for parent selection
    pub tournament_size: usize,
    /// Probability of applying swap mutation to an offspring
    pub mutation_rate: f64,
    /// Generations when the request does not set `max_iterations`
    pub default_generations: usize,

    /// Starting temperature for simulated annealing
    pub initial_temperature: f64,
    /// Geometric cooling factor applied every iteration
    pub cooling_rate: f64,
    /// Temperature floor
    pub min_temperature: f64,
    /// Annealing iterations when the request does not set `max_iterations`
    pub default_annealing_iterations: usize,

    /// Number of iterations a reversed move stays forbidden
    pub tabu_tenure: usize,
    /// Non-improving iterations after which tabu search stops early
    pub tabu_stall_limit: usize,
    /// Tabu iterations when the request does not set `max_iterations`
    pub default_tabu_iterations: usize,

    /// Ants per colony iteration
    pub n_ants: usize,
    /// Pheromone exponent (alpha)
    pub pheromone_weight: f64,
    /// Inverse-distance exponent (beta)
    pub heuristic_weight: f64,
    /// Fraction of pheromone removed each iteration
    pub evaporation_rate: f64,
    /// Pheromone deposited on the iteration-best tour, divided by its cost
    pub pheromone_deposit: f64,
    /// Lower bound that keeps every edge selectable
    pub min_pheromone: f64,
    /// Colony iterations when the request does not set `max_iterations`
    pub default_ant_iterations: usize,

    /// Instances with fewer stops start the hybrid from nearest neighbor
    pub hybrid_small_instance: usize,
    /// Instances up to this size are refined with tabu search, larger ones
    /// with simulated annealing
    pub hybrid_tabu_max_stops: usize,
    /// Passes of the final local search polish
    pub local_search_passes: usize,

    /// Upper bound on a call to the external routing provider
    pub provider_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_speed_kmh: 35.0,
            fuel_price_ron: 7.50,
            co2_kg_per_liter: 2.68,
            overtime_penalty_per_minute: 50.0,
            unassigned_penalty: 10_000.0,
            long_wait_minutes: 60.0,
            population_size: 50,
            n_elite: 5,
            tournament_size: 3,
            mutation_rate: 0.1,
            default_generations: 100,
            initial_temperature: 1000.0,
            cooling_rate: 0.995,
            min_temperature: 0.01,
            default_annealing_iterations: 1000,
            tabu_tenure: 20,
            tabu_stall_limit: 100,
            default_tabu_iterations: 500,
            n_ants: 20,
            pheromone_weight: 1.0,
            heuristic_weight: 2.0,
            evaporation_rate: 0.5,
            pheromone_deposit: 100.0,
            min_pheromone: 1e-6,
            default_ant_iterations: 100,
            hybrid_small_instance: 5,
            hybrid_tabu_max_stops: 30,
            local_search_passes: 100,
            provider_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Set the base driving speed.
    pub fn with_base_speed_kmh(mut self, speed: f64) -> Self {
        self.base_speed_kmh = speed;
        self
    }

    /// Set the fuel price.
    pub fn with_fuel_price_ron(mut self, price: f64) -> Self {
        self.fuel_price_ron = price;
        self
    }

    /// Set the penalty charged per unassigned stop.
    pub fn with_unassigned_penalty(mut self, penalty: f64) -> Self {
        self.unassigned_penalty = penalty;
        self
    }

    /// Set the overtime penalty per minute.
    pub fn with_overtime_penalty_per_minute(mut self, penalty: f64) -> Self {
        self.overtime_penalty_per_minute = penalty;
        self
    }

    /// Set the genetic population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Set the number of elite individuals.
    pub fn with_n_elite(mut self, n: usize) -> Self {
        self.n_elite = n;
        self
    }

    /// Set the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Set the annealing schedule.
    pub fn with_annealing_schedule(mut self, initial: f64, cooling_rate: f64) -> Self {
        self.initial_temperature = initial;
        self.cooling_rate = cooling_rate;
        self
    }

    /// Set the tabu tenure.
    pub fn with_tabu_tenure(mut self, tenure: usize) -> Self {
        self.tabu_tenure = tenure;
        self
    }

    /// Set the number of ants.
    pub fn with_n_ants(mut self, n: usize) -> Self {
        self.n_ants = n;
        self
    }

    /// Set the pheromone evaporation rate.
    pub fn with_evaporation_rate(mut self, rate: f64) -> Self {
        self.evaporation_rate = rate;
        self
    }

    /// Set the routing provider timeout.
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }
}
