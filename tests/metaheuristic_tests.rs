//! Tests for simulated annealing, tabu search, ant colony and the hybrid
//! strategy, and for the shared search context.

use chrono::{NaiveDate, NaiveDateTime};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use route_optimizer::annealing::SimulatedAnnealing;
use route_optimizer::ant_colony::{AntColony, PheromoneMatrix};
use route_optimizer::construction::{NearestNeighbor, Savings};
use route_optimizer::evaluation::RouteEvaluator;
use route_optimizer::hybrid::Hybrid;
use route_optimizer::problem::Problem;
use route_optimizer::solution::Solution;
use route_optimizer::strategy::strategy_for;
use route_optimizer::tabu::{MoveAttribute, TabuList, TabuSearch};
use route_optimizer::traffic::TrafficModel;
use route_optimizer::{
    Algorithm, CancellationToken, Config, DeliveryStop, Location, OptimizationOptions,
    RouteRequest, SearchContext, Strategy, Vehicle,
};
use std::time::Duration;

fn departure() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 13)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .unwrap()
}

fn depot() -> Location {
    Location::new("depot", 44.4268, 26.1025)
}

fn vehicle(id: &str) -> Vehicle {
    Vehicle {
        id: id.to_string(),
        name: format!("Van {}", id),
        capacity_weight: 500.0,
        capacity_volume: 10.0,
        capacity_pallets: 8.0,
        fuel_consumption_l100km: 12.0,
        cost_per_km: 1.5,
        fixed_daily_cost: 100.0,
        max_working_minutes: 600.0,
        depot: depot(),
        skills: Vec::new(),
    }
}

/// Eight 100 kg stops, two 500 kg vans and a small iteration budget.
fn create_test_problem(options: OptimizationOptions) -> Problem {
    let points = [
        ("victoriei", 44.4500, 26.0900),
        ("romana", 44.4350, 26.0800),
        ("unirii", 44.4100, 26.1200),
        ("aviatorilor", 44.4600, 26.1400),
        ("crangasi", 44.4200, 26.0600),
        ("floreasca", 44.4450, 26.1300),
        ("berceni", 44.3900, 26.1500),
        ("baneasa", 44.4700, 26.0700),
    ];
    let stops = points
        .iter()
        .map(|&(id, lat, lng)| {
            DeliveryStop::new(id, Location::new(id, lat, lng))
                .with_demand(100.0, 0.5, 0.0)
                .with_service_time(10.0)
        })
        .collect();

    let request = RouteRequest {
        stops,
        vehicles: vec![vehicle("v1"), vehicle("v2")],
        depot: depot(),
        departure_time: departure(),
        options,
    };
    Problem::new(&request, TrafficModel::default())
}

fn budget(iterations: usize) -> OptimizationOptions {
    OptimizationOptions {
        max_iterations: Some(iterations),
        ..OptimizationOptions::default()
    }
}

fn small_config() -> Config {
    Config::default().with_population_size(10).with_n_ants(5)
}

fn nearest_neighbor_cost(problem: &Problem, config: &Config) -> f64 {
    let evaluator = RouteEvaluator::new(problem, config);
    let mut solution = NearestNeighbor::build(&evaluator);
    evaluator.evaluate(&mut solution);
    solution.cost
}

fn solve(strategy: &dyn Strategy, problem: &Problem, config: &Config, seed: u64) -> Solution {
    let cancel = CancellationToken::new();
    let mut ctx = SearchContext::new(problem, config, &cancel, seed);
    strategy.solve(&mut ctx)
}

#[test]
fn test_annealing_not_worse_than_start() {
    let problem = create_test_problem(budget(300));
    let config = small_config();

    let solution = solve(&SimulatedAnnealing, &problem, &config, 1);

    assert!(solution.is_partition_of(8));
    assert!(solution.is_capacity_feasible(&problem));
    assert!(solution.cost <= nearest_neighbor_cost(&problem, &config) + 1e-6);
}

#[test]
fn test_tabu_not_worse_than_start() {
    let problem = create_test_problem(budget(50));
    let config = small_config();

    let solution = solve(&TabuSearch, &problem, &config, 1);

    assert!(solution.is_partition_of(8));
    assert!(solution.is_capacity_feasible(&problem));
    assert!(solution.cost <= nearest_neighbor_cost(&problem, &config) + 1e-6);
}

#[test]
fn test_hybrid_not_worse_than_savings() {
    let problem = create_test_problem(budget(50));
    let config = small_config();
    let evaluator = RouteEvaluator::new(&problem, &config);
    let mut savings = Savings::build(&evaluator);
    evaluator.evaluate(&mut savings);

    let solution = solve(&Hybrid, &problem, &config, 1);

    assert!(solution.is_partition_of(8));
    assert!(solution.is_capacity_feasible(&problem));
    assert!(solution.cost <= savings.cost + 1e-6);
}

#[test]
fn test_ant_colony_builds_valid_plans() {
    let problem = create_test_problem(budget(10));
    let config = small_config();

    let solution = solve(&AntColony, &problem, &config, 1);

    assert!(solution.is_partition_of(8));
    assert!(solution.is_capacity_feasible(&problem));
    assert!(solution.unassigned.is_empty());
}

#[test]
fn test_ant_tour_visits_every_stop() {
    let problem = create_test_problem(budget(10));
    let pheromone = PheromoneMatrix::new(problem.stop_count(), 1.0, 1e-6);
    let mut rng = ChaCha8Rng::seed_from_u64(8);

    let mut tour = AntColony::construct_tour(&problem, &pheromone, 1.0, 2.0, &mut rng);
    tour.sort_unstable();

    assert_eq!(tour, (0..8).collect::<Vec<_>>());
}

#[test]
fn test_pheromone_evaporation_and_deposit() {
    let mut pheromone = PheromoneMatrix::new(2, 1.0, 0.1);

    pheromone.evaporate(0.5);
    assert!((pheromone.get(0, 1) - 0.5).abs() < 1e-12);

    // Evaporation never goes below the floor
    for _ in 0..10 {
        pheromone.evaporate(0.5);
    }
    assert!((pheromone.get(0, 1) - 0.1).abs() < 1e-12);

    let solution = Solution::from_routes(vec![vec![1, 0]], vec![]);
    pheromone.deposit(&solution, 2.0);
    assert!((pheromone.get(0, 2) - 2.1).abs() < 1e-12);
    assert!((pheromone.get(2, 1) - 2.1).abs() < 1e-12);
    assert!((pheromone.get(1, 0) - 2.1).abs() < 1e-12);
    assert!((pheromone.get(0, 1) - 0.1).abs() < 1e-12);
}

#[test]
fn test_tabu_list_is_bounded() {
    let mut tabu = TabuList::new(2);
    let a = MoveAttribute::Placement { stop: 0, route: 0 };
    let b = MoveAttribute::Placement { stop: 1, route: 0 };
    let c = MoveAttribute::Exchange(2, 3);

    tabu.push(a);
    tabu.push(b);
    tabu.push(c);

    assert_eq!(tabu.len(), 2);
    assert!(!tabu.contains(&a));
    assert!(tabu.contains(&b));
    assert!(tabu.contains(&c));
}

#[test]
fn test_stochastic_strategies_are_reproducible() {
    let problem = create_test_problem(budget(20));
    let config = small_config();

    for algorithm in [
        Algorithm::Genetic,
        Algorithm::SimulatedAnnealing,
        Algorithm::TabuSearch,
        Algorithm::AntColony,
        Algorithm::Hybrid,
    ] {
        let strategy = strategy_for(algorithm);
        let first = solve(strategy.as_ref(), &problem, &config, 2024);
        let second = solve(strategy.as_ref(), &problem, &config, 2024);
        assert_eq!(first, second, "{} is not reproducible", algorithm);
    }
}

#[test]
fn test_cancelled_search_returns_a_plan() {
    let problem = create_test_problem(budget(1000));
    let config = small_config();
    let cancel = CancellationToken::new();
    cancel.cancel();

    for algorithm in [
        Algorithm::Genetic,
        Algorithm::SimulatedAnnealing,
        Algorithm::TabuSearch,
        Algorithm::AntColony,
    ] {
        let mut ctx = SearchContext::new(&problem, &config, &cancel, 7);
        let solution = strategy_for(algorithm).solve(&mut ctx);

        assert!(ctx.stopped_early(), "{}", algorithm);
        assert!(solution.is_partition_of(8), "{}", algorithm);
    }
}

#[test]
fn test_zero_timeout_stops_immediately() {
    let problem = create_test_problem(OptimizationOptions {
        timeout: Some(Duration::ZERO),
        ..budget(1000)
    });
    let config = small_config();
    let cancel = CancellationToken::new();
    let mut ctx = SearchContext::new(&problem, &config, &cancel, 7);

    assert!(ctx.should_stop());
    // Sticky once triggered
    assert!(ctx.should_stop());
    assert!(ctx.stopped_early());
}

#[test]
fn test_iteration_budget() {
    let config = small_config();
    let cancel = CancellationToken::new();

    let limited = create_test_problem(budget(12));
    assert_eq!(SearchContext::new(&limited, &config, &cancel, 0).iterations(500), 12);

    let unlimited = create_test_problem(OptimizationOptions::default());
    let ctx = SearchContext::new(&unlimited, &config, &cancel, 0);
    assert_eq!(ctx.iterations(500), 500);
    assert!(!ctx.stopped_early());
}
