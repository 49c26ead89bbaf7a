//! Tests for the genetic algorithm operators and population management.

use chrono::{NaiveDate, NaiveDateTime};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use route_optimizer::construction::NearestNeighbor;
use route_optimizer::evaluation::RouteEvaluator;
use route_optimizer::genetic::Genetic;
use route_optimizer::individual::Individual;
use route_optimizer::population::Population;
use route_optimizer::problem::Problem;
use route_optimizer::solution::Solution;
use route_optimizer::traffic::TrafficModel;
use route_optimizer::{
    CancellationToken, Config, DeliveryStop, Location, OptimizationOptions, RouteRequest,
    SearchContext, Strategy, Vehicle,
};

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

/// Eight 100 kg stops and two 500 kg vans.
fn create_test_problem() -> Problem {
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
        options: OptimizationOptions {
            include_traffic: false,
            max_iterations: Some(10),
            ..OptimizationOptions::default()
        },
    };
    Problem::new(&request, TrafficModel::default())
}

fn small_config() -> Config {
    Config::default().with_population_size(10).with_n_elite(2)
}

fn is_permutation(tour: &[usize], n: usize) -> bool {
    let mut sorted = tour.to_vec();
    sorted.sort_unstable();
    sorted == (0..n).collect::<Vec<_>>()
}

#[test]
fn test_crossover_produces_permutation() {
    let p1: Vec<usize> = (0..8).collect();
    let p2: Vec<usize> = vec![7, 3, 5, 1, 0, 6, 2, 4];

    for seed in 0..20 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let child = Genetic::crossover(&p1, &p2, &mut rng);
        assert!(is_permutation(&child, 8), "seed {} gave {:?}", seed, child);
    }
}

#[test]
fn test_crossover_of_identical_parents() {
    let parent = vec![4, 2, 0, 3, 1];
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    // Whatever the cut points, the child equals the parent
    for _ in 0..10 {
        assert_eq!(Genetic::crossover(&parent, &parent, &mut rng), parent);
    }
}

#[test]
fn test_crossover_empty_tour() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    assert!(Genetic::crossover(&[], &[], &mut rng).is_empty());
}

#[test]
fn test_mutation_keeps_route_membership() {
    let problem = create_test_problem();
    let config = small_config();
    let evaluator = RouteEvaluator::new(&problem, &config);
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let original = Solution::from_routes(vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]], vec![]);
    for _ in 0..20 {
        let mut mutated = original.clone();
        if Genetic::mutate(&mut mutated, &evaluator, &mut rng) {
            for (before, after) in original.routes.iter().zip(&mutated.routes) {
                let mut a = before.stops.clone();
                let mut b = after.stops.clone();
                a.sort_unstable();
                b.sort_unstable();
                assert_eq!(a, b);
            }
        }
    }
}

#[test]
fn test_mutation_needs_two_stops() {
    let problem = create_test_problem();
    let config = small_config();
    let evaluator = RouteEvaluator::new(&problem, &config);
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let mut solution = Solution::from_routes(vec![vec![0], vec![1]], (2..8).collect());
    assert!(!Genetic::mutate(&mut solution, &evaluator, &mut rng));
    assert_eq!(solution.routes[0].stops, vec![0]);
}

#[test]
fn test_individual_from_tour() {
    let problem = create_test_problem();
    let config = small_config();
    let evaluator = RouteEvaluator::new(&problem, &config);

    let individual = Individual::from_tour((0..8).collect(), &evaluator);

    assert!(individual.solution.is_partition_of(8));
    assert!((individual.fitness - 1.0 / (1.0 + individual.cost())).abs() < 1e-12);
    assert!(individual.is_clone_of(&individual.clone()));
}

#[test]
fn test_population_initialization() {
    let problem = create_test_problem();
    let config = small_config();
    let evaluator = RouteEvaluator::new(&problem, &config);
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let mut seed = NearestNeighbor::build(&evaluator);
    evaluator.evaluate(&mut seed);
    let seed_cost = seed.cost;

    let mut population = Population::new(&config);
    population.initialize(vec![seed], &evaluator, &mut rng);

    assert_eq!(population.len(), 10);
    for pair in population.individuals.windows(2) {
        assert!(pair[0].cost() <= pair[1].cost());
    }
    assert!(population.best().map_or(false, |b| b.cost() <= seed_cost));
    assert_eq!(population.elites().len(), 2);

    let parent = population.select_parent(&mut rng);
    assert!(population.individuals.iter().any(|i| i.is_clone_of(parent)));
}

#[test]
fn test_population_replace_drops_clones() {
    let problem = create_test_problem();
    let config = small_config();
    let evaluator = RouteEvaluator::new(&problem, &config);

    let forward = Individual::from_tour((0..8).collect(), &evaluator);
    let backward = Individual::from_tour((0..8).rev().collect(), &evaluator);
    let next = vec![forward.clone(), backward.clone(), forward.clone(), backward];

    let mut population = Population::new(&config);
    population.replace(next);

    assert_eq!(population.len(), 2);
    assert!(!population.individuals[0].is_clone_of(&population.individuals[1]));
    assert!(population.individuals.iter().any(|i| i.is_clone_of(&forward)));
}

#[test]
fn test_genetic_not_worse_than_nearest_neighbor() {
    let problem = create_test_problem();
    let config = small_config();
    let evaluator = RouteEvaluator::new(&problem, &config);
    let cancel = CancellationToken::new();

    let mut nn = NearestNeighbor::build(&evaluator);
    evaluator.evaluate(&mut nn);

    let mut ctx = SearchContext::new(&problem, &config, &cancel, 42);
    let solution = Genetic.solve(&mut ctx);

    assert!(solution.is_partition_of(8));
    assert!(solution.is_capacity_feasible(&problem));
    assert!(solution.cost <= nn.cost + 1e-6);
    assert!(!ctx.stopped_early());
}

#[test]
fn test_genetic_is_reproducible() {
    let problem = create_test_problem();
    let config = small_config();
    let cancel = CancellationToken::new();

    let mut first = SearchContext::new(&problem, &config, &cancel, 99);
    let mut second = SearchContext::new(&problem, &config, &cancel, 99);

    assert_eq!(Genetic.solve(&mut first), Genetic.solve(&mut second));
}
