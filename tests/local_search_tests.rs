//! Tests for neighbourhood moves and the local search polish.

use chrono::{NaiveDate, NaiveDateTime};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use route_optimizer::evaluation::RouteEvaluator;
use route_optimizer::local_search::two_opt::{reversed, two_opt_routes};
use route_optimizer::local_search::utils::{best_insertion, insert_unassigned};
use route_optimizer::local_search::{neighborhood, random_move, LocalSearch, Move};
use route_optimizer::problem::Problem;
use route_optimizer::solution::Solution;
use route_optimizer::traffic::TrafficModel;
use route_optimizer::{Config, DeliveryStop, Location, OptimizationOptions, RouteRequest, Vehicle};

fn departure() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 13)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .unwrap()
}

fn depot() -> Location {
    Location::new("depot", 44.4268, 26.1025)
}

fn vehicle(id: &str, capacity_weight: f64) -> Vehicle {
    Vehicle {
        id: id.to_string(),
        name: format!("Van {}", id),
        capacity_weight,
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

/// Creates a test problem with eight 200 kg stops and two vans.
fn create_test_problem(capacity_weight: f64) -> Problem {
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
                .with_demand(200.0, 0.5, 0.0)
                .with_service_time(10.0)
        })
        .collect();

    let request = RouteRequest {
        stops,
        vehicles: vec![vehicle("v1", capacity_weight), vehicle("v2", capacity_weight)],
        depot: depot(),
        departure_time: departure(),
        options: OptimizationOptions {
            include_traffic: false,
            ..OptimizationOptions::default()
        },
    };
    Problem::new(&request, TrafficModel::default())
}

#[test]
fn test_relocate_between_routes() {
    let mut solution = Solution::from_routes(vec![vec![0, 1], vec![2]], vec![]);

    let mv = Move::Relocate {
        from: (0, 1),
        to: (1, 0),
    };
    mv.apply(&mut solution);

    assert_eq!(solution.routes[0].stops, vec![0]);
    assert_eq!(solution.routes[1].stops, vec![1, 2]);
}

#[test]
fn test_relocate_within_route() {
    let mut solution = Solution::from_routes(vec![vec![0, 1, 2]], vec![]);

    // Target position indexes the route after removal
    Move::Relocate {
        from: (0, 0),
        to: (0, 2),
    }
    .apply(&mut solution);

    assert_eq!(solution.routes[0].stops, vec![1, 2, 0]);
}

#[test]
fn test_swap_and_insert() {
    let mut solution = Solution::from_routes(vec![vec![0, 1], vec![2]], vec![3]);

    Move::Swap { a: (0, 0), b: (1, 0) }.apply(&mut solution);
    assert_eq!(solution.routes[0].stops, vec![2, 1]);
    assert_eq!(solution.routes[1].stops, vec![0]);

    Move::Insert { stop: 3, to: (1, 1) }.apply(&mut solution);
    assert_eq!(solution.routes[1].stops, vec![0, 3]);
    assert!(solution.unassigned.is_empty());
}

#[test]
fn test_preview_does_not_touch_solution() {
    let solution = Solution::from_routes(vec![vec![0, 1], vec![2]], vec![]);
    let before = solution.clone();

    let changes = Move::Swap { a: (0, 1), b: (1, 0) }.preview(&solution);

    assert_eq!(changes, vec![(0, vec![0, 2]), (1, vec![1])]);
    assert_eq!(solution, before);
}

#[test]
fn test_delta_matches_evaluated_cost() {
    let problem = create_test_problem(1500.0);
    let config = Config::default();
    let evaluator = RouteEvaluator::new(&problem, &config);

    let mut solution = Solution::from_routes(vec![vec![0, 1, 2, 3], vec![4, 5]], vec![6, 7]);
    evaluator.evaluate(&mut solution);

    for mv in neighborhood(&solution) {
        let delta = mv.delta(&evaluator, &solution);
        let mut applied = solution.clone();
        mv.apply(&mut applied);
        evaluator.evaluate(&mut applied);
        assert!(
            (applied.cost - (solution.cost + delta)).abs() < 1e-6,
            "{:?}",
            mv
        );
    }
}

#[test]
fn test_moves_respect_capacity() {
    // 400 kg vans hold two 200 kg stops
    let problem = create_test_problem(400.0);
    let config = Config::default();
    let evaluator = RouteEvaluator::new(&problem, &config);

    let solution = Solution::from_routes(vec![vec![0, 1], vec![2]], (3..8).collect());

    let relocate_into_full = Move::Relocate {
        from: (1, 0),
        to: (0, 0),
    };
    assert!(!relocate_into_full.is_feasible(&evaluator, &solution));

    let relocate_into_free = Move::Relocate {
        from: (0, 0),
        to: (1, 1),
    };
    assert!(relocate_into_free.is_feasible(&evaluator, &solution));

    // Swaps keep loads when demands are equal
    assert!(Move::Swap { a: (0, 0), b: (1, 0) }.is_feasible(&evaluator, &solution));
    assert!(!Move::Insert { stop: 3, to: (0, 0) }.is_feasible(&evaluator, &solution));
    assert!(Move::Insert { stop: 3, to: (1, 0) }.is_feasible(&evaluator, &solution));
}

#[test]
fn test_neighborhood_size() {
    let solution = Solution::from_routes(vec![vec![0, 1], vec![2]], vec![3]);

    let moves = neighborhood(&solution);

    // 9 relocations, 3 swaps, 5 insertions
    let relocations = moves.iter().filter(|m| matches!(m, Move::Relocate { .. })).count();
    let swaps = moves.iter().filter(|m| matches!(m, Move::Swap { .. })).count();
    let inserts = moves.iter().filter(|m| matches!(m, Move::Insert { .. })).count();
    assert_eq!((relocations, swaps, inserts), (9, 3, 5));
}

#[test]
fn test_random_moves_are_applicable() {
    let problem = create_test_problem(1500.0);
    let config = Config::default();
    let evaluator = RouteEvaluator::new(&problem, &config);
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let mut solution = Solution::from_routes(vec![vec![0, 1, 2], vec![3, 4]], vec![5, 6, 7]);
    for _ in 0..200 {
        if let Some(mv) = random_move(&solution, &mut rng) {
            if mv.is_feasible(&evaluator, &solution) {
                mv.apply(&mut solution);
            }
        }
        assert!(solution.is_partition_of(8));
    }
}

#[test]
fn test_reversed_segment() {
    assert_eq!(reversed(&[0, 1, 2, 3, 4], 1, 3), vec![0, 3, 2, 1, 4]);
    assert_eq!(reversed(&[0, 1], 0, 1), vec![1, 0]);
}

#[test]
fn test_two_opt_never_worsens() {
    let problem = create_test_problem(1500.0);
    let config = Config::default();
    let evaluator = RouteEvaluator::new(&problem, &config);

    // A deliberately zig-zagging route
    let mut solution = Solution::from_routes(vec![vec![6, 7, 2, 3, 4, 5, 0, 1], vec![]], vec![]);
    evaluator.evaluate(&mut solution);
    let before = solution.cost;

    two_opt_routes(&evaluator, &mut solution);
    evaluator.evaluate(&mut solution);

    assert!(solution.cost <= before);
    assert!(solution.is_partition_of(8));
}

#[test]
fn test_best_insertion_and_repair() {
    let problem = create_test_problem(400.0);
    let config = Config::default();
    let evaluator = RouteEvaluator::new(&problem, &config);

    let mut solution = Solution::from_routes(vec![vec![0, 1], vec![2]], vec![3, 4]);

    // The full route has no room
    assert!(best_insertion(&evaluator, &solution, 0, 3).is_none());
    assert!(best_insertion(&evaluator, &solution, 1, 3).is_some());

    assert!(insert_unassigned(&evaluator, &mut solution));
    assert_eq!(solution.unassigned.len(), 1);
    assert_eq!(solution.routes[1].len(), 2);
    assert!(solution.is_capacity_feasible(&problem));
}

#[test]
fn test_polish_is_monotone() {
    let problem = create_test_problem(1500.0);
    let config = Config::default();
    let evaluator = RouteEvaluator::new(&problem, &config);

    let mut solution = Solution::from_routes(vec![vec![7, 2, 0], vec![6, 1]], vec![3, 4, 5]);
    evaluator.evaluate(&mut solution);
    let before = solution.cost;

    let changed = LocalSearch::new(evaluator, 100).polish(&mut solution);

    assert!(changed);
    assert!(solution.cost < before);
    assert!(solution.unassigned.is_empty());
    assert!(solution.is_partition_of(8));
    assert!(solution.is_capacity_feasible(&problem));
}
