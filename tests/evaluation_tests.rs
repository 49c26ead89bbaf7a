//! Tests for route walking, costing and route descriptions.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use route_optimizer::evaluation::RouteEvaluator;
use route_optimizer::problem::Problem;
use route_optimizer::result::{Severity, WarningType};
use route_optimizer::solution::Solution;
use route_optimizer::traffic::{haversine_km, TrafficModel};
use route_optimizer::{
    Config, DeliveryStop, Location, OptimizationOptions, RouteRequest, TimeWindow, Vehicle,
};

fn departure() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 13)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .unwrap()
}

fn depot() -> Location {
    Location::new("depot", 44.4268, 26.1025).with_name("Depozit București")
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

fn stop(id: &str, lat: f64, lng: f64) -> DeliveryStop {
    DeliveryStop::new(id, Location::new(id, lat, lng))
        .with_demand(100.0, 0.5, 0.0)
        .with_service_time(10.0)
}

fn window(from_minutes: i64, to_minutes: i64, penalty: f64) -> TimeWindow {
    TimeWindow {
        start: departure() + Duration::minutes(from_minutes),
        end: departure() + Duration::minutes(to_minutes),
        is_flexible: false,
        penalty_per_minute_late: penalty,
    }
}

fn request(stops: Vec<DeliveryStop>, vehicles: Vec<Vehicle>) -> RouteRequest {
    RouteRequest {
        stops,
        vehicles,
        depot: depot(),
        departure_time: departure(),
        options: OptimizationOptions {
            include_traffic: false,
            ..OptimizationOptions::default()
        },
    }
}

fn problem(request: &RouteRequest) -> Problem {
    Problem::new(request, TrafficModel::default())
}

#[test]
fn test_empty_route_costs_nothing() {
    let req = request(vec![stop("a", 44.4500, 26.0900)], vec![vehicle("v1", 1500.0)]);
    let problem = problem(&req);
    let config = Config::default();
    let evaluator = RouteEvaluator::new(&problem, &config);

    assert_eq!(evaluator.route_cost(0, &[]), 0.0);
    let walk = evaluator.walk(0, &[]);
    assert!(walk.visits.is_empty());
    assert_eq!(walk.end, 0.0);
}

#[test]
fn test_single_stop_walk_and_cost() {
    let req = request(vec![stop("a", 44.4500, 26.0900)], vec![vehicle("v1", 1500.0)]);
    let problem = problem(&req);
    let config = Config::default();
    let evaluator = RouteEvaluator::new(&problem, &config);

    let one_way = haversine_km(&depot(), &req.stops[0].location);
    let walk = evaluator.walk(0, &[0]);

    assert!((walk.distance_km - 2.0 * one_way).abs() < 1e-9);
    assert!((walk.driving_minutes - 2.0 * one_way / 35.0 * 60.0).abs() < 1e-9);
    assert_eq!(walk.service_minutes, 10.0);
    assert!((walk.end - walk.total_minutes()).abs() < 1e-9);
    assert_eq!(walk.final_load().weight, 100.0);

    // Fuel, fixed cost and per-km cost
    let km = 2.0 * one_way;
    let expected = km * 12.0 / 100.0 * 7.5 + 100.0 + km * 1.5;
    assert!((evaluator.route_cost(0, &[0]) - expected).abs() < 1e-6);
}

#[test]
fn test_late_arrival_is_penalised() {
    // Window closed an hour before departure
    let late = stop("late", 44.4500, 26.0900).with_time_window(window(-120, -60, 2.0));
    let req = request(vec![late], vec![vehicle("v1", 1500.0)]);
    let problem = problem(&req);
    let config = Config::default();
    let evaluator = RouteEvaluator::new(&problem, &config);

    let walk = evaluator.walk(0, &[0]);
    assert!(walk.visits[0].late > 60.0);
    assert!((walk.late_penalty - walk.visits[0].late * 2.0).abs() < 1e-9);

    let route = evaluator.describe_route(0, &[0]);
    assert_eq!(route.metrics.late_deliveries, 1);
    assert_eq!(route.metrics.on_time_deliveries, 0);
    assert!(route.metrics.late_penalty_ron > 120.0);
    assert!(route.stops[0].is_late());

    let warning = &route.warnings[0];
    assert_eq!(warning.warning_type, WarningType::TimeWindowViolation);
    assert_eq!(warning.severity, Severity::Error);
    assert_eq!(warning.stop_id.as_deref(), Some("late"));

    // Lateness does not make a route infeasible
    assert!(route.feasible);
}

#[test]
fn test_time_windows_can_be_ignored() {
    let late = stop("late", 44.4500, 26.0900).with_time_window(window(-120, -60, 2.0));
    let mut req = request(vec![late], vec![vehicle("v1", 1500.0)]);
    req.options.respect_time_windows = false;
    let problem = problem(&req);
    let config = Config::default();
    let evaluator = RouteEvaluator::new(&problem, &config);

    let walk = evaluator.walk(0, &[0]);
    assert_eq!(walk.visits[0].late, 0.0);
    assert_eq!(walk.late_penalty, 0.0);
}

#[test]
fn test_early_arrival_waits() {
    // Window opens three hours after departure
    let early = stop("early", 44.4500, 26.0900).with_time_window(window(180, 240, 1.0));
    let req = request(vec![early], vec![vehicle("v1", 1500.0)]);
    let problem = problem(&req);
    let config = Config::default();
    let evaluator = RouteEvaluator::new(&problem, &config);

    let walk = evaluator.walk(0, &[0]);
    let visit = walk.visits[0];
    assert!((visit.arrival + visit.wait - 180.0).abs() < 1e-9);
    assert!((visit.departure - 190.0).abs() < 1e-9);

    let route = evaluator.describe_route(0, &[0]);
    assert!(route
        .warnings
        .iter()
        .any(|w| w.warning_type == WarningType::LongWait && w.severity == Severity::Info));
    assert_eq!(route.stops[0].departure_time, departure() + Duration::minutes(190));
}

#[test]
fn test_capacity_breach_reported_once() {
    let stops = vec![
        stop("a", 44.4500, 26.0900).with_demand(600.0, 0.5, 0.0),
        stop("b", 44.4350, 26.0800).with_demand(600.0, 0.5, 0.0),
        stop("c", 44.4100, 26.1200).with_demand(600.0, 0.5, 0.0),
    ];
    let req = request(stops, vec![vehicle("v1", 1000.0)]);
    let problem = problem(&req);
    let config = Config::default();
    let evaluator = RouteEvaluator::new(&problem, &config);

    let walk = evaluator.walk(0, &[0, 1, 2]);
    assert_eq!(walk.capacity_breach, Some(1));

    let route = evaluator.describe_route(0, &[0, 1, 2]);
    assert!(!route.feasible);
    let breaches: Vec<_> = route
        .warnings
        .iter()
        .filter(|w| w.warning_type == WarningType::CapacityExceeded)
        .collect();
    assert_eq!(breaches.len(), 1);
    assert_eq!(breaches[0].stop_id.as_deref(), Some("b"));
    assert!(!evaluator.fits(0, &[0, 1]));
    assert!(evaluator.fits(0, &[0]));
}

#[test]
fn test_working_time_limit() {
    let mut short_shift = vehicle("v1", 1500.0);
    short_shift.max_working_minutes = 15.0;
    let stops = vec![
        stop("a", 44.4500, 26.0900),
        stop("b", 44.3900, 26.1500),
    ];
    let req = request(stops, vec![short_shift]);
    let problem = problem(&req);
    let config = Config::default();
    let evaluator = RouteEvaluator::new(&problem, &config);

    assert!(!evaluator.fits_working_time(0, &[0, 1]));

    let route = evaluator.describe_route(0, &[0, 1]);
    assert!(!route.feasible);
    assert!(route
        .warnings
        .iter()
        .any(|w| w.warning_type == WarningType::MaxWorkingTime && w.stop_id.is_none()));

    // Overtime is charged in the search objective only
    let walk = evaluator.walk(0, &[0, 1]);
    let overtime = walk.total_minutes() - 15.0;
    assert!(evaluator.route_cost(0, &[0, 1]) > route.metrics.total_cost_ron + overtime * 49.0);
}

#[test]
fn test_skill_mismatch_warning() {
    let cold = stop("cold", 44.4500, 26.0900).with_required_skill("COLD_CHAIN");
    let req = request(vec![cold], vec![vehicle("v1", 1500.0)]);
    let problem = problem(&req);
    let config = Config::default();
    let evaluator = RouteEvaluator::new(&problem, &config);

    let route = evaluator.describe_route(0, &[0]);
    assert!(route
        .warnings
        .iter()
        .any(|w| w.warning_type == WarningType::SkillMismatch && w.severity == Severity::Error));
    assert!(!evaluator.fits(0, &[0]));
}

#[test]
fn test_describe_route_sequences_and_load() {
    let stops = vec![
        stop("a", 44.4500, 26.0900),
        stop("b", 44.4350, 26.0800),
        stop("c", 44.4100, 26.1200),
    ];
    let req = request(stops, vec![vehicle("v1", 1500.0)]);
    let problem = problem(&req);
    let config = Config::default();
    let evaluator = RouteEvaluator::new(&problem, &config);

    let route = evaluator.describe_route(0, &[2, 0, 1]);

    let sequences: Vec<usize> = route.stops.iter().map(|s| s.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3]);
    let ids: Vec<&str> = route.stops.iter().map(|s| s.stop.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "a", "b"]);

    let loads: Vec<f64> = route.stops.iter().map(|s| s.cumulative_load.weight).collect();
    assert_eq!(loads, vec![100.0, 200.0, 300.0]);
    assert_eq!(route.metrics.utilization_percent, 20.0);
    assert_eq!(route.metrics.service_time_minutes, 30.0);
    assert_eq!(route.vehicle_id, "v1");
    assert!(route.feasible);
    assert!(route.warnings.is_empty());

    // Arrivals never go backwards
    for pair in route.stops.windows(2) {
        assert!(pair[0].departure_time <= pair[1].arrival_time);
    }
}

#[test]
fn test_solution_cost_penalises_unassigned() {
    let stops = vec![stop("a", 44.4500, 26.0900), stop("b", 44.4350, 26.0800)];
    let req = request(stops, vec![vehicle("v1", 1500.0)]);
    let problem = problem(&req);
    let config = Config::default().with_unassigned_penalty(5000.0);
    let evaluator = RouteEvaluator::new(&problem, &config);

    let mut solution = Solution::from_routes(vec![vec![0]], vec![1]);
    evaluator.evaluate(&mut solution);

    assert!((solution.cost - (evaluator.route_cost(0, &[0]) + 5000.0)).abs() < 1e-6);
}
