//! Constraint checking and cost computation for candidate routes.

use crate::config::Config;
use crate::problem::{Load, Problem};
use crate::result::{
    LoadStatus, OptimizedRoute, RouteMetrics, RouteStop, RouteWarning, Severity, WarningType,
};
use crate::solution::Solution;
use crate::utils::{percent, round2};

/// Late arrivals beyond this many minutes are reported as errors.
const SEVERE_LATENESS_MINUTES: f64 = 30.0;

/// Schedule of a single stop, in minutes since the request departure time.
#[derive(Debug, Clone, Copy)]
pub struct Visit {
    pub stop: usize,
    pub distance_km: f64,
    pub travel_minutes: f64,
    pub arrival: f64,
    pub wait: f64,
    pub late: f64,
    pub departure: f64,
    pub load: Load,
}

/// Result of walking a vehicle through an ordered stop list.
#[derive(Debug, Clone, Default)]
pub struct RouteWalk {
    pub visits: Vec<Visit>,
    pub distance_km: f64,
    pub driving_minutes: f64,
    pub service_minutes: f64,
    pub waiting_minutes: f64,
    pub late_penalty: f64,
    /// Elapsed minutes when the vehicle is back at its depot
    pub end: f64,
    /// Index of the first visit whose cumulative load exceeds the capacity
    pub capacity_breach: Option<usize>,
}

impl RouteWalk {
    pub fn total_minutes(&self) -> f64 {
        self.driving_minutes + self.service_minutes + self.waiting_minutes
    }

    pub fn final_load(&self) -> Load {
        self.visits.last().map(|v| v.load).unwrap_or_default()
    }
}

/// Evaluates routes of a problem under a configuration.
#[derive(Debug, Clone, Copy)]
pub struct RouteEvaluator<'a> {
    pub problem: &'a Problem,
    pub config: &'a Config,
}

impl<'a> RouteEvaluator<'a> {
    pub fn new(problem: &'a Problem, config: &'a Config) -> Self {
        RouteEvaluator { problem, config }
    }

    /// Walk `vehicle` from its depot through `stops` and back.
    pub fn walk(&self, vehicle: usize, stops: &[usize]) -> RouteWalk {
        let problem = self.problem;
        let capacity = problem.vehicles[vehicle].capacity();
        let depot = problem.vehicle_depot_node(vehicle);
        let respect_windows = problem.options.respect_time_windows;

        let mut walk = RouteWalk {
            visits: Vec::with_capacity(stops.len()),
            ..RouteWalk::default()
        };
        let mut node = depot;
        let mut now = 0.0;
        let mut load = Load::default();

        for &s in stops {
            let stop = &problem.stops[s];
            let next = problem.stop_node(s);
            let distance_km = problem.get_distance(node, next);
            let travel_minutes = problem.travel_minutes(node, next, problem.time_at(now));
            let arrival = now + travel_minutes;

            let mut wait = 0.0;
            let mut late = 0.0;
            if let Some(window) = &stop.time_window {
                let start = problem.minutes_since_departure(window.start);
                let end = problem.minutes_since_departure(window.end);
                if arrival < start {
                    wait = start - arrival;
                } else if respect_windows && arrival > end {
                    late = arrival - end;
                    walk.late_penalty += late * window.penalty_per_minute_late;
                }
            }

            let departure = arrival + wait + stop.service_time_minutes;
            load = load + stop.demand();
            if walk.capacity_breach.is_none() && !load.fits_within(&capacity) {
                walk.capacity_breach = Some(walk.visits.len());
            }

            walk.distance_km += distance_km;
            walk.driving_minutes += travel_minutes;
            walk.service_minutes += stop.service_time_minutes;
            walk.waiting_minutes += wait;
            walk.visits.push(Visit {
                stop: s,
                distance_km,
                travel_minutes,
                arrival,
                wait,
                late,
                departure,
                load,
            });

            node = next;
            now = departure;
        }

        if !stops.is_empty() {
            let return_minutes = problem.travel_minutes(node, depot, problem.time_at(now));
            walk.distance_km += problem.get_distance(node, depot);
            walk.driving_minutes += return_minutes;
            now += return_minutes;
        }
        walk.end = now;

        walk
    }

    fn fuel_liters(&self, vehicle: usize, distance_km: f64) -> f64 {
        distance_km * self.problem.vehicles[vehicle].fuel_consumption_l100km / 100.0
    }

    /// Operating cost of a walk: fuel, fixed cost, per-km cost and late penalty.
    fn operating_cost(&self, vehicle: usize, walk: &RouteWalk) -> f64 {
        if walk.visits.is_empty() {
            return 0.0;
        }
        let v = &self.problem.vehicles[vehicle];
        let fuel_cost = self.fuel_liters(vehicle, walk.distance_km) * self.config.fuel_price_ron;
        fuel_cost + v.fixed_daily_cost + walk.distance_km * v.cost_per_km + walk.late_penalty
    }

    fn overtime(&self, vehicle: usize, walk: &RouteWalk) -> f64 {
        (walk.total_minutes() - self.problem.vehicles[vehicle].max_working_minutes).max(0.0)
    }

    /// Search objective of one route: operating cost plus overtime penalty.
    pub fn route_cost(&self, vehicle: usize, stops: &[usize]) -> f64 {
        if stops.is_empty() {
            return 0.0;
        }
        let walk = self.walk(vehicle, stops);
        self.operating_cost(vehicle, &walk)
            + self.overtime(vehicle, &walk) * self.config.overtime_penalty_per_minute
    }

    /// Search objective of a whole solution.
    pub fn solution_cost(&self, solution: &Solution) -> f64 {
        let routes: f64 = solution
            .routes
            .iter()
            .map(|r| self.route_cost(r.vehicle, &r.stops))
            .sum();
        routes + solution.unassigned.len() as f64 * self.config.unassigned_penalty
    }

    /// Recompute and store the cost of a solution.
    pub fn evaluate(&self, solution: &mut Solution) {
        solution.cost = self.solution_cost(solution);
    }

    /// Whether the route stays within the vehicle's working time.
    pub fn fits_working_time(&self, vehicle: usize, stops: &[usize]) -> bool {
        let walk = self.walk(vehicle, stops);
        walk.total_minutes() <= self.problem.vehicles[vehicle].max_working_minutes + 1e-9
    }

    /// Whether `vehicle` can serve `stops` in this order: skills, every
    /// capacity dimension and working time.
    pub fn fits(&self, vehicle: usize, stops: &[usize]) -> bool {
        let problem = self.problem;
        let v = &problem.vehicles[vehicle];
        stops.iter().all(|&s| v.has_skills_for(&problem.stops[s]))
            && problem.total_demand(stops).fits_within(&v.capacity())
            && self.fits_working_time(vehicle, stops)
    }

    /// Full schedule, metrics and warnings of a route.
    pub fn describe_route(&self, vehicle: usize, stops: &[usize]) -> OptimizedRoute {
        let problem = self.problem;
        let v = &problem.vehicles[vehicle];
        let capacity = v.capacity();
        let walk = self.walk(vehicle, stops);
        let mut warnings = Vec::new();

        let route_stops: Vec<RouteStop> = walk
            .visits
            .iter()
            .enumerate()
            .map(|(i, visit)| {
                let stop = &problem.stops[visit.stop];

                if visit.late > 0.0 {
                    let severity = if visit.late > SEVERE_LATENESS_MINUTES {
                        Severity::Error
                    } else {
                        Severity::Warning
                    };
                    warnings.push(
                        RouteWarning::new(
                            WarningType::TimeWindowViolation,
                            severity,
                            format!("arrives {:.0} min after the window closes", visit.late),
                        )
                        .for_stop(&stop.id),
                    );
                }
                if visit.wait > self.config.long_wait_minutes {
                    warnings.push(
                        RouteWarning::new(
                            WarningType::LongWait,
                            Severity::Info,
                            format!("waits {:.0} min for the window to open", visit.wait),
                        )
                        .for_stop(&stop.id),
                    );
                }
                if !v.has_skills_for(stop) {
                    warnings.push(
                        RouteWarning::new(
                            WarningType::SkillMismatch,
                            Severity::Error,
                            format!("vehicle {} lacks a required skill", v.id),
                        )
                        .for_stop(&stop.id),
                    );
                }
                if walk.capacity_breach == Some(i) {
                    warnings.push(
                        RouteWarning::new(
                            WarningType::CapacityExceeded,
                            Severity::Error,
                            format!("cumulative load exceeds the capacity of {}", v.id),
                        )
                        .for_stop(&stop.id),
                    );
                }

                RouteStop {
                    stop: stop.clone(),
                    sequence: i + 1,
                    arrival_time: problem.time_at(visit.arrival),
                    departure_time: problem.time_at(visit.departure),
                    wait_minutes: round2(visit.wait),
                    late_minutes: round2(visit.late),
                    distance_from_previous_km: round2(visit.distance_km),
                    minutes_from_previous: round2(visit.travel_minutes),
                    cumulative_load: LoadStatus {
                        weight: visit.load.weight,
                        volume: visit.load.volume,
                        pallets: visit.load.pallets,
                        weight_utilization: round2(percent(visit.load.weight, capacity.weight)),
                        volume_utilization: round2(percent(visit.load.volume, capacity.volume)),
                    },
                }
            })
            .collect();

        let total_minutes = walk.total_minutes();
        let within_time = total_minutes <= v.max_working_minutes + 1e-9;
        if !within_time {
            warnings.push(RouteWarning::new(
                WarningType::MaxWorkingTime,
                Severity::Error,
                format!(
                    "route takes {:.0} min, limit is {:.0} min",
                    total_minutes, v.max_working_minutes
                ),
            ));
        }

        let fuel = self.fuel_liters(vehicle, walk.distance_km);
        let late_deliveries = walk.visits.iter().filter(|v| v.late > 0.0).count();
        let metrics = RouteMetrics {
            total_distance_km: round2(walk.distance_km),
            total_time_minutes: total_minutes.round(),
            driving_time_minutes: walk.driving_minutes.round(),
            service_time_minutes: walk.service_minutes.round(),
            waiting_time_minutes: walk.waiting_minutes.round(),
            fuel_consumption_liters: round2(fuel),
            fuel_cost_ron: round2(fuel * self.config.fuel_price_ron),
            total_cost_ron: round2(self.operating_cost(vehicle, &walk)),
            on_time_deliveries: walk.visits.len() - late_deliveries,
            late_deliveries,
            late_penalty_ron: round2(walk.late_penalty),
            utilization_percent: percent(walk.final_load().weight, capacity.weight).round(),
        };

        OptimizedRoute {
            vehicle_id: v.id.clone(),
            vehicle_name: v.name.clone(),
            stops: route_stops,
            metrics,
            warnings,
            feasible: walk.capacity_breach.is_none() && within_time,
        }
    }
}
