//! # route_optimizer
//!
//! A vehicle routing engine for delivery fleets: capacitated routing with
//! soft time windows and traffic-aware travel times.
//!
//! Given a depot, a fleet with capacity and cost attributes and a set of
//! stops with demand, priority and time windows, the engine assigns stops to
//! vehicles and orders each route to minimise total cost. It ships three
//! construction heuristics, four metaheuristics and a hybrid strategy, plus
//! traffic snapshots, ETA prediction and a routing-provider seam with a
//! haversine fallback.

pub mod annealing;
pub mod ant_colony;
pub mod cancel;
pub mod clock;
pub mod config;
pub mod construction;
pub mod error;
pub mod eta;
pub mod evaluation;
pub mod genetic;
pub mod hybrid;
pub mod individual;
pub mod local_search;
pub mod population;
pub mod problem;
pub mod provider;
pub mod result;
pub mod solution;
pub mod split;
pub mod strategy;
pub mod tabu;
pub mod traffic;
pub mod utils;

pub use crate::cancel::CancellationToken;
pub use crate::clock::{Clock, FixedClock, SystemClock};
pub use crate::config::Config;
pub use crate::error::{OptimizationError, ProviderError};
pub use crate::eta::{EtaFactor, EtaPrediction, EtaUpdate};
pub use crate::problem::{
    Algorithm, DeliveryStop, Location, OptimizationOptions, Priority, RouteRequest, TimeWindow,
    Vehicle,
};
pub use crate::provider::{RouteGeometry, RoutingProvider};
pub use crate::result::{OptimizationResult, OptimizationSummary, OptimizedRoute, RouteStop};
pub use crate::strategy::{SearchContext, Strategy};
pub use crate::traffic::TrafficCondition;

use crate::evaluation::RouteEvaluator;
use crate::problem::Problem;
use crate::solution::Solution;
use crate::strategy::strategy_for;
use crate::traffic::TrafficModel;
use crate::utils::{percent, round2};

use chrono::NaiveDateTime;
use log::{debug, info, warn};
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;

/// Entry point of the engine. Holds configuration and collaborators only;
/// every call works on its own data, so one optimizer can serve many
/// threads.
#[derive(Clone)]
pub struct RouteOptimizer {
    config: Config,
    clock: Arc<dyn Clock>,
    provider: Option<Arc<dyn RoutingProvider>>,
}

impl Default for RouteOptimizer {
    fn default() -> Self {
        RouteOptimizer::new(Config::default())
    }
}

impl RouteOptimizer {
    /// Create an optimizer using the system clock and no routing provider.
    pub fn new(config: Config) -> Self {
        RouteOptimizer {
            config,
            clock: Arc::new(SystemClock),
            provider: None,
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Attach an external routing provider.
    pub fn with_provider(mut self, provider: impl RoutingProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn traffic_model(&self) -> TrafficModel {
        TrafficModel::new(self.config.base_speed_kmh)
    }

    /// Optimize a request with the algorithm it names (HYBRID by default).
    pub fn optimize_routes(
        &self,
        request: &RouteRequest,
    ) -> Result<OptimizationResult, OptimizationError> {
        self.optimize_routes_cancellable(request, &CancellationToken::new())
    }

    /// Like [`optimize_routes`](Self::optimize_routes), stopping early when
    /// `cancel` fires.
    pub fn optimize_routes_cancellable(
        &self,
        request: &RouteRequest,
        cancel: &CancellationToken,
    ) -> Result<OptimizationResult, OptimizationError> {
        let strategy = strategy_for(request.options.algorithm());
        self.optimize_with(request, strategy.as_ref(), cancel)
    }

    /// Optimize a request with a caller-supplied strategy.
    pub fn optimize_with(
        &self,
        request: &RouteRequest,
        strategy: &dyn Strategy,
        cancel: &CancellationToken,
    ) -> Result<OptimizationResult, OptimizationError> {
        let start = Instant::now();
        request.validate()?;

        let algorithm = strategy.algorithm();
        let seed = request
            .options
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen());
        info!(
            "optimizing {} stops with {} vehicles using {}",
            request.stops.len(),
            request.vehicles.len(),
            algorithm
        );
        debug!("seed {}", seed);

        let problem = Problem::new(request, self.traffic_model());
        let evaluator = RouteEvaluator::new(&problem, &self.config);
        let mut ctx = SearchContext::new(&problem, &self.config, cancel, seed);

        let mut solution = strategy.solve(&mut ctx);
        let stopped_early = ctx.stopped_early();
        if request.options.drop_infeasible_stops {
            drop_infeasible_stops(&evaluator, &mut solution);
        }
        evaluator.evaluate(&mut solution);

        let routes: Vec<OptimizedRoute> = solution
            .routes
            .iter()
            .filter(|r| !r.is_empty())
            .map(|r| evaluator.describe_route(r.vehicle, &r.stops))
            .collect();

        let mut unassigned = solution.unassigned.clone();
        unassigned.sort_unstable();
        let unassigned_stops: Vec<DeliveryStop> = unassigned
            .into_iter()
            .map(|s| problem.stops[s].clone())
            .collect();

        let summary = summarize(&routes, unassigned_stops.len(), problem.stop_count(), &self.config);
        let id = uuid::Builder::from_random_bytes(ctx.rng.gen()).into_uuid();
        let computation_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "{} finished in {} ms: {} routes, {} unassigned, cost {:.2} RON{}",
            algorithm,
            computation_time_ms,
            summary.vehicles_used,
            summary.unassigned_stops,
            summary.total_cost_ron,
            if stopped_early { " (stopped early)" } else { "" }
        );

        Ok(OptimizationResult {
            id,
            routes,
            unassigned_stops,
            summary,
            algorithm,
            seed,
            stopped_early,
            computation_time_ms,
        })
    }

    /// Current traffic on each consecutive segment of `locations`.
    pub fn get_traffic_conditions(&self, locations: &[Location]) -> Vec<TrafficCondition> {
        self.traffic_model()
            .conditions(locations, self.clock.now())
    }

    /// Predict the arrival time of a trip leaving at `departure`.
    pub fn predict_eta(
        &self,
        from: &Location,
        to: &Location,
        departure: NaiveDateTime,
    ) -> EtaPrediction {
        eta::predict_eta(&self.traffic_model(), from, to, departure, self.clock.now())
    }

    /// Re-estimate planned arrivals under current traffic.
    pub fn update_etas(&self, stops: &[RouteStop]) -> Vec<EtaUpdate> {
        eta::update_etas(&self.traffic_model(), stops, self.clock.now())
    }

    /// Driving route through the given points. Uses the routing provider
    /// when one is attached and answers in time, the haversine fallback
    /// otherwise. Never fails.
    pub fn get_route(
        &self,
        origin: &Location,
        destination: &Location,
        waypoints: &[Location],
        departure: Option<NaiveDateTime>,
    ) -> RouteGeometry {
        let attempt = match &self.provider {
            Some(routing) => provider::route_with_timeout(
                Arc::clone(routing),
                origin,
                destination,
                waypoints,
                departure,
                self.config.provider_timeout,
            ),
            None => Err(ProviderError::NotConfigured),
        };

        attempt.unwrap_or_else(|err| {
            warn!("{}, using fallback route", err);
            provider::fallback_route(origin, destination, waypoints, self.config.base_speed_kmh)
        })
    }
}

/// Remove trailing stops from routes that break capacity, skills or working
/// time until they comply. Removed stops become unassigned.
fn drop_infeasible_stops(evaluator: &RouteEvaluator<'_>, solution: &mut Solution) {
    for route in solution.routes.iter_mut() {
        while !route.is_empty() && !evaluator.fits(route.vehicle, &route.stops) {
            if let Some(stop) = route.stops.pop() {
                debug!("dropping stop {} from vehicle {}", stop, route.vehicle);
                solution.unassigned.push(stop);
            }
        }
    }
}

fn summarize(
    routes: &[OptimizedRoute],
    unassigned: usize,
    total_stops: usize,
    config: &Config,
) -> OptimizationSummary {
    let assigned: usize = routes.iter().map(|r| r.stops.len()).sum();
    let on_time: usize = routes.iter().map(|r| r.metrics.on_time_deliveries).sum();
    let fuel: f64 = routes.iter().map(|r| r.metrics.fuel_consumption_liters).sum();
    let average_utilization = if routes.is_empty() {
        0.0
    } else {
        routes.iter().map(|r| r.metrics.utilization_percent).sum::<f64>() / routes.len() as f64
    };

    OptimizationSummary {
        total_stops,
        assigned_stops: assigned,
        unassigned_stops: unassigned,
        vehicles_used: routes.len(),
        total_distance_km: round2(routes.iter().map(|r| r.metrics.total_distance_km).sum()),
        total_time_minutes: routes
            .iter()
            .map(|r| r.metrics.total_time_minutes)
            .sum::<f64>()
            .round(),
        total_fuel_liters: round2(fuel),
        total_cost_ron: round2(routes.iter().map(|r| r.metrics.total_cost_ron).sum()),
        co2_emissions_kg: round2(fuel * config.co2_kg_per_liter),
        on_time_percent: percent(on_time as f64, assigned as f64).round(),
        average_utilization: average_utilization.round(),
    }
}
