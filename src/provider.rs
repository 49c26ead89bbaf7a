//! External routing provider seam and the haversine fallback route.

use crate::error::ProviderError;
use crate::problem::Location;
use crate::traffic::haversine_km;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Traffic estimate applied to fallback durations.
pub const FALLBACK_TRAFFIC_FACTOR: f64 = 1.3;

/// Where a route geometry came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteSource {
    Provider,
    #[default]
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    pub distance_meters: u64,
    pub duration_seconds: u64,
    pub instruction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maneuver: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLeg {
    pub distance_meters: u64,
    pub duration_seconds: u64,
    pub start_address: String,
    pub end_address: String,
    pub steps: Vec<RouteStep>,
}

/// Driving route through an ordered list of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteGeometry {
    pub distance_meters: u64,
    pub duration_seconds: u64,
    pub duration_in_traffic_seconds: u64,
    /// Encoded polyline; empty for fallback routes
    pub polyline: String,
    pub legs: Vec<RouteLeg>,
    #[serde(default)]
    pub source: RouteSource,
}

/// A mapping service able to compute real driving routes.
pub trait RoutingProvider: Send + Sync {
    fn route(
        &self,
        origin: &Location,
        destination: &Location,
        waypoints: &[Location],
        departure: Option<NaiveDateTime>,
    ) -> Result<RouteGeometry, ProviderError>;
}

/// Call `provider` on a worker thread and give up after `timeout`.
///
/// A provider that overruns keeps its thread until it returns; the result is
/// discarded.
pub fn route_with_timeout(
    provider: Arc<dyn RoutingProvider>,
    origin: &Location,
    destination: &Location,
    waypoints: &[Location],
    departure: Option<NaiveDateTime>,
    timeout: Duration,
) -> Result<RouteGeometry, ProviderError> {
    let (tx, rx) = mpsc::channel();
    let (origin, destination, waypoints) =
        (origin.clone(), destination.clone(), waypoints.to_vec());

    thread::spawn(move || {
        let result = provider.route(&origin, &destination, &waypoints, departure);
        // The receiver is gone when the caller already timed out
        let _ = tx.send(result);
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result.map(|mut geometry| {
            geometry.source = RouteSource::Provider;
            geometry
        }),
        Err(RecvTimeoutError::Timeout) => Err(ProviderError::Timeout(timeout)),
        Err(RecvTimeoutError::Disconnected) => Err(ProviderError::Disconnected),
    }
}

fn address_of(location: &Location) -> String {
    location
        .address
        .clone()
        .unwrap_or_else(|| format!("{},{}", location.lat, location.lng))
}

/// Straight-line route: one leg per consecutive pair of points at a
/// constant speed, durations scaled by [`FALLBACK_TRAFFIC_FACTOR`] for the
/// in-traffic estimate.
pub fn fallback_route(
    origin: &Location,
    destination: &Location,
    waypoints: &[Location],
    base_speed_kmh: f64,
) -> RouteGeometry {
    let points: Vec<&Location> = std::iter::once(origin)
        .chain(waypoints.iter())
        .chain(std::iter::once(destination))
        .collect();

    let mut total_meters = 0.0;
    let mut total_seconds = 0.0;
    let legs = points
        .windows(2)
        .map(|pair| {
            let km = haversine_km(pair[0], pair[1]);
            let meters = km * 1000.0;
            let seconds = km / base_speed_kmh * 3600.0;
            total_meters += meters;
            total_seconds += seconds;

            RouteLeg {
                distance_meters: meters.round() as u64,
                duration_seconds: seconds.round() as u64,
                start_address: address_of(pair[0]),
                end_address: address_of(pair[1]),
                steps: vec![RouteStep {
                    distance_meters: meters.round() as u64,
                    duration_seconds: seconds.round() as u64,
                    instruction: format!(
                        "Conduceți către {}",
                        pair[1].name.as_deref().unwrap_or("destinație")
                    ),
                    maneuver: None,
                }],
            }
        })
        .collect();

    RouteGeometry {
        distance_meters: total_meters.round() as u64,
        duration_seconds: total_seconds.round() as u64,
        duration_in_traffic_seconds: (total_seconds * FALLBACK_TRAFFIC_FACTOR).round() as u64,
        polyline: String::new(),
        legs,
        source: RouteSource::Fallback,
    }
}
