//! Geographic distance and the synthetic traffic model.
//!
//! Travel time is `distance / base speed`, scaled by an hourly congestion
//! multiplier that depends on the city zone the leg starts in. Weekends scale
//! the multiplier by [`WEEKEND_FACTOR`].

use crate::problem::Location;
use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// Mean Earth radius in km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Weekend traffic is lighter than the weekday profile.
pub const WEEKEND_FACTOR: f64 = 0.7;

/// Weekday rush bands as half-open hour ranges.
pub const RUSH_HOURS: [(u32, u32); 2] = [(7, 10), (16, 19)];

const BUCHAREST: [f64; 24] = [
    0.8, 0.8, 0.8, 0.8, 0.9, 1.0, 1.3, 1.8, 2.2, 1.6, 1.2, 1.1, //
    1.2, 1.1, 1.1, 1.2, 1.5, 2.0, 1.8, 1.4, 1.1, 1.0, 0.9, 0.8,
];

const CLUJ_NAPOCA: [f64; 24] = [
    0.8, 0.8, 0.8, 0.8, 0.9, 1.0, 1.2, 1.6, 1.9, 1.4, 1.1, 1.0, //
    1.1, 1.0, 1.0, 1.1, 1.4, 1.8, 1.5, 1.2, 1.0, 0.9, 0.9, 0.8,
];

const TIMISOARA: [f64; 24] = [
    0.8, 0.8, 0.8, 0.8, 0.9, 1.0, 1.2, 1.5, 1.8, 1.3, 1.1, 1.0, //
    1.1, 1.0, 1.0, 1.1, 1.3, 1.7, 1.4, 1.2, 1.0, 0.9, 0.9, 0.8,
];

const DEFAULT_PROFILE: [f64; 24] = [
    0.9, 0.9, 0.9, 0.9, 0.9, 1.0, 1.1, 1.3, 1.5, 1.2, 1.0, 1.0, //
    1.0, 1.0, 1.0, 1.1, 1.3, 1.5, 1.3, 1.1, 1.0, 0.9, 0.9, 0.9,
];

/// Great-circle distance between two locations in km.
pub fn haversine_km(a: &Location, b: &Location) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Saturday or Sunday.
pub fn is_weekend(time: NaiveDateTime) -> bool {
    matches!(time.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Weekday hour inside one of the [`RUSH_HOURS`] bands.
pub fn is_rush_hour(time: NaiveDateTime) -> bool {
    let hour = time.hour();
    !is_weekend(time)
        && RUSH_HOURS
            .iter()
            .any(|&(start, end)| hour >= start && hour < end)
}

/// City zones with a dedicated hourly traffic profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrafficZone {
    Bucharest,
    ClujNapoca,
    Timisoara,
    /// No local data; a generic profile is used
    Default,
}

impl TrafficZone {
    /// Detect the zone from a coordinate's bounding box.
    pub fn detect(lat: f64, lng: f64) -> Self {
        if lat > 44.3 && lat < 44.6 && lng > 25.9 && lng < 26.3 {
            TrafficZone::Bucharest
        } else if lat > 46.7 && lat < 46.9 && lng > 23.5 && lng < 23.7 {
            TrafficZone::ClujNapoca
        } else if lat > 45.7 && lat < 45.8 && lng > 21.1 && lng < 21.3 {
            TrafficZone::Timisoara
        } else {
            TrafficZone::Default
        }
    }

    /// Whether the zone has its own traffic data.
    pub fn has_local_data(&self) -> bool {
        !matches!(self, TrafficZone::Default)
    }

    /// Weekday congestion multiplier for an hour of the day.
    pub fn hourly_multiplier(&self, hour: u32) -> f64 {
        let profile = match self {
            TrafficZone::Bucharest => &BUCHAREST,
            TrafficZone::ClujNapoca => &CLUJ_NAPOCA,
            TrafficZone::Timisoara => &TIMISOARA,
            TrafficZone::Default => &DEFAULT_PROFILE,
        };
        profile[(hour % 24) as usize]
    }

    /// Human-readable zone name.
    pub fn name(&self) -> &'static str {
        match self {
            TrafficZone::Bucharest => "București",
            TrafficZone::ClujNapoca => "Cluj-Napoca",
            TrafficZone::Timisoara => "Timișoara",
            TrafficZone::Default => "default",
        }
    }
}

/// Qualitative congestion bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CongestionLevel {
    FreeFlow,
    Light,
    Moderate,
    Heavy,
    Severe,
}

impl CongestionLevel {
    /// Bucket a traffic multiplier.
    pub fn from_multiplier(multiplier: f64) -> Self {
        if multiplier >= 2.0 {
            CongestionLevel::Severe
        } else if multiplier >= 1.5 {
            CongestionLevel::Heavy
        } else if multiplier >= 1.2 {
            CongestionLevel::Moderate
        } else if multiplier >= 1.1 {
            CongestionLevel::Light
        } else {
            CongestionLevel::FreeFlow
        }
    }
}

/// Traffic snapshot for the segment between two consecutive locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficCondition {
    pub from: Location,
    pub to: Location,
    pub zone: TrafficZone,
    pub multiplier: f64,
    pub speed_kmh: f64,
    pub delay_minutes: f64,
    pub congestion_level: CongestionLevel,
    pub observed_at: NaiveDateTime,
}

/// Deterministic traffic model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficModel {
    pub base_speed_kmh: f64,
}

impl Default for TrafficModel {
    fn default() -> Self {
        TrafficModel {
            base_speed_kmh: 35.0,
        }
    }
}

impl TrafficModel {
    pub fn new(base_speed_kmh: f64) -> Self {
        TrafficModel { base_speed_kmh }
    }

    /// Congestion multiplier for a leg starting at `origin` at `time`.
    pub fn traffic_factor(&self, origin: &Location, time: NaiveDateTime) -> f64 {
        let zone = TrafficZone::detect(origin.lat, origin.lng);
        let mut multiplier = zone.hourly_multiplier(time.hour());
        if is_weekend(time) {
            multiplier *= WEEKEND_FACTOR;
        }
        multiplier
    }

    /// Free-flow driving minutes for a distance.
    pub fn base_minutes(&self, distance_km: f64) -> f64 {
        distance_km / self.base_speed_kmh * 60.0
    }

    /// Driving minutes for a distance, optionally traffic-adjusted.
    pub fn travel_minutes(
        &self,
        distance_km: f64,
        origin: &Location,
        departure: NaiveDateTime,
        include_traffic: bool,
    ) -> f64 {
        let base = self.base_minutes(distance_km);
        if include_traffic {
            base * self.traffic_factor(origin, departure)
        } else {
            base
        }
    }

    /// Driving minutes between two locations.
    pub fn duration(
        &self,
        from: &Location,
        to: &Location,
        departure: NaiveDateTime,
        include_traffic: bool,
    ) -> f64 {
        self.travel_minutes(haversine_km(from, to), from, departure, include_traffic)
    }

    /// Traffic conditions for each consecutive pair of locations at `now`.
    pub fn conditions(&self, locations: &[Location], now: NaiveDateTime) -> Vec<TrafficCondition> {
        locations
            .windows(2)
            .map(|pair| {
                let (from, to) = (&pair[0], &pair[1]);
                let zone = TrafficZone::detect(from.lat, from.lng);
                let multiplier = self.traffic_factor(from, now);
                let base = self.base_minutes(haversine_km(from, to));

                TrafficCondition {
                    from: from.clone(),
                    to: to.clone(),
                    zone,
                    multiplier,
                    speed_kmh: (self.base_speed_kmh / multiplier).round(),
                    delay_minutes: (base * multiplier - base).round(),
                    congestion_level: CongestionLevel::from_multiplier(multiplier),
                    observed_at: now,
                }
            })
            .collect()
    }
}
