//! Traffic-aware arrival estimates.

use crate::problem::Location;
use crate::result::RouteStop;
use crate::traffic::{haversine_km, is_rush_hour, is_weekend, TrafficModel, TrafficZone};
use crate::utils::round2;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence lost when the origin has no dedicated traffic profile.
const NO_ZONE_DATA_PENALTY: f64 = 10.0;
/// Confidence lost for departures more than a day ahead.
const DAY_AHEAD_PENALTY: f64 = 10.0;
/// Confidence lost for departures more than a week ahead.
const WEEK_AHEAD_PENALTY: f64 = 25.0;

/// Re-estimated arrivals that move by less than this are not reported.
pub const ETA_UPDATE_THRESHOLD_MINUTES: f64 = 5.0;

/// Something that influenced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EtaFactor {
    Weekend,
    RushHour,
    ZoneTraffic(TrafficZone),
    NoLocalTrafficData,
    LongRangeForecast,
}

impl fmt::Display for EtaFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtaFactor::Weekend => f.write_str("Weekend - trafic redus"),
            EtaFactor::RushHour => f.write_str("Oră de vârf"),
            EtaFactor::ZoneTraffic(zone) => write!(f, "Trafic {}", zone.name()),
            EtaFactor::NoLocalTrafficData => f.write_str("Fără date de trafic locale"),
            EtaFactor::LongRangeForecast => f.write_str("Prognoză pe termen lung"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtaPrediction {
    pub estimated_arrival: NaiveDateTime,
    pub duration_minutes: f64,
    pub distance_km: f64,
    /// Traffic multiplier applied to the free-flow duration
    pub multiplier: f64,
    /// 0 to 100
    pub confidence: u8,
    pub factors: Vec<EtaFactor>,
    /// Display text of each factor, in the same order
    pub factor_descriptions: Vec<String>,
}

/// Predict the arrival at `to` when leaving `from` at `departure`. `now` is
/// used to discount forecasts far in the future.
pub fn predict_eta(
    model: &TrafficModel,
    from: &Location,
    to: &Location,
    departure: NaiveDateTime,
    now: NaiveDateTime,
) -> EtaPrediction {
    let distance = haversine_km(from, to);
    let zone = TrafficZone::detect(from.lat, from.lng);
    let multiplier = model.traffic_factor(from, departure);
    let duration = model.duration(from, to, departure, true);

    let mut factors = Vec::new();
    if is_weekend(departure) {
        factors.push(EtaFactor::Weekend);
    }
    if is_rush_hour(departure) {
        factors.push(EtaFactor::RushHour);
    }

    let mut confidence = (95.0 - (multiplier - 1.0) * 20.0).clamp(60.0, 100.0);
    if zone.has_local_data() {
        factors.push(EtaFactor::ZoneTraffic(zone));
    } else {
        factors.push(EtaFactor::NoLocalTrafficData);
        confidence -= NO_ZONE_DATA_PENALTY;
    }

    let horizon = departure - now;
    if horizon > Duration::days(7) {
        factors.push(EtaFactor::LongRangeForecast);
        confidence -= WEEK_AHEAD_PENALTY;
    } else if horizon > Duration::hours(24) {
        factors.push(EtaFactor::LongRangeForecast);
        confidence -= DAY_AHEAD_PENALTY;
    }

    EtaPrediction {
        estimated_arrival: departure + Duration::milliseconds((duration * 60_000.0).round() as i64),
        duration_minutes: duration.round(),
        distance_km: round2(distance),
        multiplier,
        confidence: confidence.clamp(0.0, 100.0).round() as u8,
        factor_descriptions: factors.iter().map(ToString::to_string).collect(),
        factors,
    }
}

/// Why an arrival estimate moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DelayReason {
    HeavyTraffic,
    ModerateTraffic,
    LightTraffic,
}

impl fmt::Display for DelayReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelayReason::HeavyTraffic => f.write_str("Trafic aglomerat"),
            DelayReason::ModerateTraffic => f.write_str("Trafic moderat"),
            DelayReason::LightTraffic => f.write_str("Trafic redus"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtaUpdate {
    pub stop_id: String,
    pub original_eta: NaiveDateTime,
    pub updated_eta: NaiveDateTime,
    /// Positive when the stop will be reached later than planned
    pub delay_minutes: f64,
    pub reason: DelayReason,
}

/// Re-estimate each stop's arrival by scaling its inbound leg with the
/// traffic multiplier at `now`. Only changes above
/// [`ETA_UPDATE_THRESHOLD_MINUTES`] are reported.
pub fn update_etas(model: &TrafficModel, stops: &[RouteStop], now: NaiveDateTime) -> Vec<EtaUpdate> {
    stops
        .iter()
        .filter_map(|route_stop| {
            let multiplier = model.traffic_factor(&route_stop.stop.location, now);
            let planned = route_stop.minutes_from_previous;
            let delay = planned * multiplier - planned;

            if delay.abs() <= ETA_UPDATE_THRESHOLD_MINUTES {
                return None;
            }

            let reason = if delay < 0.0 {
                DelayReason::LightTraffic
            } else if multiplier >= 1.5 {
                DelayReason::HeavyTraffic
            } else {
                DelayReason::ModerateTraffic
            };

            Some(EtaUpdate {
                stop_id: route_stop.stop.id.clone(),
                original_eta: route_stop.arrival_time,
                updated_eta: route_stop.arrival_time
                    + Duration::milliseconds((delay * 60_000.0).round() as i64),
                delay_minutes: delay.round(),
                reason,
            })
        })
        .collect()
}
