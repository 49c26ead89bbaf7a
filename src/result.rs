//! Output data model returned by the optimizer.

use crate::problem::{Algorithm, DeliveryStop};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Cumulative load of a vehicle after serving a stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadStatus {
    pub weight: f64,
    pub volume: f64,
    pub pallets: f64,
    pub weight_utilization: f64,
    pub volume_utilization: f64,
}

/// A stop as scheduled on a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStop {
    pub stop: DeliveryStop,
    /// Position on the route, starting at 1
    pub sequence: usize,
    pub arrival_time: NaiveDateTime,
    pub departure_time: NaiveDateTime,
    pub wait_minutes: f64,
    pub late_minutes: f64,
    pub distance_from_previous_km: f64,
    pub minutes_from_previous: f64,
    pub cumulative_load: LoadStatus,
}

impl RouteStop {
    /// Whether the vehicle arrived after the stop's window closed.
    pub fn is_late(&self) -> bool {
        self.late_minutes > 0.0
    }
}

/// Aggregated figures for one route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMetrics {
    pub total_distance_km: f64,
    pub total_time_minutes: f64,
    pub driving_time_minutes: f64,
    pub service_time_minutes: f64,
    pub waiting_time_minutes: f64,
    pub fuel_consumption_liters: f64,
    pub fuel_cost_ron: f64,
    pub total_cost_ron: f64,
    pub on_time_deliveries: usize,
    pub late_deliveries: usize,
    pub late_penalty_ron: f64,
    pub utilization_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningType {
    TimeWindowViolation,
    CapacityExceeded,
    SkillMismatch,
    LongWait,
    MaxWorkingTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A constraint observation attached to a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteWarning {
    #[serde(rename = "type")]
    pub warning_type: WarningType,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_id: Option<String>,
}

impl RouteWarning {
    pub fn new(warning_type: WarningType, severity: Severity, message: impl Into<String>) -> Self {
        RouteWarning {
            warning_type,
            severity,
            message: message.into(),
            stop_id: None,
        }
    }

    pub fn for_stop(mut self, stop_id: impl Into<String>) -> Self {
        self.stop_id = Some(stop_id.into());
        self
    }
}

impl fmt::Display for RouteWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.severity, self.message)?;
        if let Some(stop_id) = &self.stop_id {
            write!(f, " (stop {})", stop_id)?;
        }
        Ok(())
    }
}

/// The ordered plan of one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedRoute {
    pub vehicle_id: String,
    pub vehicle_name: String,
    pub stops: Vec<RouteStop>,
    pub metrics: RouteMetrics,
    pub warnings: Vec<RouteWarning>,
    /// Capacity and working time are respected
    pub feasible: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationSummary {
    pub total_stops: usize,
    pub assigned_stops: usize,
    pub unassigned_stops: usize,
    pub vehicles_used: usize,
    pub total_distance_km: f64,
    pub total_time_minutes: f64,
    pub total_fuel_liters: f64,
    pub total_cost_ron: f64,
    pub co2_emissions_kg: f64,
    pub on_time_percent: f64,
    pub average_utilization: f64,
}

/// Outcome of a single optimization call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub id: Uuid,
    pub routes: Vec<OptimizedRoute>,
    pub unassigned_stops: Vec<DeliveryStop>,
    pub summary: OptimizationSummary,
    pub algorithm: Algorithm,
    /// Seed of the pseudo-random generator; replaying it reproduces the run
    pub seed: u64,
    /// The search hit its timeout or was cancelled
    pub stopped_early: bool,
    pub computation_time_ms: u64,
}
