//! Utility functions for reporting optimization results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use crate::result::OptimizationResult;

/// Round to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole` as a percentage, zero when `whole` is not positive.
pub fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// Format a number of minutes as `HH:MM`.
pub fn format_minutes(minutes: f64) -> String {
    let total = minutes.max(0.0).round() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Format the summary block of a result.
pub fn format_summary(result: &OptimizationResult) -> String {
    let s = &result.summary;
    format!(
        "Optimization Summary:
- Algorithm: {}
- Seed: {}
- Stopped Early: {}
- Computation Time: {} ms
- Stops: {} assigned / {} total ({} unassigned)
- Vehicles Used: {}
- Total Distance: {:.2} km
- Total Time: {}
- Total Fuel: {:.2} L
- Total Cost: {:.2} RON
- CO2 Emissions: {:.2} kg
- On Time: {:.0}%
- Average Utilization: {:.0}%",
        result.algorithm,
        result.seed,
        result.stopped_early,
        result.computation_time_ms,
        s.assigned_stops,
        s.total_stops,
        s.unassigned_stops,
        s.vehicles_used,
        s.total_distance_km,
        format_minutes(s.total_time_minutes),
        s.total_fuel_liters,
        s.total_cost_ron,
        s.co2_emissions_kg,
        s.on_time_percent,
        s.average_utilization
    )
}

/// Write a human-readable report of a result.
pub fn write_report<W: Write>(result: &OptimizationResult, out: &mut W) -> io::Result<()> {
    writeln!(out, "Route optimization {}", result.id)?;
    writeln!(out, "{}", format_summary(result))?;
    writeln!(out)?;

    for (i, route) in result.routes.iter().enumerate() {
        writeln!(
            out,
            "Route #{}: {} ({})",
            i + 1,
            route.vehicle_name,
            route.vehicle_id
        )?;

        write!(out, "  Depot")?;
        for stop in &route.stops {
            write!(out, " -> {}", stop.stop.id)?;
        }
        writeln!(out, " -> Depot")?;

        for stop in &route.stops {
            writeln!(
                out,
                "  {:>2}. {:<12} arrive {} depart {} load {:.0} kg{}",
                stop.sequence,
                stop.stop.id,
                stop.arrival_time.format("%H:%M"),
                stop.departure_time.format("%H:%M"),
                stop.cumulative_load.weight,
                if stop.is_late() {
                    format!(" LATE {:.0} min", stop.late_minutes)
                } else {
                    String::new()
                }
            )?;
        }

        let m = &route.metrics;
        writeln!(
            out,
            "  Distance: {:.2} km, Time: {}, Cost: {:.2} RON, Utilization: {:.0}%",
            m.total_distance_km,
            format_minutes(m.total_time_minutes),
            m.total_cost_ron,
            m.utilization_percent
        )?;
        for warning in &route.warnings {
            writeln!(out, "  ! {}", warning)?;
        }
        writeln!(out)?;
    }

    if !result.unassigned_stops.is_empty() {
        write!(out, "Unassigned:")?;
        for stop in &result.unassigned_stops {
            write!(out, " {}", stop.id)?;
        }
        writeln!(out)?;
    }

    Ok(())
}

/// Save a report of a result to a file.
pub fn save_report<P: AsRef<Path>>(result: &OptimizationResult, path: P) -> io::Result<()> {
    let mut file = File::create(path)?;
    write_report(result, &mut file)
}
