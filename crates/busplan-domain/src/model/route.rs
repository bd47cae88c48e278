//! Route geometry and dispatch parameters

use serde::{Deserialize, Serialize};

/// Fixed route and timetable shared by every technology.
///
/// Durations are in minutes, distances in kilometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouteParameters {
    /// One-way route length
    pub route_length_km: f64,
    /// Commercial speed including stops
    pub commercial_speed_kmh: f64,
    /// Interval between consecutive departures
    pub headway_min: f64,
    /// Daily service window dispatched at constant headway
    pub service_window_min: f64,
    /// Regulation time at each terminus
    pub layover_min: f64,
    /// Dead running as a fraction of commercial distance (0.05 = 5%)
    pub empty_running_frac: f64,
}

impl Default for RouteParameters {
    fn default() -> Self {
        Self {
            route_length_km: 23.0,
            commercial_speed_kmh: 25.0,
            headway_min: 10.0,
            service_window_min: 990.0,
            layover_min: 5.0,
            empty_running_frac: 0.05,
        }
    }
}
