//! Timetable-derived quantities for a route

use crate::model::RouteParameters;

use super::ceil_count;

/// Derives cycle time, headway-bound fleet and daily distances from the
/// route geometry and dispatch parameters.
///
/// # Examples
///
/// ```
/// use busplan_domain::model::RouteParameters;
/// use busplan_domain::service::RouteSchedule;
///
/// let schedule = RouteSchedule::new(RouteParameters::default());
/// assert_eq!(schedule.fleet_by_headway(), 13);
/// assert_eq!(schedule.departures_per_direction(), 99);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RouteSchedule {
    route: RouteParameters,
}

impl RouteSchedule {
    pub fn new(route: RouteParameters) -> Self {
        Self { route }
    }

    pub fn route(&self) -> &RouteParameters {
        &self.route
    }

    /// Driving time for one direction, in minutes
    pub fn one_way_time_min(&self) -> f64 {
        self.route.route_length_km / self.route.commercial_speed_kmh * 60.0
    }

    /// Full round trip including regulation at both termini, in minutes
    pub fn cycle_time_min(&self) -> f64 {
        2.0 * (self.one_way_time_min() + self.route.layover_min)
    }

    /// Distance of one duty cycle (both directions)
    pub fn cycle_km(&self) -> f64 {
        2.0 * self.route.route_length_km
    }

    /// Vehicles in rotation needed to sustain the headway. Lower bound for
    /// every technology.
    pub fn fleet_by_headway(&self) -> u32 {
        ceil_count(self.cycle_time_min() / self.route.headway_min)
    }

    /// Departures in each direction over the service window (truncated, no
    /// extra closing trip)
    pub fn departures_per_direction(&self) -> u32 {
        (self.route.service_window_min / self.route.headway_min).floor() as u32
    }

    pub fn daily_commercial_km(&self) -> f64 {
        2.0 * self.departures_per_direction() as f64 * self.route.route_length_km
    }

    /// Commercial distance plus dead running
    pub fn daily_total_km(&self) -> f64 {
        self.daily_commercial_km() * (1.0 + self.route.empty_running_frac)
    }

    /// Duty cycles one vehicle must complete to cover `km_per_vehicle`
    pub fn duty_cycles_for(&self, km_per_vehicle: f64) -> u32 {
        ceil_count(km_per_vehicle / self.cycle_km())
    }
}
