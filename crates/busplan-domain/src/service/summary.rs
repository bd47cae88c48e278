//! Side-by-side comparison of technologies

use std::collections::BTreeMap;

use busplan_types::Technology;
use serde::{Deserialize, Serialize};

use crate::model::OperationalResult;

/// Key indicators of one technology, for comparison tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub technology: Technology,
    pub fleet: u32,
    pub fleet_by_headway: u32,
    pub chargers_total: u32,
    pub depot_chargers: u32,
    pub en_route_chargers: u32,
    pub installed_power_kw: f64,
    pub daily_energy: f64,
    pub energy_label: String,
    pub mini_charges: u32,
    pub duty_cycles: u32,
    pub usable_range_km: f64,
    pub effective_range_km: f64,
    pub km_per_vehicle: f64,
    pub daily_commercial_km: f64,
    pub feasible: bool,
}

impl From<&OperationalResult> for ComparisonRow {
    fn from(r: &OperationalResult) -> Self {
        let (usable_range_km, effective_range_km, installed_power_kw) = match &r.electric {
            Some(e) => (e.usable_range_km, e.effective_range_km, e.total_installed_power_kw),
            None => (r.range_km, r.range_km, 0.0),
        };

        Self {
            technology: r.technology,
            fleet: r.fleet_required,
            fleet_by_headway: r.fleet_by_headway,
            chargers_total: r.total_chargers(),
            depot_chargers: r.depot_chargers(),
            en_route_chargers: r.en_route_chargers(),
            installed_power_kw,
            daily_energy: r.consumption.total_per_day,
            energy_label: r.consumption.unit.label().to_string(),
            mini_charges: r.mini_charges_per_vehicle(),
            duty_cycles: r.duty_cycles_per_vehicle,
            usable_range_km,
            effective_range_km,
            km_per_vehicle: r.km_per_vehicle,
            daily_commercial_km: r.daily_commercial_km,
            feasible: r.is_feasible(),
        }
    }
}

/// One row per configured technology, in canonical order
pub fn summarize(results: &BTreeMap<Technology, OperationalResult>) -> Vec<ComparisonRow> {
    results.values().map(ComparisonRow::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RouteParameters, TechnologySet};
    use crate::service::fleet_sizing::evaluate_all;
    use crate::service::mini_charge::OptimizerLimits;

    #[test]
    fn test_summary_rows() {
        let results = evaluate_all(
            &RouteParameters::default(),
            &TechnologySet::all_defaults(),
            &OptimizerLimits::default(),
        );
        let rows = summarize(&results);
        assert_eq!(rows.len(), 5);

        let diesel = &rows[0];
        assert_eq!(diesel.technology, Technology::Diesel);
        assert_eq!(diesel.chargers_total, 0);
        assert_eq!(diesel.energy_label, "L/day");
        assert!((diesel.usable_range_km - 600.0).abs() < f64::EPSILON);

        let overnight = &rows[1];
        assert_eq!(overnight.chargers_total, 8);
        assert_eq!(overnight.mini_charges, 0);

        let flash = &rows[2];
        assert_eq!(flash.en_route_chargers, 1);
        assert_eq!(flash.chargers_total, 6);
        assert!(flash.feasible);
        assert!(flash.effective_range_km > flash.usable_range_km);
    }
}
