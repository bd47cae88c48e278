//! Cost inputs and lifecycle cost records

use busplan_types::Technology;
use serde::{Deserialize, Serialize};

/// Project-wide financial assumptions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostAssumptions {
    pub horizon_years: u32,
    pub operating_days: u32,
}

impl Default for CostAssumptions {
    fn default() -> Self {
        Self {
            horizon_years: 15,
            operating_days: 365,
        }
    }
}

/// Unit costs for one technology, in a single currency.
///
/// Components that do not apply to a technology are left at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostParameters {
    pub vehicle: f64,
    pub en_route_charger: f64,
    pub depot_charger: f64,
    /// Grid connection, once per project
    pub substation: f64,
    /// Refuelling station, once per project
    pub hydrogen_station: f64,
    pub depot_works_per_vehicle: f64,
    /// Per litre, kilogram or kilowatt-hour
    pub energy_unit_cost: f64,
    pub maintenance_per_km: f64,
    pub battery_upkeep_per_vehicle: f64,
    pub battery_replacement: f64,
    pub battery_life_years: u32,
}

/// Capital expenditure breakdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Capex {
    pub vehicles: f64,
    pub en_route_chargers: f64,
    pub depot_chargers: f64,
    pub substation: f64,
    pub hydrogen_station: f64,
    pub depot_works: f64,
    pub total: f64,
}

/// Annual operating expenditure breakdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Opex {
    pub energy: f64,
    pub maintenance: f64,
    pub battery_upkeep: f64,
    pub total: f64,
}

/// One year of the cost timeline. Year 0 holds the capital outlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TcoYear {
    pub year: u32,
    pub capex: f64,
    pub opex: f64,
    pub battery_replacement: f64,
    pub total: f64,
    pub cumulative: f64,
}

/// Total cost of ownership over the horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tco {
    pub years: Vec<TcoYear>,
    pub total: f64,
    pub per_km: f64,
    pub per_vehicle: f64,
}

impl Tco {
    /// Years in which batteries are replaced
    pub fn replacement_years(&self) -> Vec<u32> {
        self.years
            .iter()
            .filter(|y| y.battery_replacement > 0.0)
            .map(|y| y.year)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostResult {
    pub technology: Technology,
    pub capex: Capex,
    pub opex: Opex,
    pub tco: Tco,
}
