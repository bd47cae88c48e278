//! Default unit costs per technology
//!
//! Vehicle and infrastructure prices are indicative market figures for a
//! 12 m urban bus, in a single currency unit.

use busplan_domain::model::CostParameters;
use busplan_types::Technology;

/// Battery pack replacement and upkeep, shared by every battery technology
fn battery_electric(vehicle: f64, en_route_charger: f64, substation: f64) -> CostParameters {
    CostParameters {
        vehicle,
        en_route_charger,
        depot_charger: 40_000.0,
        substation,
        hydrogen_station: 0.0,
        depot_works_per_vehicle: 20_000.0,
        energy_unit_cost: 0.12,
        maintenance_per_km: 0.18,
        battery_upkeep_per_vehicle: 2_000.0,
        battery_replacement: 80_000.0,
        battery_life_years: 8,
    }
}

/// Unit costs used when a scenario does not override them
pub fn default_cost_parameters(technology: Technology) -> CostParameters {
    match technology {
        Technology::Diesel => CostParameters {
            vehicle: 250_000.0,
            depot_works_per_vehicle: 15_000.0,
            // per litre
            energy_unit_cost: 1.50,
            maintenance_per_km: 0.30,
            ..CostParameters::default()
        },
        Technology::Overnight => battery_electric(450_000.0, 0.0, 200_000.0),
        // pantograph at the head-end
        Technology::Flash => battery_electric(500_000.0, 350_000.0, 300_000.0),
        Technology::Opportunity => battery_electric(480_000.0, 250_000.0, 250_000.0),
        Technology::Hydrogen => CostParameters {
            vehicle: 600_000.0,
            hydrogen_station: 1_500_000.0,
            depot_works_per_vehicle: 20_000.0,
            // per kilogram
            energy_unit_cost: 6.00,
            maintenance_per_km: 0.25,
            ..CostParameters::default()
        },
    }
}
