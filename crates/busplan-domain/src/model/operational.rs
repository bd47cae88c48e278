//! Operational result records produced by the fleet sizing engine

use busplan_types::Technology;
use serde::{Deserialize, Serialize};

use crate::service::mini_charge::Convergence;

/// Unit of the daily fuel or energy figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyUnit {
    Liters,
    Kilograms,
    KilowattHours,
}

impl EnergyUnit {
    pub fn label(&self) -> &'static str {
        match self {
            EnergyUnit::Liters => "L/day",
            EnergyUnit::Kilograms => "kg H2/day",
            EnergyUnit::KilowattHours => "kWh/day",
        }
    }
}

/// Daily fuel or grid energy demand
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Consumption {
    pub unit: EnergyUnit,
    /// Whole fleet, per day
    pub total_per_day: f64,
    /// One vehicle, per day
    pub per_vehicle_per_day: f64,
}

/// Nightly depot charging
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepotCharging {
    pub chargers: u32,
    pub charger_kw: f64,
    /// Grid-side energy drawn per vehicle each night
    pub energy_per_vehicle_kwh: f64,
    pub recharge_hours_per_vehicle: f64,
    pub energy_total_kwh: f64,
    /// Depot energy spread evenly over the charging window
    pub average_power_kw: f64,
    pub installed_power_kw: f64,
}

/// Supplemental charging at the terminus during service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnRouteCharging {
    pub km_per_mini_charge: f64,
    /// Charge duration actually available per stop
    pub effective_charge_min: f64,
    pub layover_min: f64,
    pub mini_charges_per_vehicle: u32,
    pub max_mini_charges_per_vehicle: u32,
    /// Battery-side energy recovered per vehicle per day
    pub energy_recovered_per_vehicle_kwh: f64,
    pub chargers: u32,
    pub charger_kw: f64,
    pub installed_power_kw: f64,
    /// Grid-side energy delivered by the en-route chargers per day
    pub energy_total_kwh: f64,
    /// Distance per vehicle beyond usable range
    pub shortfall_km_per_vehicle: f64,
    /// Distance per vehicle left uncovered by range and mini-charges
    pub uncovered_km_per_vehicle: f64,
    pub convergence: Convergence,
}

/// Battery and charging figures shared by every electric technology
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElectricDetails {
    pub total_range_km: f64,
    pub usable_range_km: f64,
    /// Usable range plus distance recovered by mini-charges
    pub effective_range_km: f64,
    pub energy_consumed_per_vehicle_kwh: f64,
    pub charging_efficiency: f64,
    pub depot: DepotCharging,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub en_route: Option<EnRouteCharging>,
    pub total_energy_kwh: f64,
    pub total_installed_power_kw: f64,
}

/// Steady-state daily operation of one technology on the route.
///
/// Distances in km, energy in kWh, fuel in L, hydrogen in kg, power in kW.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationalResult {
    pub technology: Technology,
    pub fleet_by_headway: u32,
    /// Fleet needed for range alone, when range is the only constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fleet_by_range: Option<u32>,
    pub fleet_required: u32,
    pub daily_commercial_km: f64,
    pub daily_total_km: f64,
    pub commercial_km_per_vehicle: f64,
    pub km_per_vehicle: f64,
    pub duty_cycles_per_vehicle: u32,
    /// Fuel tank range, or battery range before the reserve buffer
    pub range_km: f64,
    pub consumption: Consumption,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electric: Option<ElectricDetails>,
}

impl OperationalResult {
    pub fn depot_chargers(&self) -> u32 {
        self.electric.map(|e| e.depot.chargers).unwrap_or(0)
    }

    pub fn en_route_chargers(&self) -> u32 {
        self.electric
            .and_then(|e| e.en_route)
            .map(|r| r.chargers)
            .unwrap_or(0)
    }

    pub fn total_chargers(&self) -> u32 {
        self.depot_chargers() + self.en_route_chargers()
    }

    pub fn mini_charges_per_vehicle(&self) -> u32 {
        self.electric
            .and_then(|e| e.en_route)
            .map(|r| r.mini_charges_per_vehicle)
            .unwrap_or(0)
    }

    /// `false` only when the mini-charge search hit its iteration cap
    pub fn is_feasible(&self) -> bool {
        self.electric
            .and_then(|e| e.en_route)
            .map(|r| r.convergence == Convergence::Converged)
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{DieselParameters, EnRouteParameters, RouteParameters};
    use crate::service::{size_diesel, size_flash, OptimizerLimits};

    #[test]
    fn test_flash_result_field_names() {
        let result = size_flash(
            &RouteParameters::default(),
            &EnRouteParameters::flash(),
            &OptimizerLimits::default(),
        );
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["technology"], "flash");
        assert_eq!(value["fleet_required"], 13);
        assert_eq!(value["fleet_by_headway"], 13);
        assert!(value.get("fleet_by_range").is_none());
        assert_eq!(value["consumption"]["unit"], "kilowatthours");

        let electric = &value["electric"];
        assert_eq!(electric["depot"]["chargers"], 5);
        let en_route = &electric["en_route"];
        assert_eq!(en_route["convergence"], "converged");
        assert_eq!(en_route["mini_charges_per_vehicle"], 6);
        assert_eq!(en_route["chargers"], 1);
        assert!((en_route["km_per_mini_charge"].as_f64().unwrap() - 22.5).abs() < 1e-9);
        assert!(en_route.get("uncovered_km_per_vehicle").is_some());
        assert!((electric["total_installed_power_kw"].as_f64().unwrap() - 1350.0).abs() < 1e-9);
    }

    #[test]
    fn test_diesel_result_has_no_electric_section() {
        let result = size_diesel(&RouteParameters::default(), &DieselParameters::default());
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["technology"], "diesel");
        assert_eq!(value["fleet_by_range"], 8);
        assert_eq!(value["consumption"]["unit"], "liters");
        assert!(value.get("electric").is_none());
        assert!(value.pointer("/electric/en_route").is_none());
    }
}
