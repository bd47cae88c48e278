//! Fleet sizing per propulsion technology.
//!
//! Diesel, hydrogen and overnight-electric buses are bound by range alone:
//! the fleet is the larger of the headway fleet and the range fleet. Flash and
//! opportunity buses recover range at the terminus, so their fleet comes from
//! the mini-charge search in [`super::mini_charge`].

use std::collections::BTreeMap;

use busplan_types::Technology;
use tracing::debug;

use crate::model::{
    Consumption, DepotCharging, DieselParameters, ElectricDetails, EnRouteCharging,
    EnRouteParameters, EnergyUnit, HydrogenParameters, OperationalResult, OvernightParameters,
    RouteParameters, TechnologySet,
};

use super::ceil_count;
use super::mini_charge::{optimize_fleet, MiniChargePolicy, MiniChargeProblem, OptimizerLimits};
use super::range_model::{consumption_for, grid_energy_kwh, mini_charge_energy_kwh, RangeModel};
use super::route_schedule::RouteSchedule;

/// Charging-duration and charger-count policy of an en-route technology
pub trait EnRouteStrategy {
    fn technology(&self) -> Technology;

    /// Minutes actually spent charging at each stop
    fn effective_charge_min(&self, params: &EnRouteParameters) -> f64;

    /// Terminus chargers needed for the given mini-charge count
    fn en_route_chargers(
        &self,
        route: &RouteParameters,
        effective_charge_min: f64,
        mini_charges: u32,
    ) -> u32;
}

/// Short high-power pulses at a single head-end charger
#[derive(Debug, Clone, Copy, Default)]
pub struct FlashCharging;

impl EnRouteStrategy for FlashCharging {
    fn technology(&self) -> Technology {
        Technology::Flash
    }

    fn effective_charge_min(&self, params: &EnRouteParameters) -> f64 {
        params.en_route_charge_min
    }

    fn en_route_chargers(&self, _route: &RouteParameters, _effective: f64, mini_charges: u32) -> u32 {
        if mini_charges > 0 {
            1
        } else {
            0
        }
    }
}

/// Medium-power charging bounded by the terminal layover
#[derive(Debug, Clone, Copy, Default)]
pub struct OpportunityCharging;

impl EnRouteStrategy for OpportunityCharging {
    fn technology(&self) -> Technology {
        Technology::Opportunity
    }

    fn effective_charge_min(&self, params: &EnRouteParameters) -> f64 {
        params.en_route_charge_min.min(params.layover_min)
    }

    /// Vehicles overlapping at the terminus given the dispatch interval
    fn en_route_chargers(&self, route: &RouteParameters, effective: f64, mini_charges: u32) -> u32 {
        if mini_charges > 0 {
            ceil_count(effective / route.headway_min).max(1)
        } else {
            0
        }
    }
}

/// Fleet, per-vehicle distance and cycles for a range-bound technology
struct RangeBoundFleet {
    fleet_by_headway: u32,
    fleet_by_range: u32,
    fleet_required: u32,
    daily_commercial_km: f64,
    daily_total_km: f64,
    commercial_km_per_vehicle: f64,
    km_per_vehicle: f64,
    duty_cycles: u32,
}

impl RangeBoundFleet {
    fn new(schedule: &RouteSchedule, range_km: f64) -> Self {
        let fleet_by_headway = schedule.fleet_by_headway();
        let daily_commercial_km = schedule.daily_commercial_km();
        let daily_total_km = schedule.daily_total_km();
        let fleet_by_range = ceil_count(daily_total_km / range_km);
        let fleet_required = fleet_by_headway.max(fleet_by_range).max(1);
        let km_per_vehicle = daily_total_km / fleet_required as f64;

        Self {
            fleet_by_headway,
            fleet_by_range,
            fleet_required,
            daily_commercial_km,
            daily_total_km,
            commercial_km_per_vehicle: daily_commercial_km / fleet_required as f64,
            km_per_vehicle,
            duty_cycles: schedule.duty_cycles_for(km_per_vehicle),
        }
    }

    /// Fuel-burning technologies meter consumption on commercial distance
    fn into_fuel_result(
        self,
        technology: Technology,
        range_km: f64,
        unit: EnergyUnit,
        per_km: f64,
    ) -> OperationalResult {
        OperationalResult {
            technology,
            fleet_by_headway: self.fleet_by_headway,
            fleet_by_range: Some(self.fleet_by_range),
            fleet_required: self.fleet_required,
            daily_commercial_km: self.daily_commercial_km,
            daily_total_km: self.daily_total_km,
            commercial_km_per_vehicle: self.commercial_km_per_vehicle,
            km_per_vehicle: self.km_per_vehicle,
            duty_cycles_per_vehicle: self.duty_cycles,
            range_km,
            consumption: Consumption {
                unit,
                total_per_day: consumption_for(self.daily_commercial_km, per_km),
                per_vehicle_per_day: consumption_for(self.commercial_km_per_vehicle, per_km),
            },
            electric: None,
        }
    }
}

/// Nightly depot recharge sized as a bin-packing lower bound: vehicle-hours
/// of charging divided by the window, rounded up.
fn depot_charging(
    fleet: u32,
    energy_per_vehicle_kwh: f64,
    charger_kw: f64,
    window_h: f64,
) -> DepotCharging {
    let recharge_hours_per_vehicle = if energy_per_vehicle_kwh > 0.0 {
        energy_per_vehicle_kwh / charger_kw
    } else {
        0.0
    };
    let chargers = if recharge_hours_per_vehicle > 0.0 {
        ceil_count(fleet as f64 * recharge_hours_per_vehicle / window_h)
    } else {
        0
    };
    let energy_total_kwh = fleet as f64 * energy_per_vehicle_kwh;

    DepotCharging {
        chargers,
        charger_kw,
        energy_per_vehicle_kwh,
        recharge_hours_per_vehicle,
        energy_total_kwh,
        average_power_kw: energy_total_kwh / window_h,
        installed_power_kw: chargers as f64 * charger_kw,
    }
}

pub fn size_diesel(route: &RouteParameters, params: &DieselParameters) -> OperationalResult {
    let schedule = RouteSchedule::new(*route);
    RangeBoundFleet::new(&schedule, params.range_km).into_fuel_result(
        Technology::Diesel,
        params.range_km,
        EnergyUnit::Liters,
        params.consumption_l_per_km,
    )
}

pub fn size_hydrogen(route: &RouteParameters, params: &HydrogenParameters) -> OperationalResult {
    let schedule = RouteSchedule::new(*route);
    RangeBoundFleet::new(&schedule, params.range_km).into_fuel_result(
        Technology::Hydrogen,
        params.range_km,
        EnergyUnit::Kilograms,
        params.consumption_kg_per_km,
    )
}

/// Battery bus charged only in the depot. Range-bound like diesel, with the
/// usable range as limit.
pub fn size_overnight(route: &RouteParameters, params: &OvernightParameters) -> OperationalResult {
    let schedule = RouteSchedule::new(*route);
    let battery = RangeModel::new(
        params.battery_kwh,
        params.consumption_kwh_per_km,
        params.reserve_soc_frac,
    );
    let usable_range_km = battery.usable_range_km();
    let fleet = RangeBoundFleet::new(&schedule, usable_range_km);

    let energy_consumed_per_vehicle_kwh = battery.energy_for_km(fleet.km_per_vehicle);
    let recharge_per_vehicle_kwh = energy_consumed_per_vehicle_kwh / params.charging_efficiency;
    let depot = depot_charging(
        fleet.fleet_required,
        recharge_per_vehicle_kwh,
        params.charger_kw,
        params.charging_window_h,
    );

    OperationalResult {
        technology: Technology::Overnight,
        fleet_by_headway: fleet.fleet_by_headway,
        fleet_by_range: Some(fleet.fleet_by_range),
        fleet_required: fleet.fleet_required,
        daily_commercial_km: fleet.daily_commercial_km,
        daily_total_km: fleet.daily_total_km,
        commercial_km_per_vehicle: fleet.commercial_km_per_vehicle,
        km_per_vehicle: fleet.km_per_vehicle,
        duty_cycles_per_vehicle: fleet.duty_cycles,
        range_km: battery.total_range_km(),
        consumption: Consumption {
            unit: EnergyUnit::KilowattHours,
            total_per_day: depot.energy_total_kwh,
            per_vehicle_per_day: recharge_per_vehicle_kwh,
        },
        electric: Some(ElectricDetails {
            total_range_km: battery.total_range_km(),
            usable_range_km,
            effective_range_km: usable_range_km,
            energy_consumed_per_vehicle_kwh,
            charging_efficiency: params.charging_efficiency,
            depot,
            en_route: None,
            total_energy_kwh: depot.energy_total_kwh,
            total_installed_power_kw: depot.installed_power_kw,
        }),
    }
}

/// Battery bus with supplemental charging at the terminus.
///
/// Energy not recovered en route is shifted to a nightly depot top-up sized
/// like [`size_overnight`] on the residual energy.
pub fn size_en_route<S: EnRouteStrategy>(
    route: &RouteParameters,
    params: &EnRouteParameters,
    strategy: &S,
    limits: &OptimizerLimits,
) -> OperationalResult {
    let schedule = RouteSchedule::new(*route);
    let battery = RangeModel::new(
        params.battery_kwh,
        params.consumption_kwh_per_km,
        params.reserve_soc_frac,
    );
    let usable_range_km = battery.usable_range_km();
    let effective_charge_min = strategy.effective_charge_min(params);
    let km_per_mini_charge = battery.km_per_mini_charge(
        params.en_route_charger_kw,
        effective_charge_min,
        params.charging_efficiency,
    );

    let daily_commercial_km = schedule.daily_commercial_km();
    let daily_total_km = schedule.daily_total_km();
    let problem = MiniChargeProblem {
        daily_total_km,
        cycle_km: schedule.cycle_km(),
        usable_range_km,
        km_per_mini_charge,
        min_fleet: schedule.fleet_by_headway(),
        policy: MiniChargePolicy::from_cap(params.max_mini_charges),
    };
    let plan = optimize_fleet(&problem, limits);
    let fleet = plan.fleet;
    let mini_charges = plan.mini_charges;

    let chargers = strategy.en_route_chargers(route, effective_charge_min, mini_charges);
    let energy_consumed_per_vehicle_kwh = battery.energy_for_km(plan.km_per_vehicle);
    let energy_recovered_per_vehicle_kwh = mini_charges as f64
        * mini_charge_energy_kwh(
            params.en_route_charger_kw,
            effective_charge_min,
            params.charging_efficiency,
        );
    let residual_kwh = (energy_consumed_per_vehicle_kwh - energy_recovered_per_vehicle_kwh).max(0.0);
    let depot = depot_charging(
        fleet,
        residual_kwh / params.charging_efficiency,
        params.depot_charger_kw,
        params.depot_window_h,
    );

    let en_route = EnRouteCharging {
        km_per_mini_charge,
        effective_charge_min,
        layover_min: params.layover_min,
        mini_charges_per_vehicle: mini_charges,
        max_mini_charges_per_vehicle: plan.max_mini_charges,
        energy_recovered_per_vehicle_kwh,
        chargers,
        charger_kw: params.en_route_charger_kw,
        installed_power_kw: chargers as f64 * params.en_route_charger_kw,
        energy_total_kwh: fleet as f64
            * mini_charges as f64
            * grid_energy_kwh(params.en_route_charger_kw, effective_charge_min),
        shortfall_km_per_vehicle: plan.shortfall_km,
        uncovered_km_per_vehicle: plan.uncovered_km,
        convergence: plan.outcome,
    };
    let total_energy_kwh = depot.energy_total_kwh + en_route.energy_total_kwh;

    OperationalResult {
        technology: strategy.technology(),
        fleet_by_headway: schedule.fleet_by_headway(),
        fleet_by_range: None,
        fleet_required: fleet,
        daily_commercial_km,
        daily_total_km,
        commercial_km_per_vehicle: daily_commercial_km / fleet as f64,
        km_per_vehicle: plan.km_per_vehicle,
        duty_cycles_per_vehicle: plan.duty_cycles,
        range_km: battery.total_range_km(),
        consumption: Consumption {
            unit: EnergyUnit::KilowattHours,
            total_per_day: total_energy_kwh,
            per_vehicle_per_day: total_energy_kwh / fleet as f64,
        },
        electric: Some(ElectricDetails {
            total_range_km: battery.total_range_km(),
            usable_range_km,
            effective_range_km: usable_range_km + mini_charges as f64 * km_per_mini_charge,
            energy_consumed_per_vehicle_kwh,
            charging_efficiency: params.charging_efficiency,
            depot,
            en_route: Some(en_route),
            total_energy_kwh,
            total_installed_power_kw: depot.installed_power_kw + en_route.installed_power_kw,
        }),
    }
}

pub fn size_flash(
    route: &RouteParameters,
    params: &EnRouteParameters,
    limits: &OptimizerLimits,
) -> OperationalResult {
    size_en_route(route, params, &FlashCharging, limits)
}

pub fn size_opportunity(
    route: &RouteParameters,
    params: &EnRouteParameters,
    limits: &OptimizerLimits,
) -> OperationalResult {
    size_en_route(route, params, &OpportunityCharging, limits)
}

/// Sizes every configured technology. Technologies absent from `set` are
/// absent from the returned map.
pub fn evaluate_all(
    route: &RouteParameters,
    set: &TechnologySet,
    limits: &OptimizerLimits,
) -> BTreeMap<Technology, OperationalResult> {
    let mut results = BTreeMap::new();

    if let Some(p) = &set.diesel {
        results.insert(Technology::Diesel, size_diesel(route, p));
    }
    if let Some(p) = &set.overnight {
        results.insert(Technology::Overnight, size_overnight(route, p));
    }
    if let Some(p) = &set.flash {
        results.insert(Technology::Flash, size_flash(route, p, limits));
    }
    if let Some(p) = &set.opportunity {
        results.insert(Technology::Opportunity, size_opportunity(route, p, limits));
    }
    if let Some(p) = &set.hydrogen {
        results.insert(Technology::Hydrogen, size_hydrogen(route, p));
    }

    for (technology, result) in &results {
        debug!(
            %technology,
            fleet = result.fleet_required,
            fleet_by_headway = result.fleet_by_headway,
            "technology sized"
        );
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::mini_charge::Convergence;

    fn route() -> RouteParameters {
        RouteParameters::default()
    }

    #[test]
    fn test_diesel_reference() {
        let r = size_diesel(&route(), &DieselParameters::default());
        assert_eq!(r.fleet_by_headway, 13);
        assert_eq!(r.fleet_by_range, Some(8));
        assert_eq!(r.fleet_required, 13);
        assert!((r.consumption.total_per_day - 455.4).abs() < 1e-6);
        assert!((r.consumption.per_vehicle_per_day - 455.4 / 13.0).abs() < 1e-6);
        assert_eq!(r.consumption.unit, EnergyUnit::Liters);
        // 4781.7 / 13 = 367.8 km -> 8 cycles of 46 km
        assert_eq!(r.duty_cycles_per_vehicle, 8);
        assert!(r.electric.is_none());
    }

    #[test]
    fn test_diesel_short_range_dominates() {
        let p = DieselParameters {
            consumption_l_per_km: 0.10,
            range_km: 200.0,
        };
        let r = size_diesel(&route(), &p);
        // ceil(4781.7 / 200) = 24
        assert_eq!(r.fleet_by_range, Some(24));
        assert_eq!(r.fleet_required, 24);
    }

    #[test]
    fn test_hydrogen_reference() {
        let r = size_hydrogen(&route(), &HydrogenParameters::default());
        assert_eq!(r.fleet_by_range, Some(10));
        assert_eq!(r.fleet_required, 13);
        assert!((r.consumption.total_per_day - 455.4).abs() < 1e-6);
        assert_eq!(r.consumption.unit, EnergyUnit::Kilograms);
    }

    #[test]
    fn test_overnight_reference() {
        let r = size_overnight(&route(), &OvernightParameters::default());
        // usable 233.3 km -> ceil(4781.7 / 233.3) = 21
        assert_eq!(r.fleet_by_range, Some(21));
        assert_eq!(r.fleet_required, 21);
        assert!((r.km_per_vehicle - 227.7).abs() < 1e-6);
        assert_eq!(r.duty_cycles_per_vehicle, 5);

        let e = r.electric.expect("electric details");
        assert!((e.energy_consumed_per_vehicle_kwh - 273.24).abs() < 1e-6);
        assert!((e.depot.energy_per_vehicle_kwh - 303.6).abs() < 1e-6);
        assert!((e.depot.recharge_hours_per_vehicle - 2.024).abs() < 1e-6);
        // ceil(21 x 2.024 / 6) = ceil(7.084) = 8
        assert_eq!(e.depot.chargers, 8);
        assert!((e.depot.installed_power_kw - 1200.0).abs() < 1e-9);
        assert!((e.depot.energy_total_kwh - 6375.6).abs() < 1e-6);
        assert!((e.depot.average_power_kw - 1062.6).abs() < 1e-6);
        assert!(e.en_route.is_none());
        assert!((e.effective_range_km - e.usable_range_km).abs() < f64::EPSILON);
    }

    #[test]
    fn test_flash_reference() {
        let r = size_flash(&route(), &EnRouteParameters::flash(), &OptimizerLimits::default());
        assert_eq!(r.fleet_required, 13);
        assert_eq!(r.fleet_by_range, None);
        assert_eq!(r.duty_cycles_per_vehicle, 8);

        let e = r.electric.expect("electric details");
        let en_route = e.en_route.expect("en-route details");
        assert!((en_route.km_per_mini_charge - 22.5).abs() < 1e-9);
        assert_eq!(en_route.mini_charges_per_vehicle, 6);
        assert_eq!(en_route.chargers, 1);
        assert!((en_route.installed_power_kw - 600.0).abs() < 1e-9);
        assert!((en_route.energy_recovered_per_vehicle_kwh - 162.0).abs() < 1e-9);
        // 13 buses x 6 charges x 30 kWh from the grid
        assert!((en_route.energy_total_kwh - 2340.0).abs() < 1e-6);
        assert_eq!(en_route.convergence, Convergence::Converged);
        // residual (5738.04 - 2106) / 0.9 = 4035.6 kWh at the depot
        assert!((e.depot.energy_total_kwh - 4035.6).abs() < 1e-6);
        assert_eq!(e.depot.chargers, 5);
        assert!((e.total_energy_kwh - 6375.6).abs() < 1e-6);
        assert!((e.total_installed_power_kw - 1350.0).abs() < 1e-9);
        assert!((e.effective_range_km - (e.usable_range_km + 135.0)).abs() < 1e-9);
        assert!(r.is_feasible());
    }

    #[test]
    fn test_flash_capped_mini_charges() {
        let params = EnRouteParameters {
            max_mini_charges: Some(2),
            ..EnRouteParameters::flash()
        };
        let r = size_flash(&route(), &params, &OptimizerLimits::default());
        assert_eq!(r.fleet_required, 18);
        assert_eq!(r.mini_charges_per_vehicle(), 2);
    }

    #[test]
    fn test_flash_zero_cap_has_no_head_end_charger() {
        let params = EnRouteParameters {
            max_mini_charges: Some(0),
            ..EnRouteParameters::flash()
        };
        let r = size_flash(&route(), &params, &OptimizerLimits::default());
        assert_eq!(r.mini_charges_per_vehicle(), 0);
        assert_eq!(r.en_route_chargers(), 0);
        assert_eq!(r.fleet_required, 21);
    }

    #[test]
    fn test_opportunity_reference() {
        let r = size_opportunity(
            &route(),
            &EnRouteParameters::opportunity(),
            &OptimizerLimits::default(),
        );
        let en_route = r.electric.and_then(|e| e.en_route).expect("en-route details");
        // 200 kW x 10 min x 0.9 / 1.2 = 25 km per stop
        assert!((en_route.effective_charge_min - 10.0).abs() < f64::EPSILON);
        assert!((en_route.km_per_mini_charge - 25.0).abs() < 1e-9);
        assert_eq!(r.fleet_required, 13);
        // shortfall 134.5 km / 25 = 5.4 -> 6
        assert_eq!(en_route.mini_charges_per_vehicle, 6);
        assert_eq!(en_route.chargers, 1);
    }

    #[test]
    fn test_opportunity_charge_bounded_by_layover() {
        let params = EnRouteParameters {
            layover_min: 5.0,
            ..EnRouteParameters::opportunity()
        };
        let r = size_opportunity(&route(), &params, &OptimizerLimits::default());
        let en_route = r.electric.and_then(|e| e.en_route).expect("en-route details");
        assert!((en_route.effective_charge_min - 5.0).abs() < f64::EPSILON);
        assert!((en_route.km_per_mini_charge - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_opportunity_chargers_follow_headway() {
        let short_headway = RouteParameters {
            headway_min: 4.0,
            ..RouteParameters::default()
        };
        let r = size_opportunity(
            &short_headway,
            &EnRouteParameters::opportunity(),
            &OptimizerLimits::default(),
        );
        assert!(r.mini_charges_per_vehicle() > 0);
        // ceil(10 / 4) = 3 vehicles charging at once
        assert_eq!(r.en_route_chargers(), 3);
    }

    #[test]
    fn test_evaluate_all_skips_absent() {
        let set = TechnologySet {
            diesel: Some(DieselParameters::default()),
            hydrogen: Some(HydrogenParameters::default()),
            ..TechnologySet::default()
        };
        let results = evaluate_all(&route(), &set, &OptimizerLimits::default());
        assert_eq!(results.len(), 2);
        assert!(results.contains_key(&Technology::Diesel));
        assert!(results.contains_key(&Technology::Hydrogen));
        assert!(!results.contains_key(&Technology::Flash));
    }

    #[test]
    fn test_evaluate_all_canonical_order() {
        let results = evaluate_all(
            &route(),
            &TechnologySet::all_defaults(),
            &OptimizerLimits::default(),
        );
        let keys: Vec<Technology> = results.keys().copied().collect();
        assert_eq!(keys, Technology::ALL.to_vec());
    }
}
