//! CAPEX, OPEX and total cost of ownership projection

use busplan_types::Technology;

use crate::model::{
    Capex, CostAssumptions, CostParameters, CostResult, OperationalResult, Opex, Tco, TcoYear,
};

fn capex(result: &OperationalResult, params: &CostParameters) -> Capex {
    let fleet = result.fleet_required as f64;
    let vehicles = params.vehicle * fleet;
    let en_route_chargers = params.en_route_charger * result.en_route_chargers() as f64;
    let depot_chargers = params.depot_charger * result.depot_chargers() as f64;
    let substation = if result.technology.is_electric() {
        params.substation
    } else {
        0.0
    };
    let hydrogen_station = if result.technology == Technology::Hydrogen {
        params.hydrogen_station
    } else {
        0.0
    };
    let depot_works = params.depot_works_per_vehicle * fleet;

    Capex {
        vehicles,
        en_route_chargers,
        depot_chargers,
        substation,
        hydrogen_station,
        depot_works,
        total: vehicles + en_route_chargers + depot_chargers + substation + hydrogen_station
            + depot_works,
    }
}

fn opex(result: &OperationalResult, params: &CostParameters, days: f64) -> Opex {
    let energy = params.energy_unit_cost * result.consumption.total_per_day * days;
    let maintenance = params.maintenance_per_km * result.daily_total_km * days;
    let battery_upkeep = if result.technology.is_electric() {
        params.battery_upkeep_per_vehicle * result.fleet_required as f64
    } else {
        0.0
    };

    Opex {
        energy,
        maintenance,
        battery_upkeep,
        total: energy + maintenance + battery_upkeep,
    }
}

/// Builds the year-by-year cost timeline.
///
/// Year 0 carries the capital outlay. Years `1..=horizon_years` carry the
/// annual operating cost, plus `replacement_outlay` in every year that is a
/// multiple of `battery_life_years`, except the final year.
///
/// # Examples
///
/// ```
/// use busplan_domain::service::project_timeline;
///
/// let years = project_timeline(1_000_000.0, 100_000.0, 0.0, 0, 5);
/// assert_eq!(years.len(), 6);
/// assert!((years[5].cumulative - 1_500_000.0).abs() < 1e-6);
/// ```
pub fn project_timeline(
    capex_total: f64,
    opex_total: f64,
    replacement_outlay: f64,
    battery_life_years: u32,
    horizon_years: u32,
) -> Vec<TcoYear> {
    let mut years = Vec::with_capacity(horizon_years as usize + 1);
    let mut cumulative = capex_total;
    years.push(TcoYear {
        year: 0,
        capex: capex_total,
        opex: 0.0,
        battery_replacement: 0.0,
        total: capex_total,
        cumulative,
    });

    for year in 1..=horizon_years {
        let replaces = replacement_outlay > 0.0
            && battery_life_years > 0
            && year < horizon_years
            && year % battery_life_years == 0;
        let battery_replacement = if replaces { replacement_outlay } else { 0.0 };
        let total = opex_total + battery_replacement;
        cumulative += total;
        years.push(TcoYear {
            year,
            capex: 0.0,
            opex: opex_total,
            battery_replacement,
            total,
            cumulative,
        });
    }
    years
}

/// Projects capital, annual operating and lifecycle cost of one technology.
pub fn project_costs(
    result: &OperationalResult,
    params: &CostParameters,
    assumptions: &CostAssumptions,
) -> CostResult {
    let days = assumptions.operating_days as f64;
    let capex = capex(result, params);
    let opex = opex(result, params, days);

    let replacement_outlay = if result.technology.is_electric() {
        params.battery_replacement * result.fleet_required as f64
    } else {
        0.0
    };
    let years = project_timeline(
        capex.total,
        opex.total,
        replacement_outlay,
        params.battery_life_years,
        assumptions.horizon_years,
    );
    let total = years.last().map(|y| y.cumulative).unwrap_or(capex.total);

    let lifetime_km = result.daily_total_km * days * assumptions.horizon_years as f64;
    let per_km = if lifetime_km > 0.0 { total / lifetime_km } else { 0.0 };
    let per_vehicle = if result.fleet_required > 0 {
        total / result.fleet_required as f64
    } else {
        0.0
    };

    CostResult {
        technology: result.technology,
        capex,
        opex,
        tco: Tco {
            years,
            total,
            per_km,
            per_vehicle,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DieselParameters, EnRouteParameters, HydrogenParameters, RouteParameters};
    use crate::service::fleet_sizing::{size_diesel, size_flash, size_hydrogen};
    use crate::service::mini_charge::OptimizerLimits;

    #[test]
    fn test_timeline_without_replacement() {
        let years = project_timeline(1_000_000.0, 100_000.0, 0.0, 0, 5);
        assert_eq!(years.len(), 6);
        assert!((years[0].total - 1_000_000.0).abs() < 1e-9);
        for y in &years[1..] {
            assert!((y.total - 100_000.0).abs() < 1e-9);
            assert_eq!(y.battery_replacement, 0.0);
        }
        assert!((years[5].cumulative - 1_500_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_replacement_cadence() {
        let years = project_timeline(0.0, 1.0, 50.0, 8, 17);
        let replaced: Vec<u32> = years
            .iter()
            .filter(|y| y.battery_replacement > 0.0)
            .map(|y| y.year)
            .collect();
        assert_eq!(replaced, vec![8, 16]);
    }

    #[test]
    fn test_no_replacement_in_final_year() {
        let years = project_timeline(0.0, 1.0, 50.0, 8, 16);
        assert_eq!(years[16].battery_replacement, 0.0);
        assert_eq!(years[8].battery_replacement, 50.0);
    }

    #[test]
    fn test_zero_horizon_is_capex_only() {
        let years = project_timeline(10.0, 1.0, 0.0, 0, 0);
        assert_eq!(years.len(), 1);
        assert!((years[0].cumulative - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_diesel_costs() {
        let op = size_diesel(&RouteParameters::default(), &DieselParameters::default());
        let params = CostParameters {
            vehicle: 250_000.0,
            depot_works_per_vehicle: 15_000.0,
            energy_unit_cost: 1.5,
            maintenance_per_km: 0.30,
            substation: 999.0,
            ..CostParameters::default()
        };
        let assumptions = CostAssumptions {
            horizon_years: 15,
            operating_days: 365,
        };
        let cost = project_costs(&op, &params, &assumptions);
        // 13 x (250k + 15k)
        assert!((cost.capex.total - 3_445_000.0).abs() < 1e-6);
        assert_eq!(cost.capex.substation, 0.0);
        // 455.4 L x 1.5 x 365
        assert!((cost.opex.energy - 249_331.5).abs() < 1e-3);
        assert_eq!(cost.opex.battery_upkeep, 0.0);
        assert!(cost.tco.replacement_years().is_empty());

        let expected = cost.capex.total + 15.0 * cost.opex.total;
        assert!((cost.tco.total - expected).abs() < 1e-3);
        assert!((cost.tco.per_vehicle - cost.tco.total / 13.0).abs() < 1e-6);
    }

    #[test]
    fn test_hydrogen_station_counted_once() {
        let op = size_hydrogen(&RouteParameters::default(), &HydrogenParameters::default());
        let params = CostParameters {
            hydrogen_station: 1_500_000.0,
            ..CostParameters::default()
        };
        let cost = project_costs(&op, &params, &CostAssumptions::default());
        assert!((cost.capex.hydrogen_station - 1_500_000.0).abs() < f64::EPSILON);
        assert!((cost.capex.total - 1_500_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_flash_costs_include_battery() {
        let op = size_flash(
            &RouteParameters::default(),
            &EnRouteParameters::flash(),
            &OptimizerLimits::default(),
        );
        let params = CostParameters {
            vehicle: 500_000.0,
            en_route_charger: 350_000.0,
            depot_charger: 40_000.0,
            substation: 300_000.0,
            depot_works_per_vehicle: 20_000.0,
            energy_unit_cost: 0.12,
            maintenance_per_km: 0.18,
            battery_upkeep_per_vehicle: 2_000.0,
            battery_replacement: 80_000.0,
            battery_life_years: 8,
            ..CostParameters::default()
        };
        let cost = project_costs(&op, &params, &CostAssumptions::default());
        // 13 buses, 1 head-end charger, 5 depot chargers
        let expected_capex = 13.0 * 500_000.0 + 350_000.0 + 5.0 * 40_000.0 + 300_000.0
            + 13.0 * 20_000.0;
        assert!((cost.capex.total - expected_capex).abs() < 1e-6);
        assert!((cost.opex.battery_upkeep - 26_000.0).abs() < 1e-9);
        assert_eq!(cost.tco.replacement_years(), vec![8]);
        assert!((cost.tco.years[8].battery_replacement - 13.0 * 80_000.0).abs() < 1e-6);

        let opex_years: f64 = cost.tco.years[1..]
            .iter()
            .map(|y| y.opex + y.battery_replacement)
            .sum();
        assert!((cost.tco.total - (cost.capex.total + opex_years)).abs() < 1e-3);
        assert!(cost.tco.per_km > 0.0);
    }
}
