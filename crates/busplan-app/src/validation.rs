//! Input validation
//!
//! The calculation engine assumes well-formed numbers; everything that
//! reaches it passes through here first.

use busplan_domain::model::{
    CostAssumptions, CostParameters, DieselParameters, EnRouteParameters, HydrogenParameters,
    OvernightParameters, RouteParameters,
};
use busplan_domain::service::OptimizerLimits;
use busplan_types::{Technology, ValidationError};

use crate::config::Scenario;

type Check = Result<(), ValidationError>;

fn finite(field: &str, value: f64) -> Check {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFinite {
            field: field.to_string(),
        })
    }
}

fn positive(field: &str, value: f64) -> Check {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NonPositive {
            field: field.to_string(),
            value,
        })
    }
}

fn non_negative(field: &str, value: f64) -> Check {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::Negative {
            field: field.to_string(),
            value,
        })
    }
}

/// `min <= value < max`
fn fraction(field: &str, value: f64, min: f64, max: f64) -> Check {
    finite(field, value)?;
    if (min..max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::FractionOutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        })
    }
}

/// `min <= value <= max`
fn in_range(field: &str, value: f64, min: f64, max: f64) -> Check {
    finite(field, value)?;
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        })
    }
}

pub fn validate_route(route: &RouteParameters) -> Check {
    positive("route.route_length_km", route.route_length_km)?;
    positive("route.commercial_speed_kmh", route.commercial_speed_kmh)?;
    positive("route.headway_min", route.headway_min)?;
    positive("route.service_window_min", route.service_window_min)?;
    non_negative("route.layover_min", route.layover_min)?;
    fraction("route.empty_running_frac", route.empty_running_frac, 0.0, 1.0)
}

pub fn validate_diesel(p: &DieselParameters) -> Check {
    positive("diesel.consumption_l_per_km", p.consumption_l_per_km)?;
    positive("diesel.range_km", p.range_km)
}

pub fn validate_hydrogen(p: &HydrogenParameters) -> Check {
    positive("hydrogen.consumption_kg_per_km", p.consumption_kg_per_km)?;
    positive("hydrogen.range_km", p.range_km)
}

fn battery(
    prefix: &str,
    battery_kwh: f64,
    consumption_kwh_per_km: f64,
    reserve_soc_frac: f64,
    charging_efficiency: f64,
) -> Check {
    positive(&format!("{prefix}.battery_kwh"), battery_kwh)?;
    positive(
        &format!("{prefix}.consumption_kwh_per_km"),
        consumption_kwh_per_km,
    )?;
    fraction(
        &format!("{prefix}.reserve_soc_frac"),
        reserve_soc_frac,
        0.0,
        0.5,
    )?;
    let field = format!("{prefix}.charging_efficiency");
    positive(&field, charging_efficiency)?;
    in_range(&field, charging_efficiency, 0.0, 1.0)
}

pub fn validate_overnight(p: &OvernightParameters) -> Check {
    battery(
        "overnight",
        p.battery_kwh,
        p.consumption_kwh_per_km,
        p.reserve_soc_frac,
        p.charging_efficiency,
    )?;
    positive("overnight.charger_kw", p.charger_kw)?;
    positive("overnight.charging_window_h", p.charging_window_h)
}

/// Checks flash or opportunity parameters. For opportunity charging the
/// layover bounds the charge, so a zero layover is rejected as well.
pub fn validate_en_route(technology: Technology, p: &EnRouteParameters) -> Check {
    let prefix = technology.key();
    battery(
        prefix,
        p.battery_kwh,
        p.consumption_kwh_per_km,
        p.reserve_soc_frac,
        p.charging_efficiency,
    )?;
    positive(&format!("{prefix}.en_route_charger_kw"), p.en_route_charger_kw)?;
    positive(&format!("{prefix}.en_route_charge_min"), p.en_route_charge_min)?;
    non_negative(&format!("{prefix}.layover_min"), p.layover_min)?;
    positive(&format!("{prefix}.depot_charger_kw"), p.depot_charger_kw)?;
    positive(&format!("{prefix}.depot_window_h"), p.depot_window_h)?;

    if technology == Technology::Opportunity {
        positive(
            "opportunity.effective_charge_min",
            p.en_route_charge_min.min(p.layover_min),
        )?;
    }
    Ok(())
}

pub fn validate_costs(technology: Technology, p: &CostParameters) -> Check {
    let prefix = format!("costs.{}", technology.key());
    let unit_costs = [
        ("vehicle", p.vehicle),
        ("en_route_charger", p.en_route_charger),
        ("depot_charger", p.depot_charger),
        ("substation", p.substation),
        ("hydrogen_station", p.hydrogen_station),
        ("depot_works_per_vehicle", p.depot_works_per_vehicle),
        ("energy_unit_cost", p.energy_unit_cost),
        ("maintenance_per_km", p.maintenance_per_km),
        ("battery_upkeep_per_vehicle", p.battery_upkeep_per_vehicle),
        ("battery_replacement", p.battery_replacement),
    ];
    for (name, value) in unit_costs {
        non_negative(&format!("{prefix}.{name}"), value)?;
    }
    if technology.is_electric() {
        positive(
            &format!("{prefix}.battery_life_years"),
            p.battery_life_years as f64,
        )?;
    }
    Ok(())
}

/// Longest projection horizon accepted, in years
pub const MAX_HORIZON_YEARS: u32 = 100;

pub fn validate_assumptions(a: &CostAssumptions) -> Check {
    in_range(
        "costs.horizon_years",
        a.horizon_years as f64,
        1.0,
        MAX_HORIZON_YEARS as f64,
    )?;
    in_range("costs.operating_days", a.operating_days as f64, 1.0, 366.0)
}

pub fn validate_limits(limits: &OptimizerLimits) -> Check {
    positive(
        "optimizer.max_fleet_multiplier",
        limits.max_fleet_multiplier as f64,
    )
}

/// Validates every configured part of a scenario, stopping at the first
/// offending field
pub fn validate_scenario(scenario: &Scenario) -> Check {
    validate_route(&scenario.route)?;
    validate_limits(&scenario.optimizer)?;

    let set = scenario.technologies();
    if let Some(p) = &set.diesel {
        validate_diesel(p)?;
    }
    if let Some(p) = &set.overnight {
        validate_overnight(p)?;
    }
    if let Some(p) = &set.flash {
        validate_en_route(Technology::Flash, p)?;
    }
    if let Some(p) = &set.opportunity {
        validate_en_route(Technology::Opportunity, p)?;
    }
    if let Some(p) = &set.hydrogen {
        validate_hydrogen(p)?;
    }

    validate_assumptions(&scenario.costs.assumptions())?;
    for technology in scenario.configured() {
        validate_costs(technology, &scenario.cost_parameters(technology))?;
    }
    Ok(())
}
