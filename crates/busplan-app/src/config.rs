//! Scenario configuration
//!
//! A scenario is one TOML document: the route, the technologies to compare,
//! their unit costs and the optimizer bound. Technology tables left out of
//! the document are not evaluated.

use std::path::Path;

use busplan_domain::model::{
    CostAssumptions, CostParameters, DieselParameters, EnRouteParameters, HydrogenParameters,
    OvernightParameters, RouteParameters, TechnologySet,
};
use busplan_domain::service::OptimizerLimits;
use busplan_types::{ConfigError, Error, Result, Technology};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::default_cost_parameters;

/// One planning scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub route: RouteParameters,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diesel: Option<DieselParameters>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overnight: Option<OvernightParameters>,

    /// Overrides on top of the flash charging defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash: Option<EnRouteOverrides>,

    /// Overrides on top of the opportunity charging defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity: Option<EnRouteOverrides>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hydrogen: Option<HydrogenParameters>,

    #[serde(default)]
    pub costs: CostsConfig,

    #[serde(default)]
    pub optimizer: OptimizerLimits,
}

impl Default for Scenario {
    /// The reference route with all five technologies at their defaults
    fn default() -> Self {
        Self {
            route: RouteParameters::default(),
            diesel: Some(DieselParameters::default()),
            overnight: Some(OvernightParameters::default()),
            flash: Some(EnRouteParameters::flash().into()),
            opportunity: Some(EnRouteParameters::opportunity().into()),
            hydrogen: Some(HydrogenParameters::default()),
            costs: CostsConfig::default(),
            optimizer: OptimizerLimits::default(),
        }
    }
}

impl Scenario {
    /// Load a scenario from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                Error::Config(ConfigError::NotFound(path.display().to_string()))
            }
            _ => Error::Io(e),
        })?;
        let scenario = Self::from_toml_str(&content)?;

        info!(
            path = %path.display(),
            technologies = scenario.configured().len(),
            "scenario loaded"
        );
        Ok(scenario)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let scenario = toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        Ok(scenario)
    }

    /// Render the default scenario as a TOML document
    pub fn default_toml() -> Result<String> {
        Self::default().to_toml()
    }

    pub fn to_toml(&self) -> Result<String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::RenderError(e.to_string()))?;
        Ok(content)
    }

    /// Technology parameters with overrides resolved onto their defaults
    pub fn technologies(&self) -> TechnologySet {
        TechnologySet {
            diesel: self.diesel,
            overnight: self.overnight,
            flash: self.flash.map(|o| o.resolve(EnRouteParameters::flash())),
            opportunity: self
                .opportunity
                .map(|o| o.resolve(EnRouteParameters::opportunity())),
            hydrogen: self.hydrogen,
        }
    }

    /// Configured technologies in canonical order
    pub fn configured(&self) -> Vec<Technology> {
        let set = self.technologies();
        Technology::ALL
            .into_iter()
            .filter(|t| match t {
                Technology::Diesel => set.diesel.is_some(),
                Technology::Overnight => set.overnight.is_some(),
                Technology::Flash => set.flash.is_some(),
                Technology::Opportunity => set.opportunity.is_some(),
                Technology::Hydrogen => set.hydrogen.is_some(),
            })
            .collect()
    }

    pub fn cost_parameters(&self, technology: Technology) -> CostParameters {
        self.costs.parameters_for(technology)
    }
}

/// Partial en-route charging table. Unset fields keep the default of the
/// technology the table belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnRouteOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_kwh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumption_kwh_per_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserve_soc_frac: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging_efficiency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub en_route_charger_kw: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub en_route_charge_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layover_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depot_charger_kw: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depot_window_h: Option<f64>,
    /// Leaving this out selects the optimize-fleet mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_mini_charges: Option<u32>,
}

impl EnRouteOverrides {
    pub fn resolve(&self, base: EnRouteParameters) -> EnRouteParameters {
        EnRouteParameters {
            battery_kwh: self.battery_kwh.unwrap_or(base.battery_kwh),
            consumption_kwh_per_km: self
                .consumption_kwh_per_km
                .unwrap_or(base.consumption_kwh_per_km),
            reserve_soc_frac: self.reserve_soc_frac.unwrap_or(base.reserve_soc_frac),
            charging_efficiency: self.charging_efficiency.unwrap_or(base.charging_efficiency),
            en_route_charger_kw: self.en_route_charger_kw.unwrap_or(base.en_route_charger_kw),
            en_route_charge_min: self.en_route_charge_min.unwrap_or(base.en_route_charge_min),
            layover_min: self.layover_min.unwrap_or(base.layover_min),
            depot_charger_kw: self.depot_charger_kw.unwrap_or(base.depot_charger_kw),
            depot_window_h: self.depot_window_h.unwrap_or(base.depot_window_h),
            max_mini_charges: self.max_mini_charges.or(base.max_mini_charges),
        }
    }
}

impl From<EnRouteParameters> for EnRouteOverrides {
    fn from(p: EnRouteParameters) -> Self {
        Self {
            battery_kwh: Some(p.battery_kwh),
            consumption_kwh_per_km: Some(p.consumption_kwh_per_km),
            reserve_soc_frac: Some(p.reserve_soc_frac),
            charging_efficiency: Some(p.charging_efficiency),
            en_route_charger_kw: Some(p.en_route_charger_kw),
            en_route_charge_min: Some(p.en_route_charge_min),
            layover_min: Some(p.layover_min),
            depot_charger_kw: Some(p.depot_charger_kw),
            depot_window_h: Some(p.depot_window_h),
            max_mini_charges: p.max_mini_charges,
        }
    }
}

/// Partial unit cost table, resolved onto the technology's default costs
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CostOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub en_route_charger: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depot_charger: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hydrogen_station: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depot_works_per_vehicle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_unit_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_per_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_upkeep_per_vehicle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_replacement: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_life_years: Option<u32>,
}

impl CostOverrides {
    pub fn resolve(&self, base: CostParameters) -> CostParameters {
        CostParameters {
            vehicle: self.vehicle.unwrap_or(base.vehicle),
            en_route_charger: self.en_route_charger.unwrap_or(base.en_route_charger),
            depot_charger: self.depot_charger.unwrap_or(base.depot_charger),
            substation: self.substation.unwrap_or(base.substation),
            hydrogen_station: self.hydrogen_station.unwrap_or(base.hydrogen_station),
            depot_works_per_vehicle: self
                .depot_works_per_vehicle
                .unwrap_or(base.depot_works_per_vehicle),
            energy_unit_cost: self.energy_unit_cost.unwrap_or(base.energy_unit_cost),
            maintenance_per_km: self.maintenance_per_km.unwrap_or(base.maintenance_per_km),
            battery_upkeep_per_vehicle: self
                .battery_upkeep_per_vehicle
                .unwrap_or(base.battery_upkeep_per_vehicle),
            battery_replacement: self.battery_replacement.unwrap_or(base.battery_replacement),
            battery_life_years: self.battery_life_years.unwrap_or(base.battery_life_years),
        }
    }
}

impl From<CostParameters> for CostOverrides {
    fn from(p: CostParameters) -> Self {
        Self {
            vehicle: Some(p.vehicle),
            en_route_charger: Some(p.en_route_charger),
            depot_charger: Some(p.depot_charger),
            substation: Some(p.substation),
            hydrogen_station: Some(p.hydrogen_station),
            depot_works_per_vehicle: Some(p.depot_works_per_vehicle),
            energy_unit_cost: Some(p.energy_unit_cost),
            maintenance_per_km: Some(p.maintenance_per_km),
            battery_upkeep_per_vehicle: Some(p.battery_upkeep_per_vehicle),
            battery_replacement: Some(p.battery_replacement),
            battery_life_years: Some(p.battery_life_years),
        }
    }
}

/// `[costs]` table: financial assumptions plus per-technology unit costs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CostsConfig {
    pub horizon_years: u32,
    pub operating_days: u32,
    pub diesel: CostOverrides,
    pub overnight: CostOverrides,
    pub flash: CostOverrides,
    pub opportunity: CostOverrides,
    pub hydrogen: CostOverrides,
}

impl Default for CostsConfig {
    fn default() -> Self {
        let assumptions = CostAssumptions::default();
        Self {
            horizon_years: assumptions.horizon_years,
            operating_days: assumptions.operating_days,
            diesel: default_cost_parameters(Technology::Diesel).into(),
            overnight: default_cost_parameters(Technology::Overnight).into(),
            flash: default_cost_parameters(Technology::Flash).into(),
            opportunity: default_cost_parameters(Technology::Opportunity).into(),
            hydrogen: default_cost_parameters(Technology::Hydrogen).into(),
        }
    }
}

impl CostsConfig {
    pub fn assumptions(&self) -> CostAssumptions {
        CostAssumptions {
            horizon_years: self.horizon_years,
            operating_days: self.operating_days,
        }
    }

    pub fn overrides(&self, technology: Technology) -> &CostOverrides {
        match technology {
            Technology::Diesel => &self.diesel,
            Technology::Overnight => &self.overnight,
            Technology::Flash => &self.flash,
            Technology::Opportunity => &self.opportunity,
            Technology::Hydrogen => &self.hydrogen,
        }
    }

    pub fn parameters_for(&self, technology: Technology) -> CostParameters {
        self.overrides(technology)
            .resolve(default_cost_parameters(technology))
    }
}
