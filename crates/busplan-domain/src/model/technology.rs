//! Technology-specific operating parameters

use serde::{Deserialize, Serialize};

/// Diesel bus
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DieselParameters {
    pub consumption_l_per_km: f64,
    pub range_km: f64,
}

impl Default for DieselParameters {
    fn default() -> Self {
        Self {
            consumption_l_per_km: 0.10,
            range_km: 600.0,
        }
    }
}

/// Fuel cell bus
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HydrogenParameters {
    pub consumption_kg_per_km: f64,
    pub range_km: f64,
}

impl Default for HydrogenParameters {
    fn default() -> Self {
        Self {
            consumption_kg_per_km: 0.10,
            range_km: 500.0,
        }
    }
}

/// Battery bus charged only at the depot during the night
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OvernightParameters {
    pub battery_kwh: f64,
    pub consumption_kwh_per_km: f64,
    /// Unusable state-of-charge buffer, in [0, 0.5)
    pub reserve_soc_frac: f64,
    pub charger_kw: f64,
    pub charging_efficiency: f64,
    pub charging_window_h: f64,
}

impl Default for OvernightParameters {
    fn default() -> Self {
        Self {
            battery_kwh: 350.0,
            consumption_kwh_per_km: 1.2,
            reserve_soc_frac: 0.20,
            charger_kw: 150.0,
            charging_efficiency: 0.90,
            charging_window_h: 6.0,
        }
    }
}

/// Battery bus that tops up at the terminus during service.
///
/// Shared by flash (short high-power pulses) and opportunity (layover-bound
/// medium-power) charging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnRouteParameters {
    pub battery_kwh: f64,
    pub consumption_kwh_per_km: f64,
    pub reserve_soc_frac: f64,
    pub charging_efficiency: f64,
    pub en_route_charger_kw: f64,
    /// Desired duration of one mini-charge
    pub en_route_charge_min: f64,
    /// Regulation time available at the terminus
    pub layover_min: f64,
    pub depot_charger_kw: f64,
    pub depot_window_h: f64,
    /// Cap on mini-charges per vehicle and day. `None` optimizes the fleet
    /// with at most one mini-charge per duty cycle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_mini_charges: Option<u32>,
}

impl EnRouteParameters {
    /// Defaults for high-power flash charging at the head-end
    pub fn flash() -> Self {
        Self {
            battery_kwh: 350.0,
            consumption_kwh_per_km: 1.2,
            reserve_soc_frac: 0.20,
            charging_efficiency: 0.90,
            en_route_charger_kw: 600.0,
            en_route_charge_min: 3.0,
            layover_min: 5.0,
            depot_charger_kw: 150.0,
            depot_window_h: 6.0,
            max_mini_charges: None,
        }
    }

    /// Defaults for medium-power opportunity charging during layovers
    pub fn opportunity() -> Self {
        Self {
            en_route_charger_kw: 200.0,
            en_route_charge_min: 10.0,
            layover_min: 10.0,
            ..Self::flash()
        }
    }
}

impl Default for EnRouteParameters {
    fn default() -> Self {
        Self::flash()
    }
}

/// Technologies requested for one calculation. Absent entries are not
/// evaluated and do not appear in any result mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TechnologySet {
    pub diesel: Option<DieselParameters>,
    pub overnight: Option<OvernightParameters>,
    pub flash: Option<EnRouteParameters>,
    pub opportunity: Option<EnRouteParameters>,
    pub hydrogen: Option<HydrogenParameters>,
}

impl TechnologySet {
    /// All five technologies with their default parameters
    pub fn all_defaults() -> Self {
        Self {
            diesel: Some(DieselParameters::default()),
            overnight: Some(OvernightParameters::default()),
            flash: Some(EnRouteParameters::flash()),
            opportunity: Some(EnRouteParameters::opportunity()),
            hydrogen: Some(HydrogenParameters::default()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.diesel.is_none()
            && self.overnight.is_none()
            && self.flash.is_none()
            && self.opportunity.is_none()
            && self.hydrogen.is_none()
    }
}
