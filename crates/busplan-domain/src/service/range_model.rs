//! Range and energy primitives for battery vehicles

/// Battery range model.
///
/// # Examples
///
/// ```
/// use busplan_domain::service::RangeModel;
///
/// let battery = RangeModel::new(350.0, 1.2, 0.20);
/// assert!((battery.usable_range_km() - 233.333).abs() < 0.001);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeModel {
    battery_kwh: f64,
    consumption_kwh_per_km: f64,
    reserve_soc_frac: f64,
}

impl RangeModel {
    pub fn new(battery_kwh: f64, consumption_kwh_per_km: f64, reserve_soc_frac: f64) -> Self {
        Self {
            battery_kwh,
            consumption_kwh_per_km,
            reserve_soc_frac,
        }
    }

    /// Range on a full battery down to empty
    pub fn total_range_km(&self) -> f64 {
        self.battery_kwh / self.consumption_kwh_per_km
    }

    /// Range down to the reserve state of charge
    pub fn usable_range_km(&self) -> f64 {
        self.total_range_km() * (1.0 - self.reserve_soc_frac)
    }

    /// Grid-side energy to restore a battery depleted to reserve
    pub fn full_recharge_energy_kwh(&self, charging_efficiency: f64) -> f64 {
        self.battery_kwh * (1.0 - self.reserve_soc_frac) / charging_efficiency
    }

    /// Battery energy drawn over a distance
    pub fn energy_for_km(&self, km: f64) -> f64 {
        km * self.consumption_kwh_per_km
    }

    /// Distance regained by one supplemental charge
    pub fn km_per_mini_charge(&self, charger_kw: f64, minutes: f64, charging_efficiency: f64) -> f64 {
        mini_charge_energy_kwh(charger_kw, minutes, charging_efficiency) / self.consumption_kwh_per_km
    }
}

/// Energy delivered to the battery by one charge of `minutes` at `charger_kw`
pub fn mini_charge_energy_kwh(charger_kw: f64, minutes: f64, charging_efficiency: f64) -> f64 {
    grid_energy_kwh(charger_kw, minutes) * charging_efficiency
}

/// Energy drawn from the grid by one charge of `minutes` at `charger_kw`
pub fn grid_energy_kwh(charger_kw: f64, minutes: f64) -> f64 {
    charger_kw * (minutes / 60.0)
}

/// Fuel, hydrogen or energy drawn over a distance at a per-km rate
pub fn consumption_for(km: f64, per_km: f64) -> f64 {
    km * per_km
}
