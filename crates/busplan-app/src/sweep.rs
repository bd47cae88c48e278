//! Route parameter sweep
//!
//! Interpolates selected route parameters between their bounds and re-runs
//! fleet sizing at every step.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use busplan_domain::model::{OperationalResult, RouteParameters};
use busplan_types::{Error, Result, Technology};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Scenario;
use crate::runner::evaluate_operational;

/// Route parameter that can be swept
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteParameterKey {
    RouteLengthKm,
    CommercialSpeedKmh,
    HeadwayMin,
    ServiceWindowMin,
    LayoverMin,
    EmptyRunningFrac,
}

impl RouteParameterKey {
    pub const ALL: [RouteParameterKey; 6] = [
        RouteParameterKey::RouteLengthKm,
        RouteParameterKey::CommercialSpeedKmh,
        RouteParameterKey::HeadwayMin,
        RouteParameterKey::ServiceWindowMin,
        RouteParameterKey::LayoverMin,
        RouteParameterKey::EmptyRunningFrac,
    ];

    /// Field name, as written in scenario files
    pub fn key(&self) -> &'static str {
        match self {
            RouteParameterKey::RouteLengthKm => "route_length_km",
            RouteParameterKey::CommercialSpeedKmh => "commercial_speed_kmh",
            RouteParameterKey::HeadwayMin => "headway_min",
            RouteParameterKey::ServiceWindowMin => "service_window_min",
            RouteParameterKey::LayoverMin => "layover_min",
            RouteParameterKey::EmptyRunningFrac => "empty_running_frac",
        }
    }

    pub fn get(&self, route: &RouteParameters) -> f64 {
        match self {
            RouteParameterKey::RouteLengthKm => route.route_length_km,
            RouteParameterKey::CommercialSpeedKmh => route.commercial_speed_kmh,
            RouteParameterKey::HeadwayMin => route.headway_min,
            RouteParameterKey::ServiceWindowMin => route.service_window_min,
            RouteParameterKey::LayoverMin => route.layover_min,
            RouteParameterKey::EmptyRunningFrac => route.empty_running_frac,
        }
    }

    pub fn set(&self, route: &mut RouteParameters, value: f64) {
        let field = match self {
            RouteParameterKey::RouteLengthKm => &mut route.route_length_km,
            RouteParameterKey::CommercialSpeedKmh => &mut route.commercial_speed_kmh,
            RouteParameterKey::HeadwayMin => &mut route.headway_min,
            RouteParameterKey::ServiceWindowMin => &mut route.service_window_min,
            RouteParameterKey::LayoverMin => &mut route.layover_min,
            RouteParameterKey::EmptyRunningFrac => &mut route.empty_running_frac,
        };
        *field = value;
    }
}

impl fmt::Display for RouteParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for RouteParameterKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.key() == s)
            .ok_or_else(|| Error::UnknownParameter(s.to_string()))
    }
}

/// Bounds of one swept parameter, written `key=min:max`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRange {
    pub key: RouteParameterKey,
    pub min: f64,
    pub max: f64,
}

impl SweepRange {
    pub fn at(&self, t: f64) -> f64 {
        self.min + t * (self.max - self.min)
    }
}

impl FromStr for SweepRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidSweep(format!("expected key=min:max, got '{s}'"));

        let (key, bounds) = s.split_once('=').ok_or_else(invalid)?;
        let (min, max) = bounds.split_once(':').ok_or_else(invalid)?;
        let key: RouteParameterKey = key.trim().parse()?;
        let min: f64 = min.trim().parse().map_err(|_| invalid())?;
        let max: f64 = max.trim().parse().map_err(|_| invalid())?;

        Ok(Self { key, min, max })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSpec {
    pub ranges: Vec<SweepRange>,
    pub steps: usize,
}

impl SweepSpec {
    pub fn validate(&self) -> Result<()> {
        if self.steps < 2 {
            return Err(Error::InvalidSweep(format!(
                "at least 2 steps required, got {}",
                self.steps
            )));
        }
        if self.ranges.is_empty() {
            return Err(Error::InvalidSweep("no parameter to sweep".to_string()));
        }
        for (i, range) in self.ranges.iter().enumerate() {
            if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
                return Err(Error::InvalidSweep(format!(
                    "{}: bounds must be finite with min <= max",
                    range.key
                )));
            }
            if self.ranges[..i].iter().any(|r| r.key == range.key) {
                return Err(Error::InvalidSweep(format!(
                    "{} is swept more than once",
                    range.key
                )));
            }
        }
        Ok(())
    }

    /// Evenly spaced positions from 0 to 1 inclusive
    pub fn positions(&self) -> Vec<f64> {
        let last = self.steps.saturating_sub(1).max(1) as f64;
        (0..self.steps).map(|i| i as f64 / last).collect()
    }
}

/// Indicators tracked across a sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyMetrics {
    pub fleet: u32,
    pub commercial_km: f64,
    pub chargers_total: u32,
    pub depot_chargers: u32,
    pub en_route_chargers: u32,
    pub energy: f64,
    pub energy_label: String,
    pub feasible: bool,
}

impl From<&OperationalResult> for TechnologyMetrics {
    fn from(r: &OperationalResult) -> Self {
        Self {
            fleet: r.fleet_required,
            commercial_km: r.daily_commercial_km,
            chargers_total: r.total_chargers(),
            depot_chargers: r.depot_chargers(),
            en_route_chargers: r.en_route_chargers(),
            energy: r.consumption.total_per_day,
            energy_label: r.consumption.unit.label().to_string(),
            feasible: r.is_feasible(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub t: f64,
    pub values: BTreeMap<RouteParameterKey, f64>,
    pub metrics: BTreeMap<Technology, TechnologyMetrics>,
}

/// Runs the scenario once per sweep position. Fails on the first position
/// whose interpolated route does not validate.
pub fn run_sweep(scenario: &Scenario, spec: &SweepSpec) -> Result<Vec<SweepPoint>> {
    spec.validate()?;

    let mut points = Vec::with_capacity(spec.steps);
    for t in spec.positions() {
        let mut step = scenario.clone();
        let mut values = BTreeMap::new();
        for range in &spec.ranges {
            let value = range.at(t);
            range.key.set(&mut step.route, value);
            values.insert(range.key, value);
        }

        let results = evaluate_operational(&step)?;
        debug!(t, technologies = results.len(), "sweep step evaluated");

        points.push(SweepPoint {
            t,
            values,
            metrics: results
                .iter()
                .map(|(technology, r)| (*technology, TechnologyMetrics::from(r)))
                .collect(),
        });
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        let range: SweepRange = "headway_min=5:20".parse().unwrap();
        assert_eq!(range.key, RouteParameterKey::HeadwayMin);
        assert!((range.min - 5.0).abs() < f64::EPSILON);
        assert!((range.max - 20.0).abs() < f64::EPSILON);
        assert!((range.at(0.5) - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "speed=1:2".parse::<SweepRange>(),
            Err(Error::UnknownParameter(_))
        ));
        assert!(matches!(
            "headway_min=5".parse::<SweepRange>(),
            Err(Error::InvalidSweep(_))
        ));
        assert!(matches!(
            "headway_min=a:b".parse::<SweepRange>(),
            Err(Error::InvalidSweep(_))
        ));
    }

    #[test]
    fn test_key_roundtrip() {
        for key in RouteParameterKey::ALL {
            assert_eq!(key.key().parse::<RouteParameterKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_spec_validation() {
        let range = SweepRange {
            key: RouteParameterKey::HeadwayMin,
            min: 5.0,
            max: 20.0,
        };
        let one_step = SweepSpec {
            ranges: vec![range],
            steps: 1,
        };
        assert!(one_step.validate().is_err());

        let reversed = SweepSpec {
            ranges: vec![SweepRange { min: 20.0, max: 5.0, ..range }],
            steps: 3,
        };
        assert!(reversed.validate().is_err());

        let duplicated = SweepSpec {
            ranges: vec![range, range],
            steps: 3,
        };
        assert!(duplicated.validate().is_err());
    }

    #[test]
    fn test_positions() {
        let spec = SweepSpec {
            ranges: vec![],
            steps: 5,
        };
        assert_eq!(spec.positions(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_headway_sweep() {
        let scenario = Scenario::from_toml_str("[diesel]\n[flash]\n").unwrap();
        let spec = SweepSpec {
            ranges: vec!["headway_min=5:20".parse().unwrap()],
            steps: 4,
        };
        let points = run_sweep(&scenario, &spec).unwrap();
        assert_eq!(points.len(), 4);
        assert!((points[0].values[&RouteParameterKey::HeadwayMin] - 5.0).abs() < 1e-9);
        assert!((points[3].values[&RouteParameterKey::HeadwayMin] - 20.0).abs() < 1e-9);

        // 120.4 min cycle: 25 buses at 5 min, 7 at 20 min
        assert_eq!(points[0].metrics[&Technology::Diesel].fleet, 25);
        assert_eq!(points[3].metrics[&Technology::Diesel].fleet, 7);
        for pair in points.windows(2) {
            assert!(
                pair[1].metrics[&Technology::Diesel].fleet
                    <= pair[0].metrics[&Technology::Diesel].fleet
            );
        }
        assert_eq!(points[0].metrics.len(), 2);
        assert_eq!(points[0].metrics[&Technology::Flash].energy_label, "kWh/day");
    }

    #[test]
    fn test_sweep_into_invalid_route_fails() {
        let scenario = Scenario::from_toml_str("[diesel]\n").unwrap();
        let spec = SweepSpec {
            ranges: vec!["headway_min=0:10".parse().unwrap()],
            steps: 3,
        };
        assert!(matches!(
            run_sweep(&scenario, &spec),
            Err(Error::Validation(_))
        ));
    }
}
