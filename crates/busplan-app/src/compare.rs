//! Side-by-side evaluation of named scenarios

use std::collections::BTreeMap;

use busplan_domain::model::RouteParameters;
use busplan_types::{Result, Technology};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Scenario;
use crate::runner::evaluate_operational;
use crate::sweep::TechnologyMetrics;

/// Key indicators of one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub name: String,
    pub route: RouteParameters,
    pub metrics: BTreeMap<Technology, TechnologyMetrics>,
}

/// Evaluates each scenario in turn, keeping the given order. Fails on the
/// first scenario that does not validate.
pub fn compare_scenarios(scenarios: &[(String, Scenario)]) -> Result<Vec<ScenarioComparison>> {
    scenarios
        .iter()
        .map(|(name, scenario)| -> Result<ScenarioComparison> {
            let results = evaluate_operational(scenario)?;
            debug!(scenario = %name, technologies = results.len(), "scenario compared");
            Ok(ScenarioComparison {
                name: name.clone(),
                route: scenario.route,
                metrics: results
                    .iter()
                    .map(|(technology, r)| (*technology, TechnologyMetrics::from(r)))
                    .collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use busplan_types::Error;

    fn named(name: &str, toml: &str) -> (String, Scenario) {
        (name.to_string(), Scenario::from_toml_str(toml).unwrap())
    }

    #[test]
    fn test_compare_keeps_order_and_names() {
        let scenarios = vec![
            named("peak", "[route]\nheadway_min = 5.0\n[diesel]\n[flash]\n"),
            named("base", "[diesel]\n[flash]\n"),
        ];
        let rows = compare_scenarios(&scenarios).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "peak");
        assert!((rows[0].route.headway_min - 5.0).abs() < f64::EPSILON);
        // 120.4 min cycle: 25 buses at 5 min, 13 at 10 min
        assert_eq!(rows[0].metrics[&Technology::Diesel].fleet, 25);
        assert_eq!(rows[1].metrics[&Technology::Diesel].fleet, 13);
        assert_eq!(rows[1].metrics[&Technology::Flash].en_route_chargers, 1);
        assert!(!rows[1].metrics.contains_key(&Technology::Hydrogen));
    }

    #[test]
    fn test_several_parameters_change_at_once() {
        let scenarios = vec![
            named("base", "[overnight]\n"),
            named(
                "long and slow",
                "[route]\nroute_length_km = 30.0\ncommercial_speed_kmh = 18.0\n[overnight]\n",
            ),
        ];
        let rows = compare_scenarios(&scenarios).unwrap();
        let base = &rows[0].metrics[&Technology::Overnight];
        let long = &rows[1].metrics[&Technology::Overnight];
        assert!(long.fleet > base.fleet);
        assert!(long.commercial_km > base.commercial_km);
    }

    #[test]
    fn test_invalid_scenario_fails_comparison() {
        let scenarios = vec![
            named("base", "[diesel]\n"),
            named("broken", "[route]\nheadway_min = -1.0\n[diesel]\n"),
        ];
        assert!(matches!(
            compare_scenarios(&scenarios),
            Err(Error::Validation(_))
        ));
    }
}
