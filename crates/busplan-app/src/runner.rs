//! Scenario evaluation: fleet sizing and cost projection for every
//! configured technology

use std::collections::BTreeMap;

use busplan_domain::model::{CostResult, OperationalResult};
use busplan_domain::service::{evaluate_all, project_costs, summarize, ComparisonRow};
use busplan_types::{Result, Technology};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Scenario;
use crate::validation::validate_scenario;

/// Everything computed for one scenario. Both maps carry the same keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub operational: BTreeMap<Technology, OperationalResult>,
    pub costs: BTreeMap<Technology, CostResult>,
    pub summary: Vec<ComparisonRow>,
}

impl ScenarioReport {
    /// Technologies whose mini-charge search did not cover the daily distance
    pub fn non_convergent(&self) -> Vec<Technology> {
        self.operational
            .values()
            .filter(|r| !r.is_feasible())
            .map(|r| r.technology)
            .collect()
    }
}

/// Validated fleet sizing only
pub fn evaluate_operational(scenario: &Scenario) -> Result<BTreeMap<Technology, OperationalResult>> {
    validate_scenario(scenario)?;
    Ok(evaluate_all(
        &scenario.route,
        &scenario.technologies(),
        &scenario.optimizer,
    ))
}

pub fn run_scenario(scenario: &Scenario) -> Result<ScenarioReport> {
    let operational = evaluate_operational(scenario)?;
    if operational.is_empty() {
        warn!("no technology configured in scenario");
    }

    let assumptions = scenario.costs.assumptions();
    let costs: BTreeMap<Technology, CostResult> = operational
        .iter()
        .map(|(technology, result)| {
            let params = scenario.cost_parameters(*technology);
            (*technology, project_costs(result, &params, &assumptions))
        })
        .collect();
    let summary = summarize(&operational);

    let report = ScenarioReport {
        operational,
        costs,
        summary,
    };
    info!(
        technologies = report.operational.len(),
        non_convergent = report.non_convergent().len(),
        "scenario evaluated"
    );
    Ok(report)
}
