//! Application service layer - scenario config, validation, runner, sweep, comparison

pub mod compare;
pub mod config;
pub mod constants;
pub mod runner;
pub mod sweep;
pub mod validation;

pub use compare::{compare_scenarios, ScenarioComparison};
pub use config::{CostOverrides, CostsConfig, EnRouteOverrides, Scenario};
pub use runner::{run_scenario, ScenarioReport};
pub use sweep::{run_sweep, RouteParameterKey, SweepPoint, SweepRange, SweepSpec, TechnologyMetrics};
