//! Domain services

pub mod cost_projector;
pub mod fleet_sizing;
pub mod mini_charge;
pub mod range_model;
pub mod route_schedule;
pub mod summary;

pub use cost_projector::{project_costs, project_timeline};
pub use fleet_sizing::{
    evaluate_all, size_diesel, size_en_route, size_flash, size_hydrogen, size_opportunity,
    size_overnight, EnRouteStrategy, FlashCharging, OpportunityCharging,
};
pub use mini_charge::{
    optimize_fleet, Convergence, MiniChargePlan, MiniChargePolicy, MiniChargeProblem,
    OptimizerLimits,
};
pub use range_model::RangeModel;
pub use route_schedule::RouteSchedule;
pub use summary::{summarize, ComparisonRow};

/// Rounds a non-negative quantity up to a whole count.
///
/// Negative and NaN inputs map to zero, values beyond `u32::MAX` saturate.
pub(crate) fn ceil_count(x: f64) -> u32 {
    x.ceil() as u32
}
