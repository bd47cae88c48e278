//! Fleet search for en-route charging technologies.
//!
//! # Algorithm
//!
//! Starting from the headway-bound fleet, the search increments the fleet one
//! vehicle at a time. For each candidate the daily distance per vehicle must
//! fit inside usable range plus the permitted number of mini-charges, where a
//! vehicle gets at most one mini-charge per duty cycle (further limited by the
//! operator cap, when one is set).
//!
//! The search is bounded by [`OptimizerLimits::max_fleet_multiplier`]. A
//! search that exhausts the bound returns the last candidate tagged
//! [`Convergence::CappedNonConvergent`]; its mini-charge count does not cover
//! the distance and callers must report it as infeasible.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::ceil_count;

/// How many mini-charges a vehicle may take per day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "cap")]
pub enum MiniChargePolicy {
    /// One opportunity per duty cycle; grow the fleet until that suffices
    OptimizeFleet,
    /// Operator cap per vehicle (zero is allowed and disables mini-charging)
    Capped(u32),
}

impl MiniChargePolicy {
    pub fn from_cap(cap: Option<u32>) -> Self {
        match cap {
            Some(n) => MiniChargePolicy::Capped(n),
            None => MiniChargePolicy::OptimizeFleet,
        }
    }

    /// Mini-charges allowed for a vehicle completing `duty_cycles` cycles
    pub fn permitted(&self, duty_cycles: u32) -> u32 {
        match self {
            MiniChargePolicy::OptimizeFleet => duty_cycles,
            MiniChargePolicy::Capped(cap) => (*cap).min(duty_cycles),
        }
    }
}

/// Bound on the fleet search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerLimits {
    /// Largest candidate fleet, as a multiple of the headway-bound fleet
    pub max_fleet_multiplier: u32,
}

impl Default for OptimizerLimits {
    fn default() -> Self {
        Self {
            max_fleet_multiplier: 10,
        }
    }
}

/// Whether the search found a fleet whose mini-charges cover the distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Convergence {
    Converged,
    CappedNonConvergent,
}

/// Inputs to the fleet search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiniChargeProblem {
    pub daily_total_km: f64,
    pub cycle_km: f64,
    pub usable_range_km: f64,
    pub km_per_mini_charge: f64,
    pub min_fleet: u32,
    pub policy: MiniChargePolicy,
}

/// Fleet and charging plan chosen by the search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MiniChargePlan {
    pub fleet: u32,
    pub km_per_vehicle: f64,
    pub duty_cycles: u32,
    pub max_mini_charges: u32,
    pub mini_charges: u32,
    /// Distance per vehicle beyond usable range
    pub shortfall_km: f64,
    /// Distance per vehicle not covered by range and mini-charges
    pub uncovered_km: f64,
    pub outcome: Convergence,
}

impl MiniChargeProblem {
    /// Evaluates one candidate fleet
    fn candidate(&self, fleet: u32) -> (MiniChargePlan, bool) {
        let km_per_vehicle = self.daily_total_km / fleet as f64;
        let duty_cycles = ceil_count(km_per_vehicle / self.cycle_km);
        let max_mini_charges = self.policy.permitted(duty_cycles);
        let coverable_km =
            self.usable_range_km + max_mini_charges as f64 * self.km_per_mini_charge;
        let feasible = coverable_km >= km_per_vehicle;

        let shortfall_km = (km_per_vehicle - self.usable_range_km).max(0.0);
        let needed = if shortfall_km > 0.0 {
            ceil_count(shortfall_km / self.km_per_mini_charge)
        } else {
            0
        };
        let mini_charges = needed.min(max_mini_charges);
        let uncovered_km = if feasible {
            0.0
        } else {
            (shortfall_km - mini_charges as f64 * self.km_per_mini_charge).max(0.0)
        };

        let plan = MiniChargePlan {
            fleet,
            km_per_vehicle,
            duty_cycles,
            max_mini_charges,
            mini_charges,
            shortfall_km,
            uncovered_km,
            outcome: if feasible {
                Convergence::Converged
            } else {
                Convergence::CappedNonConvergent
            },
        };
        (plan, feasible)
    }
}

/// Finds the smallest fleet, at or above the headway bound, whose daily
/// distance per vehicle is coverable with the permitted mini-charges.
///
/// # Examples
///
/// ```
/// use busplan_domain::service::{
///     optimize_fleet, Convergence, MiniChargePolicy, MiniChargeProblem, OptimizerLimits,
/// };
///
/// let problem = MiniChargeProblem {
///     daily_total_km: 4781.7,
///     cycle_km: 46.0,
///     usable_range_km: 233.33,
///     km_per_mini_charge: 22.5,
///     min_fleet: 13,
///     policy: MiniChargePolicy::Capped(2),
/// };
/// let plan = optimize_fleet(&problem, &OptimizerLimits::default());
/// assert_eq!(plan.outcome, Convergence::Converged);
/// assert_eq!(plan.fleet, 18);
/// assert_eq!(plan.mini_charges, 2);
/// ```
pub fn optimize_fleet(problem: &MiniChargeProblem, limits: &OptimizerLimits) -> MiniChargePlan {
    let start = problem.min_fleet.max(1);
    let last = start.saturating_mul(limits.max_fleet_multiplier.max(1));

    let mut fleet = start;
    loop {
        let (plan, feasible) = problem.candidate(fleet);
        trace!(
            fleet,
            km_per_vehicle = plan.km_per_vehicle,
            max_mini_charges = plan.max_mini_charges,
            feasible,
            "mini-charge candidate"
        );

        if feasible {
            debug!(
                fleet,
                duty_cycles = plan.duty_cycles,
                mini_charges = plan.mini_charges,
                "mini-charge search converged"
            );
            return plan;
        }

        if fleet >= last {
            warn!(
                fleet,
                min_fleet = start,
                uncovered_km = plan.uncovered_km,
                "mini-charge search reached its fleet bound without covering the daily distance"
            );
            return plan;
        }
        fleet += 1;
    }
}
