//! Domain model types

pub mod cost;
pub mod operational;
pub mod route;
pub mod technology;

pub use cost::{Capex, CostAssumptions, CostParameters, CostResult, Opex, Tco, TcoYear};
pub use operational::{
    Consumption, DepotCharging, ElectricDetails, EnRouteCharging, EnergyUnit, OperationalResult,
};
pub use route::RouteParameters;
pub use technology::{
    DieselParameters, EnRouteParameters, HydrogenParameters, OvernightParameters, TechnologySet,
};
