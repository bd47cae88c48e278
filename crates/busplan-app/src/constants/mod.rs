//! Reference cost data

pub mod cost_defaults;

pub use cost_defaults::default_cost_parameters;
