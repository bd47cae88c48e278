//! Domain models and calculation services for bus technology planning.
//!
//! Every service is a pure function of its inputs: callers validate the
//! parameters, the services derive fleet size, energy demand, charging
//! infrastructure and lifecycle cost from them.

pub mod model;
pub mod service;
