//! Core types for bus technology planning

mod error;

pub use error::*;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output format for results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Propulsion technology identifier.
///
/// Variant order is the canonical presentation order, so maps keyed by
/// `Technology` iterate diesel first and hydrogen last.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Technology {
    Diesel,
    Overnight,
    Flash,
    Opportunity,
    Hydrogen,
}

impl Technology {
    pub const ALL: [Technology; 5] = [
        Technology::Diesel,
        Technology::Overnight,
        Technology::Flash,
        Technology::Opportunity,
        Technology::Hydrogen,
    ];

    /// Stable identifier used as map key in serialized output
    pub fn key(&self) -> &'static str {
        match self {
            Technology::Diesel => "diesel",
            Technology::Overnight => "overnight",
            Technology::Flash => "flash",
            Technology::Opportunity => "opportunity",
            Technology::Hydrogen => "hydrogen",
        }
    }

    /// Human readable name
    pub fn label(&self) -> &'static str {
        match self {
            Technology::Diesel => "Diesel",
            Technology::Overnight => "Electric - overnight charging",
            Technology::Flash => "Electric - flash charging",
            Technology::Opportunity => "Electric - opportunity charging",
            Technology::Hydrogen => "Hydrogen",
        }
    }

    /// Battery electric technologies (battery upkeep and replacement apply)
    pub fn is_electric(&self) -> bool {
        matches!(
            self,
            Technology::Overnight | Technology::Flash | Technology::Opportunity
        )
    }
}

impl std::fmt::Display for Technology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}
