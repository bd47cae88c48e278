//! CLI definition using clap

use busplan_app::SweepRange;
use busplan_types::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "busplan")]
#[command(version)]
#[command(about = "Bus fleet sizing, energy and lifecycle cost comparison across propulsion technologies")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json, csv)
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Verbose output (debug logging unless RUST_LOG is set)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Size the fleet and charging infrastructure of every configured technology
    Run {
        /// Scenario TOML file. Uses the reference scenario if omitted.
        scenario: Option<PathBuf>,
    },

    /// Project CAPEX, OPEX and total cost of ownership
    Costs {
        /// Scenario TOML file. Uses the reference scenario if omitted.
        scenario: Option<PathBuf>,
    },

    /// Sweep route parameters between bounds and track the key indicators
    Sweep {
        /// Scenario TOML file. Uses the reference scenario if omitted.
        scenario: Option<PathBuf>,

        /// Parameter range as key=min:max (e.g. headway_min=5:20). Repeatable.
        #[arg(long = "param", short = 'p', required = true)]
        params: Vec<SweepRange>,

        /// Number of evenly spaced steps, bounds included
        #[arg(long, short = 'n', default_value_t = 5)]
        steps: usize,
    },

    /// Compare the key indicators of several scenario files
    Compare {
        /// Scenario TOML files, named after their file stem
        #[arg(required = true)]
        scenarios: Vec<PathBuf>,
    },

    /// Print the reference scenario as TOML
    Init,
}
