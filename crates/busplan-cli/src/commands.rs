//! Command handlers

use std::io::Write;
use std::path::{Path, PathBuf};

use busplan_app::{compare_scenarios, run_scenario, run_sweep, Scenario, SweepRange, SweepSpec};
use busplan_types::{OutputFormat, Result};
use tracing::info;

use crate::cli::{Cli, Commands};
use crate::output::{write_comparison, write_costs, write_report, write_sweep};

pub fn execute(cli: Cli) -> Result<()> {
    let format = cli.format;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Run { scenario } => cmd_run(&mut out, scenario.as_deref(), format),
        Commands::Costs { scenario } => cmd_costs(&mut out, scenario.as_deref(), format),
        Commands::Sweep {
            scenario,
            params,
            steps,
        } => cmd_sweep(&mut out, scenario.as_deref(), params, steps, format),
        Commands::Compare { scenarios } => cmd_compare(&mut out, &scenarios, format),
        Commands::Init => cmd_init(&mut out),
    }
}

fn load_scenario(path: Option<&Path>) -> Result<Scenario> {
    match path {
        Some(path) => Scenario::load(path),
        None => {
            info!("no scenario file given, using the reference scenario");
            Ok(Scenario::default())
        }
    }
}

fn cmd_run<W: Write>(out: &mut W, path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let scenario = load_scenario(path)?;
    let report = run_scenario(&scenario)?;
    write_report(out, format, &report)
}

fn cmd_costs<W: Write>(out: &mut W, path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let scenario = load_scenario(path)?;
    let report = run_scenario(&scenario)?;
    write_costs(out, format, &scenario.costs.assumptions(), &report.costs)
}

fn cmd_sweep<W: Write>(
    out: &mut W,
    path: Option<&Path>,
    ranges: Vec<SweepRange>,
    steps: usize,
    format: OutputFormat,
) -> Result<()> {
    let scenario = load_scenario(path)?;
    let spec = SweepSpec { ranges, steps };
    let points = run_sweep(&scenario, &spec)?;
    write_sweep(out, format, &spec, &points)
}

fn cmd_compare<W: Write>(out: &mut W, paths: &[PathBuf], format: OutputFormat) -> Result<()> {
    let scenarios = paths
        .iter()
        .map(|path| -> Result<(String, Scenario)> {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok((name, Scenario::load(path)?))
        })
        .collect::<Result<Vec<_>>>()?;
    let rows = compare_scenarios(&scenarios)?;
    write_comparison(out, format, &rows)
}

fn cmd_init<W: Write>(out: &mut W) -> Result<()> {
    let content = Scenario::default_toml()?;
    out.write_all(content.as_bytes())?;
    Ok(())
}
