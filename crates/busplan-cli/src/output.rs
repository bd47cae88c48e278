//! Output formatting module

use std::collections::BTreeMap;
use std::io::Write;

use busplan_app::{ScenarioComparison, ScenarioReport, SweepPoint, SweepSpec};
use busplan_domain::model::{CostAssumptions, CostResult, OperationalResult};
use busplan_types::{OutputFormat, Result, Technology};
use serde::Serialize;

pub fn write_report<W: Write>(out: &mut W, format: OutputFormat, report: &ScenarioReport) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(&mut *out);
            for row in &report.summary {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        OutputFormat::Table => {
            write_summary_table(out, report)?;
            for result in report.operational.values() {
                writeln!(out)?;
                write_details(out, result)?;
            }
        }
    }
    Ok(())
}

fn write_summary_table<W: Write>(out: &mut W, report: &ScenarioReport) -> Result<()> {
    writeln!(out, "Technology comparison")?;
    writeln!(out, "=====================")?;
    writeln!(
        out,
        "{:<12} {:>6} {:>8} {:>9} {:>9} {:>20} {:>5} {:>7} {:>9} {:>9} {:>8}",
        "Technology",
        "Fleet",
        "Headway",
        "Chargers",
        "Power kW",
        "Daily energy",
        "Mini",
        "Cycles",
        "Usable km",
        "Eff. km",
        "km/bus"
    )?;

    for row in &report.summary {
        writeln!(
            out,
            "{:<12} {:>6} {:>8} {:>9} {:>9.0} {:>20} {:>5} {:>7} {:>9.1} {:>9.1} {:>8.1}{}",
            row.technology.key(),
            row.fleet,
            row.fleet_by_headway,
            row.chargers_total,
            row.installed_power_kw,
            format!("{:.1} {}", row.daily_energy, row.energy_label),
            row.mini_charges,
            row.duty_cycles,
            row.usable_range_km,
            row.effective_range_km,
            row.km_per_vehicle,
            if row.feasible { "" } else { "  !" }
        )?;
    }

    for technology in report.non_convergent() {
        let uncovered = report.operational[&technology]
            .electric
            .and_then(|e| e.en_route)
            .map(|r| r.uncovered_km_per_vehicle)
            .unwrap_or(0.0);
        writeln!(
            out,
            "! {}: fleet search hit its bound, {:.1} km per bus remain uncovered",
            technology.key(),
            uncovered
        )?;
    }
    Ok(())
}

fn write_details<W: Write>(out: &mut W, r: &OperationalResult) -> Result<()> {
    let title = r.technology.label();
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "-".repeat(title.len()))?;
    writeln!(
        out,
        "Fleet:              {} (headway bound {}{})",
        r.fleet_required,
        r.fleet_by_headway,
        r.fleet_by_range
            .map(|n| format!(", range bound {}", n))
            .unwrap_or_default()
    )?;
    writeln!(
        out,
        "Daily distance:     {:.1} km commercial, {:.1} km total",
        r.daily_commercial_km, r.daily_total_km
    )?;
    writeln!(
        out,
        "Per vehicle:        {:.1} km commercial, {:.1} km total, {} duty cycles",
        r.commercial_km_per_vehicle, r.km_per_vehicle, r.duty_cycles_per_vehicle
    )?;
    writeln!(
        out,
        "Consumption:        {:.1} {} ({:.1} per vehicle)",
        r.consumption.total_per_day,
        r.consumption.unit.label(),
        r.consumption.per_vehicle_per_day
    )?;

    let Some(e) = r.electric else {
        writeln!(out, "Range:              {:.1} km", r.range_km)?;
        return Ok(());
    };

    writeln!(
        out,
        "Range:              {:.1} km usable of {:.1} km, {:.1} km effective",
        e.usable_range_km, e.total_range_km, e.effective_range_km
    )?;
    writeln!(
        out,
        "Energy per vehicle: {:.1} kWh consumed",
        e.energy_consumed_per_vehicle_kwh
    )?;
    writeln!(
        out,
        "Depot charging:     {} x {:.0} kW, {:.2} h per vehicle, {:.1} kWh/day, {:.1} kW average",
        e.depot.chargers,
        e.depot.charger_kw,
        e.depot.recharge_hours_per_vehicle,
        e.depot.energy_total_kwh,
        e.depot.average_power_kw
    )?;

    if let Some(en_route) = e.en_route {
        writeln!(
            out,
            "En-route charging:  {} x {:.0} kW, {:.1} of {:.1} min layover, {:.1} kWh/day",
            en_route.chargers,
            en_route.charger_kw,
            en_route.effective_charge_min,
            en_route.layover_min,
            en_route.energy_total_kwh
        )?;
        writeln!(
            out,
            "Mini-charges:       {} of {} per vehicle, {:.1} km each, {:.1} kWh recovered",
            en_route.mini_charges_per_vehicle,
            en_route.max_mini_charges_per_vehicle,
            en_route.km_per_mini_charge,
            en_route.energy_recovered_per_vehicle_kwh
        )?;
        writeln!(
            out,
            "Range shortfall:    {:.1} km per vehicle",
            en_route.shortfall_km_per_vehicle
        )?;
    }

    writeln!(
        out,
        "Grid energy:        {:.1} kWh/day, {:.0} kW installed",
        e.total_energy_kwh, e.total_installed_power_kw
    )?;
    Ok(())
}

/// One year of one technology's cost timeline, flattened for CSV
#[derive(Serialize)]
struct TimelineRow {
    technology: Technology,
    year: u32,
    capex: f64,
    opex: f64,
    battery_replacement: f64,
    total: f64,
    cumulative: f64,
}

pub fn write_costs<W: Write>(
    out: &mut W,
    format: OutputFormat,
    assumptions: &CostAssumptions,
    costs: &BTreeMap<Technology, CostResult>,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, costs)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(&mut *out);
            for cost in costs.values() {
                for y in &cost.tco.years {
                    wtr.serialize(TimelineRow {
                        technology: cost.technology,
                        year: y.year,
                        capex: y.capex,
                        opex: y.opex,
                        battery_replacement: y.battery_replacement,
                        total: y.total,
                        cumulative: y.cumulative,
                    })?;
                }
            }
            wtr.flush()?;
        }
        OutputFormat::Table => write_costs_table(out, assumptions, costs)?,
    }
    Ok(())
}

fn write_costs_table<W: Write>(
    out: &mut W,
    assumptions: &CostAssumptions,
    costs: &BTreeMap<Technology, CostResult>,
) -> Result<()> {
    writeln!(
        out,
        "Lifecycle costs ({} years, {} operating days per year)",
        assumptions.horizon_years, assumptions.operating_days
    )?;
    writeln!(out, "=====================================================")?;
    writeln!(
        out,
        "{:<12} {:>14} {:>12} {:>14} {:>8} {:>12}  {}",
        "Technology", "CAPEX", "OPEX/year", "TCO", "TCO/km", "TCO/bus", "Battery swaps"
    )?;
    for cost in costs.values() {
        let swaps = cost.tco.replacement_years();
        writeln!(
            out,
            "{:<12} {:>14.0} {:>12.0} {:>14.0} {:>8.2} {:>12.0}  {}",
            cost.technology.key(),
            cost.capex.total,
            cost.opex.total,
            cost.tco.total,
            cost.tco.per_km,
            cost.tco.per_vehicle,
            if swaps.is_empty() {
                "-".to_string()
            } else {
                swaps
                    .iter()
                    .map(|y| format!("year {}", y))
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        )?;
    }

    for cost in costs.values() {
        let c = &cost.capex;
        let o = &cost.opex;
        writeln!(out)?;
        writeln!(out, "{}", cost.technology.label())?;
        writeln!(
            out,
            "  CAPEX: vehicles {:.0}, en-route chargers {:.0}, depot chargers {:.0}, substation {:.0}, H2 station {:.0}, depot works {:.0}",
            c.vehicles, c.en_route_chargers, c.depot_chargers, c.substation, c.hydrogen_station, c.depot_works
        )?;
        writeln!(
            out,
            "  OPEX:  energy {:.0}, maintenance {:.0}, battery upkeep {:.0} per year",
            o.energy, o.maintenance, o.battery_upkeep
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Cumulative cost")?;
    write!(out, "{:>5}", "Year")?;
    for technology in costs.keys() {
        write!(out, " {:>14}", technology.key())?;
    }
    writeln!(out)?;
    for year in 0..=assumptions.horizon_years as usize {
        write!(out, "{:>5}", year)?;
        for cost in costs.values() {
            match cost.tco.years.get(year) {
                Some(y) => write!(out, " {:>14.0}", y.cumulative)?,
                None => write!(out, " {:>14}", "")?,
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_sweep<W: Write>(
    out: &mut W,
    format: OutputFormat,
    spec: &SweepSpec,
    points: &[SweepPoint],
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, points)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(&mut *out);
            let mut header = vec!["t".to_string()];
            header.extend(spec.ranges.iter().map(|r| r.key.key().to_string()));
            header.extend(
                [
                    "technology",
                    "fleet",
                    "commercial_km",
                    "chargers_total",
                    "depot_chargers",
                    "en_route_chargers",
                    "energy",
                    "energy_label",
                    "feasible",
                ]
                .map(String::from),
            );
            wtr.write_record(&header)?;

            for point in points {
                for (technology, m) in &point.metrics {
                    let mut record = vec![point.t.to_string()];
                    record.extend(
                        spec.ranges
                            .iter()
                            .map(|r| point.values.get(&r.key).copied().unwrap_or_default().to_string()),
                    );
                    record.extend([
                        technology.key().to_string(),
                        m.fleet.to_string(),
                        m.commercial_km.to_string(),
                        m.chargers_total.to_string(),
                        m.depot_chargers.to_string(),
                        m.en_route_chargers.to_string(),
                        m.energy.to_string(),
                        m.energy_label.clone(),
                        m.feasible.to_string(),
                    ]);
                    wtr.write_record(&record)?;
                }
            }
            wtr.flush()?;
        }
        OutputFormat::Table => {
            write!(out, "{:>5}", "t")?;
            for range in &spec.ranges {
                write!(out, " {:>20}", range.key.key())?;
            }
            writeln!(
                out,
                " {:<12} {:>6} {:>9} {:>6} {:>9} {:>22}",
                "Technology", "Fleet", "Chargers", "Depot", "En-route", "Daily energy"
            )?;
            for point in points {
                for (technology, m) in &point.metrics {
                    write!(out, "{:>5.2}", point.t)?;
                    for range in &spec.ranges {
                        let value = point.values.get(&range.key).copied().unwrap_or_default();
                        write!(out, " {:>20.2}", value)?;
                    }
                    writeln!(
                        out,
                        " {:<12} {:>6} {:>9} {:>6} {:>9} {:>22}{}",
                        technology.key(),
                        m.fleet,
                        m.chargers_total,
                        m.depot_chargers,
                        m.en_route_chargers,
                        format!("{:.1} {}", m.energy, m.energy_label),
                        if m.feasible { "" } else { "  !" }
                    )?;
                }
            }
        }
    }
    Ok(())
}

pub fn write_comparison<W: Write>(
    out: &mut W,
    format: OutputFormat,
    rows: &[ScenarioComparison],
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, rows)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(&mut *out);
            wtr.write_record([
                "scenario",
                "route_length_km",
                "commercial_speed_kmh",
                "headway_min",
                "service_window_min",
                "layover_min",
                "empty_running_frac",
                "technology",
                "fleet",
                "commercial_km",
                "chargers_total",
                "depot_chargers",
                "en_route_chargers",
                "energy",
                "energy_label",
                "feasible",
            ])?;
            for row in rows {
                let r = &row.route;
                for (technology, m) in &row.metrics {
                    wtr.write_record([
                        row.name.clone(),
                        r.route_length_km.to_string(),
                        r.commercial_speed_kmh.to_string(),
                        r.headway_min.to_string(),
                        r.service_window_min.to_string(),
                        r.layover_min.to_string(),
                        r.empty_running_frac.to_string(),
                        technology.key().to_string(),
                        m.fleet.to_string(),
                        m.commercial_km.to_string(),
                        m.chargers_total.to_string(),
                        m.depot_chargers.to_string(),
                        m.en_route_chargers.to_string(),
                        m.energy.to_string(),
                        m.energy_label.clone(),
                        m.feasible.to_string(),
                    ])?;
                }
            }
            wtr.flush()?;
        }
        OutputFormat::Table => {
            writeln!(
                out,
                "{:<20} {:>7} {:>6} {:>8} {:<12} {:>6} {:>9} {:>22}",
                "Scenario", "Length", "Speed", "Headway", "Technology", "Fleet", "Chargers", "Daily energy"
            )?;
            for row in rows {
                let r = &row.route;
                for (technology, m) in &row.metrics {
                    writeln!(
                        out,
                        "{:<20} {:>7.1} {:>6.1} {:>8.1} {:<12} {:>6} {:>9} {:>22}{}",
                        row.name,
                        r.route_length_km,
                        r.commercial_speed_kmh,
                        r.headway_min,
                        technology.key(),
                        m.fleet,
                        m.chargers_total,
                        format!("{:.1} {}", m.energy, m.energy_label),
                        if m.feasible { "" } else { "  !" }
                    )?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use busplan_app::{compare_scenarios, run_scenario, run_sweep, Scenario};

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_report_table() {
        let report = run_scenario(&Scenario::default()).unwrap();
        let text = render(|out| write_report(out, OutputFormat::Table, &report));
        assert!(text.starts_with("Technology comparison"));
        assert!(text.contains("Electric - opportunity charging"));
        assert!(text.contains("455.4 L/day"));
        assert!(text.contains("Mini-charges:       6 of 8 per vehicle"));
        assert!(!text.contains("fleet search hit its bound"));
    }

    #[test]
    fn test_report_csv_has_one_row_per_technology() {
        let report = run_scenario(&Scenario::default()).unwrap();
        let text = render(|out| write_report(out, OutputFormat::Csv, &report));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("technology,fleet,fleet_by_headway"));
        assert!(lines[1].starts_with("diesel,13,13,"));
    }

    #[test]
    fn test_non_convergence_flagged() {
        let scenario = Scenario::from_toml_str(
            "[optimizer]\nmax_fleet_multiplier = 1\n[flash]\nmax_mini_charges = 0\n",
        )
        .unwrap();
        let report = run_scenario(&scenario).unwrap();
        let text = render(|out| write_report(out, OutputFormat::Table, &report));
        assert!(text.contains("! flash: fleet search hit its bound"));
    }

    #[test]
    fn test_costs_outputs() {
        let scenario = Scenario::from_toml_str("[diesel]\n[overnight]\n").unwrap();
        let report = run_scenario(&scenario).unwrap();
        let assumptions = scenario.costs.assumptions();

        let table = render(|out| write_costs(out, OutputFormat::Table, &assumptions, &report.costs));
        assert!(table.contains("Lifecycle costs (15 years, 365 operating days per year)"));
        assert!(table.contains("year 8"));

        let csv = render(|out| write_costs(out, OutputFormat::Csv, &assumptions, &report.costs));
        // header plus 16 years for each technology
        assert_eq!(csv.lines().count(), 1 + 2 * 16);
        assert!(csv.lines().nth(1).unwrap().starts_with("diesel,0,"));

        let json = render(|out| write_costs(out, OutputFormat::Json, &assumptions, &report.costs));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("overnight").is_some());
        assert!(value.get("flash").is_none());
    }

    #[test]
    fn test_sweep_csv() {
        let scenario = Scenario::from_toml_str("[diesel]\n[flash]\n").unwrap();
        let spec = SweepSpec {
            ranges: vec!["headway_min=5:20".parse().unwrap()],
            steps: 3,
        };
        let points = run_sweep(&scenario, &spec).unwrap();
        let text = render(|out| write_sweep(out, OutputFormat::Csv, &spec, &points));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "t,headway_min,technology,fleet,commercial_km,chargers_total,depot_chargers,en_route_chargers,energy,energy_label,feasible");
        assert_eq!(lines.len(), 1 + 3 * 2);
        assert!(lines[1].starts_with("0,5,diesel,25,"));
    }

    #[test]
    fn test_sweep_table() {
        let scenario = Scenario::from_toml_str("[overnight]\n").unwrap();
        let spec = SweepSpec {
            ranges: vec!["route_length_km=10:30".parse().unwrap()],
            steps: 2,
        };
        let points = run_sweep(&scenario, &spec).unwrap();
        let text = render(|out| write_sweep(out, OutputFormat::Table, &spec, &points));
        assert!(text.lines().next().unwrap().contains("route_length_km"));
        assert_eq!(text.lines().filter(|l| l.contains("overnight")).count(), 2);
    }

    #[test]
    fn test_comparison_csv_and_table() {
        let scenarios = vec![
            ("base".to_string(), Scenario::from_toml_str("[diesel]\n[overnight]\n").unwrap()),
            (
                "short".to_string(),
                Scenario::from_toml_str("[route]\nroute_length_km = 12.0\n[diesel]\n").unwrap(),
            ),
        ];
        let rows = compare_scenarios(&scenarios).unwrap();

        let csv = render(|out| write_comparison(out, OutputFormat::Csv, &rows));
        let lines: Vec<&str> = csv.lines().collect();
        assert!(lines[0].starts_with("scenario,route_length_km,"));
        assert_eq!(lines.len(), 1 + 2 + 1);
        assert!(lines[1].starts_with("base,23,25,10,990,5,0.05,diesel,13,"));
        assert!(lines[3].starts_with("short,12,"));

        let table = render(|out| write_comparison(out, OutputFormat::Table, &rows));
        assert_eq!(table.lines().filter(|l| l.starts_with("base")).count(), 2);
        assert!(table.contains("overnight"));
    }
}
