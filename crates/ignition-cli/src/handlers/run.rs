//! Run Command Handler
//!
//! Replays a scenario file against a freshly deployed vehicle and prints one
//! line per step, or the whole report as JSON.

use crate::handlers::load_config;
use crate::scenario::{Scenario, ScenarioReport};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Replay `scenario_path` and write the report to `out`.
pub fn handle_run(
    scenario_path: &Path,
    config_path: Option<&Path>,
    json: bool,
    out: &mut dyn Write,
) -> Result<ScenarioReport> {
    let config = load_config(config_path)?;
    let scenario = Scenario::load(scenario_path)?;
    let report = scenario.run(config)?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &report).context("Failed to encode report")?;
        writeln!(out)?;
    } else {
        write_summary(&report, out)?;
    }

    info!(
        scenario = %report.name,
        steps = report.steps.len(),
        failed = report.failed_expectations().count(),
        "Scenario finished"
    );
    Ok(report)
}

fn write_summary(report: &ScenarioReport, out: &mut dyn Write) -> Result<()> {
    if !report.name.is_empty() {
        writeln!(out, "scenario: {}", report.name)?;
    }

    for step in &report.steps {
        let mark = match step.expectation_met {
            Some(true) => "PASS",
            Some(false) => "FAIL",
            None => "    ",
        };
        writeln!(
            out,
            "{mark} #{:<3} {:<20} {:<12} @{} -> {}",
            step.number, step.operation, step.caller, step.at, step.outcome
        )?;
    }

    let vehicle = &report.final_state;
    writeln!(
        out,
        "engine: {}, owner: {}, authorities: {} active / {} total, permits: {}, facts: {}",
        vehicle.engine_state(),
        vehicle.owner(),
        vehicle.roster().active_count(),
        vehicle.roster().len(),
        vehicle.ledger().len(),
        vehicle.facts().len()
    )?;
    Ok(())
}
