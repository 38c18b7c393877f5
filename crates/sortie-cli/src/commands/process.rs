//! Process command implementation

use anyhow::Result;
use sortie_core::config::RunConfig;
use sortie_core::pipeline::{ProcessReport, ProcessStage};
use std::path::Path;

use crate::cli::OverrideArgs;
use crate::config_loader::load_run_config;
use crate::errors::explain;
use crate::output::OutputWriter;
use crate::output_types::ProcessedRow;

pub fn execute(args: OverrideArgs, config_file: Option<&Path>, output: &OutputWriter) -> Result<()> {
    let config = load_run_config(config_file, args.into())?;
    let report = process(&config)?;

    if output.is_json() {
        output.result(&report)?;
    } else {
        render(&report, output);
    }
    Ok(())
}

pub fn process(config: &RunConfig) -> Result<ProcessReport> {
    ProcessStage::new(config).run().map_err(explain)
}

/// Human rendering of a process report
pub fn render(report: &ProcessReport, output: &OutputWriter) {
    output.section("Project Logs");
    output.table(report.projects.iter().map(ProcessedRow::from).collect());

    let unresolved: usize = report.projects.iter().map(|p| p.resolution.unresolved).sum();
    if unresolved > 0 {
        output.warning(format!("{} flight(s) have no landing location (written as None)", unresolved));
    }

    output.kv("Flights", report.total_flights());
    output.kv("Consolidated dataset", report.consolidated_log.display());
    output.success(format!(
        "Processed {} project(s) into {}",
        report.projects.len(),
        report.output_dir.display()
    ));
}
