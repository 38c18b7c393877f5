//! Identify command implementation

use anyhow::Result;
use sortie_core::config::RunConfig;
use sortie_core::geo::GeodesicDistance;
use sortie_core::pipeline::{IdentifyReport, IdentifyStage};
use sortie_core::ports::{CountryResolver, NoCountryResolver};
use sortie_geo::CountryIndex;
use std::path::Path;

use crate::cli::OverrideArgs;
use crate::config_loader::load_run_config;
use crate::errors::explain;
use crate::output::OutputWriter;
use crate::output_types::ProjectRow;

pub fn execute(args: OverrideArgs, config_file: Option<&Path>, output: &OutputWriter) -> Result<()> {
    let config = load_run_config(config_file, args.into())?;
    let report = identify(&config)?;

    if output.is_json() {
        output.result(&report)?;
    } else {
        render(&report, output);
    }
    Ok(())
}

/// Run the identify stage with the configured boundary dataset, if any.
pub fn identify(config: &RunConfig) -> Result<IdentifyReport> {
    let index = match &config.paths.boundaries {
        Some(path) => Some(CountryIndex::load(path).map_err(explain)?),
        None => None,
    };
    let countries: &dyn CountryResolver = match &index {
        Some(index) => index,
        None => &NoCountryResolver,
    };

    IdentifyStage::new(config, GeodesicDistance, countries).run().map_err(explain)
}

/// Human rendering of an identify report
pub fn render(report: &IdentifyReport, output: &OutputWriter) {
    for skipped in &report.skipped {
        output.warning(format!("Skipped {}: {}", skipped.path.display(), skipped.reason));
    }

    output.section("Projects");
    output.table(report.projects.iter().map(ProjectRow::from).collect());

    if report.projects.iter().any(|p| p.missing_gps > 0) {
        output.info("Review Suggested_landing_location in the property files before processing");
    }
    output.success(format!(
        "Identified {} project(s); property files in {}",
        report.projects.len(),
        report.properties_dir.display()
    ));
}
