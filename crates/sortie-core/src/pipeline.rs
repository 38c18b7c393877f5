//! The two stages of a run
//!
//! `IdentifyStage` segments flight logs into projects and persists one
//! property file per project. `ProcessStage` starts from those files alone,
//! resolves missing landing locations and writes the summary logs. Either stage
//! can be re-run without the other.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::aggregator::{summary_row, LogAggregator};
use crate::clustering::{Placement, TemporalSpatialClusterer};
use crate::config::RunConfig;
use crate::error::{Result, SortieError};
use crate::models::{
    file_name_of, Coordinate, FlightRecord, ProjectPropertiesRecord, ResolvedLocation,
};
use crate::parser::{list_flight_logs, FlightFileParser};
use crate::ports::{CountryResolver, DistanceMetric};
use crate::properties::{self, ProjectPropertiesWriter};
use crate::resolver::MissingGpsResolver;

/// A flight log left out of clustering
#[derive(Debug, Clone, Serialize)]
pub struct SkippedLog {
    pub path: PathBuf,
    pub reason: String,
}

/// One project as written by the identify stage
#[derive(Debug, Clone, Serialize)]
pub struct IdentifiedProject {
    pub id: String,
    pub files: Vec<PathBuf>,
    pub missing_gps: usize,
    pub suggested_landing_location: Option<Coordinate>,
    pub country: Option<String>,
    pub properties_path: PathBuf,
}

/// Outcome of the identify stage
#[derive(Debug, Clone, Serialize)]
pub struct IdentifyReport {
    pub properties_dir: PathBuf,
    pub projects: Vec<IdentifiedProject>,
    pub placements: Vec<Placement>,
    pub skipped: Vec<SkippedLog>,
}

/// Segments flight logs into projects and writes their property files
pub struct IdentifyStage<'a, D, C> {
    config: &'a RunConfig,
    distance: D,
    countries: C,
    parser: FlightFileParser,
}

impl<'a, D: DistanceMetric, C: CountryResolver> IdentifyStage<'a, D, C> {
    pub fn new(config: &'a RunConfig, distance: D, countries: C) -> Self {
        Self { config, distance, countries, parser: FlightFileParser }
    }

    pub fn run(self) -> Result<IdentifyReport> {
        let paths = &self.config.paths;
        let logs = list_flight_logs(&paths.input_dir)?;
        tracing::info!("Found {} flight log(s) in {}", logs.len(), paths.input_dir.display());

        let (flights, skipped) = self.collect_flights(&logs)?;

        let mut clusterer =
            TemporalSpatialClusterer::new(self.config.thresholds, self.distance, self.countries);
        let placements: Vec<Placement> = flights.iter().map(|f| clusterer.push(f)).collect();
        let projects = clusterer.finish();

        reset_dir(&paths.properties_dir)?;
        let writer = ProjectPropertiesWriter::new(&paths.properties_dir);

        let mut identified = Vec::with_capacity(projects.len());
        for project in &projects {
            let record = ProjectPropertiesRecord::from_project(project, &self.config.metadata);
            let properties_path = writer.write(&record)?;
            identified.push(IdentifiedProject {
                id: record.project_id,
                files: record.files,
                missing_gps: record.missing_gps,
                suggested_landing_location: record.suggested_landing_location,
                country: project.country.clone(),
                properties_path,
            });
        }

        tracing::info!(
            "Generated {} project property file(s) in {}",
            identified.len(),
            paths.properties_dir.display()
        );

        Ok(IdentifyReport {
            properties_dir: paths.properties_dir.clone(),
            projects: identified,
            placements,
            skipped,
        })
    }

    /// Parse every log, dropping unreadable, unlistable and too-short flights.
    fn collect_flights(&self, logs: &[PathBuf]) -> Result<(Vec<FlightRecord>, Vec<SkippedLog>)> {
        let min_seconds = self.config.thresholds.valid_time_threshold_seconds;
        let mut flights = Vec::with_capacity(logs.len());
        let mut skipped = Vec::new();

        for path in logs {
            if path.to_string_lossy().contains(properties::FILES_SEPARATOR) {
                tracing::warn!(
                    "Skipping {}: '{}' in its path cannot be stored in a project file list",
                    path.display(),
                    properties::FILES_SEPARATOR
                );
                skipped.push(SkippedLog {
                    path: path.clone(),
                    reason: format!(
                        "path contains '{}', which separates project files",
                        properties::FILES_SEPARATOR
                    ),
                });
                continue;
            }

            let flight = match self.parser.parse(path) {
                Ok(flight) => flight,
                Err(e) if e.is_skippable() => {
                    tracing::warn!("Skipping {}: {}", file_name_of(path), e);
                    skipped.push(SkippedLog { path: path.clone(), reason: e.to_string() });
                    continue;
                }
                Err(e) => return Err(e),
            };

            let seconds = flight.duration_seconds();
            if seconds < min_seconds {
                tracing::info!(
                    "Skipping {}: Flight duration too short ({:.0} seconds)",
                    file_name_of(path),
                    seconds
                );
                skipped.push(SkippedLog {
                    path: path.clone(),
                    reason: format!("flight duration too short ({:.0} seconds)", seconds),
                });
                continue;
            }

            flights.push(flight);
        }

        Ok((flights, skipped))
    }
}

/// How each member of a processed project got its landing location
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionCounts {
    pub recorded: usize,
    pub suggested: usize,
    pub nearest: usize,
    pub unresolved: usize,
}

impl ResolutionCounts {
    fn add(&mut self, location: &ResolvedLocation) {
        match location {
            ResolvedLocation::Recorded(_) => self.recorded += 1,
            ResolvedLocation::Suggested(_) => self.suggested += 1,
            ResolvedLocation::Nearest { .. } => self.nearest += 1,
            ResolvedLocation::Unresolved => self.unresolved += 1,
        }
    }
}

/// One project as written by the process stage
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedProject {
    pub id: String,
    pub log_path: PathBuf,
    pub flights: usize,
    pub resolution: ResolutionCounts,
}

/// Outcome of the process stage
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    pub output_dir: PathBuf,
    pub consolidated_log: PathBuf,
    pub projects: Vec<ProcessedProject>,
}

impl ProcessReport {
    pub fn total_flights(&self) -> usize {
        self.projects.iter().map(|p| p.flights).sum()
    }
}

/// Resolves landing locations and writes summary logs from property files
pub struct ProcessStage<'a> {
    config: &'a RunConfig,
    parser: FlightFileParser,
}

impl<'a> ProcessStage<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config, parser: FlightFileParser }
    }

    pub fn run(self) -> Result<ProcessReport> {
        let paths = &self.config.paths;
        if !paths.properties_dir.is_dir() {
            return Err(SortieError::PropertiesDirNotFound { path: paths.properties_dir.clone() });
        }
        let records = properties::load_all(&paths.properties_dir)?;

        reset_dir(&paths.output_dir)?;
        let aggregator = LogAggregator::new(&paths.output_dir, &paths.consolidated_log);
        aggregator.reset_consolidated()?;

        let mut projects = Vec::with_capacity(records.len());
        for record in &records {
            projects.push(self.process_project(record, &aggregator)?);
        }

        Ok(ProcessReport {
            output_dir: paths.output_dir.clone(),
            consolidated_log: paths.consolidated_log.clone(),
            projects,
        })
    }

    fn process_project(
        &self,
        record: &ProjectPropertiesRecord,
        aggregator: &LogAggregator,
    ) -> Result<ProcessedProject> {
        let members = record
            .files
            .iter()
            .map(|path| self.parser.parse(path))
            .collect::<Result<Vec<FlightRecord>>>()?;

        let locations =
            MissingGpsResolver::new(record.suggested_landing_location).resolve_all(&members);

        let mut resolution = ResolutionCounts::default();
        let rows: Vec<_> = members
            .iter()
            .zip(&locations)
            .map(|(flight, location)| {
                resolution.add(location);
                summary_row(flight, location, record)
            })
            .collect();

        let log_path = aggregator.write_project_log(&record.project_id, &rows)?;
        aggregator.append_consolidated(&rows)?;

        Ok(ProcessedProject {
            id: record.project_id.clone(),
            log_path,
            flights: rows.len(),
            resolution,
        })
    }
}

/// Remove `dir` with everything in it and create it empty.
fn reset_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}
