//! Per-project summary logs and the consolidated dataset

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::{Result, SortieError};
use crate::models::{
    format_flight_time, FlightRecord, ProjectPropertiesRecord, ResolvedLocation, SummaryRow,
    SUMMARY_HEADERS,
};

/// Build the summary row of one member flight
pub fn summary_row(
    flight: &FlightRecord,
    location: &ResolvedLocation,
    record: &ProjectPropertiesRecord,
) -> SummaryRow {
    SummaryRow {
        date: flight.takeoff_date().format("%Y-%m-%d").to_string(),
        take_off_utc: flight.takeoff_clock.clone(),
        landing_utc: flight.landing_clock.clone(),
        flight_time: format_flight_time(flight.duration()),
        client: record.client.clone(),
        landing_location: match (location, &flight.landing_gps) {
            (ResolvedLocation::Recorded(_), Some(logged)) => logged.clone(),
            _ => location.to_log_value(),
        },
        purpose: record.purpose.clone(),
        aircraft: flight.aircraft(),
        pilot: record.pilot.clone(),
    }
}

/// Writes project logs into an output directory and appends their rows to a
/// consolidated dataset
pub struct LogAggregator {
    output_dir: PathBuf,
    consolidated: PathBuf,
}

impl LogAggregator {
    pub fn new(output_dir: impl Into<PathBuf>, consolidated: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into(), consolidated: consolidated.into() }
    }

    /// Replace the consolidated dataset with an empty one holding only the header.
    pub fn reset_consolidated(&self) -> Result<()> {
        if self.consolidated.exists() {
            fs::remove_file(&self.consolidated)?;
        }
        if let Some(parent) = self.consolidated.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer =
            csv::Writer::from_path(&self.consolidated).map_err(write_error(&self.consolidated))?;
        writer.write_record(SUMMARY_HEADERS).map_err(write_error(&self.consolidated))?;
        writer.flush()?;
        Ok(())
    }

    /// Path of the log written for `project_id`
    pub fn project_log_path(&self, project_id: &str) -> PathBuf {
        self.output_dir.join(format!("{}_log.csv", project_id))
    }

    /// Write `<output_dir>/<id>_log.csv` and return its path.
    pub fn write_project_log(&self, project_id: &str, rows: &[SummaryRow]) -> Result<PathBuf> {
        let path = self.project_log_path(project_id);

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .map_err(write_error(&path))?;
        writer.write_record(SUMMARY_HEADERS).map_err(write_error(&path))?;
        write_rows(&mut writer, &path, rows)?;

        tracing::info!("Processed project {} and generated {}", project_id, path.display());
        Ok(path)
    }

    /// Append `rows` to the consolidated dataset.
    pub fn append_consolidated(&self, rows: &[SummaryRow]) -> Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(&self.consolidated)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        write_rows(&mut writer, &self.consolidated, rows)?;

        tracing::info!("Appended {} row(s) to {}", rows.len(), self.consolidated.display());
        Ok(())
    }
}

fn write_rows(writer: &mut csv::Writer<File>, path: &Path, rows: &[SummaryRow]) -> Result<()> {
    for row in rows {
        writer.serialize(row).map_err(write_error(path))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_error(path: &Path) -> impl Fn(csv::Error) -> SortieError + '_ {
    move |source| SortieError::SummaryWrite { path: path.to_path_buf(), source }
}

/// Read the rows of a summary log back
pub fn read_summary_log(path: &Path) -> Result<Vec<SummaryRow>> {
    let read_error = |source| SortieError::SummaryRead { path: path.to_path_buf(), source };
    let mut reader = csv::Reader::from_path(path).map_err(read_error)?;
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<SummaryRow>, _>>()
        .map_err(read_error)?;
    Ok(rows)
}
