use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::Coordinate;

/// One parsed flight log file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    /// File the record was read from
    pub source_path: PathBuf,

    /// Date and time of the first row
    pub takeoff: NaiveDateTime,

    /// Date and time of the last row
    pub landing: NaiveDateTime,

    /// `Time` text of the first row, as logged
    pub takeoff_clock: String,

    /// `Time` text of the last row, as logged
    pub landing_clock: String,

    /// Valid position of the last row, if any
    pub landing_coordinate: Option<Coordinate>,

    /// `GPS` text of the last row, as logged, when it holds a valid position
    pub landing_gps: Option<String>,
}

impl FlightRecord {
    pub fn duration(&self) -> TimeDelta {
        self.landing - self.takeoff
    }

    pub fn duration_seconds(&self) -> f64 {
        delta_seconds(self.duration())
    }

    pub fn takeoff_date(&self) -> NaiveDate {
        self.takeoff.date()
    }

    pub fn has_landing_coordinate(&self) -> bool {
        self.landing_coordinate.is_some()
    }

    pub fn file_name(&self) -> String {
        file_name_of(&self.source_path)
    }

    /// Aircraft identifier encoded as the file name prefix, e.g. `DJI` in
    /// `DJI-2024-03-05-101500.csv`.
    pub fn aircraft(&self) -> String {
        let name = self.file_name();
        name.split('-').next().unwrap_or_default().to_string()
    }
}

/// Signed length of a time delta in fractional seconds.
pub fn delta_seconds(delta: TimeDelta) -> f64 {
    match delta.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0,
        None => delta.num_seconds() as f64,
    }
}

/// Final path component, lossily converted for display.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
