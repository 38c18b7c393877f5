//! Flight log reader
//!
//! A flight log is a CSV file with one row per telemetry sample. Only three
//! columns matter here: `Date` and `Time` of the sample and the free-text
//! `GPS` position. The first row is the takeoff and the last row the landing.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::cmp::Ordering;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{Result, SortieError};
use crate::models::{file_name_of, Coordinate, FlightRecord};

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H%M%S";

/// Reads single flight logs into [`FlightRecord`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct FlightFileParser;

struct Columns {
    date: usize,
    time: usize,
    gps: Option<usize>,
}

impl FlightFileParser {
    /// Parse the flight log at `path`.
    pub fn parse(&self, path: &Path) -> Result<FlightRecord> {
        let file = File::open(path).map_err(|source| SortieError::LogUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Fields)
            .from_reader(file);

        let csv_error = |source: csv::Error| SortieError::Csv { path: path.to_path_buf(), source };

        let headers = reader.headers().map_err(csv_error)?.clone();
        let columns = self.locate_columns(path, &headers)?;

        let mut first: Option<csv::StringRecord> = None;
        let mut last: Option<csv::StringRecord> = None;
        for row in reader.records() {
            let row = row.map_err(csv_error)?;
            if first.is_none() {
                first = Some(row.clone());
            }
            last = Some(row);
        }

        let (first, last) = match (first, last) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(SortieError::EmptyLog { path: path.to_path_buf() }),
        };

        let takeoff = self.row_timestamp(path, &first, &columns)?;
        let landing = self.row_timestamp(path, &last, &columns)?;

        let landing_gps = columns
            .gps
            .and_then(|idx| last.get(idx))
            .and_then(|text| Coordinate::parse_gps(text).map(|c| (c, text.to_string())));
        let (landing_coordinate, landing_gps) = landing_gps.unzip();

        Ok(FlightRecord {
            source_path: path.to_path_buf(),
            takeoff,
            landing,
            takeoff_clock: field(&first, columns.time).to_string(),
            landing_clock: field(&last, columns.time).to_string(),
            landing_coordinate,
            landing_gps,
        })
    }

    fn locate_columns(&self, path: &Path, headers: &csv::StringRecord) -> Result<Columns> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let date = position("Date");
        let time = position("Time");
        match (date, time) {
            (Some(date), Some(time)) => Ok(Columns { date, time, gps: position("GPS") }),
            _ => {
                let columns = [("Date", date), ("Time", time)]
                    .into_iter()
                    .filter(|(_, idx)| idx.is_none())
                    .map(|(name, _)| name.to_string())
                    .collect();
                Err(SortieError::MissingColumns { path: path.to_path_buf(), columns })
            }
        }
    }

    fn row_timestamp(
        &self,
        path: &Path,
        row: &csv::StringRecord,
        columns: &Columns,
    ) -> Result<NaiveDateTime> {
        let date = field(row, columns.date);
        let time = field(row, columns.time);

        parse_timestamp(date, time).ok_or_else(|| SortieError::InvalidTimestamp {
            path: path.to_path_buf(),
            value: format!("{} {}", date, time),
        })
    }
}

fn field(row: &csv::StringRecord, idx: usize) -> &str {
    row.get(idx).unwrap_or_default()
}

/// Combine a logged `Date` and `Time` into one timestamp
pub fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date.trim(), format).ok())?;
    let time = NaiveTime::parse_from_str(time.trim(), TIME_FORMAT).ok()?;
    Some(date.and_time(time))
}

fn file_timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\d{4}-\d{2}-\d{2}-\d{6}").expect("file timestamp pattern is valid")
    })
}

/// Timestamp embedded in a log's file name, e.g. `2024-03-05-101500`
pub fn file_timestamp(path: &Path) -> Option<NaiveDateTime> {
    let name = file_name_of(path);
    let found = file_timestamp_pattern().find(&name)?;
    NaiveDateTime::parse_from_str(found.as_str(), FILE_TIMESTAMP_FORMAT).ok()
}

/// List the flight logs in `dir`, ordered by the timestamp in their names.
///
/// Logs without a name timestamp go last, ordered by name, with a warning
/// since their position relative to the others is arbitrary.
pub fn list_flight_logs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(SortieError::InputDirNotFound { path: dir.to_path_buf() });
    }

    let mut logs: Vec<(Option<NaiveDateTime>, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if path.is_file() && is_csv {
            logs.push((file_timestamp(&path), path));
        }
    }

    for (timestamp, path) in &logs {
        if timestamp.is_none() {
            tracing::warn!(
                "No timestamp in file name {}; it will be ordered after timestamped logs",
                file_name_of(path)
            );
        }
    }

    logs.sort_by(|(ts_a, path_a), (ts_b, path_b)| match (ts_a, ts_b) {
        (Some(a), Some(b)) => a.cmp(b).then_with(|| path_a.cmp(path_b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => path_a.cmp(path_b),
    });

    Ok(logs.into_iter().map(|(_, path)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_log(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_flight_log() {
        let dir = TempDir::new().unwrap();
        let path = write_log(
            dir.path(),
            "M300-2024-03-05-101500.csv",
            "Date,Time,GPS,Altitude\n\
             2024-03-05,10:15:00.000,47.6205 -122.3493,0\n\
             2024-03-05,10:20:00.000,47.6210 -122.3490,80\n\
             2024-03-05,10:27:30.500,47.6206 -122.3492,0\n",
        );

        let record = FlightFileParser.parse(&path).unwrap();
        assert_eq!(record.takeoff_clock, "10:15:00.000");
        assert_eq!(record.landing_clock, "10:27:30.500");
        assert_eq!(record.duration_seconds(), 750.5);
        assert_eq!(record.landing_coordinate, Some(Coordinate::new(47.6206, -122.3492)));
        assert_eq!(record.landing_gps.as_deref(), Some("47.6206 -122.3492"));
    }

    #[test]
    fn test_landing_gps_text_kept_as_logged() {
        let dir = TempDir::new().unwrap();
        let path = write_log(
            dir.path(),
            "M300-2024-03-05-101500.csv",
            "Date,Time,GPS
2024-03-05,10:15:00,47.62050 -122.34930
2024-03-05,10:20:00,47.62050 -122.34930
",
        );

        let record = FlightFileParser.parse(&path).unwrap();
        assert_eq!(record.landing_gps.as_deref(), Some("47.62050 -122.34930"));
        assert_eq!(record.landing_coordinate, Some(Coordinate::new(47.6205, -122.3493)));
    }

    #[test]
    fn test_invalid_landing_gps_is_absent() {
        let dir = TempDir::new().unwrap();
        for (name, gps) in [("a.csv", "0 0"), ("b.csv", "None"), ("c.csv", ""), ("d.csv", "garbage")] {
            let path = write_log(
                dir.path(),
                name,
                &format!("Date,Time,GPS\n2024-03-05,10:00:00,1.5 2.5\n2024-03-05,10:05:00,{}\n", gps),
            );
            let record = FlightFileParser.parse(&path).unwrap();
            assert_eq!(record.landing_coordinate, None, "{}", gps);
            assert_eq!(record.landing_gps, None, "{}", gps);
        }
    }

    #[test]
    fn test_missing_gps_column() {
        let dir = TempDir::new().unwrap();
        let path = write_log(
            dir.path(),
            "nogps.csv",
            "Date,Time\n2024/03/05,10:00:00\n2024/03/05,10:05:00\n",
        );

        let record = FlightFileParser.parse(&path).unwrap();
        assert!(record.landing_coordinate.is_none());
        assert_eq!(record.duration_seconds(), 300.0);
    }

    #[test]
    fn test_missing_required_columns() {
        let dir = TempDir::new().unwrap();
        let path = write_log(dir.path(), "bad.csv", "Timestamp,GPS\n1,1.0 2.0\n");

        let err = FlightFileParser.parse(&path).unwrap_err();
        assert!(err.is_skippable());
        match err {
            SortieError::MissingColumns { columns, .. } => assert_eq!(columns, vec!["Date", "Time"]),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_empty_and_unparsable_logs() {
        let dir = TempDir::new().unwrap();
        let empty = write_log(dir.path(), "empty.csv", "Date,Time,GPS\n");
        assert!(matches!(FlightFileParser.parse(&empty), Err(SortieError::EmptyLog { .. })));

        let garbled = write_log(dir.path(), "garbled.csv", "Date,Time\nyesterday,noon\n");
        assert!(matches!(
            FlightFileParser.parse(&garbled),
            Err(SortieError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn test_unreadable_log_is_skippable() {
        let dir = TempDir::new().unwrap();

        let gone = FlightFileParser.parse(&dir.path().join("gone.csv")).unwrap_err();
        assert!(matches!(gone, SortieError::LogUnreadable { .. }));
        assert!(gone.is_skippable());

        let not_a_file = dir.path().join("folder.csv");
        fs::create_dir(&not_a_file).unwrap();
        assert!(FlightFileParser.parse(&not_a_file).unwrap_err().is_skippable());
    }

    #[test]
    fn test_file_timestamp() {
        let ts = file_timestamp(Path::new("logs/DJI-2024-03-05-101500.csv")).unwrap();
        assert_eq!(ts.to_string(), "2024-03-05 10:15:00");
        assert!(file_timestamp(Path::new("logs/flight.csv")).is_none());
    }

    #[test]
    fn test_list_flight_logs_ordering() {
        let dir = TempDir::new().unwrap();
        for name in [
            "B-2024-03-05-120000.csv",
            "A-2024-03-05-090000.csv",
            "zz-untimed.csv",
            "C-2024-03-04-235959.CSV",
            "notes.txt",
        ] {
            write_log(dir.path(), name, "Date,Time\n");
        }

        let names: Vec<String> = list_flight_logs(dir.path())
            .unwrap()
            .iter()
            .map(|p| file_name_of(p))
            .collect();

        assert_eq!(
            names,
            vec![
                "C-2024-03-04-235959.CSV",
                "A-2024-03-05-090000.csv",
                "B-2024-03-05-120000.csv",
                "zz-untimed.csv",
            ]
        );
    }

    #[test]
    fn test_missing_input_dir() {
        let err = list_flight_logs(Path::new("/nonexistent/sortie-logs")).unwrap_err();
        assert!(matches!(err, SortieError::InputDirNotFound { .. }));
    }
}
