use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::Coordinate;

/// Marker written when no landing location could be determined
pub const UNRESOLVED_LOCATION: &str = "None";

/// How a member flight's landing location was obtained
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedLocation {
    /// The flight's own last GPS fix
    Recorded(Coordinate),
    /// The project's stored suggestion
    Suggested(Coordinate),
    /// Borrowed from the sibling flight closest in takeoff time
    Nearest { coordinate: Coordinate, source: PathBuf },
    /// Nothing usable in the project
    Unresolved,
}

impl ResolvedLocation {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            ResolvedLocation::Recorded(c) | ResolvedLocation::Suggested(c) => Some(*c),
            ResolvedLocation::Nearest { coordinate, .. } => Some(*coordinate),
            ResolvedLocation::Unresolved => None,
        }
    }

    /// Value of the `Landing_Location` column
    pub fn to_log_value(&self) -> String {
        self.coordinate()
            .map(|c| c.to_string())
            .unwrap_or_else(|| UNRESOLVED_LOCATION.to_string())
    }
}

/// One row of a project log or of the consolidated dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Take_Off_UTC")]
    pub take_off_utc: String,
    #[serde(rename = "Landing_UTC")]
    pub landing_utc: String,
    #[serde(rename = "Flight_Time")]
    pub flight_time: String,
    #[serde(rename = "Client")]
    pub client: String,
    #[serde(rename = "Landing_Location")]
    pub landing_location: String,
    #[serde(rename = "Purpose")]
    pub purpose: String,
    #[serde(rename = "Aircraft")]
    pub aircraft: String,
    #[serde(rename = "Pilot")]
    pub pilot: String,
}

/// Column order of every summary log
pub const SUMMARY_HEADERS: [&str; 9] = [
    "Date",
    "Take_Off_UTC",
    "Landing_UTC",
    "Flight_Time",
    "Client",
    "Landing_Location",
    "Purpose",
    "Aircraft",
    "Pilot",
];

/// Render a flight duration as `H:MM:SS`, with `.ffffff` when there are
/// sub-second parts.
pub fn format_flight_time(duration: TimeDelta) -> String {
    let sign = if duration < TimeDelta::zero() { "-" } else { "" };
    let duration = duration.abs();

    let total_seconds = duration.num_seconds();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let micros = duration.subsec_nanos() / 1_000;

    if micros == 0 {
        format!("{sign}{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{sign}{hours}:{minutes:02}:{seconds:02}.{micros:06}")
    }
}
