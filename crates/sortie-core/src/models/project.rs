use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{Coordinate, FlightRecord};

/// A run of flights that belong to one operational session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// `Project_<takeoff date>`, with a numeric suffix when the date repeats
    pub id: String,

    /// Member flight logs in arrival order (never empty)
    pub member_files: Vec<PathBuf>,

    /// Landing time of the most recently appended member
    pub last_landing: NaiveDateTime,

    /// Landing position of the most recently appended member
    pub last_landing_coordinate: Option<Coordinate>,

    /// First valid landing position seen after the project was opened
    pub suggested_landing_coordinate: Option<Coordinate>,

    /// Members without a usable landing position
    pub missing_gps: usize,

    /// Country label of the opening flight, for display only
    pub country: Option<String>,
}

impl Project {
    /// Open a project whose first member is `flight`.
    pub fn open(id: String, flight: &FlightRecord, country: Option<String>) -> Self {
        Self {
            id,
            member_files: vec![flight.source_path.clone()],
            last_landing: flight.landing,
            last_landing_coordinate: flight.landing_coordinate,
            suggested_landing_coordinate: None,
            missing_gps: usize::from(!flight.has_landing_coordinate()),
            country,
        }
    }

    /// Append `flight` and advance the last-landing state to it.
    ///
    /// Returns `true` when this flight supplied the project's suggested
    /// landing coordinate.
    pub fn append(&mut self, flight: &FlightRecord) -> bool {
        self.member_files.push(flight.source_path.clone());
        self.last_landing = flight.landing;
        self.last_landing_coordinate = flight.landing_coordinate;

        if flight.landing_coordinate.is_none() {
            self.missing_gps += 1;
            return false;
        }

        if self.suggested_landing_coordinate.is_none() {
            self.suggested_landing_coordinate = flight.landing_coordinate;
            return true;
        }

        false
    }

    pub fn len(&self) -> usize {
        self.member_files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.member_files.is_empty()
    }
}

/// Persisted form of a [`Project`], the hand-off between the two stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPropertiesRecord {
    pub project_id: String,
    pub files: Vec<PathBuf>,
    pub suggested_landing_location: Option<Coordinate>,
    pub missing_gps: usize,
    pub pilot: String,
    pub purpose: String,
    pub client: String,
}

/// Pilot, purpose and client, supplied once for a whole run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub pilot: String,
    pub purpose: String,
    pub client: String,
}

impl ProjectPropertiesRecord {
    /// Build the persisted record for `project`.
    ///
    /// The suggestion is only exposed when some member actually lacks GPS.
    pub fn from_project(project: &Project, metadata: &RunMetadata) -> Self {
        let suggested_landing_location = if project.missing_gps == 0 {
            None
        } else {
            project.suggested_landing_coordinate
        };

        Self {
            project_id: project.id.clone(),
            files: project.member_files.clone(),
            suggested_landing_location,
            missing_gps: project.missing_gps,
            pilot: metadata.pilot.clone(),
            purpose: metadata.purpose.clone(),
            client: metadata.client.clone(),
        }
    }
}
