use serde::Serialize;
use sortie_core::config::ConfigSource;
use sortie_core::pipeline::{IdentifiedProject, IdentifyReport, ProcessReport, ProcessedProject};
use tabled::Tabled;

/// Output for the run command
#[derive(Debug, Serialize)]
pub struct RunOutput<'a> {
    pub identify: &'a IdentifyReport,
    pub process: &'a ProcessReport,
}

/// Output for the config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub config_file: Option<String>,
    pub values: Vec<ConfigEntry>,
}

#[derive(Debug, Serialize, Tabled)]
pub struct ConfigEntry {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

impl ConfigEntry {
    pub fn new(key: &str, value: &str, source: ConfigSource) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            source: format!("{:?}", source),
        }
    }
}

/// Table row for an identified project
#[derive(Debug, Tabled)]
pub struct ProjectRow {
    #[tabled(rename = "Project")]
    pub id: String,
    #[tabled(rename = "Files")]
    pub files: usize,
    #[tabled(rename = "Missing GPS")]
    pub missing_gps: usize,
    #[tabled(rename = "Suggested Landing")]
    pub suggested: String,
    #[tabled(rename = "Country")]
    pub country: String,
}

impl From<&IdentifiedProject> for ProjectRow {
    fn from(project: &IdentifiedProject) -> Self {
        Self {
            id: project.id.clone(),
            files: project.files.len(),
            missing_gps: project.missing_gps,
            suggested: project
                .suggested_landing_location
                .map(|c| c.to_persisted())
                .unwrap_or_else(|| "-".to_string()),
            country: project.country.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Table row for a processed project
#[derive(Debug, Tabled)]
pub struct ProcessedRow {
    #[tabled(rename = "Project")]
    pub id: String,
    #[tabled(rename = "Flights")]
    pub flights: usize,
    #[tabled(rename = "Recorded")]
    pub recorded: usize,
    #[tabled(rename = "Suggested")]
    pub suggested: usize,
    #[tabled(rename = "Nearest")]
    pub nearest: usize,
    #[tabled(rename = "Unresolved")]
    pub unresolved: usize,
    #[tabled(rename = "Log")]
    pub log: String,
}

impl From<&ProcessedProject> for ProcessedRow {
    fn from(project: &ProcessedProject) -> Self {
        Self {
            id: project.id.clone(),
            flights: project.flights,
            recorded: project.resolution.recorded,
            suggested: project.resolution.suggested,
            nearest: project.resolution.nearest,
            unresolved: project.resolution.unresolved,
            log: project.log_path.display().to_string(),
        }
    }
}
