use crate::error::{Result, SortieError};
use crate::models::RunMetadata;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "sortie.toml";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for a Sortie run
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub pilot: ConfigValue<String>,
    pub purpose: ConfigValue<String>,
    pub client: ConfigValue<String>,
    pub time_threshold_hours: ConfigValue<f64>,
    pub coordinate_threshold_meters: ConfigValue<f64>,
    pub valid_time_threshold_seconds: ConfigValue<f64>,
    pub input_dir: ConfigValue<PathBuf>,
    pub properties_dir: ConfigValue<PathBuf>,
    pub output_dir: ConfigValue<PathBuf>,
    pub consolidated_log: ConfigValue<PathBuf>,
    pub boundaries: ConfigValue<Option<PathBuf>>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let default = ConfigSource::Default;
        Self {
            pilot: ConfigValue::new("Unknown Pilot".to_string(), default),
            purpose: ConfigValue::new("Unknown Purpose".to_string(), default),
            client: ConfigValue::new("Unknown Client".to_string(), default),
            time_threshold_hours: ConfigValue::new(24.0, default),
            coordinate_threshold_meters: ConfigValue::new(1000.0, default),
            valid_time_threshold_seconds: ConfigValue::new(50.0, default),
            input_dir: ConfigValue::new(PathBuf::from("CSV LOGS"), default),
            properties_dir: ConfigValue::new(PathBuf::from("project_properties"), default),
            output_dir: ConfigValue::new(PathBuf::from("project_outputs"), default),
            consolidated_log: ConfigValue::new(PathBuf::from("new_data.csv"), default),
            boundaries: ConfigValue::new(None, default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| SortieError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| SortieError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        let source = ConfigSource::File;

        if let Some(pilot) = file_config.pilot {
            self.pilot.update(pilot, source);
        }
        if let Some(purpose) = file_config.purpose {
            self.purpose.update(purpose, source);
        }
        if let Some(client) = file_config.client {
            self.client.update(client, source);
        }
        if let Some(hours) = file_config.time_threshold_hours {
            self.time_threshold_hours.update(hours, source);
        }
        if let Some(meters) = file_config.coordinate_threshold_meters {
            self.coordinate_threshold_meters.update(meters, source);
        }
        if let Some(seconds) = file_config.valid_time_threshold_seconds {
            self.valid_time_threshold_seconds.update(seconds, source);
        }
        if let Some(dir) = file_config.input_dir {
            self.input_dir.update(dir, source);
        }
        if let Some(dir) = file_config.properties_dir {
            self.properties_dir.update(dir, source);
        }
        if let Some(dir) = file_config.output_dir {
            self.output_dir.update(dir, source);
        }
        if let Some(log) = file_config.consolidated_log {
            self.consolidated_log.update(log, source);
        }
        if let Some(boundaries) = file_config.boundaries {
            self.boundaries.update(Some(boundaries), source);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    ///
    /// A threshold variable that is set but not a number is rejected.
    pub fn load_from_env(mut self) -> Result<Self> {
        let source = ConfigSource::Environment;

        if let Ok(pilot) = env::var("SORTIE_PILOT") {
            self.pilot.update(pilot, source);
        }
        if let Ok(purpose) = env::var("SORTIE_PURPOSE") {
            self.purpose.update(purpose, source);
        }
        if let Ok(client) = env::var("SORTIE_CLIENT") {
            self.client.update(client, source);
        }

        if let Some(hours) = env_number("SORTIE_TIME_THRESHOLD", "time_threshold_hours")? {
            self.time_threshold_hours.update(hours, source);
        }
        if let Some(meters) =
            env_number("SORTIE_COORDINATE_THRESHOLD", "coordinate_threshold_meters")?
        {
            self.coordinate_threshold_meters.update(meters, source);
        }
        if let Some(seconds) =
            env_number("SORTIE_VALID_TIME_THRESHOLD", "valid_time_threshold_seconds")?
        {
            self.valid_time_threshold_seconds.update(seconds, source);
        }

        if let Ok(boundaries) = env::var("SORTIE_BOUNDARIES") {
            if !boundaries.trim().is_empty() {
                self.boundaries.update(Some(PathBuf::from(boundaries)), source);
            }
        }

        Ok(self)
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        let source = ConfigSource::Cli;

        if let Some(pilot) = overrides.pilot {
            self.pilot.update(pilot, source);
        }
        if let Some(purpose) = overrides.purpose {
            self.purpose.update(purpose, source);
        }
        if let Some(client) = overrides.client {
            self.client.update(client, source);
        }
        if let Some(hours) = overrides.time_threshold_hours {
            self.time_threshold_hours.update(hours, source);
        }
        if let Some(meters) = overrides.coordinate_threshold_meters {
            self.coordinate_threshold_meters.update(meters, source);
        }
        if let Some(seconds) = overrides.valid_time_threshold_seconds {
            self.valid_time_threshold_seconds.update(seconds, source);
        }
        if let Some(dir) = overrides.input_dir {
            self.input_dir.update(dir, source);
        }
        if let Some(dir) = overrides.properties_dir {
            self.properties_dir.update(dir, source);
        }
        if let Some(dir) = overrides.output_dir {
            self.output_dir.update(dir, source);
        }
        if let Some(log) = overrides.consolidated_log {
            self.consolidated_log.update(log, source);
        }
        if let Some(boundaries) = overrides.boundaries {
            self.boundaries.update(Some(boundaries), source);
        }
    }

    /// Validate the layered values and freeze them into a [`RunConfig`]
    pub fn resolve(&self) -> Result<RunConfig> {
        let thresholds = Thresholds {
            time_threshold_hours: non_negative(
                "time_threshold_hours",
                self.time_threshold_hours.value,
            )?,
            coordinate_threshold_meters: non_negative(
                "coordinate_threshold_meters",
                self.coordinate_threshold_meters.value,
            )?,
            valid_time_threshold_seconds: non_negative(
                "valid_time_threshold_seconds",
                self.valid_time_threshold_seconds.value,
            )?,
        };

        Ok(RunConfig {
            metadata: RunMetadata {
                pilot: self.pilot.value.clone(),
                purpose: self.purpose.value.clone(),
                client: self.client.value.clone(),
            },
            thresholds,
            paths: RunPaths {
                input_dir: self.input_dir.value.clone(),
                properties_dir: self.properties_dir.value.clone(),
                output_dir: self.output_dir.value.clone(),
                consolidated_log: self.consolidated_log.value.clone(),
                boundaries: self.boundaries.value.clone(),
            },
        })
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> BTreeMap<String, (String, ConfigSource)> {
        let mut map = BTreeMap::new();

        map.insert("pilot".to_string(), (self.pilot.value.clone(), self.pilot.source));
        map.insert("purpose".to_string(), (self.purpose.value.clone(), self.purpose.source));
        map.insert("client".to_string(), (self.client.value.clone(), self.client.source));

        map.insert(
            "time_threshold_hours".to_string(),
            (self.time_threshold_hours.value.to_string(), self.time_threshold_hours.source),
        );
        map.insert(
            "coordinate_threshold_meters".to_string(),
            (
                self.coordinate_threshold_meters.value.to_string(),
                self.coordinate_threshold_meters.source,
            ),
        );
        map.insert(
            "valid_time_threshold_seconds".to_string(),
            (
                self.valid_time_threshold_seconds.value.to_string(),
                self.valid_time_threshold_seconds.source,
            ),
        );

        for (key, value) in [
            ("input_dir", &self.input_dir),
            ("properties_dir", &self.properties_dir),
            ("output_dir", &self.output_dir),
            ("consolidated_log", &self.consolidated_log),
        ] {
            map.insert(key.to_string(), (value.value.display().to_string(), value.source));
        }

        let boundaries = match &self.boundaries.value {
            Some(path) => path.display().to_string(),
            None => "(none)".to_string(),
        };
        map.insert("boundaries".to_string(), (boundaries, self.boundaries.source));

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    pilot: Option<String>,
    purpose: Option<String>,
    client: Option<String>,
    time_threshold_hours: Option<f64>,
    coordinate_threshold_meters: Option<f64>,
    valid_time_threshold_seconds: Option<f64>,
    input_dir: Option<PathBuf>,
    properties_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    consolidated_log: Option<PathBuf>,
    boundaries: Option<PathBuf>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub pilot: Option<String>,
    pub purpose: Option<String>,
    pub client: Option<String>,
    pub time_threshold_hours: Option<f64>,
    pub coordinate_threshold_meters: Option<f64>,
    pub valid_time_threshold_seconds: Option<f64>,
    pub input_dir: Option<PathBuf>,
    pub properties_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub consolidated_log: Option<PathBuf>,
    pub boundaries: Option<PathBuf>,
}

/// Resolved, immutable configuration handed to each stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfig {
    pub metadata: RunMetadata,
    pub thresholds: Thresholds,
    pub paths: RunPaths,
}

/// Clustering and eligibility thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Largest gap between a landing and the next takeoff within one project
    pub time_threshold_hours: f64,
    /// Largest distance between consecutive landing sites within one project
    pub coordinate_threshold_meters: f64,
    /// Flights shorter than this are ignored
    pub valid_time_threshold_seconds: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            time_threshold_hours: 24.0,
            coordinate_threshold_meters: 1000.0,
            valid_time_threshold_seconds: 50.0,
        }
    }
}

/// Filesystem locations used by the two stages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunPaths {
    pub input_dir: PathBuf,
    pub properties_dir: PathBuf,
    pub output_dir: PathBuf,
    pub consolidated_log: PathBuf,
    pub boundaries: Option<PathBuf>,
}

fn env_number(var: &str, key: &str) -> Result<Option<f64>> {
    let Ok(raw) = env::var(var) else {
        return Ok(None);
    };
    raw.trim().parse::<f64>().map(Some).map_err(|_| SortieError::ConfigInvalid {
        key: key.to_string(),
        reason: format!("{} must be a number, got '{}'", var, raw),
    })
}

fn non_negative(key: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SortieError::ConfigInvalid {
            key: key.to_string(),
            reason: format!("expected a finite, non-negative number, got {}", value),
        })
    }
}
