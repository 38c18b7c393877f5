//! Error types for Sortie

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SortieError {
    // Flight log errors
    #[error("Flight log {path} is missing required column(s): {}", .columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    #[error("Flight log {path} has no data rows")]
    EmptyLog { path: PathBuf },

    #[error("Flight log {path} has an unparsable timestamp '{value}'")]
    InvalidTimestamp { path: PathBuf, value: String },

    #[error("Cannot open flight log {path}: {source}")]
    LogUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read flight log {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    // Project properties errors
    #[error("Invalid project properties in {path}: {reason}")]
    PropertiesInvalid { path: PathBuf, reason: String },

    #[error("Project properties directory not found: {path}")]
    PropertiesDirNotFound { path: PathBuf },

    // Boundary dataset errors
    #[error("Failed to load boundary dataset {path}: {reason}")]
    Boundary { path: PathBuf, reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    #[error("Input directory not found: {path}")]
    InputDirNotFound { path: PathBuf },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Summary log errors
    #[error("Failed to write summary log {path}: {source}")]
    SummaryWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to read summary log {path}: {source}")]
    SummaryRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl SortieError {
    /// Whether the error only disqualifies a single flight log.
    ///
    /// Skippable errors are reported and the offending file is left out of the
    /// run; everything else aborts the current stage.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            SortieError::MissingColumns { .. }
                | SortieError::EmptyLog { .. }
                | SortieError::InvalidTimestamp { .. }
                | SortieError::LogUnreadable { .. }
                | SortieError::Csv { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SortieError>;
