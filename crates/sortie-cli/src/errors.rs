use console::style;
use sortie_core::SortieError;
use std::fmt;
use std::path::Path;

/// Enhanced error type with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Turn the stage errors users can fix themselves into guided errors.
pub fn explain(err: SortieError) -> anyhow::Error {
    match err {
        SortieError::InputDirNotFound { path } => input_dir_not_found(&path).into(),
        SortieError::PropertiesDirNotFound { path } => properties_not_found(&path).into(),
        SortieError::Boundary { path, reason } => boundary_load_failed(&path, &reason).into(),
        SortieError::ConfigInvalid { key, reason } => config_invalid(&key, &reason).into(),
        other => anyhow::Error::new(other),
    }
}

/// Create error for a missing flight log directory
pub fn input_dir_not_found(path: &Path) -> CliError {
    CliError::new("Flight log directory not found")
        .with_context(format!("No directory of flight logs exists at the input path.\n\nPath: {}", path.display()))
        .with_suggestion("Pass the log directory: sortie identify --input-dir <DIR>")
        .with_suggestion("Or set input_dir in sortie.toml")
        .with_help("Run: sortie identify --help")
}

/// Create error for processing before identification
pub fn properties_not_found(path: &Path) -> CliError {
    CliError::new("Project properties not found")
        .with_context(format!(
            "Processing reads the project property files written by identification.\n\nPath: {}",
            path.display()
        ))
        .with_suggestion("Identify projects first: sortie identify")
        .with_suggestion("Or do both in one go: sortie run")
        .with_suggestion("Or point to existing property files: --properties-dir <DIR>")
        .with_help("Run: sortie process --help")
}

/// Create error for an unusable boundary dataset
pub fn boundary_load_failed(path: &Path, reason: &str) -> CliError {
    CliError::new("Cannot load country boundaries")
        .with_context(format!("Path: {}\nReason: {}", path.display(), reason))
        .with_suggestion("Check that the .shp, .shx and .dbf files sit side by side")
        .with_suggestion("Or use a GeoJSON FeatureCollection with a NAME property")
        .with_suggestion("Or drop the boundaries setting to skip country labels")
        .with_help("Run: sortie config")
}

/// Create error for a rejected configuration value
pub fn config_invalid(key: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid configuration value for {}", key))
        .with_context(reason.to_string())
        .with_suggestion("Thresholds must be finite, non-negative numbers")
        .with_suggestion("Inspect the effective values and their sources: sortie config")
        .with_help("Run: sortie --help")
}

/// Create error for an explicit configuration file that does not exist
pub fn config_file_not_found(path: &Path) -> CliError {
    CliError::new("Configuration file not found")
        .with_context(format!("Path: {}", path.display()))
        .with_suggestion("Check the --config path")
        .with_suggestion("Or omit --config to use ./sortie.toml when present")
        .with_help("Run: sortie --help")
}
