//! Configuration loading utilities for CLI commands

use anyhow::Result;
use sortie_core::config::{CliConfigOverrides, LayeredConfig, RunConfig, DEFAULT_CONFIG_FILE};
use std::path::{Path, PathBuf};

use crate::errors::{config_file_not_found, explain};

/// Locate the configuration file: an explicit path must exist, the default
/// one is optional.
pub fn config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) if path.is_file() => Ok(Some(path.to_path_buf())),
        Some(path) => Err(config_file_not_found(path).into()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            Ok(default.is_file().then_some(default))
        }
    }
}

/// Load layered configuration with CLI overrides
pub fn load_layered_config(
    file: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();
    if let Some(path) = file {
        tracing::debug!("Loading configuration from {}", path.display());
        config = config.load_from_file(path).map_err(explain)?;
    }

    let mut config = config.load_from_env().map_err(explain)?;
    config.update_from_cli(overrides);
    Ok(config)
}

/// Load and resolve the configuration for a run
pub fn load_run_config(explicit: Option<&Path>, overrides: CliConfigOverrides) -> Result<RunConfig> {
    let file = config_file(explicit)?;
    let layered = load_layered_config(file.as_deref(), overrides)?;
    layered.resolve().map_err(explain)
}
