//! Config command implementation

use anyhow::Result;
use std::path::Path;

use crate::cli::OverrideArgs;
use crate::config_loader::{config_file, load_layered_config};
use crate::errors::explain;
use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, ConfigOutput};

pub fn execute(args: OverrideArgs, explicit: Option<&Path>, output: &OutputWriter) -> Result<()> {
    let file = config_file(explicit)?;
    let layered = load_layered_config(file.as_deref(), args.into())?;

    let values: Vec<ConfigEntry> = layered
        .to_inspection_map()
        .iter()
        .map(|(key, (value, source))| ConfigEntry::new(key, value, *source))
        .collect();

    // Report invalid values, but still show where they came from
    let problem = layered.resolve().err();

    if output.is_json() {
        output.result(ConfigOutput {
            config_file: file.map(|p| p.display().to_string()),
            values,
        })?;
    } else {
        output.section("Configuration");
        match &file {
            Some(path) => output.kv("Config file", path.display()),
            None => output.kv("Config file", "(none)"),
        }
        output.table(values);
    }

    match problem {
        Some(err) => Err(explain(err)),
        None => Ok(()),
    }
}
