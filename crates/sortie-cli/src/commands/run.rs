//! Run command implementation: identify, then process

use anyhow::Result;
use std::path::Path;

use super::{identify, process};
use crate::cli::OverrideArgs;
use crate::config_loader::load_run_config;
use crate::output::OutputWriter;
use crate::output_types::RunOutput;

pub fn execute(args: OverrideArgs, config_file: Option<&Path>, output: &OutputWriter) -> Result<()> {
    let config = load_run_config(config_file, args.into())?;

    let identified = identify::identify(&config)?;
    if !output.is_json() {
        identify::render(&identified, output);
    }

    let processed = process::process(&config)?;

    if output.is_json() {
        output.result(RunOutput { identify: &identified, process: &processed })?;
    } else {
        process::render(&processed, output);
    }
    Ok(())
}
