//! Command implementations

mod config;
mod identify;
mod process;
mod run;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config_file = cli.config.as_deref();

    match cli.command {
        Commands::Identify(args) => identify::execute(args, config_file, &output),
        Commands::Process(args) => process::execute(args, config_file, &output),
        Commands::Run(args) => run::execute(args, config_file, &output),
        Commands::Config(args) => config::execute(args, config_file, &output),
    }
}
