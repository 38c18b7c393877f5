use clap::{Args, Parser, Subcommand};
use sortie_core::config::CliConfigOverrides;
use std::path::PathBuf;

/// Sortie - Drone flight log project segmentation
#[derive(Parser, Debug)]
#[command(name = "sortie")]
#[command(about = "Group drone flight logs into projects and build flight summaries", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ./sortie.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Segment flight logs into projects and write project property files
    Identify(OverrideArgs),

    /// Build project logs and the consolidated dataset from property files
    Process(OverrideArgs),

    /// Identify projects, then process them
    Run(OverrideArgs),

    /// Show the effective configuration and where each value comes from
    Config(OverrideArgs),
}

/// Per-run overrides, highest precedence
#[derive(Args, Debug, Default)]
pub struct OverrideArgs {
    /// Pilot name recorded in every project
    #[arg(long)]
    pub pilot: Option<String>,

    /// Flight purpose (Training, Testing, or Commercial)
    #[arg(long)]
    pub purpose: Option<String>,

    /// Client name recorded in every project
    #[arg(long)]
    pub client: Option<String>,

    /// Largest landing-to-takeoff gap within a project, in hours
    #[arg(long, value_name = "HOURS")]
    pub time_threshold: Option<f64>,

    /// Largest distance between consecutive landings within a project, in meters
    #[arg(long, value_name = "METERS")]
    pub coordinate_threshold: Option<f64>,

    /// Flights shorter than this many seconds are ignored
    #[arg(long, value_name = "SECONDS")]
    pub valid_time_threshold: Option<f64>,

    /// Directory holding the flight logs
    #[arg(long, value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory for project property files
    #[arg(long, value_name = "DIR")]
    pub properties_dir: Option<PathBuf>,

    /// Directory for per-project summary logs
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Consolidated dataset path
    #[arg(long, value_name = "FILE")]
    pub consolidated: Option<PathBuf>,

    /// Country boundary dataset (.shp or .geojson)
    #[arg(long, value_name = "FILE")]
    pub boundaries: Option<PathBuf>,
}

impl From<OverrideArgs> for CliConfigOverrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            pilot: args.pilot,
            purpose: args.purpose,
            client: args.client,
            time_threshold_hours: args.time_threshold,
            coordinate_threshold_meters: args.coordinate_threshold,
            valid_time_threshold_seconds: args.valid_time_threshold,
            input_dir: args.input_dir,
            properties_dir: args.properties_dir,
            output_dir: args.output_dir,
            consolidated_log: args.consolidated,
            boundaries: args.boundaries,
        }
    }
}
