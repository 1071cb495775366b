//! Command-line interface definitions for Daily Readings.
//!
//! All arguments can be provided via command-line flags or environment variables.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Daily Readings application.
///
/// # Examples
///
/// ```sh
/// # Assemble today's readings once with default settings
/// daily_readings -j ./json -m ./markdown
///
/// # Use a config file and refresh every 3 hours
/// daily_readings -c ./readings.yaml -j ./json -m ./markdown --interval-secs 10800
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, env = "READINGS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output directory for the JSON bundle
    #[arg(short, long, env = "READINGS_JSON_DIR", default_value = "./output/json")]
    pub json_output_dir: PathBuf,

    /// Output directory for the Markdown page
    #[arg(short, long, env = "READINGS_MARKDOWN_DIR", default_value = "./output/markdown")]
    pub markdown_output_dir: PathBuf,

    /// Re-assemble every N seconds instead of running once
    #[arg(long, env = "READINGS_INTERVAL_SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_secs: Option<u64>,
}
