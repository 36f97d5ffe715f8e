//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::config::ExportFormat;
use clap::Parser;
use std::path::PathBuf;

/// Decline Indicators - regional decline criteria from statistics extracts
///
/// Reads caret-delimited `year^region^metric^value` files for population,
/// business establishments and building ages, flags the regions meeting
/// each decline criterion, and ranks regions by how many they meet.
///
/// Examples:
///   decline-indicators -p pop/ -b biz/ -B buildings.txt
///   decline-indicators -p pop_2000_2010.txt,pop_2011_2023.txt --format csv
///   decline-indicators -p pop/ --preview
///   decline-indicators --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Population files or directories (comma-separated)
    #[arg(short = 'p', long, value_name = "PATHS", value_delimiter = ',')]
    pub population: Vec<PathBuf>,

    /// Business establishment files or directories (comma-separated)
    #[arg(short = 'b', long, value_name = "PATHS", value_delimiter = ',')]
    pub business: Vec<PathBuf>,

    /// Building age files or directories (comma-separated)
    #[arg(short = 'B', long, value_name = "PATHS", value_delimiter = ',')]
    pub buildings: Vec<PathBuf>,

    /// Directory receiving the exported tables
    ///
    /// Defaults to the config file setting, or ./decline_output
    #[arg(short, long, value_name = "DIR", env = "DECLINE_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Export format (csv, xlsx, both)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<ExportFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .decline.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Consecutive drops needed for a sustained decline
    #[arg(long, value_name = "N")]
    pub min_drops: Option<usize>,

    /// Print each result table to the terminal
    #[arg(long)]
    pub preview: bool,

    /// Write the region -> criteria met mapping as JSON
    #[arg(long, value_name = "FILE")]
    pub map_json: Option<PathBuf>,

    /// Do not append the run date to exported file names
    #[arg(long)]
    pub no_timestamp: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .decline.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.population.is_empty() && self.business.is_empty() && self.buildings.is_empty() {
            return Err(
                "Supply at least one of --population, --business or --buildings".to_string(),
            );
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(0) = self.min_drops {
            return Err("--min-drops must be at least 1".to_string());
        }

        if self.map_json.is_some() && !self.has_all_categories() {
            return Err(
                "--map-json needs --population, --business and --buildings inputs".to_string(),
            );
        }

        Ok(())
    }

    /// Whether inputs were given for all three categories.
    pub fn has_all_categories(&self) -> bool {
        !self.population.is_empty() && !self.business.is_empty() && !self.buildings.is_empty()
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
